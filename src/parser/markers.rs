//! Inline title markers
//!
//! Question titles carry optional bracketed markers, written plain (`[TF]`) or
//! with the escaped brackets Quarto emits (`\[TF\]`):
//! - type markers: `[TF]`, `[MultiAns]`, `[Essay, 10pts]`, ...
//! - points markers: `[2 pts]`, `[1pt]`, `\[3 points\]`
//! - correctness tokens: `[x]`, `[correct]`

use crate::models::QuestionType;

/// Alias → canonical type. Keys are normalized by [`normalize_alias`].
const TYPE_ALIASES: &[(&str, QuestionType)] = &[
    ("mc", QuestionType::MultipleChoice),
    ("multiplechoice", QuestionType::MultipleChoice),
    ("choice", QuestionType::MultipleChoice),
    ("tf", QuestionType::TrueFalse),
    ("truefalse", QuestionType::TrueFalse),
    ("true/false", QuestionType::TrueFalse),
    ("t/f", QuestionType::TrueFalse),
    ("multians", QuestionType::MultipleAnswers),
    ("multianswer", QuestionType::MultipleAnswers),
    ("multianswers", QuestionType::MultipleAnswers),
    ("multipleanswer", QuestionType::MultipleAnswers),
    ("multipleanswers", QuestionType::MultipleAnswers),
    ("ma", QuestionType::MultipleAnswers),
    ("selectall", QuestionType::MultipleAnswers),
    ("checkbox", QuestionType::MultipleAnswers),
    ("short", QuestionType::ShortAnswer),
    ("sa", QuestionType::ShortAnswer),
    ("shortanswer", QuestionType::ShortAnswer),
    ("essay", QuestionType::Essay),
    ("longanswer", QuestionType::Essay),
    ("match", QuestionType::Matching),
    ("matching", QuestionType::Matching),
    ("fmb", QuestionType::FillInMultipleBlanks),
    ("fillblanks", QuestionType::FillInMultipleBlanks),
    ("fitb", QuestionType::FillInMultipleBlanks),
    ("fillinblanks", QuestionType::FillInMultipleBlanks),
    ("fillinmultipleblanks", QuestionType::FillInMultipleBlanks),
    ("multiblank", QuestionType::FillInMultipleBlanks),
    ("fib", QuestionType::FillInBlank),
    ("fillblank", QuestionType::FillInBlank),
    ("fillintheblank", QuestionType::FillInBlank),
    ("numeric", QuestionType::Numerical),
    ("numerical", QuestionType::Numerical),
    ("num", QuestionType::Numerical),
    ("number", QuestionType::Numerical),
    ("calc", QuestionType::Calculated),
    ("calculated", QuestionType::Calculated),
    ("formula", QuestionType::Calculated),
];

regex!(
    type_marker_re,
    r"(?i)[ \t]*(?:\\\[|\[)[ \t]*([a-z][a-z/ _-]*?)[ \t]*(?:,[ \t]*(\d+)[ \t]*(?:pts?|points?))?[ \t]*(?:\\\]|\])"
);
regex!(
    points_re,
    r"(?i)[ \t]*(?:\\\[|\[)[ \t]*(\d+)[ \t]*(?:pts?|points?)[ \t]*(?:\\\]|\])"
);
regex!(
    correctness_token_re,
    r"(?i)[ \t]*\\?\[[ \t]*(?:x|correct)[ \t]*\\?\]"
);

/// Type marker found in a title
#[derive(Debug, Clone, PartialEq)]
pub struct TypeMarker {
    pub question_type: Option<QuestionType>,
    /// Points embedded in the marker, as in `[Essay, 10pts]`
    pub points: Option<u32>,
    /// Title with the marker removed
    pub title: String,
}

fn normalize_alias(alias: &str) -> String {
    alias
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Resolve an alias such as `TrueFalse` or `select all` to its question type
pub fn resolve_alias(alias: &str) -> Option<QuestionType> {
    let key = normalize_alias(alias);
    TYPE_ALIASES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, question_type)| *question_type)
}

/// Every alias the marker table knows, in table order
pub fn known_aliases() -> impl Iterator<Item = (&'static str, QuestionType)> {
    TYPE_ALIASES.iter().copied()
}

/// Detect the first bracketed type marker in `title`
///
/// Brackets that do not name a known alias are left alone, so `[blank1]` or
/// `[x]` never count as type markers.
pub fn extract_type_marker(title: &str) -> TypeMarker {
    for caps in type_marker_re().captures_iter(title) {
        let Some(question_type) = caps.get(1).and_then(|m| resolve_alias(m.as_str())) else {
            continue;
        };
        let points = caps.get(2).and_then(|m| m.as_str().parse().ok());
        let Some(whole) = caps.get(0) else {
            continue;
        };

        let mut cleaned = String::with_capacity(title.len());
        cleaned.push_str(&title[..whole.start()]);
        cleaned.push_str(&title[whole.end()..]);

        return TypeMarker {
            question_type: Some(question_type),
            points,
            title: cleaned.trim().to_string(),
        };
    }

    TypeMarker {
        question_type: None,
        points: None,
        title: title.to_string(),
    }
}

/// Extract a `[N pts]` marker, returning the points and the title without it
pub fn extract_points(title: &str) -> (Option<u32>, String) {
    match points_re().captures(title) {
        Some(caps) => {
            let points = caps.get(1).and_then(|m| m.as_str().parse().ok());
            let cleaned = points_re().replace(title, "");
            (points, cleaned.trim().to_string())
        }
        None => (None, title.to_string()),
    }
}

/// Remove residual type, points, and correctness tokens from a stem
pub fn strip_residual_markers(stem: &str) -> String {
    let without_types = type_marker_re().replace_all(stem, |caps: &regex::Captures| {
        match caps.get(1).and_then(|m| resolve_alias(m.as_str())) {
            Some(_) => String::new(),
            None => caps[0].to_string(),
        }
    });
    let without_points = points_re().replace_all(&without_types, "");
    let without_tokens = correctness_token_re().replace_all(&without_points, "");
    without_tokens.trim().to_string()
}

/// Whether a title carries any type or points marker
pub fn has_marker(title: &str) -> bool {
    extract_type_marker(title).question_type.is_some() || points_re().is_match(title)
}

/// Infer the type from title and section keywords when no marker is present
pub fn infer_question_type(title: &str, section_title: Option<&str>) -> QuestionType {
    let lower = title.to_lowercase();

    if lower.contains("essay") {
        return QuestionType::Essay;
    }
    if lower.contains("short") && lower.contains("answer") {
        return QuestionType::ShortAnswer;
    }
    if lower.contains("fill") || lower.contains("blank") {
        return QuestionType::FillInBlank;
    }

    if let Some(section) = section_title {
        let section = section.to_lowercase();
        if section.contains("essay") {
            return QuestionType::Essay;
        }
        if section.contains("true") || section.contains("false") {
            return QuestionType::TrueFalse;
        }
        if section.contains("short") {
            return QuestionType::ShortAnswer;
        }
        if section.contains("multi-part") || section.contains("multi part") {
            return QuestionType::Essay;
        }
    }

    QuestionType::MultipleChoice
}
