use serde::{Deserialize, Serialize};
use std::fmt;

/// Canvas question kinds the parser can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    /// Several options may be correct
    MultipleAnswers,
    TrueFalse,
    Essay,
    ShortAnswer,
    FillInBlank,
    /// Several `[blankN]` placeholders in one stem
    FillInMultipleBlanks,
    /// Left/right pairs
    Matching,
    Numerical,
    Calculated,
}

impl QuestionType {
    /// Wire name used in previews and lint messages
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::MultipleAnswers => "multiple_answers",
            QuestionType::TrueFalse => "true_false",
            QuestionType::Essay => "essay",
            QuestionType::ShortAnswer => "short_answer",
            QuestionType::FillInBlank => "fill_in_blank",
            QuestionType::FillInMultipleBlanks => "fill_in_multiple_blanks",
            QuestionType::Matching => "matching",
            QuestionType::Numerical => "numerical",
            QuestionType::Calculated => "calculated",
        }
    }

    /// Whether the question is answered by picking from its option list
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            QuestionType::MultipleChoice | QuestionType::MultipleAnswers | QuestionType::TrueFalse
        )
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One answer option as written by the author
///
/// `id` is the model identifier derived from the author's numbering (`1)` → `a`).
/// It is not the QTI choice identifier, which the generator assigns by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl AnswerOption {
    pub fn new(id: impl Into<String>, text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            is_correct,
            feedback: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
    pub left: String,
    pub right: String,
}

/// Accepted answers for one `[blankN]` placeholder; the first is primary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlankAnswer {
    pub blank_id: String,
    pub answers: Vec<String>,
}

/// A sealed question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u32,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub stem: String,
    pub options: Vec<AnswerOption>,
    pub points: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_pairs: Option<Vec<MatchPair>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blanks: Option<Vec<BlankAnswer>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_feedback: Option<String>,
    /// 1-indexed line of the question heading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_line: Option<usize>,
}

impl Question {
    pub fn correct_options(&self) -> impl Iterator<Item = &AnswerOption> {
        self.options.iter().filter(|o| o.is_correct)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub title: String,
    pub question_ids: Vec<u32>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            id: slugify(&title),
            title,
            question_ids: Vec::new(),
        }
    }
}

/// Result of one parse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedQuiz {
    pub title: String,
    pub default_points: f64,
    pub sections: Vec<Section>,
    pub questions: Vec<Question>,
}

impl ParsedQuiz {
    pub fn question(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// Lowercase identifier slug: runs of non-alphanumerics become `_`
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_sep = false;

    for c in text.chars().flat_map(|c| c.to_lowercase()) {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(c);
        } else {
            pending_sep = true;
        }
    }

    slug
}
