//! Answer option lines
//!
//! Recognized shapes, first match wins:
//! 1. `> feedback` (attached to the previous option, or `> [feedback] ...` for the question)
//! 2. `1) text` / `*1) text`
//! 3. `a) text` / `*a) text` / `a) *text`
//! 4. `- text` (not `- left :: right` pairs, not `-0.678`)
//! 5. `True` / `*False` / `[x] True`
//!
//! Correctness markers inside the text: `**bold**`, `✓`, `✔`, `[correct]`, `[x]`,
//! and their Quarto-escaped forms. Markers never survive into the stored text.

use crate::models::AnswerOption;

regex!(numbered_re, r"^(\*)?(\d+)\)\s+(.+)$");
regex!(lettered_re, r"^(\*)?([a-eA-E])\)\s+(.+)$");
regex!(dashed_re, r"^-\s+(.+)$");
regex!(
    true_false_re,
    r"(?i)^(\*|\\?\[[ \t]*x[ \t]*\\?\])?[ \t]*(true|false)[ \t]*(\\?\[[ \t]*(?:x|correct)[ \t]*\\?\])?$"
);
regex!(inline_feedback_re, r"^(.*?)[ \t]+//[ \t]*(.*)$");
regex!(
    correct_token_re,
    r"(?i)[ \t]*\\?\[[ \t]*(?:x|correct)[ \t]*\\?\]"
);
regex!(general_feedback_re, r"(?i)^\\?\[feedback\\?\]\s*(.*)$");
regex!(blank_definition_re, r"^\\?\[blank\d+\\?\]:");

/// Options plus question-level feedback found in one question's lines
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedOptions {
    pub options: Vec<AnswerOption>,
    pub general_feedback: Option<String>,
}

/// A logical line: an option with its wrapped continuations joined, or feedback
#[derive(Debug)]
enum Entry {
    Option(String),
    Feedback(String),
}

/// Map an author number to its model id: `1 → a`, `2 → b`, ...
pub fn option_letter(number: usize) -> String {
    if (1..=26).contains(&number) {
        char::from(b'a' + (number - 1) as u8).to_string()
    } else {
        number.to_string()
    }
}

/// Whether `line` is a `- left :: right` or `- left => right` matching pair
pub fn is_match_pair_line(line: &str) -> bool {
    line.contains("::") || line.contains("=>")
}

/// Whether a trimmed line opens a new option
pub fn is_option_start(line: &str) -> bool {
    numbered_re().is_match(line)
        || lettered_re().is_match(line)
        || dashed_re().is_match(line)
        || true_false_re().is_match(line)
}

/// Whether a trimmed line is a `[blankN]: answers` definition
pub fn is_blank_definition(line: &str) -> bool {
    blank_definition_re().is_match(line)
}

/// Parse option lines, ignoring feedback
pub fn parse_options<S: AsRef<str>>(lines: &[S]) -> Vec<AnswerOption> {
    parse_options_with_feedback(lines).options
}

/// Parse option lines together with `>` feedback lines
pub fn parse_options_with_feedback<S: AsRef<str>>(lines: &[S]) -> ParsedOptions {
    let mut parsed = ParsedOptions::default();

    for entry in group_entries(lines) {
        match entry {
            Entry::Option(line) => {
                if let Some(option) = parse_option_line(&line, parsed.options.len()) {
                    parsed.options.push(option);
                }
            }
            Entry::Feedback(text) => attach_feedback(&mut parsed, text),
        }
    }

    parsed
}

/// Join hard-wrapped continuation lines onto the option they belong to
fn group_entries<S: AsRef<str>>(lines: &[S]) -> Vec<Entry> {
    let mut entries: Vec<Entry> = Vec::new();

    for raw in lines {
        let line = raw.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix('>') {
            entries.push(Entry::Feedback(rest.trim().to_string()));
        } else if is_option_start(line) {
            entries.push(Entry::Option(line.to_string()));
        } else if is_blank_definition(line) {
            continue;
        } else if let Some(Entry::Option(previous)) = entries.last_mut() {
            previous.push(' ');
            previous.push_str(line);
        }
    }

    entries
}

fn attach_feedback(parsed: &mut ParsedOptions, text: String) {
    if text.is_empty() {
        return;
    }

    if let Some(caps) = general_feedback_re().captures(&text) {
        let general = caps[1].trim().to_string();
        if !general.is_empty() {
            append_text(&mut parsed.general_feedback, general);
        }
        return;
    }

    match parsed.options.last_mut() {
        Some(option) => append_text(&mut option.feedback, text),
        None => append_text(&mut parsed.general_feedback, text),
    }
}

fn append_text(slot: &mut Option<String>, text: String) {
    match slot {
        Some(existing) => {
            existing.push(' ');
            existing.push_str(&text);
        }
        None => *slot = Some(text),
    }
}

/// Parse a single logical option line; `position` is the number of options already parsed
pub fn parse_option_line(line: &str, position: usize) -> Option<AnswerOption> {
    if let Some(caps) = numbered_re().captures(line) {
        let number: usize = caps[2].parse().ok()?;
        return Some(build_option(
            option_letter(number),
            &caps[3],
            caps.get(1).is_some(),
            false,
        ));
    }

    if let Some(caps) = lettered_re().captures(line) {
        return Some(build_option(
            caps[2].to_lowercase(),
            &caps[3],
            caps.get(1).is_some(),
            true,
        ));
    }

    if let Some(caps) = dashed_re().captures(line) {
        if is_match_pair_line(&caps[1]) {
            return None;
        }
        return Some(build_option(option_letter(position + 1), &caps[1], false, false));
    }

    if let Some(caps) = true_false_re().captures(line) {
        let is_true = caps[2].eq_ignore_ascii_case("true");
        let is_correct = caps.get(1).is_some() || caps.get(3).is_some();
        let (id, text) = if is_true { ("a", "True") } else { ("b", "False") };
        return Some(AnswerOption::new(id, text, is_correct));
    }

    None
}

fn build_option(id: String, body: &str, starred: bool, leading_star_marks: bool) -> AnswerOption {
    // `//` feedback is split off first; marker detection only sees the option part
    let (text, feedback) = match inline_feedback_re().captures(body) {
        Some(caps) if !caps[2].trim().is_empty() => {
            (caps[1].to_string(), Some(caps[2].trim().to_string()))
        }
        _ => (body.to_string(), None),
    };

    let (clean, marked) = strip_correctness(&text, leading_star_marks);

    AnswerOption {
        id,
        text: clean,
        is_correct: starred || marked,
        feedback,
    }
}

/// Remove correctness markup, reporting whether any was present
pub fn strip_correctness(text: &str, leading_star_marks: bool) -> (String, bool) {
    let trimmed = text.trim();
    let mut marked = trimmed.contains("**")
        || trimmed.contains('✓')
        || trimmed.contains('✔')
        || correct_token_re().is_match(trimmed);

    let mut clean = trimmed.replace("**", "");
    if leading_star_marks && !trimmed.starts_with("**") {
        if let Some(rest) = clean.strip_prefix('*') {
            marked = true;
            clean = rest.strip_suffix('*').unwrap_or(rest).to_string();
        }
    }

    let clean: String = clean.chars().filter(|c| *c != '✓' && *c != '✔').collect();
    let clean = correct_token_re().replace_all(&clean, "");

    (clean.trim().to_string(), marked)
}
