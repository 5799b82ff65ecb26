//! Matching pairs and fill-in-multiple-blanks definitions

use crate::models::{BlankAnswer, MatchPair};

regex!(match_pair_re, r"^-?\s*(.+?)\s*(?:::|=>)\s*(.+)$");
regex!(blank_definition_re, r"^\\?\[(blank\d+)\\?\]:\s*(.+)$");

/// Parse `- left :: right` / `- left => right` lines into ordered pairs
pub fn parse_match_pairs<S: AsRef<str>>(lines: &[S]) -> Vec<MatchPair> {
    lines
        .iter()
        .filter_map(|line| {
            let caps = match_pair_re().captures(line.as_ref().trim())?;
            Some(MatchPair {
                left: caps[1].trim().to_string(),
                right: caps[2].trim().to_string(),
            })
        })
        .collect()
}

/// Parse `[blankN]: a, b` lines; answers are split on commas, empties dropped
pub fn parse_blank_definitions<S: AsRef<str>>(lines: &[S]) -> Vec<BlankAnswer> {
    lines
        .iter()
        .filter_map(|line| {
            let caps = blank_definition_re().captures(line.as_ref().trim())?;
            let answers: Vec<String> = caps[2]
                .split(',')
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect();
            if answers.is_empty() {
                return None;
            }
            Some(BlankAnswer {
                blank_id: caps[1].to_string(),
                answers,
            })
        })
        .collect()
}

/// Whether the stem contains a `[blank_id]` placeholder (escaped or not)
pub fn stem_has_placeholder(stem: &str, blank_id: &str) -> bool {
    stem.contains(&format!("[{}]", blank_id)) || stem.contains(&format!("\\[{}\\]", blank_id))
}

/// Placeholder ids in order of first appearance in the stem
pub fn placeholders_in(stem: &str) -> Vec<String> {
    regex!(placeholder_re, r"\\?\[(blank\d+)\\?\]");

    let mut ids: Vec<String> = Vec::new();
    for caps in placeholder_re().captures_iter(stem) {
        let id = caps[1].to_string();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Keep only definitions whose placeholder appears in the stem
pub fn retain_placed_blanks(stem: &str, blanks: Vec<BlankAnswer>) -> Vec<BlankAnswer> {
    blanks
        .into_iter()
        .filter(|blank| {
            let placed = stem_has_placeholder(stem, &blank.blank_id);
            if !placed {
                tracing::warn!(
                    "Dropping [{}]: no matching placeholder in the question text",
                    blank.blank_id
                );
            }
            placed
        })
        .collect()
}
