//! Authoring lint for Markdown exams
//!
//! Runs the parser and reports questions that would convert into broken or
//! surprising QTI items.

use std::collections::{BTreeSet, HashSet};

use crate::models::{LintIssue, ParsedQuiz, Question, QuestionType};
use crate::parser::{blanks, parse_markdown};

const CONTEXT_STEM_CHARS: usize = 30;

/// Lint a Markdown exam document
pub fn lint_markdown(content: &str) -> Vec<LintIssue> {
    lint_quiz(&parse_markdown(content))
}

/// Lint an already parsed quiz
pub fn lint_quiz(quiz: &ParsedQuiz) -> Vec<LintIssue> {
    let mut issues = Vec::new();

    if quiz.questions.is_empty() {
        issues.push(LintIssue::error(
            "No questions found. Ensure headers start with ## and follow the correct format.",
        ));
        return issues;
    }

    for (index, question) in quiz.questions.iter().enumerate() {
        lint_question(question, index + 1, &mut issues);
    }

    let mut seen = HashSet::new();
    let duplicates: BTreeSet<u32> = quiz
        .questions
        .iter()
        .map(|q| q.id)
        .filter(|id| !seen.insert(*id))
        .collect();
    for id in duplicates {
        issues.push(LintIssue::error(format!("Duplicate Question ID found: {}", id)));
    }

    issues
}

fn context_for(question: &Question, position: usize) -> String {
    let preview: String = question.stem.chars().take(CONTEXT_STEM_CHARS).collect();
    format!("Question {} (\"{}...\")", position, preview)
}

fn lint_question(question: &Question, position: usize, issues: &mut Vec<LintIssue>) {
    let context = context_for(question, position);
    let mut push = |issue: LintIssue| issues.push(issue.at(question.source_line, context.as_str()));

    if question.stem.trim().is_empty() {
        push(LintIssue::error("Question is missing a question stem/text."));
    }

    let question_type = question.question_type;

    if question_type.is_choice() {
        if question.options.len() < 2 {
            push(LintIssue::error(format!(
                "Question type '{}' must have at least 2 options. Found {}.",
                question_type,
                question.options.len()
            )));
        }

        let correct = question.correct_options().count();
        if correct == 0 {
            push(LintIssue::error(
                "No correct answer marked. Use **bold**, [x], or a leading * to mark the correct option.",
            ));
        }

        if question_type == QuestionType::MultipleChoice && correct > 1 {
            push(LintIssue::warning(
                "Multiple correct answers found for 'multiple_choice'. Use a [MultiAns] marker or ensure only one is correct.",
            ));
        }

        if question_type == QuestionType::TrueFalse && correct != 1 {
            push(LintIssue::warning(format!(
                "True/False question should have exactly one correct answer. Found {}.",
                correct
            )));
        }

        let mut option_ids = HashSet::new();
        for option in &question.options {
            if !option_ids.insert(option.id.as_str()) {
                push(LintIssue::warning(format!(
                    "Duplicate option id '{}'. Check the option numbering.",
                    option.id
                )));
            }
        }
    }

    match question_type {
        QuestionType::Matching => {
            let pairs = question.match_pairs.as_ref().map_or(0, Vec::len);
            if pairs < 2 {
                push(LintIssue::error(format!(
                    "Matching question needs at least 2 pairs (- left :: right). Found {}.",
                    pairs
                )));
            }
        }
        QuestionType::FillInMultipleBlanks => {
            let defined: HashSet<&str> = question
                .blanks
                .iter()
                .flatten()
                .map(|b| b.blank_id.as_str())
                .collect();
            let placeholders = blanks::placeholders_in(&question.stem);
            if placeholders.is_empty() {
                push(LintIssue::error(
                    "Fill-in-multiple-blanks question has no [blankN] placeholders in its text.",
                ));
            }
            for placeholder in placeholders {
                if !defined.contains(placeholder.as_str()) {
                    push(LintIssue::error(format!(
                        "Placeholder [{}] has no answer line ([{}]: answer).",
                        placeholder, placeholder
                    )));
                }
            }
        }
        QuestionType::ShortAnswer | QuestionType::FillInBlank if question.options.is_empty() => {
            push(LintIssue::warning(
                "No answer provided (Answer: ...). The question will need manual grading.",
            ));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{has_errors, Severity};

    fn messages(issues: &[LintIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.message.as_str()).collect()
    }

    #[test]
    fn test_valid_quiz_has_no_issues() {
        let issues = lint_markdown("# Quiz Title\n## 1. Valid Question [1 pt]\n1) Option A\n2) **Option B**\n");
        assert!(issues.is_empty(), "{:?}", messages(&issues));
    }

    #[test]
    fn test_empty_quiz() {
        let issues = lint_markdown("");
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("No questions found"));
        assert!(has_errors(&issues));
    }

    #[test]
    fn test_missing_correct_answer() {
        let issues = lint_markdown("# Quiz\n## 1. Invalid Question\n1) A\n2) B\n");
        assert!(messages(&issues).iter().any(|m| m.contains("No correct answer marked")));
        assert_eq!(issues[0].line, Some(2));
        assert_eq!(issues[0].context.as_deref(), Some("Question 1 (\"Invalid Question...\")"));
    }

    #[test]
    fn test_insufficient_options() {
        let issues = lint_markdown("# Quiz\n## 1. Bad Question\n1) **A**\n");
        assert!(messages(&issues)
            .iter()
            .any(|m| m.contains("must have at least 2 options")));
    }

    #[test]
    fn test_duplicate_question_ids() {
        let issues = lint_markdown(
            "# Quiz\n## 1. Question A [1 pt]\n1) A\n2) **B**\n\n## 1. Question B [1 pt]\n1) A\n2) **B**\n",
        );
        let duplicates: Vec<_> = messages(&issues)
            .into_iter()
            .filter(|m| m.contains("Duplicate Question ID found: 1"))
            .collect();
        assert_eq!(duplicates.len(), 1);
    }

    #[test]
    fn test_multiple_correct_is_warning() {
        let issues = lint_markdown("## 1. Pick one\n1) **A**\n2) **B**\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert!(!has_errors(&issues));
    }

    #[test]
    fn test_duplicate_option_ids_warn() {
        let issues = lint_markdown("## 1. Q\na) A\na) **B**\n");
        assert!(messages(&issues).iter().any(|m| m.contains("Duplicate option id 'a'")));
    }

    #[test]
    fn test_matching_needs_two_pairs() {
        let issues = lint_markdown("## 1. [Match] Pair them\n- A :: 1\n");
        assert!(messages(&issues).iter().any(|m| m.contains("at least 2 pairs")));
    }

    #[test]
    fn test_blank_without_answer_line() {
        let issues = lint_markdown("## 1. [FMB] From [blank1] to [blank2].\n[blank1]: -1\n");
        assert!(messages(&issues).iter().any(|m| m.contains("Placeholder [blank2]")));
        assert!(!messages(&issues).iter().any(|m| m.contains("Placeholder [blank1]")));
    }

    #[test]
    fn test_short_answer_without_answer_warns() {
        let issues = lint_markdown("## 1. [Short] Name a measure of spread.\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
    }
}
