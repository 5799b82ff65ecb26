//! Integration tests for the Markdown exam parser
//!
//! Covers the full dialect through `parse_markdown`:
//! - sections, points and type markers
//! - correctness markers on options
//! - true/false synthesis and answer extraction
//! - matching pairs and fill-in-multiple-blanks
//! - cover page handling and solution blocks

use examark::parser::{extract_type_marker, parse_markdown, MarkdownParser};
use examark::QuestionType;

#[test]
fn test_standard_quiz() {
    let quiz = parse_markdown(
        r#"
# Quiz Title

# Multiple Choice

## 1. Question 1 [2 pts]
1) Option A
2) **Option B**
"#,
    );

    assert_eq!(quiz.title, "Quiz Title");
    assert_eq!(quiz.questions.len(), 1);
    let q = &quiz.questions[0];
    assert_eq!(q.points, 2.0);
    assert_eq!(q.question_type, QuestionType::MultipleChoice);
    assert_eq!(q.stem, "Question 1");
}

#[test]
fn test_section_prefix_headers() {
    let quiz = parse_markdown(
        r#"
# Statistics Exam

# Section: Multiple Choice

## 1. What is variance? [3 pts]
1) Sum of squares
2) **Average squared deviation**
"#,
    );

    assert_eq!(quiz.sections.len(), 1);
    assert!(quiz.sections[0].title.contains("Multiple Choice"));
    assert_eq!(quiz.sections[0].question_ids, [1]);
    assert_eq!(quiz.questions.len(), 1);
    assert_eq!(quiz.questions[0].points, 3.0);
}

#[test]
fn test_numbering_determinism() {
    let quiz = parse_markdown("## 1. Pick one\n1) A\n2) **B**\n");
    let options = &quiz.questions[0].options;

    assert_eq!(options.len(), 2);
    assert_eq!(options[0].id, "a");
    assert_eq!(options[1].id, "b");
    assert_eq!(options[0].text, "A");
    assert_eq!(options[1].text, "B");
    assert!(!options[0].is_correct);
    assert!(options[1].is_correct);
}

#[test]
fn test_correctness_markers_are_stripped() {
    let quiz = parse_markdown(
        r#"
# Multiple Choice

## 1. Bold
1) Wrong
2) **Right**

## 2. Checkmark
1) Wrong
2) Average squared deviation from mean ✓

## 3. Correct tag
1) Wrong
2) Right [correct]

## 4. Checkbox
1) Wrong
2) Right [x]

## 5. Asterisk prefix
*a) The coefficient β₁
b) The intercept
"#,
    );

    assert_eq!(quiz.questions.len(), 5);
    for q in &quiz.questions {
        let correct: Vec<_> = q.correct_options().collect();
        assert_eq!(correct.len(), 1, "question {}", q.id);
        for marker in ["**", "✓", "[correct]", "[x]"] {
            assert!(
                !correct[0].text.contains(marker),
                "question {} kept {} in {:?}",
                q.id,
                marker,
                correct[0].text
            );
        }
    }

    assert_eq!(quiz.questions[1].options[1].text, "Average squared deviation from mean");
    assert_eq!(quiz.questions[4].options[0].text, "The coefficient β₁");
    assert!(quiz.questions[4].options[0].is_correct);
}

#[test]
fn test_escaped_points_match_plain_points() {
    let quiz = parse_markdown(
        r#"
# Quiz
## 1. Question Title \[2 pts\]
1) A
2) **B**

## 2. Question Title [2 pts]
1) A
2) **B**
"#,
    );

    assert_eq!(quiz.questions[0].points, 2.0);
    assert_eq!(quiz.questions[1].points, 2.0);
    assert_eq!(quiz.questions[0].stem, "Question Title");
    assert_eq!(quiz.questions[0].stem, quiz.questions[1].stem);
}

#[test]
fn test_true_false_synthesis_from_arrow() {
    let quiz = parse_markdown("# Section: True/False\n\n## 1. The sky is blue. -> True\n");
    let q = &quiz.questions[0];

    assert_eq!(q.question_type, QuestionType::TrueFalse);
    assert_eq!(q.stem, "The sky is blue.");
    assert_eq!(q.options.len(), 2);
    assert_eq!(q.options[0].text, "True");
    assert!(q.options[0].is_correct);
    assert_eq!(q.options[1].text, "False");
    assert!(!q.options[1].is_correct);
}

#[test]
fn test_true_false_answer_on_body_line() {
    let quiz = parse_markdown(
        r#"
# Section: True/False
## 1. Simple Fact
The sky is blue. -> True

## 2. Another Fact
Water is dry. → False
"#,
    );

    let q1 = &quiz.questions[0];
    assert_eq!(q1.question_type, QuestionType::TrueFalse);
    assert!(q1.options[0].is_correct);
    assert!(!q1.stem.contains("-> True"));

    let q2 = &quiz.questions[1];
    assert_eq!(q2.options[1].text, "False");
    assert!(q2.options[1].is_correct);
    assert!(!q2.stem.contains('→'));
}

#[test]
fn test_type_markers() {
    let quiz = parse_markdown(
        r#"
# Quiz

## 3. [TF] The coefficient R² can never be negative.
*True
False

## 5. [Essay, 10pts] Explain the difference between correlation and causation.

## 6. [MultiAns] Which are measures of central tendency?
*a) Mean
*b) Median
c) Standard deviation
*d) Mode
"#,
    );

    let tf = quiz.question(3).unwrap();
    assert_eq!(tf.question_type, QuestionType::TrueFalse);
    assert_eq!(tf.stem, "The coefficient R² can never be negative.");

    let essay = quiz.question(5).unwrap();
    assert_eq!(essay.question_type, QuestionType::Essay);
    assert_eq!(essay.points, 10.0);
    assert_eq!(essay.stem, "Explain the difference between correlation and causation.");

    let multi = quiz.question(6).unwrap();
    assert_eq!(multi.question_type, QuestionType::MultipleAnswers);
    let flags: Vec<bool> = multi.options.iter().map(|o| o.is_correct).collect();
    assert_eq!(flags, [true, true, false, true]);
}

#[test]
fn test_type_marker_aliases_match_primary_forms() {
    let cases = [
        ("[TrueFalse] x", "[TF] x"),
        ("[True/False] x", "[TF] x"),
        ("[MultiAnswer] x", "[MultiAns] x"),
        ("[SelectAll] x", "[MultiAns] x"),
        ("[FillBlanks] x", "[FMB] x"),
        ("[tf] x", "[TF] x"),
        ("[multians] x", "[MultiAns] x"),
    ];

    for (alias, primary) in cases {
        let alias_type = extract_type_marker(alias).question_type;
        assert!(alias_type.is_some(), "{} not recognized", alias);
        assert_eq!(alias_type, extract_type_marker(primary).question_type, "{}", alias);
    }
}

#[test]
fn test_cover_page_numbered_list_is_not_a_question() {
    let quiz = parse_markdown(
        r#"
# Final Exam

1. Intro
2. Overview

# Section: Multiple Choice

1. What is 2 + 2?
1) 3
2) **4**
"#,
    );

    assert_eq!(quiz.questions.len(), 1);
    assert_eq!(quiz.questions[0].stem, "What is 2 + 2?");
    assert_eq!(quiz.questions[0].options.len(), 2);
}

#[test]
fn test_clean_syntax_with_marker_on_cover_page() {
    let quiz = parse_markdown("# Quiz\n\n1. [TF] The sky is blue. -> True\n");
    assert_eq!(quiz.questions.len(), 1);
    assert_eq!(quiz.questions[0].question_type, QuestionType::TrueFalse);
}

#[test]
fn test_matching_pairs_keep_order() {
    let quiz = parse_markdown(
        r#"
## 1. [Match] Match each statistic to its formula.
- Mean :: Σx/n
- Variance :: Σ(x-μ)²/n
"#,
    );

    let q = &quiz.questions[0];
    assert_eq!(q.question_type, QuestionType::Matching);
    let pairs = q.match_pairs.as_ref().unwrap();
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].left, "Mean");
    assert_eq!(pairs[0].right, "Σx/n");
    assert_eq!(pairs[1].left, "Variance");
    assert_eq!(pairs[1].right, "Σ(x-μ)²/n");
}

#[test]
fn test_fill_in_multiple_blanks() {
    let quiz = parse_markdown(
        r#"
## 1. [FMB] Correlation ranges from [blank1] to [blank2].
[blank1]: -1, negative one
[blank2]: 1, one, +1
"#,
    );

    let q = &quiz.questions[0];
    assert_eq!(q.question_type, QuestionType::FillInMultipleBlanks);
    let blanks = q.blanks.as_ref().unwrap();
    assert_eq!(blanks.len(), 2);
    assert_eq!(blanks[0].blank_id, "blank1");
    assert_eq!(blanks[0].answers, ["-1", "negative one"]);
    assert_eq!(blanks[1].answers, ["1", "one", "+1"]);
}

#[test]
fn test_solution_blocks_are_skipped() {
    let quiz = parse_markdown(
        r#"
# Multiple Choice

## 1. What is variance?
1) Sum of squares
2) **Average squared deviation**

<div class="proof solution">

<span class="proof-title">*Solution*. </span>Variance measures the
average squared deviation from the mean.

</div>

## 2. Second question
1) A
2) **B**
"#,
    );

    assert_eq!(quiz.questions.len(), 2);
    let q1 = &quiz.questions[0];
    assert!(!q1.stem.contains("Solution"));
    assert!(!q1.stem.contains("deviation from the mean"));
    assert!(q1.options.iter().all(|o| !o.text.contains("Variance measures")));
}

#[test]
fn test_short_answer_extraction() {
    let quiz = parse_markdown("## 1. [Short] Which measure is robust to outliers?\nAnswer: median\n");
    let q = &quiz.questions[0];

    assert_eq!(q.question_type, QuestionType::ShortAnswer);
    assert_eq!(q.stem, "Which measure is robust to outliers?");
    assert_eq!(q.options.len(), 1);
    assert_eq!(q.options[0].text, "median");
    assert!(q.options[0].is_correct);
}

#[test]
fn test_default_points_injection() {
    let quiz = MarkdownParser::new()
        .with_default_points(4.0)
        .parse("## 1. Q\n1) **A**\n2) B\n\n## 2. R [1 pt]\n1) **A**\n2) B\n");

    assert_eq!(quiz.default_points, 4.0);
    assert_eq!(quiz.questions[0].points, 4.0);
    assert_eq!(quiz.questions[1].points, 1.0);
}

#[test]
fn test_end_to_end_two_question_fixture() {
    let quiz = parse_markdown(
        r#"# Quiz

# Section: Multiple Choice

## 1. What is 2 + 2? [2 pts]
1) A
2) **B**

# Section: True/False

## 2. The sky is blue. -> True
"#,
    );

    assert_eq!(quiz.questions.len(), 2);
    assert_eq!(quiz.questions[0].points, 2.0);
    assert_eq!(quiz.questions[0].id, 1);
    assert_eq!(quiz.questions[1].id, 2);
    assert_eq!(quiz.questions[1].question_type, QuestionType::TrueFalse);
    assert_eq!(quiz.sections.len(), 2);
    assert_eq!(quiz.sections[0].question_ids, [1]);
    assert_eq!(quiz.sections[1].question_ids, [2]);
    assert_eq!(quiz.questions[1].source_line, Some(11));
}
