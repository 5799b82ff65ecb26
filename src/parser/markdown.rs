//! Markdown exam parser
//!
//! A line scanner over the exam dialect. Each line is classified once, in this order:
//! 1. block bodies (solution/figure divs, multi-line HTML comments)
//! 2. blank lines, horizontal rules, block openers, structural HTML and `:::` fences
//! 3. `>` feedback (kept only while a question is open)
//! 4. `# ...` quiz title or section header
//! 5. `## N. Title` or clean `N. Title` question headers
//! 6. `### Part X: ...` sub-parts
//! 7. option/blank lines and stem text of the open question

use super::{blanks, frontmatter, images, markers, options};
use crate::models::{AnswerOption, ParsedQuiz, Question, QuestionType, Section};

regex!(h1_re, r"^#\s+(.+)$");
regex!(
    section_keyword_re,
    r"(?i)^(?:section:\s*\S|(?:multiple|true|short|essay|multi))"
);
regex!(h2_question_re, r"^##\s+(\d+)\.\s+(.+)$");
regex!(clean_question_re, r"^(\d+)\.\s+(.+)$");
regex!(part_re, r"(?i)^###\s+Part\s+([A-Z]):\s*(.+)$");
regex!(hr_re, r"^(?:-{3,}|\*{3,}|_{3,})$");
regex!(
    structural_tag_re,
    r"(?i)^</?(?:div|span|section|aside|figure)\b[^>]*\bclass\s*=[^>]*>$"
);
regex!(closing_tag_re, r"(?i)^</(?:div|span|section|aside|figure)\s*>$");
regex!(figure_div_re, r#"(?i)<div\b[^>]*\bid\s*=\s*["']fig-"#);
regex!(
    tf_answer_re,
    r"(?mi)(?:[ \t]*(?:->|→)|(?:^|[ \t]+)(?:Answer|Ans):)[ \t]*(True|False)[ \t]*$"
);
regex!(text_answer_re, r"(?mi)(?:^|[ \t])(?:Answer|Ans):[ \t]*(\S.*?)[ \t]*$");

const DEFAULT_POINTS: f64 = 1.0;
const DEFAULT_TITLE: &str = "Quiz";

/// Markdown exam parser
#[derive(Debug, Clone, Default)]
pub struct MarkdownParser {
    default_points: Option<f64>,
}

impl MarkdownParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points for questions without a points marker; wins over frontmatter `points`
    pub fn with_default_points(mut self, points: f64) -> Self {
        if points.is_finite() && points > 0.0 {
            self.default_points = Some(points);
        }
        self
    }

    /// Parse a whole exam document. Never fails; malformed input yields fewer questions.
    pub fn parse(&self, content: &str) -> ParsedQuiz {
        let document = frontmatter::parse_exam_document(content);

        let default_points = self
            .default_points
            .or(document.frontmatter.points)
            .unwrap_or(DEFAULT_POINTS);

        let mut scanner = Scanner::new(document.frontmatter.title, default_points);
        for (index, line) in document.body.lines().enumerate() {
            scanner.feed(document.line_offset + index + 1, line.trim());
        }
        scanner.finish()
    }
}

/// Parse with default settings
pub fn parse_markdown(content: &str) -> ParsedQuiz {
    MarkdownParser::new().parse(content)
}

// =============================================================================
// Scanner state
// =============================================================================

/// Where the scanner is in the document
#[derive(Debug)]
enum ScanState {
    /// Before the first section or question header; only the title is kept
    CoverPage,
    /// Past the cover page with no question open
    Body,
    Question(QuestionDraft),
}

/// Multi-line constructs whose bodies bypass normal classification
#[derive(Debug, Clone, Copy)]
enum Block {
    /// `<div class="solution">` or `proof`; content is discarded
    Solution { depth: i32 },
    /// `<div id="fig-...">`; content is held for the next question
    Figure { depth: i32 },
    /// `<!--` without its `-->` on the same line
    Comment,
}

/// The open question, before finalization
#[derive(Debug)]
struct QuestionDraft {
    id: u32,
    question_type: QuestionType,
    stem: String,
    points: Option<f64>,
    /// Option, blank, pair and feedback lines for the sub-parsers
    lines: Vec<String>,
    /// Last buffered line was an option, so plain text continues it
    continuing: bool,
    source_line: usize,
}

impl QuestionDraft {
    fn append_stem(&mut self, text: &str) {
        if !self.stem.is_empty() {
            self.stem.push_str("\n\n");
        }
        self.stem.push_str(text);
    }

    fn push_line(&mut self, line: &str) {
        if options::is_option_start(line) || options::is_blank_definition(line) {
            self.lines.push(line.to_string());
            self.continuing = true;
        } else if line.starts_with('#') {
            // unnumbered headings are not part of a question
        } else if self.continuing {
            self.lines.push(line.to_string());
        } else {
            self.append_stem(line);
        }
    }

    fn push_feedback(&mut self, line: &str) {
        self.lines.push(line.to_string());
        self.continuing = false;
    }
}

struct Scanner {
    title: Option<String>,
    default_points: f64,
    sections: Vec<Section>,
    questions: Vec<Question>,
    state: ScanState,
    block: Option<Block>,
    pending_figure: Vec<String>,
    counter: u32,
}

impl Scanner {
    fn new(title: Option<String>, default_points: f64) -> Self {
        Self {
            title,
            default_points,
            sections: Vec::new(),
            questions: Vec::new(),
            state: ScanState::CoverPage,
            block: None,
            pending_figure: Vec::new(),
            counter: 0,
        }
    }

    fn feed(&mut self, line_no: usize, line: &str) {
        if self.consume_block_line(line) {
            return;
        }

        if line.is_empty() || hr_re().is_match(line) || self.open_block(line) {
            return;
        }

        if is_structure_line(line) {
            return;
        }

        if line.starts_with('>') {
            if let ScanState::Question(draft) = &mut self.state {
                draft.push_feedback(line);
            }
            return;
        }

        if let Some(caps) = h1_re().captures(line) {
            self.heading(caps[1].trim());
            return;
        }

        if let Some(caps) = h2_question_re().captures(line) {
            self.open_question(&caps[1], &caps[2], line_no);
            return;
        }

        if let Some(caps) = clean_question_re().captures(line) {
            let past_cover = !matches!(self.state, ScanState::CoverPage);
            if past_cover || markers::has_marker(&caps[2]) {
                self.open_question(&caps[1], &caps[2], line_no);
                return;
            }
        }

        if let ScanState::Question(draft) = &mut self.state {
            if let Some(caps) = part_re().captures(line) {
                let (_, part_title) = markers::extract_points(&caps[2]);
                let part = format!("**Part {}:** {}", caps[1].to_uppercase(), part_title);
                draft.append_stem(&part);
            } else {
                draft.push_line(line);
            }
        }
    }

    /// Route a line to the open block, if any
    fn consume_block_line(&mut self, line: &str) -> bool {
        let Some(block) = self.block else {
            return false;
        };

        let balance = div_balance(line);
        self.block = match block {
            Block::Comment => (!line.contains("-->")).then_some(Block::Comment),
            Block::Solution { depth } => {
                let depth = depth + balance;
                (depth > 0).then_some(Block::Solution { depth })
            }
            Block::Figure { depth } => {
                let depth = depth + balance;
                if depth > 0 && balance == 0 && !line.is_empty() && !is_structure_line(line) {
                    self.pending_figure.push(line.to_string());
                }
                (depth > 0).then_some(Block::Figure { depth })
            }
        };
        true
    }

    /// Enter a block if `line` opens one; returns whether the line was consumed
    fn open_block(&mut self, line: &str) -> bool {
        let lower = line.to_ascii_lowercase();

        if lower.contains("<div") && (lower.contains("solution") || lower.contains("proof")) {
            let depth = div_balance(line);
            if depth > 0 {
                self.block = Some(Block::Solution { depth });
            }
            return true;
        }

        if figure_div_re().is_match(line) {
            let depth = div_balance(line);
            if depth > 0 {
                self.block = Some(Block::Figure { depth });
            }
            return true;
        }

        if line.starts_with("<!--") {
            if !line.contains("-->") {
                self.block = Some(Block::Comment);
            }
            return true;
        }

        false
    }

    fn heading(&mut self, text: &str) {
        if section_keyword_re().is_match(text) {
            self.finalize();
            tracing::debug!("Section opened: {}", text);
            self.sections.push(Section::new(text));
            self.state = ScanState::Body;
        } else if self.title.is_none() {
            self.title = Some(text.to_string());
        }
    }

    fn open_question(&mut self, number: &str, raw_title: &str, line_no: usize) {
        self.finalize();
        self.counter += 1;

        let id = match number.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => self.counter,
        };

        let marker = markers::extract_type_marker(raw_title);
        let (points, title) = markers::extract_points(&marker.title);
        let points = points.or(marker.points).filter(|p| *p > 0).map(f64::from);

        let section_title = self.sections.last().map(|s| s.title.as_str());
        let question_type = marker
            .question_type
            .unwrap_or_else(|| markers::infer_question_type(&title, section_title));

        let mut draft = QuestionDraft {
            id,
            question_type,
            stem: String::new(),
            points,
            lines: Vec::new(),
            continuing: false,
            source_line: line_no,
        };

        for figure_line in self.pending_figure.drain(..) {
            draft.append_stem(&figure_line);
        }
        if !title.is_empty() {
            draft.append_stem(&title);
        }

        self.state = ScanState::Question(draft);
    }

    fn finalize(&mut self) {
        if !matches!(self.state, ScanState::Question(_)) {
            return;
        }

        let ScanState::Question(draft) = std::mem::replace(&mut self.state, ScanState::Body) else {
            return;
        };

        let question_id = draft.id;
        let Some(question) = self.seal(draft) else {
            tracing::debug!("Discarding question {} with empty stem", question_id);
            return;
        };

        tracing::debug!(
            "Question {} finalized as {} with {} options",
            question.id,
            question.question_type,
            question.options.len()
        );

        if let Some(section) = self.sections.last_mut() {
            section.question_ids.push(question.id);
        }
        self.questions.push(question);
    }

    fn seal(&self, draft: QuestionDraft) -> Option<Question> {
        if draft.stem.trim().is_empty() {
            return None;
        }

        let mut stem = draft.stem;
        let mut question_type = draft.question_type;
        let parsed = options::parse_options_with_feedback(&draft.lines);

        let mut match_pairs = None;
        let mut blank_answers = None;
        let mut answer_options = Vec::new();

        match question_type {
            QuestionType::Matching => {
                match_pairs = Some(blanks::parse_match_pairs(&draft.lines));
            }
            QuestionType::FillInMultipleBlanks => {
                let definitions = blanks::parse_blank_definitions(&draft.lines);
                blank_answers = Some(blanks::retain_placed_blanks(&stem, definitions));
            }
            _ => answer_options = parsed.options,
        }

        if is_true_false_pair(&answer_options) {
            question_type = QuestionType::TrueFalse;
        } else if question_type == QuestionType::MultipleChoice && answer_options.is_empty() {
            question_type = QuestionType::ShortAnswer;
        }

        match question_type {
            QuestionType::TrueFalse if answer_options.is_empty() => {
                let answer = take_last_match(&mut stem, tf_answer_re());
                let correct = answer.map(|a| a.eq_ignore_ascii_case("true"));
                answer_options.push(AnswerOption::new("a", "True", correct == Some(true)));
                answer_options.push(AnswerOption::new("b", "False", correct == Some(false)));
            }
            QuestionType::TrueFalse if answer_options.len() == 1 => {
                if answer_options[0].text.trim().eq_ignore_ascii_case("true") {
                    answer_options.push(AnswerOption::new("b", "False", false));
                } else {
                    answer_options.insert(0, AnswerOption::new("a", "True", false));
                }
            }
            QuestionType::ShortAnswer | QuestionType::FillInBlank | QuestionType::Numerical
                if answer_options.is_empty() =>
            {
                if let Some(answer) = take_last_match(&mut stem, text_answer_re()) {
                    answer_options.push(AnswerOption::new("answer1", answer, true));
                }
            }
            _ => {}
        }

        let stem = markers::strip_residual_markers(&stem);
        let images = images::extract_images(&stem);

        Some(Question {
            id: draft.id,
            question_type,
            stem,
            options: answer_options,
            points: draft.points.unwrap_or(self.default_points),
            section: self.sections.last().map(|s| s.id.clone()),
            images,
            match_pairs,
            blanks: blank_answers,
            general_feedback: parsed.general_feedback,
            source_line: Some(draft.source_line),
        })
    }

    fn finish(mut self) -> ParsedQuiz {
        if !self.pending_figure.is_empty() {
            match &mut self.state {
                ScanState::Question(draft) => {
                    for figure_line in std::mem::take(&mut self.pending_figure) {
                        draft.append_stem(&figure_line);
                    }
                }
                _ => tracing::warn!("Figure block at end of document has no question to attach to"),
            }
        }

        self.finalize();

        ParsedQuiz {
            title: self.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            default_points: self.default_points,
            sections: self.sections,
            questions: self.questions,
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn is_structure_line(line: &str) -> bool {
    line.starts_with(":::") || structural_tag_re().is_match(line) || closing_tag_re().is_match(line)
}

/// Opened minus closed `<div>` tags on one line
fn div_balance(line: &str) -> i32 {
    let lower = line.to_ascii_lowercase();
    lower.matches("<div").count() as i32 - lower.matches("</div").count() as i32
}

fn is_true_false_pair(options: &[AnswerOption]) -> bool {
    if options.len() != 2 {
        return false;
    }
    let texts: Vec<String> = options.iter().map(|o| o.text.trim().to_lowercase()).collect();
    texts.iter().any(|t| t == "true") && texts.iter().any(|t| t == "false")
}

/// Remove the last match of `re` from `stem`, returning its first capture
fn take_last_match(stem: &mut String, re: &regex::Regex) -> Option<String> {
    let caps = re.captures_iter(stem).last()?;
    let whole = caps.get(0)?;
    let answer = caps.get(1)?.as_str().trim().to_string();

    let cleaned = format!("{}{}", stem[..whole.start()].trim_end(), &stem[whole.end()..]);
    *stem = cleaned.trim().to_string();
    Some(answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_and_sections() {
        let quiz = parse_markdown(
            "# Midterm\n\n# Section: Multiple Choice\n\n## 1. Q one\n1) A\n2) **B**\n\n# True/False\n\n## 2. Sky is blue. -> True\n",
        );
        assert_eq!(quiz.title, "Midterm");
        assert_eq!(quiz.sections.len(), 2);
        assert_eq!(quiz.sections[0].question_ids, [1]);
        assert_eq!(quiz.sections[1].question_ids, [2]);
        assert_eq!(quiz.questions[0].section.as_deref(), Some("section_multiple_choice"));
        assert_eq!(quiz.questions[1].question_type, QuestionType::TrueFalse);
    }

    #[test]
    fn test_default_title() {
        let quiz = parse_markdown("## 1. Only question\n1) A\n2) **B**");
        assert_eq!(quiz.title, "Quiz");
        assert_eq!(quiz.default_points, 1.0);
    }

    #[test]
    fn test_frontmatter_title_wins_and_lines_are_counted() {
        let quiz = parse_markdown("---\ntitle: Final Exam\npoints: 4\n---\n# Heading Title\n\n## 1. Q\n1) A\n2) **B**\n");
        assert_eq!(quiz.title, "Final Exam");
        assert_eq!(quiz.default_points, 4.0);
        assert_eq!(quiz.questions[0].points, 4.0);
        assert_eq!(quiz.questions[0].source_line, Some(7));
    }

    #[test]
    fn test_explicit_default_points_win_over_frontmatter() {
        let quiz = MarkdownParser::new()
            .with_default_points(3.0)
            .parse("---\npoints: 4\n---\n## 1. Q\n1) A\n2) **B**\n");
        assert_eq!(quiz.questions[0].points, 3.0);
    }

    #[test]
    fn test_empty_question_is_discarded() {
        let quiz = parse_markdown("# Quiz\n\n## 1. [TF]\n\n## 2. Real question\n1) A\n2) **B**");
        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(quiz.questions[0].id, 2);
    }

    #[test]
    fn test_multi_part_question_collapses() {
        let quiz = parse_markdown(
            "# Multi-Part Problems\n\n## 1. Regression analysis\n\n### Part A: Fit the model [3 pts]\n\n### Part B: Interpret the slope\n",
        );
        let q = &quiz.questions[0];
        assert_eq!(q.question_type, QuestionType::Essay);
        assert_eq!(
            q.stem,
            "Regression analysis\n\n**Part A:** Fit the model\n\n**Part B:** Interpret the slope"
        );
    }

    #[test]
    fn test_figure_block_prepends_to_next_question() {
        let quiz = parse_markdown(
            "# Quiz\n\n<div id=\"fig-plot\">\n\n![Scatter plot](images/plot.png)\n\n</div>\n\n## 1. What trend does the figure show?\na) Positive [x]\nb) Negative\n",
        );
        let q = &quiz.questions[0];
        assert_eq!(
            q.stem,
            "![Scatter plot](images/plot.png)\n\nWhat trend does the figure show?"
        );
        assert_eq!(q.images, ["images/plot.png"]);
        assert_eq!(q.options.len(), 2);
    }

    #[test]
    fn test_trailing_figure_attaches_to_open_question() {
        let quiz = parse_markdown(
            "## 1. Describe the plot\n\n<div id=\"fig-end\">\n<img src=\"images/end.png\">\n</div>\n",
        );
        assert!(quiz.questions[0].stem.ends_with("<img src=\"images/end.png\">"));
    }

    #[test]
    fn test_nested_solution_divs_are_discarded() {
        let quiz = parse_markdown(
            "## 1. Q\n1) A\n2) **B**\n\n<div class=\"solution\">\n<div class=\"inner\">\nhidden\n</div>\nstill hidden\n</div>\n\nVisible note\n",
        );
        let q = &quiz.questions[0];
        assert!(!q.stem.contains("hidden"));
        assert_eq!(q.options.len(), 2);
    }

    #[test]
    fn test_multiline_comment_and_fences_skipped() {
        let quiz = parse_markdown(
            "## 1. Question text\n<!--\n1) not an option\n-->\n::: {.callout-note}\n:::\n1) A\n2) **B**\n",
        );
        let q = &quiz.questions[0];
        assert_eq!(q.stem, "Question text");
        assert_eq!(q.options.len(), 2);
        assert_eq!(q.options[0].text, "A");
    }

    #[test]
    fn test_blockquote_outside_question_is_discarded() {
        let quiz = parse_markdown("# Quiz\n\n> Note to students\n\n## 1. Q\n1) A\n2) **B**");
        assert_eq!(quiz.questions[0].general_feedback, None);
    }

    #[test]
    fn test_negative_number_line_stays_in_stem() {
        let quiz = parse_markdown("## 1. [Numeric] Compute the correlation\n-0.678\n\nAnswer: -0.68");
        let q = &quiz.questions[0];
        assert_eq!(q.question_type, QuestionType::Numerical);
        assert!(q.stem.contains("-0.678"));
        assert_eq!(q.options[0].text, "-0.68");
    }

    #[test]
    fn test_single_true_false_option_is_completed() {
        let quiz = parse_markdown("## 1. [TF] Water is wet.\n[x] True\n\n## 2. [TF] Fire is cold.\n*False");
        let first = &quiz.questions[0].options;
        assert_eq!(first.len(), 2);
        assert_eq!((first[0].text.as_str(), first[0].is_correct), ("True", true));
        assert_eq!((first[1].text.as_str(), first[1].is_correct), ("False", false));

        let second = &quiz.questions[1].options;
        assert_eq!((second[0].text.as_str(), second[0].is_correct), ("True", false));
        assert_eq!((second[1].text.as_str(), second[1].is_correct), ("False", true));
    }

    #[test]
    fn test_true_false_without_answer_has_no_correct_option() {
        let quiz = parse_markdown("# True/False\n\n## 1. An unmarked statement");
        let q = &quiz.questions[0];
        assert_eq!(q.options.len(), 2);
        assert!(q.options.iter().all(|o| !o.is_correct));
        assert_eq!(q.stem, "An unmarked statement");
    }

    #[test]
    fn test_unplaced_blank_definition_dropped() {
        let quiz = parse_markdown("## 1. [FMB] The capital is [blank1].\n[blank1]: Paris\n[blank2]: Lyon");
        let blanks = quiz.questions[0].blanks.as_ref().unwrap();
        assert_eq!(blanks.len(), 1);
        assert_eq!(blanks[0].blank_id, "blank1");
    }

    #[test]
    fn test_explicit_zero_id_uses_counter() {
        let quiz = parse_markdown("## 0. First\n1) A\n2) **B**\n\n## 0. Second\n1) A\n2) **B**");
        let ids: Vec<u32> = quiz.questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, [1, 2]);
    }

    #[test]
    fn test_choice_without_options_becomes_short_answer() {
        let quiz = parse_markdown("# Quiz\n\n## 1. What is 2+2?\nAnswer: 4\n");
        let q = &quiz.questions[0];
        assert_eq!(q.question_type, QuestionType::ShortAnswer);
        assert_eq!(q.stem, "What is 2+2?");
        assert_eq!(q.options.len(), 1);
        assert_eq!((q.options[0].text.as_str(), q.options[0].is_correct), ("4", true));

        let unanswered = parse_markdown("## 1. Name one robust statistic");
        assert_eq!(unanswered.questions[0].question_type, QuestionType::ShortAnswer);
        assert!(unanswered.questions[0].options.is_empty());
    }

    #[test]
    fn test_take_last_match() {
        let mut stem = "Pick one. Answer: first\n\nAnswer: second".to_string();
        let answer = take_last_match(&mut stem, text_answer_re());
        assert_eq!(answer.as_deref(), Some("second"));
        assert_eq!(stem, "Pick one. Answer: first");
    }
}
