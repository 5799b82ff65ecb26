//! QTI 2.1 XML for Canvas New Quizzes imports
//!
//! Items, the assessment test and the manifest are rendered as strings. Choice
//! identifiers on the wire are `A`, `B`, ... by option position and never the
//! model option ids.

use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::path::Path;

use crate::models::{ParsedQuiz, Question, QuestionType};
use crate::parser::{blanks, images};
use crate::validator::qti21::{ITEM_RESOURCE_TYPE, TEST_RESOURCE_TYPE};

const QTI_NS: &str = "http://www.imsglobal.org/xsd/imsqti_v2p1";
const QTI_XSD: &str = "http://www.imsglobal.org/xsd/imsqti_v2p1.xsd";
const IMSCP_NS: &str = "http://www.imsglobal.org/xsd/imscp_v1p1";
const IMSCP_XSD: &str = "http://www.imsglobal.org/xsd/imscp_v1p1.xsd";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const MATCH_CORRECT: &str = "http://www.imsglobal.org/question/qti_v2p1/rptemplates/match_correct";

pub const TEST_HREF: &str = "tests/test.xml";
pub const TEST_RESOURCE_ID: &str = "test_resource";

/// Package directory holding copied images, relative to `items/`
pub const IMAGE_DIR: &str = "images";

regex!(display_math_re, r"(?s)\$\$(.+?)\$\$");
regex!(inline_math_re, r"(^|[^\\$])\$([^$\n]+?)\$");
regex!(
    inline_token_re,
    r#"!\[([^\]]*)\]\(\s*([^)\s]+)(?:\s+"[^"]*")?\s*\)|<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["'][^>]*>|\\?\[(blank\d+)\\?\]"#
);

pub fn item_identifier(question: &Question) -> String {
    format!("item_{}", question.id)
}

pub fn item_href(question: &Question) -> String {
    format!("items/item_{}.xml", question.id)
}

/// Manifest resource identifier; kept apart from the item identifier
pub fn resource_identifier(question: &Question) -> String {
    format!("res_item_{}", question.id)
}

/// Wire identifier for the option at `index`
pub fn choice_identifier(index: usize) -> String {
    let mut n = index;
    let mut id = String::new();
    loop {
        id.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    id
}

/// Deterministic 16 hex character identifier for a quiz title
pub fn title_hash(title: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

/// File name an image is stored under inside `items/images/`
pub fn packaged_image_name(src: &str) -> Option<String> {
    if images::is_external(src) {
        return None;
    }
    Path::new(src)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// `$$x$$` becomes `\[x\]` and `$x$` becomes `\(x\)`
pub fn convert_latex(text: &str) -> String {
    let display = display_math_re().replace_all(text, |caps: &regex::Captures| {
        format!("\\[{}\\]", &caps[1])
    });
    inline_math_re()
        .replace_all(&display, |caps: &regex::Captures| {
            format!("{}\\({}\\)", &caps[1], &caps[2])
        })
        .into_owned()
}

/// Escaped inline markup for question text
///
/// Image references become `<img>` elements pointing into the package and,
/// when `blank_response` is given, `[blankN]` placeholders become text entries.
fn render_inline(text: &str, blank_response: Option<&dyn Fn(&str) -> String>) -> String {
    let text = convert_latex(text);
    let mut rendered = String::with_capacity(text.len());
    let mut last = 0;

    for caps in inline_token_re().captures_iter(&text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };

        let replacement = if let Some(blank) = caps.get(4) {
            match blank_response {
                Some(response) => format!(
                    r#"<textEntryInteraction responseIdentifier="{}" expectedLength="15"/>"#,
                    response(blank.as_str())
                ),
                None => continue,
            }
        } else {
            let alt = caps.get(1).map_or("", |m| m.as_str());
            let src = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
            let src = match packaged_image_name(src) {
                Some(name) => format!("{}/{}", IMAGE_DIR, name),
                None => src.to_string(),
            };
            format!(r#"<img src="{}" alt="{}"/>"#, escape_xml(&src), escape_xml(alt))
        };

        rendered.push_str(&escape_xml(&text[last..whole.start()]));
        rendered.push_str(&replacement);
        last = whole.end();
    }

    rendered.push_str(&escape_xml(&text[last..]));
    rendered
}

fn format_points(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{}", points as i64)
    } else {
        points.to_string()
    }
}

/// Interaction name recorded in the manifest metadata
pub fn interaction_type(question_type: QuestionType) -> &'static str {
    match question_type {
        QuestionType::MultipleChoice | QuestionType::MultipleAnswers | QuestionType::TrueFalse => {
            "choiceInteraction"
        }
        QuestionType::ShortAnswer
        | QuestionType::FillInBlank
        | QuestionType::FillInMultipleBlanks
        | QuestionType::Numerical => "textEntryInteraction",
        QuestionType::Matching => "matchInteraction",
        QuestionType::Essay | QuestionType::Calculated => "extendedTextInteraction",
    }
}

// =============================================================================
// Items
// =============================================================================

/// Declarations, body and response processing of one item
#[derive(Debug, Default)]
struct ItemParts {
    declarations: String,
    body: String,
    processing: Option<&'static str>,
}

/// Render the `assessmentItem` document for a question
pub fn generate_item(question: &Question) -> String {
    let parts = match question.question_type {
        QuestionType::MultipleChoice | QuestionType::MultipleAnswers | QuestionType::TrueFalse => {
            choice_parts(question)
        }
        QuestionType::ShortAnswer | QuestionType::FillInBlank | QuestionType::Numerical => {
            text_entry_parts(question)
        }
        QuestionType::FillInMultipleBlanks => blanks_parts(question),
        QuestionType::Matching => match_parts(question),
        QuestionType::Essay | QuestionType::Calculated => essay_parts(question),
    };

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<assessmentItem xmlns=\"{ns}\" xmlns:xsi=\"{xsi}\" xsi:schemaLocation=\"{ns} {xsd}\"\n    identifier=\"{id}\" title=\"Question {n}\" adaptive=\"false\" timeDependent=\"false\">\n",
        ns = QTI_NS,
        xsi = XSI_NS,
        xsd = QTI_XSD,
        id = item_identifier(question),
        n = question.id,
    ));
    xml.push_str(&parts.declarations);
    xml.push_str(&format!(
        "  <outcomeDeclaration identifier=\"SCORE\" cardinality=\"single\" baseType=\"float\">\n    <defaultValue>\n      <value>{}</value>\n    </defaultValue>\n  </outcomeDeclaration>\n",
        format_points(question.points)
    ));
    xml.push_str("  <itemBody>\n");
    xml.push_str(&parts.body);
    xml.push_str("  </itemBody>\n");
    if let Some(template) = parts.processing {
        xml.push_str(&format!("  <responseProcessing template=\"{}\"/>\n", template));
    }
    xml.push_str("</assessmentItem>\n");
    xml
}

fn stem_paragraph(question: &Question) -> String {
    format!("    <p>{}</p>\n", render_inline(&question.stem, None))
}

fn declaration(identifier: &str, cardinality: &str, base_type: &str, values: &[String]) -> String {
    if values.is_empty() {
        return format!(
            "  <responseDeclaration identifier=\"{}\" cardinality=\"{}\" baseType=\"{}\"/>\n",
            identifier, cardinality, base_type
        );
    }

    let mut xml = format!(
        "  <responseDeclaration identifier=\"{}\" cardinality=\"{}\" baseType=\"{}\">\n    <correctResponse>\n",
        identifier, cardinality, base_type
    );
    for value in values {
        xml.push_str(&format!("      <value>{}</value>\n", escape_xml(value)));
    }
    xml.push_str("    </correctResponse>\n  </responseDeclaration>\n");
    xml
}

fn choice_parts(question: &Question) -> ItemParts {
    let multiple = question.question_type == QuestionType::MultipleAnswers;
    let correct: Vec<String> = question
        .options
        .iter()
        .enumerate()
        .filter(|(_, option)| option.is_correct)
        .map(|(index, _)| choice_identifier(index))
        .collect();

    let mut body = stem_paragraph(question);
    body.push_str(&format!(
        "    <choiceInteraction responseIdentifier=\"RESPONSE\" shuffle=\"false\" maxChoices=\"{}\">\n",
        if multiple { 0 } else { 1 }
    ));
    for (index, option) in question.options.iter().enumerate() {
        body.push_str(&format!(
            "      <simpleChoice identifier=\"{}\">{}</simpleChoice>\n",
            choice_identifier(index),
            render_inline(&option.text, None)
        ));
    }
    body.push_str("    </choiceInteraction>\n");

    ItemParts {
        declarations: declaration(
            "RESPONSE",
            if multiple { "multiple" } else { "single" },
            "identifier",
            &correct,
        ),
        body,
        processing: Some(MATCH_CORRECT),
    }
}

fn text_entry_parts(question: &Question) -> ItemParts {
    let answers: Vec<String> = question
        .correct_options()
        .map(|option| option.text.clone())
        .take(1)
        .collect();
    let base_type = if question.question_type == QuestionType::Numerical
        && answers.iter().all(|a| a.trim().parse::<f64>().is_ok())
    {
        "float"
    } else {
        "string"
    };

    let mut body = stem_paragraph(question);
    body.push_str("    <p><textEntryInteraction responseIdentifier=\"RESPONSE\" expectedLength=\"50\"/></p>\n");

    ItemParts {
        declarations: declaration("RESPONSE", "single", base_type, &answers),
        body,
        processing: (!answers.is_empty()).then_some(MATCH_CORRECT),
    }
}

fn blank_response_identifier(blank_id: &str) -> String {
    format!("RESPONSE_{}", blank_id)
}

fn blanks_parts(question: &Question) -> ItemParts {
    let defined = question.blanks.as_deref().unwrap_or_default();
    let mut declarations = String::new();
    let mut answered = false;

    for placeholder in blanks::placeholders_in(&question.stem) {
        let answers: Vec<String> = defined
            .iter()
            .find(|b| b.blank_id == placeholder)
            .and_then(|b| b.answers.first().cloned())
            .into_iter()
            .collect();
        answered |= !answers.is_empty();
        declarations.push_str(&declaration(
            &blank_response_identifier(&placeholder),
            "single",
            "string",
            &answers,
        ));
    }

    let response: &dyn Fn(&str) -> String = &|blank_id| blank_response_identifier(blank_id);
    let body = format!(
        "    <p>{}</p>\n",
        render_inline(&question.stem, Some(response))
    );

    ItemParts {
        declarations,
        body,
        processing: answered.then_some(MATCH_CORRECT),
    }
}

fn match_parts(question: &Question) -> ItemParts {
    let pairs = question.match_pairs.as_deref().unwrap_or_default();
    let values: Vec<String> = (1..=pairs.len()).map(|i| format!("L{} R{}", i, i)).collect();

    let mut body = stem_paragraph(question);
    body.push_str(&format!(
        "    <matchInteraction responseIdentifier=\"RESPONSE\" shuffle=\"false\" maxAssociations=\"{}\">\n",
        pairs.len()
    ));
    for (side, prefix) in [("left", "L"), ("right", "R")] {
        body.push_str("      <simpleMatchSet>\n");
        for (index, pair) in pairs.iter().enumerate() {
            let text = if side == "left" { &pair.left } else { &pair.right };
            body.push_str(&format!(
                "        <simpleAssociableChoice identifier=\"{}{}\" matchMax=\"1\">{}</simpleAssociableChoice>\n",
                prefix,
                index + 1,
                render_inline(text, None)
            ));
        }
        body.push_str("      </simpleMatchSet>\n");
    }
    body.push_str("    </matchInteraction>\n");

    ItemParts {
        declarations: declaration("RESPONSE", "multiple", "directedPair", &values),
        body,
        processing: (!pairs.is_empty()).then_some(MATCH_CORRECT),
    }
}

fn essay_parts(question: &Question) -> ItemParts {
    let mut body = stem_paragraph(question);
    body.push_str("    <extendedTextInteraction responseIdentifier=\"RESPONSE\" expectedLines=\"10\"/>\n");

    ItemParts {
        declarations: declaration("RESPONSE", "single", "string", &[]),
        body,
        processing: None,
    }
}

// =============================================================================
// Test and manifest
// =============================================================================

/// Consecutive questions that share a parsed section
fn section_runs(quiz: &ParsedQuiz) -> Vec<(Option<&str>, Vec<&Question>)> {
    let mut runs: Vec<(Option<&str>, Vec<&Question>)> = Vec::new();
    for question in &quiz.questions {
        let section = question.section.as_deref();
        match runs.last_mut() {
            Some((current, members)) if *current == section => members.push(question),
            _ => runs.push((section, vec![question])),
        }
    }
    runs
}

/// Render the `assessmentTest` binding every item in order
pub fn generate_test(quiz: &ParsedQuiz) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<assessmentTest xmlns=\"{ns}\" xmlns:xsi=\"{xsi}\" xsi:schemaLocation=\"{ns} {xsd}\"\n    identifier=\"test_{hash}\" title=\"{title}\">\n",
        ns = QTI_NS,
        xsi = XSI_NS,
        xsd = QTI_XSD,
        hash = title_hash(&quiz.title),
        title = escape_xml(&quiz.title),
    ));
    xml.push_str("  <testPart identifier=\"part_1\" navigationMode=\"linear\" submissionMode=\"individual\">\n");

    let runs = section_runs(quiz);
    if runs.is_empty() {
        xml.push_str("    <assessmentSection identifier=\"section_main\" title=\"Main Section\" visible=\"true\"/>\n");
    }

    let single = runs.len() == 1;
    for (index, (section_id, questions)) in runs.into_iter().enumerate() {
        let identifier = if single {
            "section_main".to_string()
        } else {
            format!("section_{}", index + 1)
        };
        let title = section_id
            .and_then(|id| quiz.sections.iter().find(|s| s.id == id))
            .map_or("Main Section", |s| s.title.as_str());

        xml.push_str(&format!(
            "    <assessmentSection identifier=\"{}\" title=\"{}\" visible=\"true\">\n",
            identifier,
            escape_xml(title)
        ));
        for question in questions {
            xml.push_str(&format!(
                "      <assessmentItemRef identifier=\"itemref_{}\" href=\"{}\" fixed=\"false\"/>\n",
                question.id,
                item_href(question)
            ));
        }
        xml.push_str("    </assessmentSection>\n");
    }

    xml.push_str("  </testPart>\n</assessmentTest>\n");
    xml
}

/// Render `imsmanifest.xml`
///
/// `bundled` holds the image file names actually copied into `items/images/`;
/// only those are listed as resource files.
pub fn generate_manifest(quiz: &ParsedQuiz, bundled: &BTreeSet<String>) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<manifest identifier=\"MANIFEST_{hash}\" xmlns=\"{cp}\" xmlns:imsqti=\"{qti}\" xmlns:xsi=\"{xsi}\"\n    xsi:schemaLocation=\"{cp} {cp_xsd} {qti} {qti_xsd}\">\n",
        hash = title_hash(&quiz.title),
        cp = IMSCP_NS,
        cp_xsd = IMSCP_XSD,
        qti = QTI_NS,
        qti_xsd = QTI_XSD,
        xsi = XSI_NS,
    ));
    xml.push_str("  <metadata>\n    <schema>QTI Package</schema>\n    <schemaversion>2.1</schemaversion>\n  </metadata>\n");
    xml.push_str("  <organizations/>\n  <resources>\n");

    xml.push_str(&format!(
        "    <resource identifier=\"{}\" type=\"{}\" href=\"{}\">\n      <file href=\"{}\"/>\n",
        TEST_RESOURCE_ID, TEST_RESOURCE_TYPE, TEST_HREF, TEST_HREF
    ));
    for question in &quiz.questions {
        xml.push_str(&format!(
            "      <dependency identifierref=\"{}\"/>\n",
            resource_identifier(question)
        ));
    }
    xml.push_str("    </resource>\n");

    for question in &quiz.questions {
        let href = item_href(question);
        xml.push_str(&format!(
            "    <resource identifier=\"{}\" type=\"{}\" href=\"{}\">\n",
            resource_identifier(question),
            ITEM_RESOURCE_TYPE,
            href
        ));
        xml.push_str(&format!(
            "      <metadata>\n        <imsqti:qtiMetadata>\n          <imsqti:interactionType>{}</imsqti:interactionType>\n        </imsqti:qtiMetadata>\n      </metadata>\n",
            interaction_type(question.question_type)
        ));
        xml.push_str(&format!("      <file href=\"{}\"/>\n", href));

        let mut listed = BTreeSet::new();
        for name in question.images.iter().filter_map(|src| packaged_image_name(src)) {
            if bundled.contains(&name) && listed.insert(name.clone()) {
                xml.push_str(&format!(
                    "      <file href=\"items/{}/{}\"/>\n",
                    IMAGE_DIR,
                    escape_xml(&name)
                ));
            }
        }
        xml.push_str("    </resource>\n");
    }

    xml.push_str("  </resources>\n</manifest>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerOption, MatchPair};
    use crate::parser::parse_markdown;

    fn question(question_type: QuestionType, stem: &str, options: Vec<AnswerOption>) -> Question {
        Question {
            id: 1,
            question_type,
            stem: stem.to_string(),
            options,
            points: 2.0,
            section: None,
            images: Vec::new(),
            match_pairs: None,
            blanks: None,
            general_feedback: None,
            source_line: None,
        }
    }

    #[test]
    fn test_choice_identifiers() {
        assert_eq!(choice_identifier(0), "A");
        assert_eq!(choice_identifier(3), "D");
        assert_eq!(choice_identifier(25), "Z");
        assert_eq!(choice_identifier(26), "AA");
    }

    #[test]
    fn test_title_hash_is_stable() {
        assert_eq!(title_hash("Midterm"), title_hash("Midterm"));
        assert_ne!(title_hash("Midterm"), title_hash("Final"));
        assert_eq!(title_hash("Midterm").len(), 16);
    }

    #[test]
    fn test_convert_latex() {
        assert_eq!(convert_latex("Solve $x^2$ now"), "Solve \\(x^2\\) now");
        assert_eq!(convert_latex("$$\\sum x$$"), "\\[\\sum x\\]");
        assert_eq!(convert_latex("Costs \\$5 and $y$"), "Costs \\$5 and \\(y\\)");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_choice_item_uses_positional_identifiers() {
        let q = question(
            QuestionType::MultipleChoice,
            "Which is largest?",
            vec![
                AnswerOption::new("a", "1", false),
                AnswerOption::new("c", "3", true),
            ],
        );
        let xml = generate_item(&q);
        assert!(xml.contains(r#"identifier="item_1""#));
        assert!(xml.contains("<value>B</value>"));
        assert!(xml.contains(r#"<simpleChoice identifier="B">3</simpleChoice>"#));
        assert!(!xml.contains(r#"identifier="c""#));
        assert!(xml.contains(r#"cardinality="single""#));
        assert!(xml.contains(r#"maxChoices="1""#));
        assert!(xml.contains("<value>2</value>"));
        assert!(xml.contains("match_correct"));
    }

    #[test]
    fn test_multiple_answers_cardinality() {
        let q = question(
            QuestionType::MultipleAnswers,
            "Pick all even numbers",
            vec![
                AnswerOption::new("a", "2", true),
                AnswerOption::new("b", "3", false),
                AnswerOption::new("c", "4", true),
            ],
        );
        let xml = generate_item(&q);
        assert!(xml.contains(r#"cardinality="multiple""#));
        assert!(xml.contains(r#"maxChoices="0""#));
        assert!(xml.contains("<value>A</value>"));
        assert!(xml.contains("<value>C</value>"));
    }

    #[test]
    fn test_short_answer_and_essay() {
        let q = question(
            QuestionType::ShortAnswer,
            "Name the measure",
            vec![AnswerOption::new("a", "median", true)],
        );
        let xml = generate_item(&q);
        assert!(xml.contains("textEntryInteraction"));
        assert!(xml.contains("<value>median</value>"));

        let xml = generate_item(&question(QuestionType::Essay, "Discuss variance.", vec![]));
        assert!(xml.contains("extendedTextInteraction"));
        assert!(!xml.contains("responseProcessing"));
    }

    #[test]
    fn test_matching_item() {
        let mut q = question(QuestionType::Matching, "Match the formulas", vec![]);
        q.match_pairs = Some(vec![
            MatchPair {
                left: "Mean".to_string(),
                right: "Σx/n".to_string(),
            },
            MatchPair {
                left: "Variance".to_string(),
                right: "Σ(x-μ)²/n".to_string(),
            },
        ]);
        let xml = generate_item(&q);
        assert!(xml.contains("matchInteraction"));
        assert!(xml.contains("<value>L2 R2</value>"));
        assert!(xml.contains(r#"<simpleAssociableChoice identifier="R1" matchMax="1">Σx/n</simpleAssociableChoice>"#));
    }

    #[test]
    fn test_blanks_become_text_entries() {
        let quiz = parse_markdown("## 1. [FMB] Range is [blank1] to [blank2].\n[blank1]: -1\n[blank2]: 1, one\n");
        let xml = generate_item(&quiz.questions[0]);
        assert!(xml.contains(r#"<textEntryInteraction responseIdentifier="RESPONSE_blank1" expectedLength="15"/>"#));
        assert!(xml.contains(r#"identifier="RESPONSE_blank2""#));
        assert!(xml.contains("<value>-1</value>"));
        assert!(!xml.contains("[blank1]"));
    }

    #[test]
    fn test_images_point_into_package() {
        let q = question(
            QuestionType::Essay,
            "Describe ![the plot](figures/plot.png) and <img src=\"https://example.com/a.png\">",
            vec![],
        );
        let xml = generate_item(&q);
        assert!(xml.contains(r#"<img src="images/plot.png" alt="the plot"/>"#));
        assert!(xml.contains(r#"<img src="https://example.com/a.png" alt=""/>"#));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let q = question(QuestionType::Essay, "Run <script>alert(1)</script>", vec![]);
        let xml = generate_item(&q);
        assert!(xml.contains("&lt;script&gt;"));
        assert!(!xml.contains("<script>"));
    }

    #[test]
    fn test_test_groups_sections() {
        let quiz = parse_markdown(
            "# Quiz\n# Section: Multiple Choice\n## 1. Q one\n1) **A**\n2) B\n# Section: Essay\n## 2. Q two\n",
        );
        let xml = generate_test(&quiz);
        assert!(xml.contains(r#"identifier="section_1" title="Section: Multiple Choice""#));
        assert!(xml.contains(r#"identifier="section_2""#));
        assert!(xml.contains(r#"href="items/item_2.xml""#));
    }

    #[test]
    fn test_manifest_lists_bundled_images_only() {
        let mut quiz = parse_markdown("## 1. [Essay] See ![p](plot.png) and ![m](missing.png)\n");
        quiz.questions[0].images = vec!["plot.png".to_string(), "missing.png".to_string()];
        let bundled: BTreeSet<String> = ["plot.png".to_string()].into_iter().collect();

        let xml = generate_manifest(&quiz, &bundled);
        assert!(xml.contains(r#"<file href="items/images/plot.png"/>"#));
        assert!(!xml.contains("missing.png"));
        assert!(xml.contains(r#"<dependency identifierref="res_item_1"/>"#));
        assert!(xml.contains(r#"identifier="test_resource""#));
    }
}
