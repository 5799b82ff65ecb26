//! QTI 1.2 (Canvas Classic Quizzes) checks for a single `questestinterop` file

use roxmltree::Node;
use std::path::Path;

use super::xml::{self, IdentifierSet};
use crate::models::DiagnosticReport;
use crate::Result;

/// Free-text types that Canvas grades by hand
const MANUALLY_GRADED: &[&str] = &["essay_question", "short_answer_question"];

const MIN_QUESTION_CHARS: usize = 3;

/// Validate the QTI 1.2 document at `root/file`
pub fn validate(root: &Path, file: &str, report: &mut DiagnosticReport) -> Result<()> {
    let path = root.join(file);
    let content = std::fs::read_to_string(&path)?;

    let doc = match xml::parse(&content) {
        Ok(doc) => doc,
        Err(e) => {
            report.error(format!("Invalid XML content in {}: {}", file, e));
            return Ok(());
        }
    };

    let root_element = doc.root_element();
    let Some(assessment) = xml::child(root_element, "assessment") else {
        report.error(format!("QTI 1.2: missing <assessment> element in {}", file));
        return Ok(());
    };
    let Some(section) = xml::child(assessment, "section") else {
        report.error(format!("QTI 1.2: missing <section> element in {}", file));
        return Ok(());
    };
    report.details.test_found = true;

    let mut identifiers = IdentifierSet::new();
    identifiers.check(assessment.attribute("ident"), &format!("Assessment {}", file), report);

    let items: Vec<Node> = xml::descendants(section, "item").collect();
    report.details.item_count = items.len();
    report.details.resource_count = items.len();

    for item in items {
        check_item(&content, item, file, &mut identifiers, report);
    }

    Ok(())
}

fn check_item(
    content: &str,
    item: Node,
    file: &str,
    identifiers: &mut IdentifierSet,
    report: &mut DiagnosticReport,
) {
    let ident = item.attribute("ident").unwrap_or("unknown");
    identifiers.check(item.attribute("ident"), &format!("Item in {}", file), report);

    let Some(presentation) = xml::child(item, "presentation") else {
        report.error(format!("Item '{}' missing <presentation> in {}", ident, file));
        return;
    };

    let question_text = question_text(presentation);
    if question_text.trim().chars().count() < MIN_QUESTION_CHARS {
        report.error(format!(
            "Canvas import may fail: Question stem appears empty or too short in item '{}' ({})",
            ident, file
        ));
    }

    let raw = xml::raw_source(content, presentation);
    for pattern in xml::find_suspicious(raw, &question_text) {
        report.error(format!(
            "Security Error: Potential malicious content '{}' detected in item '{}' ({})",
            pattern, ident, file
        ));
    }

    let question_type = question_type(item);
    let response_lid = xml::descendants(presentation, "response_lid").next();
    let response_str = xml::descendants(presentation, "response_str").next();

    match (response_lid, response_str) {
        (Some(lid), _) => check_choice_item(item, lid, ident, question_type.as_deref(), file, report),
        (None, Some(_)) => {
            // free text, graded by hand
        }
        (None, None) => {
            report.error(format!(
                "Item '{}' has no response_lid or response_str in {}",
                ident, file
            ));
        }
    }

    for src in xml::find_image_refs(&question_text) {
        let lower = src.to_ascii_lowercase();
        if !lower.starts_with("data:") && !lower.starts_with("http") {
            report.warning(format!(
                "Image '{}' in item '{}' uses a relative path and may not display in Canvas",
                src, ident
            ));
        }
    }
}

fn check_choice_item(
    item: Node,
    lid: Node,
    ident: &str,
    question_type: Option<&str>,
    file: &str,
    report: &mut DiagnosticReport,
) {
    let choices = xml::descendants(lid, "render_choice")
        .flat_map(|render| xml::children(render, "response_label"))
        .count();
    if choices < 2 {
        report.error(format!(
            "Canvas import may fail: Less than 2 answer options in item '{}' ({})",
            ident, file
        ));
    }

    if question_type.is_some_and(|t| MANUALLY_GRADED.contains(&t)) {
        return;
    }

    let Some(resprocessing) = xml::child(item, "resprocessing") else {
        report.warning(format!(
            "Missing resprocessing (may need manual grading) in item '{}' ({})",
            ident, file
        ));
        return;
    };

    let has_correct = xml::descendants(resprocessing, "conditionvar").any(|condition| {
        xml::children(condition, "varequal").next().is_some()
            || xml::children(condition, "and")
                .any(|and| xml::children(and, "varequal").next().is_some())
    });

    if !has_correct {
        report.error(format!(
            "Canvas import will fail: No correct answer defined in item '{}' ({})",
            ident, file
        ));
    }
}

/// Question text from `presentation/material/mattext`
fn question_text(presentation: Node) -> String {
    xml::children(presentation, "material")
        .flat_map(|material| xml::children(material, "mattext"))
        .map(xml::text_content)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Value of the `question_type` metadata field
fn question_type(item: Node) -> Option<String> {
    let metadata = xml::child(item, "itemmetadata")?;
    xml::descendants(metadata, "qtimetadatafield").find_map(|field| {
        let label = xml::child(field, "fieldlabel").map(xml::text_content)?;
        if label.trim() != "question_type" {
            return None;
        }
        xml::child(field, "fieldentry").map(|entry| xml::text_content(entry).trim().to_string())
    })
}

/// Whether `content` is a QTI 1.2 document
///
/// Only the prolog and the root start tag are scanned, so malformed
/// documents still reach `validate` and get their XML error reported.
pub fn is_qti12(content: &str) -> bool {
    root_tag_name(content).is_some_and(|name| {
        name.rsplit(':').next() == Some("questestinterop")
    })
}

/// Name of the first element start tag, skipping declarations and comments
fn root_tag_name(content: &str) -> Option<&str> {
    let mut rest = content.trim_start_matches('\u{feff}');
    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix("<?") {
            rest = &after[after.find("?>")? + 2..];
        } else if let Some(after) = rest.strip_prefix("<!--") {
            rest = &after[after.find("-->")? + 3..];
        } else if let Some(after) = rest.strip_prefix("<!") {
            rest = &after[after.find('>')? + 1..];
        } else {
            let after = rest.strip_prefix('<')?;
            let end = after
                .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
                .unwrap_or(after.len());
            return Some(&after[..end]).filter(|name| !name.is_empty());
        }
    }
}
