//! QTI 2.1 package checks: manifest, resources, items and tests

use anyhow::Context;
use roxmltree::Node;
use std::collections::HashSet;
use std::path::Path;

use super::xml::{self, IdentifierSet};
use super::PackageError;
use crate::models::DiagnosticReport;
use crate::Result;

pub const ITEM_RESOURCE_TYPE: &str = "imsqti_item_xmlv2p1";
pub const TEST_RESOURCE_TYPE: &str = "imsqti_test_xmlv2p1";

/// Interactions Canvas rejects on import
pub const UNSUPPORTED_INTERACTIONS: &[&str] = &[
    "gapMatchInteraction",
    "orderInteraction",
    "associateInteraction",
    "graphicGapMatchInteraction",
    "hotspotInteraction",
];

/// Minimum characters of stem text Canvas accepts
const MIN_STEM_CHARS: usize = 5;

/// Validate an extracted QTI 2.1 package rooted at `root`
///
/// Missing or unparseable manifests are fatal and returned as errors; every
/// other finding is recorded on `report`.
pub fn validate(root: &Path, report: &mut DiagnosticReport) -> Result<()> {
    let manifest_path = root.join("imsmanifest.xml");
    if !manifest_path.is_file() {
        return Err(PackageError::MissingManifest.into());
    }
    report.details.manifest_found = true;

    let content = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
    let doc = xml::parse(&content).map_err(|e| PackageError::InvalidManifest(e.to_string()))?;

    let manifest = doc.root_element();
    if manifest.tag_name().name() != "manifest" {
        report.error("imsmanifest.xml missing root <manifest> element");
        return Ok(());
    }

    let mut identifiers = IdentifierSet::new();
    identifiers.check(manifest.attribute("identifier"), "Manifest", report);

    let resources: Vec<Node> = xml::children(manifest, "resources")
        .flat_map(|group| xml::children(group, "resource"))
        .collect();
    report.details.resource_count = resources.len();

    let known: HashSet<&str> = resources
        .iter()
        .filter_map(|r| r.attribute("identifier"))
        .collect();

    for resource in &resources {
        check_resource(root, *resource, &known, &mut identifiers, report);
    }

    if !report.details.test_found {
        report.warning(
            "No assessmentTest resource found (imsqti_test_xmlv2p1). This may just be an item bank.",
        );
    }

    Ok(())
}

fn check_resource(
    root: &Path,
    resource: Node,
    known: &HashSet<&str>,
    identifiers: &mut IdentifierSet,
    report: &mut DiagnosticReport,
) {
    let resource_type = resource.attribute("type").unwrap_or_default();
    let resource_id = resource.attribute("identifier");
    identifiers.check(resource_id, "Resource", report);

    let is_item = resource_type == ITEM_RESOURCE_TYPE;
    let is_test = resource_type == TEST_RESOURCE_TYPE;
    if is_item {
        report.details.item_count += 1;
    }
    if is_test {
        report.details.test_found = true;
    }

    let mut xml_files: Vec<&str> = Vec::new();

    if let Some(href) = resource.attribute("href") {
        if xml::escapes_package(href) {
            report.error(format!("Resource path points outside the package: {}", href));
        } else if root.join(href).exists() {
            if xml::has_xml_extension(href) {
                xml_files.push(href);
            }
        } else {
            report.error(format!("Resource main file not found: {}", href));
        }
    }

    for file in xml::children(resource, "file") {
        let Some(href) = file.attribute("href") else {
            continue;
        };
        if xml::escapes_package(href) {
            report.error(format!("Resource path points outside the package: {}", href));
        } else if !root.join(href).exists() {
            report.error(format!("Missing resource file: {}", href));
        } else if xml::has_xml_extension(href) && !xml_files.contains(&href) {
            xml_files.push(href);
        }
    }

    for dependency in xml::children(resource, "dependency") {
        if let Some(target) = dependency.attribute("identifierref") {
            if !known.contains(target) {
                report.warning(format!(
                    "Resource '{}' depends on unknown resource '{}'",
                    resource_id.unwrap_or_default(),
                    target
                ));
            }
        }
    }

    for href in xml_files {
        if is_item {
            check_item_file(root, href, identifiers, report);
        } else if is_test {
            check_test_file(root, href, identifiers, report);
        }
    }
}

// =============================================================================
// Items
// =============================================================================

fn check_item_file(root: &Path, href: &str, identifiers: &mut IdentifierSet, report: &mut DiagnosticReport) {
    tracing::debug!("Checking item {}", href);

    let content = match std::fs::read_to_string(root.join(href)) {
        Ok(content) => content,
        Err(e) => {
            report.error(format!("Invalid XML content in {}: {}", href, e));
            return;
        }
    };

    let doc = match xml::parse(&content) {
        Ok(doc) => doc,
        Err(e) => {
            report.error(format!("Invalid XML content in {}: {}", href, e));
            return;
        }
    };

    let item = doc.root_element();
    if item.tag_name().name() != "assessmentItem" {
        report.error(format!("Invalid Item XML (missing assessmentItem): {}", href));
        return;
    }

    let identifier = item.attribute("identifier");
    identifiers.check(identifier, &format!("Item {}", href), report);

    let has_score = xml::children(item, "outcomeDeclaration")
        .any(|o| o.attribute("identifier") == Some("SCORE"));
    if !has_score {
        report.warning(format!("Item missing SCORE outcomeDeclaration: {}", href));
    }

    if let Some(id) = identifier {
        if !xml::is_plain_identifier(id) {
            report.warning(format!(
                "Identifier '{}' contains special characters, may cause issues: {}",
                id, href
            ));
        }
    }

    let Some(body) = xml::child(item, "itemBody") else {
        report.error(format!(
            "Canvas import may fail: Question stem appears empty or too short in {}",
            href
        ));
        return;
    };

    check_stem(body, href, report);
    check_choices(item, body, href, report);
    check_interactions(body, href, report);
    check_images(root, &content, body, href, report);
    check_security(&content, body, identifier.unwrap_or(href), href, report);
}

fn check_stem(body: Node, href: &str, report: &mut DiagnosticReport) {
    let mut text = xml::text_content(body);
    for img in xml::descendants(body, "img") {
        if let Some(alt) = img.attribute("alt") {
            text.push(' ');
            text.push_str(alt);
        }
    }

    let residual: String = text
        .chars()
        .filter(|c| !matches!(c, '{' | '}' | '"' | '[' | ']' | ',' | ':'))
        .collect();

    if residual.trim().chars().count() < MIN_STEM_CHARS {
        report.error(format!(
            "Canvas import may fail: Question stem appears empty or too short in {}",
            href
        ));
    }
}

fn check_choices(item: Node, body: Node, href: &str, report: &mut DiagnosticReport) {
    let interactions: Vec<Node> = xml::descendants(body, "choiceInteraction").collect();
    if interactions.is_empty() {
        return;
    }

    if xml::child(item, "responseProcessing").is_none() {
        report.warning(format!(
            "Missing responseProcessing (may need manual grading): {}",
            href
        ));
    }

    for interaction in interactions {
        if xml::children(interaction, "simpleChoice").count() < 2 {
            report.error(format!(
                "Canvas import may fail: Less than 2 answer options in {}",
                href
            ));
        }

        let response_id = interaction.attribute("responseIdentifier");
        let declaration = xml::children(item, "responseDeclaration")
            .find(|d| response_id.is_some() && d.attribute("identifier") == response_id)
            .or_else(|| xml::child(item, "responseDeclaration"));

        let Some(declaration) = declaration else {
            report.error(format!(
                "Canvas import will fail: No correct answer defined in {}",
                href
            ));
            continue;
        };

        check_cardinality(declaration, interaction, href, report);

        let has_correct = xml::child(declaration, "correctResponse")
            .map(|c| xml::children(c, "value").any(|v| !xml::text_content(v).trim().is_empty()))
            .unwrap_or(false);
        if !has_correct {
            report.error(format!(
                "Canvas import will fail: No correct answer defined in {}",
                href
            ));
        }
    }
}

fn check_cardinality(declaration: Node, interaction: Node, href: &str, report: &mut DiagnosticReport) {
    let cardinality = declaration.attribute("cardinality").unwrap_or_default();
    let Some(max_choices) = interaction.attribute("maxChoices") else {
        return;
    };
    let max = max_choices.trim().parse::<u32>().ok();

    match cardinality {
        "single" if max == Some(0) || max.is_some_and(|m| m > 1) => {
            report.error(format!(
                "Mismatch: Cardinality 'single' but maxChoices '{}' in {}",
                max_choices, href
            ));
        }
        "multiple" if max == Some(1) => {
            report.error(format!(
                "Mismatch: Cardinality 'multiple' but maxChoices '1' in {}",
                href
            ));
        }
        _ => {}
    }
}

fn check_interactions(body: Node, href: &str, report: &mut DiagnosticReport) {
    for node in body.descendants().filter(|n| n.is_element()) {
        let name = node.tag_name().name();
        if UNSUPPORTED_INTERACTIONS.contains(&name) {
            report.error(format!("Unsupported Canvas interaction '{}' in {}", name, href));
        }
    }

    if xml::descendants(body, "matchInteraction").next().is_some() {
        report.warning(format!("matchInteraction has limited Canvas support: {}", href));
    }
}

fn check_images(root: &Path, content: &str, body: Node, href: &str, report: &mut DiagnosticReport) {
    let mut refs: Vec<String> = Vec::new();
    for node in body.descendants().filter(|n| n.is_element()) {
        let src = match node.tag_name().name() {
            "img" => node.attribute("src"),
            "object" => node.attribute("data"),
            _ => None,
        };
        if let Some(src) = src {
            refs.push(src.to_string());
        }
    }
    refs.extend(xml::find_image_refs(&xml::text_content(body)));
    refs.extend(xml::find_image_refs(xml::raw_source(content, body)));

    let mut checked: HashSet<String> = HashSet::new();
    for path in refs {
        if xml::is_remote(&path) || !xml::is_image_path(&path) || !checked.insert(path.clone()) {
            continue;
        }
        if !root.join("items").join(&path).exists() && !root.join(&path).exists() {
            report.error(format!("Missing image file '{}' referenced in {}", path, href));
        }
    }
}

fn check_security(content: &str, body: Node, item_id: &str, href: &str, report: &mut DiagnosticReport) {
    let raw = xml::raw_source(content, body);
    let decoded = xml::text_content(body);

    for pattern in xml::find_suspicious(raw, &decoded) {
        report.error(format!(
            "Security Error: Potential malicious content '{}' detected in item '{}' ({})",
            pattern, item_id, href
        ));
    }
}

// =============================================================================
// Tests
// =============================================================================

fn check_test_file(root: &Path, href: &str, identifiers: &mut IdentifierSet, report: &mut DiagnosticReport) {
    tracing::debug!("Checking test {}", href);

    let content = match std::fs::read_to_string(root.join(href)) {
        Ok(content) => content,
        Err(e) => {
            report.error(format!("Invalid XML content in {}: {}", href, e));
            return;
        }
    };

    let doc = match xml::parse(&content) {
        Ok(doc) => doc,
        Err(e) => {
            report.error(format!("Invalid XML content in {}: {}", href, e));
            return;
        }
    };

    let test = doc.root_element();
    if test.tag_name().name() != "assessmentTest" {
        report.error(format!("Invalid Test XML (missing assessmentTest): {}", href));
        return;
    }

    identifiers.check(test.attribute("identifier"), &format!("Test {}", href), report);

    let test_dir = Path::new(href).parent().unwrap_or_else(|| Path::new(""));
    let context = TestContext {
        root,
        test_dir,
        href,
    };

    for part in xml::children(test, "testPart") {
        for section in xml::children(part, "assessmentSection") {
            check_section(&context, section, identifiers, report);
        }
    }
}

struct TestContext<'a> {
    root: &'a Path,
    test_dir: &'a Path,
    href: &'a str,
}

fn check_section(
    context: &TestContext,
    section: Node,
    identifiers: &mut IdentifierSet,
    report: &mut DiagnosticReport,
) {
    identifiers.check(
        section.attribute("identifier"),
        &format!("Section in {}", context.href),
        report,
    );

    for item_ref in xml::children(section, "assessmentItemRef") {
        let Some(item_href) = item_ref.attribute("href") else {
            continue;
        };
        let from_root = context.root.join(item_href);
        let from_test = context.root.join(context.test_dir).join(item_href);
        if !from_root.exists() && !from_test.exists() {
            report.error(format!("Test references missing item file: {}", item_href));
        }
    }

    for subsection in xml::children(section, "assessmentSection") {
        check_section(context, subsection, identifiers, report);
    }
}
