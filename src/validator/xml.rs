//! XML helpers shared by the QTI 1.2 and 2.1 checks

use roxmltree::{Document, Node, ParsingOptions};
use std::collections::HashSet;
use std::path::{Component, Path};

use crate::models::DiagnosticReport;

/// Substrings that must never appear in question content
pub const SUSPICIOUS_PATTERNS: &[&str] = &["<script", "<iframe", "<object", "<embed", "javascript:"];

regex!(src_attr_re, r#"(?i)\bsrc\s*=\s*\\?["']([^"'\\]+)\\?["']"#);
regex!(markdown_image_re, r#"!\[[^\]]*\]\(\s*([^)\s]+)(?:\s+"[^"]*")?\s*\)"#);
regex!(image_extension_re, r"(?i)\.(?:png|jpe?g|gif|svg|webp)$");
regex!(identifier_re, r"^[A-Za-z_][A-Za-z0-9_]*$");

/// Parse XML, tolerating a DOCTYPE
pub fn parse(content: &str) -> Result<Document<'_>, roxmltree::Error> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(content, options)
}

/// First element child with the given local name
pub fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// All element children with the given local name
pub fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

/// All element descendants (the node itself excluded) with the given local name
pub fn descendants<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.descendants()
        .skip(1)
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

/// Concatenated, entity-decoded text of a subtree
pub fn text_content(node: Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Raw source text of a node, markup included
pub fn raw_source<'input>(content: &'input str, node: Node) -> &'input str {
    content.get(node.range()).unwrap_or_default()
}

/// Suspicious patterns found in either the raw markup or the decoded text
pub fn find_suspicious(raw: &str, decoded: &str) -> Vec<&'static str> {
    let raw = raw.to_lowercase();
    let decoded = decoded.to_lowercase();
    SUSPICIOUS_PATTERNS
        .iter()
        .copied()
        .filter(|pattern| raw.contains(pattern) || decoded.contains(pattern))
        .collect()
}

/// Image paths referenced through `src=` attributes or Markdown image syntax
pub fn find_image_refs(text: &str) -> Vec<String> {
    let mut refs: Vec<String> = Vec::new();
    let candidates = src_attr_re()
        .captures_iter(text)
        .chain(markdown_image_re().captures_iter(text));

    for caps in candidates {
        let path = caps[1].trim().to_string();
        if !refs.contains(&path) {
            refs.push(path);
        }
    }
    refs
}

pub fn is_image_path(path: &str) -> bool {
    image_extension_re().is_match(path)
}

pub fn is_remote(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("data:")
}

/// Whether an identifier is safe for Canvas (`[A-Za-z_][A-Za-z0-9_]*`)
pub fn is_plain_identifier(identifier: &str) -> bool {
    identifier_re().is_match(identifier)
}

pub fn has_xml_extension(href: &str) -> bool {
    Path::new(href)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}

/// Whether `href` is absolute or climbs out of the package with `..`
pub fn escapes_package(href: &str) -> bool {
    Path::new(href).components().any(|c| {
        matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_))
    })
}

/// Identifiers seen so far in one package; any repeat is an error
#[derive(Debug, Default)]
pub struct IdentifierSet {
    seen: HashSet<String>,
}

impl IdentifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id`, reporting a duplicate against `source`
    pub fn check(&mut self, id: Option<&str>, source: &str, report: &mut DiagnosticReport) {
        let Some(id) = id.filter(|id| !id.is_empty()) else {
            return;
        };
        if !self.seen.insert(id.to_string()) {
            report.error(format!("Duplicate identifier used: '{}' in {}", id, source));
        }
    }
}
