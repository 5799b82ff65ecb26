//! Image references in question text

use pulldown_cmark::{Event, Parser, Tag};

regex!(html_img_re, r#"(?i)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#);

/// Collect image paths referenced by Markdown `![alt](path)` or HTML `<img src>`
///
/// Paths are returned in order of first appearance without duplicates.
pub fn extract_images(text: &str) -> Vec<String> {
    let mut images: Vec<String> = Vec::new();
    let mut push = |path: &str| {
        let path = path.trim();
        if !path.is_empty() && !images.iter().any(|p| p == path) {
            images.push(path.to_string());
        }
    };

    for event in Parser::new(text) {
        if let Event::Start(Tag::Image { dest_url, .. }) = event {
            push(&dest_url);
        }
    }

    for caps in html_img_re().captures_iter(text) {
        push(&caps[1]);
    }

    images
}

/// Whether an image reference points outside the package
pub fn is_external(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("data:")
}
