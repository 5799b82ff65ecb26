//! YAML Frontmatter
//!
//! Exams may open with a Quarto-style YAML block:
//!
//! ```text
//! ---
//! title: "Midterm"
//! points: 2
//! ---
//! ```
//!
//! Handles:
//! - BOM (Byte Order Mark) stripping
//! - Line ending normalization (CRLF → LF)
//! - Closing `---` with trailing whitespace
//!
//! A block that is unclosed or not valid YAML is left in the body untouched.

use anyhow::{bail, Result};
use serde::Deserialize;

regex!(closing_delimiter_re, r"\n---[ \t]*\n|\n---[ \t]*$");

/// Frontmatter keys the converter understands; everything else is ignored
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QuizFrontmatter {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, alias = "default-points", alias = "default_points")]
    pub points: Option<f64>,
}

/// Result of splitting frontmatter off an exam document
#[derive(Debug, Clone, PartialEq)]
pub struct ExamDocument {
    pub frontmatter: QuizFrontmatter,
    /// Markdown body after the closing delimiter
    pub body: String,
    /// Number of source lines consumed by the frontmatter block
    pub line_offset: usize,
}

/// Normalize content: strip BOM, normalize line endings
pub fn normalize_content(content: &str) -> String {
    let s = content.strip_prefix('\u{FEFF}').unwrap_or(content);
    s.replace("\r\n", "\n").replace('\r', "\n")
}

/// Split `(frontmatter, body, line_offset)` off normalized content
pub fn split_frontmatter(content: &str) -> Result<(String, String, usize)> {
    let Some(after_open) = content.strip_prefix("---\n") else {
        bail!("Document does not start with YAML frontmatter (---)")
    };

    let Some(m) = closing_delimiter_re().find(after_open) else {
        bail!("Frontmatter not properly closed (--- must be at line start)")
    };

    let frontmatter = after_open[..m.start()].to_string();
    let body = after_open[m.end()..].to_string();

    // opening delimiter + YAML lines + closing delimiter
    let yaml_lines = if frontmatter.is_empty() {
        0
    } else {
        frontmatter.lines().count()
    };
    let line_offset = yaml_lines + 2;

    Ok((frontmatter, body, line_offset))
}

/// Parse an exam document, pulling out the frontmatter when there is a usable one
pub fn parse_exam_document(content: &str) -> ExamDocument {
    let normalized = normalize_content(content);

    let fallback = |body: String| ExamDocument {
        frontmatter: QuizFrontmatter::default(),
        body,
        line_offset: 0,
    };

    let Ok((raw, body, line_offset)) = split_frontmatter(&normalized) else {
        return fallback(normalized);
    };

    // Empty blocks deserialize to unit, not a mapping
    if raw.trim().is_empty() {
        return ExamDocument {
            frontmatter: QuizFrontmatter::default(),
            body,
            line_offset,
        };
    }

    match serde_yaml::from_str::<QuizFrontmatter>(&raw) {
        Ok(frontmatter) => ExamDocument {
            frontmatter: sanitize(frontmatter),
            body,
            line_offset,
        },
        Err(e) => {
            tracing::debug!("Ignoring malformed frontmatter: {}", e);
            fallback(normalized)
        }
    }
}

fn sanitize(frontmatter: QuizFrontmatter) -> QuizFrontmatter {
    QuizFrontmatter {
        title: frontmatter
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()),
        points: frontmatter.points.filter(|p| p.is_finite() && *p > 0.0),
    }
}
