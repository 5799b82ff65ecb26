//! QTI package validation
//!
//! `validate_package` accepts a package directory or a `.zip` of one, detects
//! whether it holds QTI 1.2 or QTI 2.1 content, and collects every problem it
//! can find into a `DiagnosticReport`.

pub mod canvas;
pub mod lint;
pub mod qti12;
pub mod qti21;
pub mod xml;

pub use canvas::{predict_canvas_import, CanvasPrediction, Finding};
pub use lint::lint_markdown;

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::process::Command;
use walkdir::WalkDir;

use crate::models::DiagnosticReport;
use crate::Result;

/// Problems that stop validation before any package content is checked
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to unzip file. Is it a valid zip archive?")]
    UnzipFailed,

    #[error("Input must be a directory or .zip file")]
    UnsupportedInput,

    #[error("imsmanifest.xml not found in root")]
    MissingManifest,

    #[error("Invalid XML in imsmanifest.xml: {0}")]
    InvalidManifest(String),
}

/// Package layout found after extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageKind {
    /// A single top-level `questestinterop` document
    Qti12 { file: String },
    /// Manifest-based package
    Qti21,
}

/// Validate the package at `path`
///
/// Never fails: a fatal input problem yields a report holding only that
/// error, and unexpected internal errors are appended to the findings.
pub async fn validate_package(path: impl AsRef<Path>) -> DiagnosticReport {
    let path = path.as_ref();
    let mut report = DiagnosticReport::new();

    if let Err(e) = inspect(path, &mut report).await {
        match e.downcast_ref::<PackageError>() {
            Some(fatal) => {
                return DiagnosticReport {
                    details: report.details,
                    ..DiagnosticReport::fatal(fatal.to_string())
                };
            }
            None => report.error(format!("Validation Error: {:#}", e)),
        }
    }

    report.finish()
}

async fn inspect(path: &Path, report: &mut DiagnosticReport) -> Result<()> {
    if !path.exists() {
        return Err(PackageError::NotFound(path.to_path_buf()).into());
    }

    // The scratch dir is removed when `_scratch` drops, on every exit path
    let (root, _scratch): (PathBuf, Option<TempDir>) = if path.is_dir() {
        (path.to_path_buf(), None)
    } else if path.is_file() && is_zip(path) {
        let dir = tempfile::Builder::new().prefix("qti-validate-").tempdir()?;
        extract_zip(path, dir.path()).await?;
        (dir.path().to_path_buf(), Some(dir))
    } else {
        return Err(PackageError::UnsupportedInput.into());
    };

    match detect_kind(&root) {
        PackageKind::Qti12 { file } => {
            tracing::debug!("Validating QTI 1.2 document {}", file);
            qti12::validate(&root, &file, report)
        }
        PackageKind::Qti21 => {
            tracing::debug!("Validating QTI 2.1 package at {}", root.display());
            qti21::validate(&root, report)
        }
    }
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

/// Extract `archive` into `dest` with the system `unzip`
async fn extract_zip(archive: &Path, dest: &Path) -> Result<()> {
    let output = Command::new("unzip")
        .arg("-o")
        .arg("-q")
        .arg(archive)
        .arg("-d")
        .arg(dest)
        .output()
        .await
        .map_err(|e| {
            tracing::debug!("Could not run unzip: {}", e);
            PackageError::UnzipFailed
        })?;

    if !output.status.success() {
        tracing::debug!(
            "unzip exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return Err(PackageError::UnzipFailed.into());
    }

    Ok(())
}

/// Look for a top-level QTI 1.2 document; otherwise assume QTI 2.1
pub fn detect_kind(root: &Path) -> PackageKind {
    let candidates = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        });

    for entry in candidates {
        let Ok(content) = std::fs::read_to_string(entry.path()) else {
            continue;
        };
        if qti12::is_qti12(&content) {
            return PackageKind::Qti12 {
                file: entry.file_name().to_string_lossy().into_owned(),
            };
        }
    }

    PackageKind::Qti21
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_path_is_fatal() {
        let report = validate_package("/definitely/not/here.zip").await;
        assert!(!report.is_valid);
        assert_eq!(report.errors, ["File not found: /definitely/not/here.zip"]);
    }

    #[tokio::test]
    async fn test_plain_file_is_unsupported() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("quiz.md");
        std::fs::write(&file, "# Quiz").unwrap();

        let report = validate_package(&file).await;
        assert_eq!(report.errors, ["Input must be a directory or .zip file"]);
    }

    #[tokio::test]
    async fn test_bad_zip_is_fatal() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("broken.zip");
        std::fs::write(&file, "not a zip").unwrap();

        let report = validate_package(&file).await;
        assert_eq!(report.errors, ["Failed to unzip file. Is it a valid zip archive?"]);
    }

    #[tokio::test]
    async fn test_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let report = validate_package(dir.path()).await;
        assert_eq!(report.errors, ["imsmanifest.xml not found in root"]);
        assert!(!report.details.manifest_found);
    }

    #[tokio::test]
    async fn test_invalid_manifest_xml() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("imsmanifest.xml"), "<manifest><resources>").unwrap();

        let report = validate_package(dir.path()).await;
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("Invalid XML in imsmanifest.xml:"));
        assert!(report.details.manifest_found);
    }

    #[test]
    fn test_detect_kind() {
        let dir = TempDir::new().unwrap();
        assert_eq!(detect_kind(dir.path()), PackageKind::Qti21);

        std::fs::write(dir.path().join("notes.xml"), "<notes/>").unwrap();
        std::fs::write(
            dir.path().join("quiz.xml"),
            "<questestinterop><assessment/></questestinterop>",
        )
        .unwrap();
        assert_eq!(
            detect_kind(dir.path()),
            PackageKind::Qti12 {
                file: "quiz.xml".to_string()
            }
        );
    }
}
