//! QTI 2.1 package layout on disk
//!
//! ```text
//! imsmanifest.xml
//! items/item_<id>.xml
//! items/images/<file>
//! tests/test.xml
//! ```

use anyhow::{bail, Context};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use super::qti21::{self, IMAGE_DIR, TEST_HREF};
use crate::models::ParsedQuiz;
use crate::Result;

/// What `write_package_dir` produced
#[derive(Debug, Clone, Default)]
pub struct PackageSummary {
    pub item_count: usize,
    /// Image file names copied into `items/images/`
    pub bundled_images: BTreeSet<String>,
    /// Image references that could not be found next to the source
    pub missing_images: Vec<String>,
}

/// Write the package for `quiz` into `out_dir`
///
/// Local images are looked up relative to `source_dir`.
pub fn write_package_dir(quiz: &ParsedQuiz, source_dir: &Path, out_dir: &Path) -> Result<PackageSummary> {
    let items_dir = out_dir.join("items");
    let tests_dir = out_dir.join("tests");
    std::fs::create_dir_all(&items_dir)
        .with_context(|| format!("Failed to create {}", items_dir.display()))?;
    std::fs::create_dir_all(&tests_dir)
        .with_context(|| format!("Failed to create {}", tests_dir.display()))?;

    let mut missing_images = Vec::new();
    let bundled_images = copy_images(quiz, source_dir, &items_dir, &mut missing_images)?;
    let mut summary = PackageSummary {
        item_count: 0,
        bundled_images,
        missing_images,
    };

    for question in &quiz.questions {
        let path = out_dir.join(qti21::item_href(question));
        std::fs::write(&path, qti21::generate_item(question))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        summary.item_count += 1;
    }

    let test_path = out_dir.join(TEST_HREF);
    std::fs::write(&test_path, qti21::generate_test(quiz))
        .with_context(|| format!("Failed to write {}", test_path.display()))?;

    let manifest_path = out_dir.join("imsmanifest.xml");
    std::fs::write(&manifest_path, qti21::generate_manifest(quiz, &summary.bundled_images))
        .with_context(|| format!("Failed to write {}", manifest_path.display()))?;

    tracing::debug!(
        "Wrote {} items to {} ({} images)",
        summary.item_count,
        out_dir.display(),
        summary.bundled_images.len()
    );

    Ok(summary)
}

fn copy_images(
    quiz: &ParsedQuiz,
    source_dir: &Path,
    items_dir: &Path,
    missing: &mut Vec<String>,
) -> Result<BTreeSet<String>> {
    let mut bundled = BTreeSet::new();

    for src in quiz.questions.iter().flat_map(|q| q.images.iter()) {
        let Some(name) = qti21::packaged_image_name(src) else {
            continue;
        };
        if bundled.contains(&name) {
            continue;
        }

        let source = source_dir.join(src);
        if !source.is_file() {
            tracing::warn!("Image not found: {}", source.display());
            if !missing.contains(src) {
                missing.push(src.clone());
            }
            continue;
        }

        let image_dir = items_dir.join(IMAGE_DIR);
        std::fs::create_dir_all(&image_dir)
            .with_context(|| format!("Failed to create {}", image_dir.display()))?;
        std::fs::copy(&source, image_dir.join(&name))
            .with_context(|| format!("Failed to copy image {}", source.display()))?;
        bundled.insert(name);
    }

    Ok(bundled)
}

/// Zip the package directory `dir` into `output` with the system `zip`
pub async fn zip_package(dir: &Path, output: &Path) -> Result<PathBuf> {
    let output = std::path::absolute(output)
        .with_context(|| format!("Invalid output path {}", output.display()))?;
    if output.exists() {
        std::fs::remove_file(&output)
            .with_context(|| format!("Failed to replace {}", output.display()))?;
    }
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let result = Command::new("zip")
        .arg("-r")
        .arg("-q")
        .arg(&output)
        .arg(".")
        .current_dir(dir)
        .output()
        .await
        .context("Failed to run zip. Is it installed?")?;

    if !result.status.success() {
        bail!(
            "zip failed: {}",
            String::from_utf8_lossy(&result.stderr).trim()
        );
    }

    Ok(output)
}
