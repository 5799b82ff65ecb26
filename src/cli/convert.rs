use anyhow::{bail, Context};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::generator::{write_package_dir, zip_package};
use crate::models::{ExamarkConfig, ParsedQuiz, Severity};
use crate::parser::MarkdownParser;
use crate::validator::{lint, validate_package};
use crate::Result;

/// Flags of `examark convert`
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Output `.qti.zip`, or a directory when several inputs are given
    pub output: Option<PathBuf>,
    pub points: Option<f64>,
    pub title: Option<String>,
    pub validate: bool,
    /// Print the parsed quiz as JSON instead of packaging it
    pub preview: bool,
    /// Keep the unzipped package directory next to the zip
    pub keep_dir: bool,
}

impl ConvertOptions {
    fn overrides(&self) -> ExamarkConfig {
        ExamarkConfig {
            default_points: self.points,
            output_dir: None,
            validate: self.validate.then_some(true),
            title: self.title.clone(),
        }
        .sanitized()
    }
}

pub async fn run(inputs: &[String], options: &ConvertOptions) -> Result<()> {
    let files = super::expand_inputs(inputs)?;
    let multiple = files.len() > 1;
    let mut failed = 0;

    for file in &files {
        if let Err(e) = convert_file(file, options, multiple).await {
            eprintln!("{}", format!("✗ {}: {:#}", file.display(), e).red());
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{} of {} file(s) failed to convert", failed, files.len());
    }

    Ok(())
}

async fn convert_file(input: &Path, options: &ConvertOptions, multiple: bool) -> Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let source_dir = input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let config = ExamarkConfig::load(source_dir).merge(&options.overrides());
    let quiz = parse_with_config(&content, &config);

    if options.preview {
        println!("{}", serde_json::to_string_pretty(&quiz)?);
        return Ok(());
    }

    if quiz.questions.is_empty() {
        bail!("No questions found. Ensure headers start with ## and follow the correct format.");
    }

    for issue in lint::lint_quiz(&quiz) {
        let line = issue.format();
        match issue.severity {
            Severity::Error => eprintln!("{}", line.red()),
            Severity::Warning => eprintln!("{}", line.yellow()),
        }
    }

    let output = output_path(input, options.output.as_deref(), config.output_dir.as_deref(), multiple);

    let scratch;
    let package_dir = if options.keep_dir {
        let dir = package_dir_for(&output);
        if dir.exists() {
            std::fs::remove_dir_all(&dir)
                .with_context(|| format!("Failed to clear {}", dir.display()))?;
        }
        dir
    } else {
        scratch = tempfile::Builder::new().prefix("examark-").tempdir()?;
        scratch.path().to_path_buf()
    };

    let summary = write_package_dir(&quiz, source_dir, &package_dir)?;
    let zip = zip_package(&package_dir, &output).await?;

    println!(
        "{}",
        format!(
            "✓ {} → {} ({} questions)",
            input.display(),
            zip.display(),
            summary.item_count
        )
        .green()
    );
    for missing in &summary.missing_images {
        println!("{}", format!("  ⚠ Image not found: {}", missing).yellow());
    }
    if options.keep_dir {
        println!("  Package directory: {}", package_dir.display());
    }

    if config.validate.unwrap_or(false) {
        let report = validate_package(&zip).await;
        super::verify::print_report(&report);
        if !report.is_valid {
            bail!("Generated package failed validation");
        }
    }

    Ok(())
}

/// Parse with config defaults applied
pub fn parse_with_config(content: &str, config: &ExamarkConfig) -> ParsedQuiz {
    let mut parser = MarkdownParser::new();
    if let Some(points) = config.default_points {
        parser = parser.with_default_points(points);
    }

    let mut quiz = parser.parse(content);
    if let Some(title) = &config.title {
        quiz.title = title.clone();
    }
    quiz
}

/// Where the zip for `input` goes
///
/// An explicit `-o` wins; with several inputs it names a directory. Otherwise
/// the configured output directory, falling back to the input's directory.
pub fn output_path(input: &Path, explicit: Option<&Path>, output_dir: Option<&Path>, multiple: bool) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "quiz".to_string());
    let file_name = format!("{}.qti.zip", stem);

    match (explicit, output_dir) {
        (Some(path), _) if multiple => path.join(file_name),
        (Some(path), _) => path.to_path_buf(),
        (None, Some(dir)) => dir.join(file_name),
        (None, None) => input.with_file_name(file_name),
    }
}

/// Directory kept by `--keep-dir` for a given zip path
fn package_dir_for(zip: &Path) -> PathBuf {
    let name = zip
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = name
        .strip_suffix(".qti.zip")
        .or_else(|| name.strip_suffix(".zip"))
        .unwrap_or(&name);
    zip.with_file_name(format!("{}_qti", base))
}
