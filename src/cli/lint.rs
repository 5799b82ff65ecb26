use anyhow::{bail, Context};
use colored::Colorize;

use crate::models::{has_errors, Severity};
use crate::validator::lint_markdown;
use crate::Result;

pub fn run(inputs: &[String]) -> Result<()> {
    let files = super::expand_inputs(inputs)?;
    let mut failing = 0;

    for file in &files {
        let content = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let issues = lint_markdown(&content);

        if issues.is_empty() {
            println!("{}", format!("✓ {}", file.display()).green());
            continue;
        }

        println!("{}", format!("{}:", file.display()).bold());
        for issue in &issues {
            let line = format!("   {}", issue.format());
            match issue.severity {
                Severity::Error => println!("{}", line.red()),
                Severity::Warning => println!("{}", line.yellow()),
            }
        }

        if has_errors(&issues) {
            failing += 1;
        }
    }

    if failing > 0 {
        bail!("{} file(s) have lint errors", failing);
    }

    Ok(())
}
