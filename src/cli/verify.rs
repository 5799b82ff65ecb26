use anyhow::bail;
use colored::Colorize;
use std::path::Path;

use crate::models::DiagnosticReport;
use crate::validator::validate_package;
use crate::Result;

pub async fn run(path: &Path, json: bool) -> Result<()> {
    if !json {
        println!("{}", format!("🔍 Verifying {}...", path.display()).cyan());
    }

    let report = validate_package(path).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if !report.is_valid {
        bail!("Package has {} error(s)", report.errors.len());
    }

    Ok(())
}

/// Human readable validation summary
pub fn print_report(report: &DiagnosticReport) {
    if report.is_valid {
        println!("\n{}", "✅ Package is valid".green().bold());
    } else {
        println!("\n{}", "❌ Package is invalid".red().bold());
    }

    let details = &report.details;
    println!("   Manifest:  {}", if details.manifest_found { "found" } else { "missing" });
    println!("   Resources: {}", details.resource_count);
    println!("   Items:     {}", details.item_count);
    println!("   Test:      {}", if details.test_found { "found" } else { "missing" });

    if !report.errors.is_empty() {
        println!("\n{}", "Errors:".red().bold());
        for error in &report.errors {
            println!("   {} {}", "✗".red(), error);
        }
    }

    if !report.warnings.is_empty() {
        println!("\n{}", "Warnings:".yellow().bold());
        for warning in &report.warnings {
            println!("   {} {}", "⚠".yellow(), warning);
        }
    }
}
