use anyhow::bail;
use colored::Colorize;
use std::path::Path;

use crate::validator::{predict_canvas_import, validate_package, Finding};
use crate::Result;

pub async fn run(path: &Path, json: bool) -> Result<()> {
    let report = validate_package(path).await;
    let prediction = predict_canvas_import(&report);

    if json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
    } else {
        println!("{}", format!("🎓 Emulating Canvas import of {}", path.display()).cyan());

        if prediction.will_import {
            println!("\n{}", "✅ Canvas should import this package".green().bold());
        } else {
            println!("\n{}", "❌ Canvas import will fail".red().bold());
        }

        if !prediction.blocking.is_empty() {
            println!("\n{}", "Blocking:".red().bold());
            for finding in &prediction.blocking {
                print_finding("✗".red().to_string(), finding);
            }
        }

        if !prediction.advisories.is_empty() {
            println!("\n{}", "Advisories:".yellow().bold());
            for finding in &prediction.advisories {
                print_finding("⚠".yellow().to_string(), finding);
            }
        }
    }

    if !prediction.will_import {
        bail!("Canvas would reject {}", path.display());
    }

    Ok(())
}

fn print_finding(icon: String, finding: &Finding) {
    println!("   {} {}", icon, finding.message);
    if let Some(fix) = finding.fix {
        println!("     {} {}", "→".bright_black(), fix.bright_black());
    }
}
