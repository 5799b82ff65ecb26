// Examark - Markdown exams to Canvas QTI packages
// Parses the exam Markdown dialect, generates QTI 2.1 packages, and predicts Canvas imports

/// Declare `fn $name() -> &'static Regex` compiled once on first use
macro_rules! regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static regex::Regex {
            static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            RE.get_or_init(|| regex::Regex::new($pattern).expect("valid regex literal"))
        }
    };
}

pub mod cli;
pub mod generator;
pub mod models;
pub mod parser;
pub mod validator;

pub use anyhow::{Context, Result};
pub use colored::Colorize;

// Re-export commonly used types
pub use models::{DiagnosticReport, ExamarkConfig, ParsedQuiz, Question, QuestionType};
pub use parser::{parse_markdown, MarkdownParser};
pub use validator::{validate_package, PackageError};
