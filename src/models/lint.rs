use serde::{Deserialize, Serialize};

/// Severity level for lint findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks conversion; the generated package would be wrong
    Error,
    /// Worth fixing, but the package still imports
    Warning,
}

impl Severity {
    /// Get display symbol for severity
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Error => "🔴",
            Severity::Warning => "🟡",
        }
    }

    /// Get display name for severity
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        }
    }
}

/// An authoring mistake found in a Markdown exam
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintIssue {
    /// Line number (1-indexed) of the question heading, if known
    pub line: Option<usize>,
    pub message: String,
    pub severity: Severity,
    /// Short description of the offending question
    pub context: Option<String>,
}

impl LintIssue {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            line: None,
            message: message.into(),
            severity,
            context: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Error)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Warning)
    }

    pub fn at(mut self, line: Option<usize>, context: impl Into<String>) -> Self {
        self.line = line;
        self.context = Some(context.into());
        self
    }

    /// Format issue for display
    pub fn format(&self) -> String {
        let location = match (self.line, &self.context) {
            (Some(line), Some(ctx)) => format!("line {} {} - ", line, ctx),
            (None, Some(ctx)) => format!("{} - ", ctx),
            (Some(line), None) => format!("line {} - ", line),
            (None, None) => String::new(),
        };
        format!(
            "{} [{}] {}{}",
            self.severity.symbol(),
            self.severity.name(),
            location,
            self.message
        )
    }
}

/// Whether any issue blocks conversion
pub fn has_errors(issues: &[LintIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}
