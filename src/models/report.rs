use serde::{Deserialize, Serialize};

/// Counters describing what the validator found in a package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDetails {
    pub manifest_found: bool,
    pub resource_count: usize,
    pub item_count: usize,
    pub test_found: bool,
}

/// Outcome of validating one QTI package
///
/// `is_valid` always equals `errors.is_empty()` once the report leaves the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub details: ReportDetails,
}

impl Default for DiagnosticReport {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticReport {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            details: ReportDetails::default(),
        }
    }

    /// Report holding a single fatal error
    pub fn fatal(message: impl Into<String>) -> Self {
        let mut report = Self::new();
        report.error(message);
        report.finish()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.is_valid = false;
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn has_error_containing(&self, needle: &str) -> bool {
        self.errors.iter().any(|e| e.contains(needle))
    }

    pub fn has_warning_containing(&self, needle: &str) -> bool {
        self.warnings.iter().any(|w| w.contains(needle))
    }

    /// Recompute `is_valid` from the error list
    pub fn finish(mut self) -> Self {
        self.is_valid = self.errors.is_empty();
        self
    }
}
