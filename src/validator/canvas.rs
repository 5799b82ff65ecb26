//! Canvas import emulation
//!
//! Reads a `DiagnosticReport` and predicts how Canvas will treat the package,
//! pairing each finding with a suggested fix where one is known.

use serde::Serialize;

use crate::models::DiagnosticReport;

/// Known validator phrasings and the fix to suggest for each
const FIXES: &[(&str, &str)] = &[
    (
        "No correct answer",
        "Mark the correct option with **bold**, [x], or a leading *.",
    ),
    (
        "Unsupported Canvas interaction",
        "Rewrite the question as multiple choice, multiple answers, or essay.",
    ),
    (
        "Missing image file",
        "Place the image next to the Markdown file, or fix its path.",
    ),
    (
        "Potential malicious content",
        "Remove script, iframe, object, and embed tags from the question text.",
    ),
    (
        "Mismatch: Cardinality",
        "Use [MultiAns] for questions with several correct options.",
    ),
    (
        "Less than 2 answer options",
        "Give the question at least two options.",
    ),
    (
        "stem appears empty",
        "Add question text below the heading.",
    ),
    (
        "Duplicate identifier",
        "Renumber the questions so every id is unique.",
    ),
    (
        "not found",
        "Regenerate the package; a referenced file is missing.",
    ),
    (
        "Missing resource file",
        "Regenerate the package; a referenced file is missing.",
    ),
    (
        "responseProcessing",
        "Expect to grade this question manually in Canvas.",
    ),
    (
        "resprocessing",
        "Expect to grade this question manually in Canvas.",
    ),
    (
        "limited Canvas support",
        "Check the matching question after import; Canvas may reorder it.",
    ),
    (
        "relative path",
        "Embed the image or use an absolute URL.",
    ),
];

/// One report message with an optional suggested fix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub message: String,
    pub fix: Option<&'static str>,
}

impl Finding {
    fn classify(message: &str) -> Self {
        let fix = FIXES
            .iter()
            .find(|(needle, _)| message.contains(needle))
            .map(|(_, fix)| *fix);
        Self {
            message: message.to_string(),
            fix,
        }
    }
}

/// Predicted Canvas import outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasPrediction {
    pub will_import: bool,
    /// Problems that make the import fail or lose content
    pub blocking: Vec<Finding>,
    /// Problems Canvas tolerates
    pub advisories: Vec<Finding>,
}

/// Predict the Canvas import from a validator report
pub fn predict_canvas_import(report: &DiagnosticReport) -> CanvasPrediction {
    CanvasPrediction {
        will_import: report.errors.is_empty(),
        blocking: report.errors.iter().map(|e| Finding::classify(e)).collect(),
        advisories: report.warnings.iter().map(|w| Finding::classify(w)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_report_will_import() {
        let prediction = predict_canvas_import(&DiagnosticReport::new());
        assert!(prediction.will_import);
        assert!(prediction.blocking.is_empty());
    }

    #[test]
    fn test_errors_block_with_fixes() {
        let mut report = DiagnosticReport::new();
        report.error("Canvas import will fail: No correct answer defined in items/item_1.xml");
        report.error("Something nobody anticipated");
        report.warning("matchInteraction has limited Canvas support: items/item_2.xml");

        let prediction = predict_canvas_import(&report);
        assert!(!prediction.will_import);
        assert_eq!(prediction.blocking.len(), 2);
        assert!(prediction.blocking[0].fix.is_some_and(|f| f.contains("Mark the correct option")));
        assert_eq!(prediction.blocking[1].fix, None);
        assert!(prediction.advisories[0].fix.is_some());
    }

    #[test]
    fn test_security_errors_get_security_fix() {
        let mut report = DiagnosticReport::new();
        report.error("Security Error: Potential malicious content '<script' detected in item 'item_1' (items/item_1.xml)");
        let prediction = predict_canvas_import(&report);
        assert!(prediction.blocking[0].fix.is_some_and(|f| f.contains("script")));
    }
}
