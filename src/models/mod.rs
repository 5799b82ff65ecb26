pub mod config;
pub mod lint;
pub mod question;
pub mod report;

pub use config::{ConfigError, ExamarkConfig};
pub use lint::{has_errors, LintIssue, Severity};
pub use question::{
    slugify, AnswerOption, BlankAnswer, MatchPair, ParsedQuiz, Question, QuestionType, Section,
};
pub use report::{DiagnosticReport, ReportDetails};
