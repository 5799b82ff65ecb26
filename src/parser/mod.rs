pub mod blanks;
pub mod frontmatter;
pub mod images;
pub mod markdown;
pub mod markers;
pub mod options;

pub use blanks::{parse_blank_definitions, parse_match_pairs};
pub use frontmatter::{normalize_content, parse_exam_document, ExamDocument, QuizFrontmatter};
pub use images::extract_images;
pub use markdown::{parse_markdown, MarkdownParser};
pub use markers::{extract_points, extract_type_marker, infer_question_type, TypeMarker};
pub use options::{parse_options, parse_options_with_feedback, ParsedOptions};
