//! QTI 2.1 package generation

pub mod package;
pub mod qti21;

pub use package::{write_package_dir, zip_package, PackageSummary};
pub use qti21::{generate_item, generate_manifest, generate_test};
