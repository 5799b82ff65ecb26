pub mod convert;
pub mod emulate;
pub mod lint;
pub mod verify;

use anyhow::{bail, Context};
use std::path::PathBuf;

use crate::Result;

/// Expand file arguments that may be glob patterns
///
/// Literal paths are kept as given; a pattern that matches nothing is an error.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            files.push(PathBuf::from(pattern));
            continue;
        }

        let mut matched = false;
        for entry in glob::glob(pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))? {
            let path = entry.with_context(|| format!("Failed to read match for {}", pattern))?;
            if path.is_file() && !files.contains(&path) {
                files.push(path);
                matched = true;
            }
        }
        if !matched {
            bail!("No files match: {}", pattern);
        }
    }

    if files.is_empty() {
        bail!("No input files given");
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_expand_inputs_globs_and_literals() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.md"), "").unwrap();
        std::fs::write(dir.path().join("b.md"), "").unwrap();
        std::fs::write(dir.path().join("c.txt"), "").unwrap();

        let pattern = format!("{}/*.md", dir.path().display());
        let literal = dir.path().join("c.txt").display().to_string();
        let files = expand_inputs(&[pattern, literal]).unwrap();

        assert_eq!(files.len(), 3);
        assert!(files[0].ends_with("a.md"));
        assert!(files[1].ends_with("b.md"));
        assert!(files[2].ends_with("c.txt"));
    }

    #[test]
    fn test_expand_inputs_unmatched_pattern() {
        let dir = TempDir::new().unwrap();
        let pattern = format!("{}/*.md", dir.path().display());
        assert!(expand_inputs(&[pattern]).is_err());
    }
}
