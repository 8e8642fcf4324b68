//! File helpers used to persist reports.

use std::fs;
use std::path::Path;

use crate::error::HarnessResult;

/// Write `content` to `path`, creating parent directories as needed.
///
/// An existing file at `path` is overwritten.
pub fn create_text_file(path: impl AsRef<Path>, content: &str) -> HarnessResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, content)?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "Wrote text file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("report.csv");

        create_text_file(&path, "header\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "header\n");
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.csv");

        create_text_file(&path, "first content").unwrap();
        create_text_file(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }
}
