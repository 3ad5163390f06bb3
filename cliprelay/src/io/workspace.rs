//! Plain UTF-8 file access inside the working copy.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::action::WorkingFile;

/// Root of the local working copy; all action filenames resolve against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingCopy {
    root: PathBuf,
}

impl WorkingCopy {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_of(&self, file: &WorkingFile) -> PathBuf {
        self.root.join(file.to_path_buf())
    }

    /// Read a file as UTF-8. Returns `Ok(None)` when the file does not exist.
    pub fn read_text(&self, file: &WorkingFile) -> Result<Option<String>> {
        let path = self.path_of(file);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "file not found");
                Ok(None)
            }
            Err(err) => Err(err).with_context(|| format!("read {}", path.display())),
        }
    }

    /// Overwrite a file with `contents`, creating parent directories as needed.
    pub fn write_text(&self, file: &WorkingFile, contents: &str) -> Result<()> {
        let path = self.path_of(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> WorkingFile {
        WorkingFile::parse(name).expect("file")
    }

    #[test]
    fn missing_file_reads_as_none() {
        let temp = tempfile::tempdir().expect("tempdir");
        let copy = WorkingCopy::new(temp.path());
        assert_eq!(copy.read_text(&file("absent.md")).expect("read"), None);
    }

    #[test]
    fn write_creates_parents_and_overwrites() {
        let temp = tempfile::tempdir().expect("tempdir");
        let copy = WorkingCopy::new(temp.path());
        let target = file("out/response.md");

        copy.write_text(&target, "first").expect("write");
        copy.write_text(&target, "second").expect("overwrite");
        assert_eq!(
            copy.read_text(&target).expect("read").as_deref(),
            Some("second")
        );
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("bin.dat"), [0xff, 0xfe, 0x00]).expect("write");
        let copy = WorkingCopy::new(temp.path());
        assert!(copy.read_text(&file("bin.dat")).is_err());
    }
}
