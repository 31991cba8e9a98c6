//! Output-file expectations checked after a scheduled task finishes.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{Result, SchedulerError};

/// At least one file with `extension` must exist directly inside `dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactExpectation {
    dir: PathBuf,
    extension: String,
}

impl ArtifactExpectation {
    pub fn new(dir: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }

    /// Matching files, sorted. A missing directory yields no files.
    pub fn find(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut found = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && self.matches(&path) {
                found.push(path);
            }
        }
        found.sort();
        debug!(
            dir = %self.dir.display(),
            extension = %self.extension,
            count = found.len(),
            "Scanned for artifacts"
        );
        Ok(found)
    }

    pub fn verify(&self) -> Result<Vec<PathBuf>> {
        let found = self.find()?;
        if found.is_empty() {
            return Err(SchedulerError::MissingArtifact {
                dir: self.dir.clone(),
                extension: self.extension.clone(),
            });
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extension_compare_ignores_case() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("session.XLAYER"), b"model").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let found = ArtifactExpectation::new(dir.path(), ".xlayer").verify().unwrap();
        assert_eq!(found, vec![dir.path().join("session.XLAYER")]);
    }

    #[test]
    fn test_missing_artifact_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let err = ArtifactExpectation::new(dir.path(), "xlayer")
            .verify()
            .unwrap_err();
        assert!(matches!(
            err,
            SchedulerError::MissingArtifact { ref extension, .. } if extension == "xlayer"
        ));
    }

    #[test]
    fn test_missing_directory_finds_nothing() {
        let dir = TempDir::new().unwrap();
        let expectation = ArtifactExpectation::new(dir.path().join("absent"), "xlayer");
        assert!(expectation.find().unwrap().is_empty());
        assert!(expectation.verify().is_err());
    }

    #[test]
    fn test_subdirectories_are_not_artifacts() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested.xlayer")).unwrap();
        let expectation = ArtifactExpectation::new(dir.path(), "xlayer");
        assert!(expectation.find().unwrap().is_empty());
    }
}
