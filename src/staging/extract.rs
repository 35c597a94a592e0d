//! Archive extraction.

use std::path::Path;

use crate::error::{PrereqError, Result};
use crate::shell::{execute_quiet, Invocation};

/// Unpacks an archive into a directory.
pub trait Extractor: Send + Sync {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()>;
}

/// Extracts with the `7z` command line tool.
#[derive(Debug, Clone)]
pub struct SevenZipExtractor {
    program: String,
}

impl SevenZipExtractor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn invocation(&self, archive: &Path, dest: &Path) -> Invocation {
        Invocation::new(
            &self.program,
            [
                "x".to_string(),
                "-y".to_string(),
                format!("-o{}", dest.display()),
                archive.display().to_string(),
            ],
        )
    }
}

impl Default for SevenZipExtractor {
    fn default() -> Self {
        Self::new("7z")
    }
}

impl Extractor for SevenZipExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        let invocation = self.invocation(archive, dest);
        tracing::debug!("Extracting: {}", invocation.display());

        let result = execute_quiet(&invocation).map_err(|e| PrereqError::Extraction {
            archive: archive.to_path_buf(),
            message: e.to_string(),
        })?;

        if !result.success() {
            return Err(PrereqError::Extraction {
                archive: archive.to_path_buf(),
                message: match result.exit_code {
                    Some(code) => format!("{} exited with code {}", self.program, code),
                    None => format!("{} was terminated", self.program),
                },
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn invocation_extracts_into_destination() {
        let extractor = SevenZipExtractor::default();
        let invocation =
            extractor.invocation(&PathBuf::from("work/dx/dx.7z"), &PathBuf::from("work/dx"));

        assert_eq!(invocation.program, "7z");
        assert_eq!(invocation.args, vec!["x", "-y", "-owork/dx", "work/dx/dx.7z"]);
    }

    #[test]
    fn missing_tool_is_extraction_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let extractor = SevenZipExtractor::new("definitely-not-a-real-7z");

        let err = extractor
            .extract(&temp.path().join("a.7z"), temp.path())
            .unwrap_err();
        assert!(matches!(err, PrereqError::Extraction { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_is_extraction_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let extractor = SevenZipExtractor::new("false");

        let err = extractor
            .extract(&temp.path().join("a.7z"), temp.path())
            .unwrap_err();
        assert!(err.to_string().contains("exited with code 1"));
    }
}
