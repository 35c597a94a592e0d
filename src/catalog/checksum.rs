//! SHA-256 checksum manifests and file verification.

use crate::error::{PrereqError, Result};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// File name of the checksum manifest published next to each archive.
pub const CHECKSUM_MANIFEST: &str = "SHA256SUMS";

/// Mapping of file name to expected SHA-256 digest (lowercase hex).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumManifest {
    entries: HashMap<String, String>,
}

impl ChecksumManifest {
    /// Parse `sha256sum`-style output: `<digest> <file>` per line.
    ///
    /// A `*` before the file name (binary mode marker) is ignored, as are
    /// blank lines and `#` comments. Malformed lines are skipped.
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((digest, file)) = line.split_once(char::is_whitespace) else {
                tracing::debug!("Skipping malformed checksum line: {}", line);
                continue;
            };

            let file = file.trim_start().trim_start_matches('*');
            if file.is_empty() {
                continue;
            }

            entries.insert(file.to_string(), digest.to_ascii_lowercase());
        }

        Self { entries }
    }

    /// Expected digest for `file`.
    pub fn get(&self, file: &str) -> Option<&str> {
        self.entries.get(file).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compute the SHA-256 digest of a file as lowercase hex.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Check that `path` hashes to `expected`.
///
/// # Errors
///
/// Returns `Integrity` on mismatch.
pub fn verify_file(path: &Path, expected: &str) -> Result<()> {
    let actual = sha256_file(path)?;
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(PrereqError::Integrity {
            file: path.to_path_buf(),
            expected: expected.trim().to_ascii_lowercase(),
            actual,
        })
    }
}
