//! Installation identification and hashing.
//!
//! Ledgers are stored in a directory named after a short SHA256 hash of the
//! installation id, so arbitrary ids map to safe, fixed-length names.

use sha2::{Digest, Sha256};
use std::fmt;

/// Identifier of a managed installation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstallationId {
    id: String,
    /// 16 hex chars (8 bytes of SHA256 of `id`).
    hash: String,
}

impl InstallationId {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let hash = Self::compute_hash(&id);
        Self { id, hash }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    fn compute_hash(id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(id.as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..8])
    }
}

impl fmt::Display for InstallationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_sixteen_hex_chars() {
        let id = InstallationId::new("cave-1234");
        assert_eq!(id.hash().len(), 16);
        assert!(id.hash().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn same_id_same_hash() {
        assert_eq!(
            InstallationId::new("cave-1234").hash(),
            InstallationId::new("cave-1234").hash()
        );
    }

    #[test]
    fn different_ids_different_hash() {
        assert_ne!(
            InstallationId::new("cave-1234").hash(),
            InstallationId::new("cave-1235").hash()
        );
    }

    #[test]
    fn display_is_raw_id() {
        assert_eq!(InstallationId::new("C:\\Games\\Foo").to_string(), "C:\\Games\\Foo");
    }
}
