//! HTTP access to the redistributables catalog.
//!
//! Layout of the catalog, per prerequisite `<name>`:
//!
//! - `<base>/<name>/info.json`: the descriptor
//! - `<base>/<name>/<name>.7z`: the installer archive
//! - `<base>/<name>/SHA256SUMS`: digests of the files in that directory

use crate::catalog::checksum::{ChecksumManifest, CHECKSUM_MANIFEST};
use crate::catalog::descriptor::PrerequisiteDescriptor;
use crate::error::{PrereqError, Result};
use crate::manifest::PrerequisiteRequest;
use chrono::Utc;
use reqwest::blocking::Client;
use std::fs::File;
use std::path::Path;
use std::time::Duration;

/// Fetches descriptors, checksums and archives from the catalog.
///
/// # Example
///
/// ```no_run
/// use prereqs::catalog::CatalogClient;
/// use std::time::Duration;
///
/// let catalog = CatalogClient::new("https://dl.itch.ovh/itch-redists", Duration::from_secs(30)).unwrap();
/// let descriptor = catalog.fetch_descriptor("vcredist-2010-x86").unwrap();
/// println!("{} {}", descriptor.full_name, descriptor.version);
/// ```
#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: String,
    client: Client,
}

impl CatalogClient {
    /// Create a client for the catalog rooted at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("prereqs/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| PrereqError::remote(base_url, e))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Directory URL holding everything about one prerequisite.
    pub fn prerequisite_url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    pub fn descriptor_url(&self, name: &str) -> String {
        format!("{}/info.json", self.prerequisite_url(name))
    }

    /// File name of a prerequisite's archive.
    pub fn archive_name(name: &str) -> String {
        format!("{}.7z", name)
    }

    pub fn archive_url(&self, name: &str) -> String {
        format!("{}/{}", self.prerequisite_url(name), Self::archive_name(name))
    }

    pub fn checksums_url(&self, name: &str) -> String {
        format!("{}/{}", self.prerequisite_url(name), CHECKSUM_MANIFEST)
    }

    /// Fetch the descriptor for `name`.
    ///
    /// Every call carries a fresh `t` query parameter so intermediate caches
    /// never serve a stale descriptor.
    ///
    /// # Errors
    ///
    /// Returns `Remote` on transport failure, non-success status, or a payload
    /// that does not validate.
    pub fn fetch_descriptor(&self, name: &str) -> Result<PrerequisiteDescriptor> {
        self.check_name(name)?;
        let url = self.descriptor_url(name);
        let busted = format!("{}?t={}", url, Utc::now().timestamp_millis());
        tracing::debug!("Retrieving {}", busted);

        let body = self.get_text(&busted, &url)?;
        PrerequisiteDescriptor::from_json(&body)
            .map_err(|e| PrereqError::remote(&url, format!("invalid descriptor: {}", e)))
    }

    fn check_name(&self, name: &str) -> Result<()> {
        if PrerequisiteRequest::is_valid_name(name) {
            Ok(())
        } else {
            Err(PrereqError::remote(
                &self.base_url,
                format!("invalid prerequisite name '{}'", name),
            ))
        }
    }

    /// Fetch the checksum manifest for `name`'s catalog directory.
    pub fn fetch_checksums(&self, name: &str) -> Result<ChecksumManifest> {
        self.check_name(name)?;
        let url = self.checksums_url(name);
        tracing::debug!("Retrieving {}", url);
        let body = self.get_text(&url, &url)?;
        Ok(ChecksumManifest::parse(&body))
    }

    /// Stream `url` into a new file at `dest`, returning the byte count.
    pub fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        tracing::debug!("Downloading {} to {}", url, dest.display());

        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| PrereqError::remote(url, e))?;

        if !response.status().is_success() {
            return Err(PrereqError::remote(
                url,
                format!("server replied with HTTP {}", response.status()),
            ));
        }

        let mut file = File::create(dest)?;
        let written = response
            .copy_to(&mut file)
            .map_err(|e| PrereqError::remote(url, e))?;
        file.sync_all()?;

        Ok(written)
    }

    fn get_text(&self, request_url: &str, reported_url: &str) -> Result<String> {
        let response = self
            .client
            .get(request_url)
            .send()
            .map_err(|e| PrereqError::remote(reported_url, e))?;

        if !response.status().is_success() {
            return Err(PrereqError::remote(
                reported_url,
                format!("server replied with HTTP {}", response.status()),
            ));
        }

        response
            .text()
            .map_err(|e| PrereqError::remote(reported_url, e))
    }
}
