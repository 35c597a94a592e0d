//! Fetch, verify and extract prerequisite archives.
//!
//! Each pending prerequisite gets its own subdirectory of the pass's
//! [`ScratchWorkspace`]. Its archive is downloaded there, checked against the
//! catalog's `SHA256SUMS`, and extracted in place. Nothing from an archive
//! that fails verification is ever extracted or run.

pub mod extract;
pub mod workspace;

pub use extract::{Extractor, SevenZipExtractor};
pub use workspace::ScratchWorkspace;

use std::fs;
use std::path::PathBuf;
use std::thread;

use crate::catalog::{sha256_file, verify_file, CatalogClient, CHECKSUM_MANIFEST};
use crate::error::{PrereqError, Result};
use crate::requirements::AssessmentResult;
use crate::ui::{Reporter, StatusEvent};

/// Prepares pending prerequisites for installation.
#[derive(Clone, Copy)]
pub struct Stager<'a> {
    catalog: &'a CatalogClient,
    extractor: &'a dyn Extractor,
    reporter: &'a dyn Reporter,
}

impl<'a> Stager<'a> {
    pub fn new(
        catalog: &'a CatalogClient,
        extractor: &'a dyn Extractor,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            catalog,
            extractor,
            reporter,
        }
    }

    /// Download, verify and extract one prerequisite.
    ///
    /// Returns the directory holding the extracted installer.
    ///
    /// # Errors
    ///
    /// - `Remote` if the archive or checksums cannot be downloaded
    /// - `Integrity` if the archive has no recorded digest or does not match it
    /// - `Extraction` if the archive cannot be unpacked
    pub fn stage(
        &self,
        assessment: &AssessmentResult,
        workspace: &ScratchWorkspace,
    ) -> Result<PathBuf> {
        let name = assessment.name();
        let descriptor = &assessment.descriptor;
        let dir = workspace.subdir(name)?;

        self.reporter.status(&StatusEvent::Installing {
            name: descriptor.full_name.clone(),
            version: descriptor.version.clone(),
        });

        let archive_name = CatalogClient::archive_name(name);
        let archive = dir.join(&archive_name);
        let bytes = self
            .catalog
            .download(&self.catalog.archive_url(name), &archive)?;
        tracing::debug!("Downloaded {} ({} bytes)", archive_name, bytes);

        let checksums = self.catalog.fetch_checksums(name)?;
        let Some(expected) = checksums.get(&archive_name) else {
            let actual = sha256_file(&archive)?;
            remove_archive(&archive);
            return Err(PrereqError::Integrity {
                file: archive,
                expected: format!("an entry in {}", CHECKSUM_MANIFEST),
                actual,
            });
        };

        if let Err(e) = verify_file(&archive, expected) {
            remove_archive(&archive);
            return Err(e);
        }
        tracing::debug!("{} matches its recorded SHA-256", archive_name);

        self.extractor.extract(&archive, &dir)?;
        tracing::info!("Extracted {} into {}", archive_name, dir.display());

        Ok(dir)
    }

    /// Stage every assessment concurrently.
    ///
    /// Results come back in input order; the first failure in input order is
    /// returned after all workers finished.
    pub fn stage_all(
        &self,
        assessments: &[AssessmentResult],
        workspace: &ScratchWorkspace,
    ) -> Result<Vec<PathBuf>> {
        thread::scope(|scope| {
            let handles: Vec<_> = assessments
                .iter()
                .map(|assessment| scope.spawn(move || self.stage(assessment, workspace)))
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        Err(PrereqError::Other(anyhow::anyhow!("staging thread panicked")))
                    })
                })
                .collect()
        })
    }
}

fn remove_archive(archive: &std::path::Path) {
    if let Err(e) = fs::remove_file(archive) {
        tracing::warn!("Could not delete {}: {}", archive.display(), e);
    }
}
