//! Dependency assessment.
//!
//! The `Assessor` fetches a fresh descriptor for each requested prerequisite
//! and asks the prober whether the host already has it.

use crate::catalog::CatalogClient;
use crate::error::{PrereqError, Result};
use crate::manifest::PrerequisiteRequest;
use crate::requirements::probe::{probe, HostProbe};
use crate::requirements::status::AssessmentResult;
use std::thread;

/// Classifies requested prerequisites as present or missing.
#[derive(Clone, Copy)]
pub struct Assessor<'a> {
    catalog: &'a CatalogClient,
    host: &'a dyn HostProbe,
}

impl<'a> Assessor<'a> {
    pub fn new(catalog: &'a CatalogClient, host: &'a dyn HostProbe) -> Self {
        Self { catalog, host }
    }

    /// Assess a single prerequisite.
    ///
    /// # Errors
    ///
    /// Returns `Remote` if the descriptor cannot be fetched; a missing catalog
    /// entry is never skipped silently.
    pub fn assess(&self, request: &PrerequisiteRequest) -> Result<AssessmentResult> {
        let descriptor = self.catalog.fetch_descriptor(&request.name)?;
        let already_satisfied = probe(&descriptor, self.host);

        tracing::debug!(
            "{} ({} {}) already satisfied: {}",
            request.name,
            descriptor.full_name,
            descriptor.version,
            already_satisfied
        );

        Ok(AssessmentResult {
            request: request.clone(),
            descriptor,
            already_satisfied,
        })
    }

    /// Assess all requests concurrently.
    ///
    /// Results come back in request order. If any assessment fails, the first
    /// failure in request order is returned.
    pub fn assess_all(&self, requests: &[PrerequisiteRequest]) -> Result<Vec<AssessmentResult>> {
        thread::scope(|scope| {
            let handles: Vec<_> = requests
                .iter()
                .map(|request| scope.spawn(move || self.assess(request)))
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        Err(PrereqError::Other(anyhow::anyhow!(
                            "assessment thread panicked"
                        )))
                    })
                })
                .collect()
        })
    }
}
