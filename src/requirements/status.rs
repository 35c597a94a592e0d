//! Assessment results.

use crate::catalog::PrerequisiteDescriptor;
use crate::manifest::PrerequisiteRequest;

/// Outcome of assessing one requested prerequisite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentResult {
    pub request: PrerequisiteRequest,

    /// Descriptor fetched for this pass.
    pub descriptor: PrerequisiteDescriptor,

    /// Whether the host already has it; nothing further to do if so.
    pub already_satisfied: bool,
}

impl AssessmentResult {
    pub fn name(&self) -> &str {
        &self.request.name
    }
}

/// Split assessments into (already satisfied, still to install), keeping order.
pub fn partition(
    results: Vec<AssessmentResult>,
) -> (Vec<AssessmentResult>, Vec<AssessmentResult>) {
    results.into_iter().partition(|r| r.already_satisfied)
}
