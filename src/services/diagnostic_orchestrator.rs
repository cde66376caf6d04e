use crate::api::DiagnosticResult;
use crate::core::SelectionSet;
use crate::error::{ApiError, ClientError, ValidationError};
use tracing::{debug, info, warn};

/// Frozen selection sent to the service, tagged with the submission
/// generation it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRequest {
    pub generation: u64,
    pub symptom_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionPhase {
    Idle,
    Submitting(DiagnosticRequest),
    Succeeded,
    Failed(String),
}

/// What happened to a diagnose response
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Result stored and result surface opened
    Applied,
    /// The submission failed; earlier results are kept
    Failed(ApiError),
    /// Response belongs to a reset or superseded submission
    Discarded,
}

/// Sequences diagnose submissions: one in flight at most, responses
/// attributed by generation.
#[derive(Debug)]
pub struct DiagnosticOrchestrator {
    phase: SubmissionPhase,
    generation: u64,
    result: Option<DiagnosticResult>,
    result_open: bool,
}

impl Default for DiagnosticOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticOrchestrator {
    pub fn new() -> Self {
        Self {
            phase: SubmissionPhase::Idle,
            generation: 0,
            result: None,
            result_open: false,
        }
    }

    pub fn phase(&self) -> &SubmissionPhase {
        &self.phase
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, SubmissionPhase::Submitting(_))
    }

    pub fn in_flight(&self) -> Option<&DiagnosticRequest> {
        match &self.phase {
            SubmissionPhase::Submitting(request) => Some(request),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&DiagnosticResult> {
        self.result.as_ref()
    }

    pub fn is_result_open(&self) -> bool {
        self.result_open
    }

    /// Start a submission from the current selection.
    ///
    /// Rejected without side effects when the selection is empty or another
    /// submission is still in flight.
    pub fn begin(&mut self, selection: &SelectionSet) -> Result<DiagnosticRequest, ClientError> {
        if self.is_submitting() {
            warn!(target: "diagnostic", "Submission rejected: one is already in flight");
            return Err(ClientError::SubmissionInFlight);
        }
        if selection.is_empty() {
            return Err(ValidationError::EmptySelection.into());
        }

        self.generation += 1;
        let request = DiagnosticRequest {
            generation: self.generation,
            symptom_ids: selection.snapshot(),
        };
        info!(
            target: "diagnostic",
            "Submitting #{} with {:?}",
            request.generation,
            request.symptom_ids
        );
        self.phase = SubmissionPhase::Submitting(request.clone());
        Ok(request)
    }

    pub fn complete(
        &mut self,
        generation: u64,
        outcome: Result<DiagnosticResult, ApiError>,
    ) -> Completion {
        let current = self.in_flight().map(|request| request.generation);
        if current != Some(generation) {
            debug!(
                target: "diagnostic",
                "Discarding response #{} (in flight: {:?})",
                generation,
                current
            );
            return Completion::Discarded;
        }

        match outcome {
            Ok(result) => {
                info!(
                    target: "diagnostic",
                    "#{} diagnosed {:?} ({})",
                    generation,
                    result.diagnosis,
                    result.severity
                );
                self.result = Some(result);
                self.result_open = true;
                self.phase = SubmissionPhase::Succeeded;
                Completion::Applied
            }
            Err(err) => {
                warn!(target: "diagnostic", "#{} failed: {}", generation, err);
                self.phase = SubmissionPhase::Failed(err.to_string());
                Completion::Failed(err)
            }
        }
    }

    /// Close the result surface; the result itself stays available
    pub fn close_result(&mut self) {
        self.result_open = false;
    }

    /// Back to idle from any phase. A response still on the wire will be
    /// discarded when it arrives.
    pub fn reset(&mut self) {
        if self.is_submitting() {
            debug!(target: "diagnostic", "Reset while #{} in flight", self.generation);
        }
        self.generation += 1;
        self.phase = SubmissionPhase::Idle;
        self.result = None;
        self.result_open = false;
    }
}
