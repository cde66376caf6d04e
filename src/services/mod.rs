pub mod diagnostic_orchestrator;

pub use diagnostic_orchestrator::{
    Completion, DiagnosticOrchestrator, DiagnosticRequest, SubmissionPhase,
};
