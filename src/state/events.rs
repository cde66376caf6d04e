//! Events consumed by the controller and requests it emits

use crate::api::{DiagnosticResult, Symptom};
use crate::core::SearchDispatch;
use crate::error::ApiError;
use crate::services::DiagnosticRequest;
use crate::utils::timer::TimerHandle;

/// Everything that can change the UI state: user intents first, then the
/// completions posted back by timers and network calls.
#[derive(Debug, Clone)]
pub enum Event {
    /// (Re)load the symptom catalogue
    LoadSymptoms,

    /// Search input text changed (text as typed)
    InputChanged(String),

    /// Pick a visible search result or suggestion by id
    SelectFromSearch(String),

    /// Toggle an id from the catalogue list
    Toggle(String),

    /// Ask for a diagnosis of the current selection
    Diagnose,

    /// Clear selection, search, result and error
    Reset,

    /// Close the result surface
    CloseResult,

    /// Hide the error banner
    DismissError,

    /// A scheduled timer elapsed
    TimerFired(TimerHandle),

    SymptomsLoaded(Result<Vec<Symptom>, ApiError>),

    SearchCompleted {
        seq: u64,
        outcome: Result<Vec<Symptom>, ApiError>,
    },

    DiagnosisCompleted {
        generation: u64,
        outcome: Result<DiagnosticResult, ApiError>,
    },

    /// Stop the runtime loop
    Shutdown,
}

impl Event {
    /// Short name for logs and event history
    pub fn name(&self) -> &'static str {
        match self {
            Event::LoadSymptoms => "LoadSymptoms",
            Event::InputChanged(_) => "InputChanged",
            Event::SelectFromSearch(_) => "SelectFromSearch",
            Event::Toggle(_) => "Toggle",
            Event::Diagnose => "Diagnose",
            Event::Reset => "Reset",
            Event::CloseResult => "CloseResult",
            Event::DismissError => "DismissError",
            Event::TimerFired(_) => "TimerFired",
            Event::SymptomsLoaded(_) => "SymptomsLoaded",
            Event::SearchCompleted { .. } => "SearchCompleted",
            Event::DiagnosisCompleted { .. } => "DiagnosisCompleted",
            Event::Shutdown => "Shutdown",
        }
    }

    /// Completions come from the runtime, not from the user
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            Event::TimerFired(_)
                | Event::SymptomsLoaded(_)
                | Event::SearchCompleted { .. }
                | Event::DiagnosisCompleted { .. }
        )
    }
}

/// Network work the runtime must perform on behalf of the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    FetchSymptoms,
    Search(SearchDispatch),
    Diagnose(DiagnosticRequest),
}
