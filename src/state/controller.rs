//! AppController - routes events to the owning controller
//!
//! Each event mutates the slice it belongs to; the few cross-slice effects
//! (a selection closes the search panel, reset clears everything, failures
//! land in the error banner) are spelled out here and nowhere else.

use crate::core::{SearchConfig, SearchController, SelectionSet, MAX_SELECTED};
use crate::error::{ApiError, ClientError};
use crate::services::{Completion, DiagnosticOrchestrator};
use crate::state::events::{ApiRequest, Event};
use crate::state::ui_state::UiState;
use crate::utils::timer::Scheduler;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    pub search: SearchConfig,
    pub max_selected: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            max_selected: MAX_SELECTED,
        }
    }
}

pub struct AppController<S: Scheduler> {
    state: UiState,
    scheduler: S,
    rng: StdRng,
}

impl<S: Scheduler> AppController<S> {
    pub fn new(settings: ControllerSettings, scheduler: S) -> Self {
        Self {
            state: UiState {
                search: SearchController::new(settings.search),
                selection: SelectionSet::new(settings.max_selected),
                diagnostic: DiagnosticOrchestrator::new(),
                ..Default::default()
            },
            scheduler,
            rng: StdRng::from_entropy(),
        }
    }

    /// Fixed seed for reproducible suggestion pools
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn into_state(self) -> UiState {
        self.state
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Apply one event. Returns the requests the runtime must send, or the
    /// local rejection of a user intent (validation, submission in flight).
    /// Remote failures are not rejections: they land in the error banner.
    pub fn handle(&mut self, event: Event) -> Result<Vec<ApiRequest>, ClientError> {
        debug!(target: "controller", "Handling {}", event.name());

        match event {
            Event::LoadSymptoms => Ok(self.load_symptoms()),
            Event::SymptomsLoaded(outcome) => {
                self.symptoms_loaded(outcome);
                Ok(Vec::new())
            }
            Event::InputChanged(text) => {
                self.state
                    .search
                    .on_input(&text, &mut self.scheduler)
                    .map_err(|err| self.reject(err.into()))?;
                Ok(Vec::new())
            }
            Event::TimerFired(handle) => Ok(self
                .state
                .search
                .on_timer(handle)
                .map(ApiRequest::Search)
                .into_iter()
                .collect()),
            Event::SearchCompleted { seq, outcome } => {
                if let Err(err) = self.state.search.on_results(seq, outcome) {
                    self.record_failure(&err);
                }
                Ok(Vec::new())
            }
            Event::SelectFromSearch(id) => {
                self.select_from_search(&id)?;
                Ok(Vec::new())
            }
            Event::Toggle(id) => {
                self.toggle(&id);
                Ok(Vec::new())
            }
            Event::Diagnose => self.diagnose(),
            Event::DiagnosisCompleted { generation, outcome } => {
                match self.state.diagnostic.complete(generation, outcome) {
                    Completion::Applied => self.state.error = None,
                    Completion::Failed(err) => self.record_failure(&err),
                    Completion::Discarded => {}
                }
                Ok(Vec::new())
            }
            Event::Reset => {
                self.reset();
                Ok(Vec::new())
            }
            Event::CloseResult => {
                self.state.diagnostic.close_result();
                Ok(Vec::new())
            }
            Event::DismissError => {
                self.state.error = None;
                Ok(Vec::new())
            }
            Event::Shutdown => Ok(Vec::new()),
        }
    }

    fn load_symptoms(&mut self) -> Vec<ApiRequest> {
        if self.state.catalog.loading {
            debug!(target: "controller", "Catalogue already loading");
            return Vec::new();
        }
        self.state.catalog.loading = true;
        vec![ApiRequest::FetchSymptoms]
    }

    fn symptoms_loaded(&mut self, outcome: Result<Vec<crate::api::Symptom>, ApiError>) {
        self.state.catalog.loading = false;
        match outcome {
            Ok(symptoms) => {
                info!(target: "controller", "Loaded {} symptoms", symptoms.len());
                self.state
                    .search
                    .load_suggestions(&symptoms, &mut self.rng);
                self.state.catalog.symptoms = symptoms;
            }
            Err(err) => self.record_failure(&err),
        }
    }

    fn select_from_search(&mut self, id: &str) -> Result<(), ClientError> {
        if self.state.search.find(id).is_none() {
            // Picked from a list that has since been replaced
            warn!(target: "controller", "Ignoring pick of {}: not visible", id);
            return Ok(());
        }

        let outcome = self.state.selection.add(id);
        // Picking always closes the panel, even when the set is full
        self.state.search.close(&mut self.scheduler);

        match outcome {
            Ok(_) => {
                self.state.error = None;
                Ok(())
            }
            Err(err) => Err(self.reject(err.into())),
        }
    }

    fn toggle(&mut self, id: &str) {
        use crate::core::ToggleOutcome;

        if self.state.selection.toggle(id) != ToggleOutcome::Ignored {
            self.state.error = None;
        }
    }

    fn diagnose(&mut self) -> Result<Vec<ApiRequest>, ClientError> {
        match self.state.diagnostic.begin(&self.state.selection) {
            Ok(request) => {
                self.state.error = None;
                Ok(vec![ApiRequest::Diagnose(request)])
            }
            // The banner keeps whatever it showed; the button is disabled anyway
            Err(ClientError::SubmissionInFlight) => Err(ClientError::SubmissionInFlight),
            Err(err) => Err(self.reject(err)),
        }
    }

    fn reset(&mut self) {
        info!(target: "controller", "Reset");
        self.state.selection.clear();
        self.state.search.close(&mut self.scheduler);
        self.state.diagnostic.reset();
        self.state.error = None;
    }

    /// Show a local rejection in the banner and hand it back
    fn reject(&mut self, err: ClientError) -> ClientError {
        debug!(target: "controller", "Rejected: {}", err);
        self.state.error = Some(err.to_string());
        err
    }

    fn record_failure(&mut self, err: &ApiError) {
        warn!(target: "controller", "Request failed: {}", err);
        self.state.error = Some(err.to_string());
    }
}
