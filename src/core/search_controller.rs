//! SearchController - turns keystrokes into debounced remote searches
//!
//! At most one debounce timer is live at a time. Every dispatched search
//! carries a sequence number and only the response to the latest issued
//! sequence may replace the visible results. The suggestion pool is drawn
//! once per catalogue load and is independent from searching.

use crate::api::Symptom;
use crate::error::{ApiError, ValidationError};
use crate::utils::debouncer::Debouncer;
use crate::utils::timer::{Scheduler, TimerHandle};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

/// Configuration for search behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Quiet period before a search is sent
    pub debounce_ms: u64,
    /// Minimum trimmed length, in characters, worth a search
    pub min_query_chars: usize,
    /// The service rejects longer texts
    pub max_query_chars: usize,
    /// Size of the random suggestion pool
    pub suggestion_count: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_query_chars: 3,
            max_query_chars: 200,
            suggestion_count: 6,
        }
    }
}

/// What the controller did with a new input text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Debounce timer (re)armed
    Scheduled,
    /// Too short: timer disarmed, visible results cleared
    BelowThreshold,
}

/// A search the runtime must send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDispatch {
    pub seq: u64,
    pub text: String,
}

#[derive(Debug)]
pub struct SearchController {
    config: SearchConfig,
    text: String,
    debouncer: Debouncer,
    /// Latest issued (or invalidated) sequence number
    latest_seq: u64,
    /// Sequence of the response we are still waiting for
    in_flight: Option<u64>,
    results: Vec<Symptom>,
    suggestions: Vec<Symptom>,
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl SearchController {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            debouncer: Debouncer::new(config.debounce_ms),
            config,
            text: String::new(),
            latest_seq: 0,
            in_flight: None,
            results: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn results(&self) -> &[Symptom] {
        &self.results
    }

    pub fn suggestions(&self) -> &[Symptom] {
        &self.suggestions
    }

    /// A search request is on the wire and still relevant
    pub fn is_searching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// A debounce timer is armed
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Find a symptom among the visible results or the suggestions
    pub fn find(&self, id: &str) -> Option<&Symptom> {
        self.results
            .iter()
            .chain(self.suggestions.iter())
            .find(|symptom| symptom.id == id)
    }

    /// Record the text as typed and (re)arm or disarm the debounce timer
    pub fn on_input(
        &mut self,
        text: &str,
        scheduler: &mut dyn Scheduler,
    ) -> Result<InputOutcome, ValidationError> {
        self.text = text.to_string();
        let length = text.trim().chars().count();

        if length < self.config.min_query_chars {
            self.debouncer.reset(scheduler);
            self.clear_results();
            return Ok(InputOutcome::BelowThreshold);
        }

        if length > self.config.max_query_chars {
            self.debouncer.reset(scheduler);
            self.clear_results();
            return Err(ValidationError::QueryTooLong {
                max: self.config.max_query_chars,
            });
        }

        self.debouncer.trigger(scheduler);
        Ok(InputOutcome::Scheduled)
    }

    /// A timer fired. Only the live debounce timer produces a dispatch.
    pub fn on_timer(&mut self, fired: TimerHandle) -> Option<SearchDispatch> {
        if !self.debouncer.should_execute(fired) {
            debug!(target: "search", "Ignoring cancelled timer {}", fired.id());
            return None;
        }

        self.latest_seq += 1;
        self.in_flight = Some(self.latest_seq);
        info!(target: "search", "Dispatching search #{} for {:?}", self.latest_seq, self.text);

        Some(SearchDispatch {
            seq: self.latest_seq,
            text: self.text.clone(),
        })
    }

    /// Apply a search response. Returns `Ok(false)` when the response was
    /// stale and dropped, and hands back the error of a relevant failure.
    pub fn on_results(
        &mut self,
        seq: u64,
        outcome: Result<Vec<Symptom>, ApiError>,
    ) -> Result<bool, ApiError> {
        if self.in_flight == Some(seq) {
            self.in_flight = None;
        }
        if seq != self.latest_seq {
            debug!(
                target: "search",
                "Dropping stale response #{} (latest #{})",
                seq,
                self.latest_seq
            );
            return Ok(false);
        }

        let results = outcome?;
        debug!(target: "search", "Search #{} returned {} results", seq, results.len());
        self.results = results;
        Ok(true)
    }

    /// Hide the visible results and invalidate any response still on the wire
    pub fn clear_results(&mut self) {
        self.results.clear();
        self.latest_seq += 1;
        self.in_flight = None;
    }

    /// Close the search panel entirely: empty input, no timer, no results
    pub fn close(&mut self, scheduler: &mut dyn Scheduler) {
        self.text.clear();
        self.debouncer.reset(scheduler);
        self.clear_results();
    }

    /// Draw a fresh suggestion pool from the catalogue, without replacement
    pub fn load_suggestions<R: Rng + ?Sized>(&mut self, catalog: &[Symptom], rng: &mut R) {
        self.suggestions = catalog
            .choose_multiple(rng, self.config.suggestion_count)
            .cloned()
            .collect();
        debug!(
            target: "search",
            "Drew {} suggestions from {} symptoms",
            self.suggestions.len(),
            catalog.len()
        );
    }
}
