//! Event loop that owns the controller
//!
//! A single task consumes the event channel, so every state mutation happens
//! one event at a time. Network calls and timers run as separate tokio tasks
//! and post their completions back into the same channel.

use crate::api::SymptomApi;
use crate::error::ClientError;
use crate::state::controller::{AppController, ControllerSettings};
use crate::state::events::{ApiRequest, Event};
use crate::state::ui_state::UiState;
use crate::utils::timer::TokioScheduler;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Trait for components that observe state changes
pub trait StateSubscriber: Send {
    /// Called after an event has been applied
    fn on_state_event(&mut self, event: &Event, state: &UiState);

    /// Called when a user intent was rejected locally
    fn on_rejected(&mut self, _event: &Event, _error: &ClientError, _state: &UiState) {}

    /// Get subscriber name for debugging
    fn name(&self) -> &str;
}

/// Cloneable sender side used by the presentation layer
#[derive(Clone)]
pub struct RuntimeHandle {
    tx: UnboundedSender<Event>,
}

impl RuntimeHandle {
    /// Returns false once the runtime has stopped
    pub fn send(&self, event: Event) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(Event::Shutdown);
    }
}

pub struct Runtime {
    controller: AppController<TokioScheduler<Event>>,
    api: Arc<dyn SymptomApi>,
    tx: UnboundedSender<Event>,
    rx: UnboundedReceiver<Event>,
    subscribers: Vec<Box<dyn StateSubscriber>>,
    /// Event history for debugging
    event_history: VecDeque<&'static str>,
    max_history: usize,
}

impl Runtime {
    pub fn new(settings: ControllerSettings, api: Arc<dyn SymptomApi>) -> (Self, RuntimeHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = TokioScheduler::new(tx.clone(), Event::TimerFired);
        let runtime = Self {
            controller: AppController::new(settings, scheduler),
            api,
            tx: tx.clone(),
            rx,
            subscribers: Vec::new(),
            event_history: VecDeque::new(),
            max_history: 100,
        };
        (runtime, RuntimeHandle { tx })
    }

    /// Fixed seed for reproducible suggestion pools
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.controller = self.controller.with_seed(seed);
        self
    }

    /// Add a subscriber
    pub fn subscribe(&mut self, subscriber: Box<dyn StateSubscriber>) {
        info!(target: "runtime", "Adding subscriber: {}", subscriber.name());
        self.subscribers.push(subscriber);
    }

    /// Consume events until `Shutdown`, then hand back the final state.
    /// In-flight requests are abandoned at that point.
    pub async fn run(mut self) -> UiState {
        info!(target: "runtime", "Event loop started");

        while let Some(event) = self.rx.recv().await {
            if matches!(event, Event::Shutdown) {
                break;
            }
            self.dispatch(event);
        }

        info!(target: "runtime", "Event loop stopped");
        debug!(target: "runtime", "Last events: {:?}", self.event_history);
        self.controller.into_state()
    }

    fn dispatch(&mut self, event: Event) {
        if !event.is_completion() {
            debug!(target: "runtime", "User intent: {}", event.name());
        }
        self.event_history.push_back(event.name());
        if self.event_history.len() > self.max_history {
            self.event_history.pop_front();
        }

        match self.controller.handle(event.clone()) {
            Ok(requests) => {
                for request in requests {
                    self.execute(request);
                }
                let state = self.controller.state();
                for subscriber in &mut self.subscribers {
                    debug!(target: "runtime", "Notifying subscriber: {}", subscriber.name());
                    subscriber.on_state_event(&event, state);
                }
            }
            Err(err) => {
                warn!(target: "runtime", "{} rejected: {}", event.name(), err);
                let state = self.controller.state();
                for subscriber in &mut self.subscribers {
                    subscriber.on_rejected(&event, &err, state);
                }
            }
        }
    }

    fn execute(&self, request: ApiRequest) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();

        // A send error only means the loop has shut down
        match request {
            ApiRequest::FetchSymptoms => {
                tokio::spawn(async move {
                    let outcome = api.fetch_symptoms().await;
                    let _ = tx.send(Event::SymptomsLoaded(outcome));
                });
            }
            ApiRequest::Search(dispatch) => {
                tokio::spawn(async move {
                    let outcome = api.search_symptoms(&dispatch.text).await;
                    let _ = tx.send(Event::SearchCompleted {
                        seq: dispatch.seq,
                        outcome,
                    });
                });
            }
            ApiRequest::Diagnose(request) => {
                tokio::spawn(async move {
                    let outcome = api.diagnose(&request.symptom_ids).await;
                    let _ = tx.send(Event::DiagnosisCompleted {
                        generation: request.generation,
                        outcome,
                    });
                });
            }
        }
    }
}
