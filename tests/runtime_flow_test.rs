// End-to-end event loop runs against a scripted service on paused tokio time

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use symptom_diag::api::{DiagnosticResult, Severity, Symptom, SymptomApi};
use symptom_diag::error::{ApiError, ClientError};
use symptom_diag::state::{ControllerSettings, Event, Runtime, StateSubscriber, UiState};
use tokio::time::sleep;

#[derive(Default)]
struct ScriptedApi {
    search_calls: AtomicUsize,
    diagnose_calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
    fail_diagnosis: bool,
}

impl ScriptedApi {
    fn catalogue() -> Vec<Symptom> {
        vec![
            Symptom::new("s1", "bruit moteur").with_category("moteur"),
            Symptom::new("s2", "fumée").with_category("échappement"),
            Symptom::new("s3", "vibration"),
        ]
    }
}

#[async_trait]
impl SymptomApi for ScriptedApi {
    async fn fetch_symptoms(&self) -> Result<Vec<Symptom>, ApiError> {
        sleep(Duration::from_millis(20)).await;
        Ok(Self::catalogue())
    }

    async fn search_symptoms(&self, query: &str) -> Result<Vec<Symptom>, ApiError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        // Older queries answer slower than newer ones
        let delay = if query.starts_with("bru") { 500 } else { 10 };
        sleep(Duration::from_millis(delay)).await;
        Ok(Self::catalogue()
            .into_iter()
            .filter(|symptom| symptom.name.starts_with(query.trim()))
            .collect())
    }

    async fn diagnose(&self, symptom_ids: &[String]) -> Result<DiagnosticResult, ApiError> {
        self.diagnose_calls.fetch_add(1, Ordering::SeqCst);
        sleep(Duration::from_millis(100)).await;
        if self.fail_diagnosis {
            return Err(ApiError::Diagnosis("Aucun diagnostic trouvé".into()));
        }
        Ok(DiagnosticResult {
            diagnosis: format!("Diagnostic pour {}", symptom_ids.join("+")),
            description: None,
            severity: Severity::Critical,
            estimated_cost: "500 000Ar".into(),
            cost_range: None,
            confidence: None,
            score: Some(0.8),
            explanation: None,
            advice: None,
            used_symptoms: symptom_ids.to_vec(),
        })
    }
}

#[derive(Clone, Default)]
struct Rejections(Arc<Mutex<Vec<ClientError>>>);

impl StateSubscriber for Rejections {
    fn on_state_event(&mut self, _event: &Event, _state: &UiState) {}

    fn on_rejected(&mut self, _event: &Event, error: &ClientError, _state: &UiState) {
        self.0.lock().unwrap().push(error.clone());
    }

    fn name(&self) -> &str {
        "Rejections"
    }
}

/// Start a runtime, feed it `script`, wait `settle`, and return the final state
async fn run_script(
    api: Arc<ScriptedApi>,
    rejections: Rejections,
    script: Vec<(u64, Event)>,
    settle: u64,
) -> UiState {
    let (mut runtime, handle) = Runtime::new(ControllerSettings::default(), api);
    runtime.subscribe(Box::new(rejections));
    let event_loop = tokio::spawn(runtime.with_seed(1).run());

    for (wait_ms, event) in script {
        sleep(Duration::from_millis(wait_ms)).await;
        assert!(handle.send(event));
    }
    sleep(Duration::from_millis(settle)).await;

    handle.shutdown();
    event_loop.await.unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_catalogue_load_fills_suggestions() {
    let api = Arc::new(ScriptedApi::default());
    let state = run_script(api, Rejections::default(), vec![(0, Event::LoadSymptoms)], 100).await;

    assert_eq!(state.catalog.symptoms.len(), 3);
    assert!(!state.catalog.loading);
    assert_eq!(state.suggestions().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_only_the_latest_search_is_shown() {
    let api = Arc::new(ScriptedApi::default());
    let state = run_script(
        Arc::clone(&api),
        Rejections::default(),
        vec![
            (0, Event::InputChanged("bru".into())),
            // First search is on the wire (slow) when the text changes
            (350, Event::InputChanged("fum".into())),
        ],
        1000,
    )
    .await;

    assert_eq!(api.search_calls.load(Ordering::SeqCst), 2);
    assert_eq!(*api.queries.lock().unwrap(), vec!["bru", "fum"]);
    let ids: Vec<&str> = state.search_results().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["s2"]);
    assert!(!state.loading_flags().searching);
}

#[tokio::test(start_paused = true)]
async fn test_pick_from_results_adds_to_selection() {
    let api = Arc::new(ScriptedApi::default());
    let state = run_script(
        api,
        Rejections::default(),
        vec![
            (0, Event::InputChanged("fum".into())),
            (400, Event::SelectFromSearch("s2".into())),
        ],
        50,
    )
    .await;

    assert_eq!(state.selected_ids(), ["s2"]);
    assert!(state.search_results().is_empty());
    assert_eq!(state.search.text(), "");
}

#[tokio::test(start_paused = true)]
async fn test_double_diagnose_sends_one_request() {
    let api = Arc::new(ScriptedApi::default());
    let rejections = Rejections::default();
    let state = run_script(
        Arc::clone(&api),
        rejections.clone(),
        vec![
            (0, Event::Toggle("s1".into())),
            (0, Event::Diagnose),
            (10, Event::Diagnose),
        ],
        300,
    )
    .await;

    assert_eq!(api.diagnose_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        *rejections.0.lock().unwrap(),
        vec![ClientError::SubmissionInFlight]
    );
    let result = state.diagnostic_result().unwrap();
    assert_eq!(result.diagnosis, "Diagnostic pour s1");
    assert!(state.is_result_open());
    assert_eq!(state.error(), None);
}

#[tokio::test(start_paused = true)]
async fn test_reset_while_diagnosing_drops_the_late_result() {
    let api = Arc::new(ScriptedApi::default());
    let state = run_script(
        Arc::clone(&api),
        Rejections::default(),
        vec![
            (0, Event::Toggle("s1".into())),
            (0, Event::Diagnose),
            (20, Event::Reset),
        ],
        500,
    )
    .await;

    assert_eq!(api.diagnose_calls.load(Ordering::SeqCst), 1);
    assert!(state.diagnostic_result().is_none());
    assert!(state.selected_ids().is_empty());
    assert!(!state.loading_flags().diagnosing);
    assert_eq!(state.error(), None);
}

#[tokio::test(start_paused = true)]
async fn test_diagnose_without_selection_is_rejected_locally() {
    let api = Arc::new(ScriptedApi::default());
    let rejections = Rejections::default();
    let state = run_script(
        Arc::clone(&api),
        rejections.clone(),
        vec![(0, Event::Diagnose)],
        50,
    )
    .await;

    assert_eq!(api.diagnose_calls.load(Ordering::SeqCst), 0);
    assert_eq!(rejections.0.lock().unwrap().len(), 1);
    assert_eq!(
        state.error(),
        Some("Veuillez sélectionner au moins un symptôme")
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_diagnosis_lands_in_banner_and_allows_retry() {
    let api = Arc::new(ScriptedApi {
        fail_diagnosis: true,
        ..Default::default()
    });
    let state = run_script(
        Arc::clone(&api),
        Rejections::default(),
        vec![
            (0, Event::Toggle("s3".into())),
            (0, Event::Diagnose),
            (200, Event::Diagnose),
        ],
        300,
    )
    .await;

    assert_eq!(api.diagnose_calls.load(Ordering::SeqCst), 2);
    assert_eq!(state.error(), Some("Aucun diagnostic trouvé"));
    assert!(state.diagnostic_result().is_none());
    assert!(!state.diagnostic.is_submitting());
}
