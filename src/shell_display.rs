use crossterm::style::Stylize;
use std::sync::{Arc, Mutex, MutexGuard};
use symptom_diag::api::{DiagnosticResult, Severity, Symptom};
use symptom_diag::error::ClientError;
use symptom_diag::state::{Event, StateSubscriber, UiState};

/// What the prompt thread needs to turn `/pick 2` or `/toggle 3` into ids
#[derive(Debug, Default)]
pub struct ShellView {
    /// Numbered picks: search results, or suggestions when there are none
    pub visible: Vec<String>,
    /// Catalogue as (id, name)
    pub catalog: Vec<(String, String)>,
    pub selected: Vec<String>,
}

#[derive(Clone, Default)]
pub struct SharedView(Arc<Mutex<ShellView>>);

impl SharedView {
    pub fn lock(&self) -> MutexGuard<'_, ShellView> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn visible_id(&self, number: usize) -> Option<String> {
        number
            .checked_sub(1)
            .and_then(|index| self.lock().visible.get(index).cloned())
    }

    /// Accepts either a catalogue number from `/symptoms` or a raw id
    pub fn resolve_catalog(&self, arg: &str) -> String {
        let view = self.lock();
        arg.parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|index| view.catalog.get(index))
            .map(|(id, _)| id.clone())
            .unwrap_or_else(|| arg.to_string())
    }

    pub fn print_catalog(&self) {
        let view = self.lock();
        if view.catalog.is_empty() {
            println!("{}", "Catalogue vide ou non chargé.".yellow());
            return;
        }
        for (index, (id, name)) in view.catalog.iter().enumerate() {
            let mark = if view.selected.contains(id) { "[x]" } else { "[ ]" };
            println!("  {:>3}. {} {} {}", index + 1, mark, name, format!("({id})").dark_grey());
        }
    }
}

/// Prints state changes to the terminal
pub struct ShellDisplay {
    view: SharedView,
    last_error: Option<String>,
}

impl ShellDisplay {
    pub fn new(view: SharedView) -> Self {
        Self {
            view,
            last_error: None,
        }
    }

    fn refresh_view(&self, state: &UiState) {
        let mut view = self.view.lock();
        let source = if state.search_results().is_empty() {
            state.suggestions()
        } else {
            state.search_results()
        };
        view.visible = source.iter().map(|symptom| symptom.id.clone()).collect();
        view.catalog = state
            .catalog
            .symptoms
            .iter()
            .map(|symptom| (symptom.id.clone(), symptom.name.clone()))
            .collect();
        view.selected = state.selected_ids().to_vec();
    }

    fn print_error_if_changed(&mut self, state: &UiState) {
        let current = state.error().map(str::to_string);
        if current != self.last_error {
            if let Some(message) = &current {
                println!("{}", format!("✖ {message}").red());
            }
            self.last_error = current;
        }
    }
}

impl StateSubscriber for ShellDisplay {
    fn on_state_event(&mut self, event: &Event, state: &UiState) {
        self.refresh_view(state);

        match event {
            Event::SymptomsLoaded(Ok(symptoms)) => {
                println!(
                    "{}",
                    format!("{} symptômes disponibles (/symptoms)", symptoms.len()).cyan()
                );
                print_numbered("Suggestions", state.suggestions());
            }
            Event::SearchCompleted { seq, outcome: Ok(_) }
                if *seq == state.search.latest_seq() && !state.search.is_searching() =>
            {
                if state.search_results().is_empty() {
                    println!("{}", "Aucun symptôme trouvé".yellow());
                } else {
                    print_numbered("Résultats", state.search_results());
                }
            }
            Event::SelectFromSearch(_) | Event::Toggle(_) | Event::Reset => {
                print_selection(state);
            }
            Event::Diagnose if state.diagnostic.is_submitting() => {
                println!("{}", "Analyse en cours...".cyan());
            }
            Event::DiagnosisCompleted { .. } if state.is_result_open() => {
                if let Some(result) = state.diagnostic_result() {
                    print_result(result);
                }
            }
            _ => {}
        }

        self.print_error_if_changed(state);
    }

    fn on_rejected(&mut self, _event: &Event, error: &ClientError, state: &UiState) {
        // Repeated rejections leave the banner unchanged, so print every time
        println!("{}", format!("✖ {error}").red());
        self.last_error = state.error().map(str::to_string);
    }

    fn name(&self) -> &str {
        "ShellDisplay"
    }
}

fn print_numbered(title: &str, symptoms: &[Symptom]) {
    if symptoms.is_empty() {
        return;
    }
    println!("{}", format!("{title}:").yellow());
    for (index, symptom) in symptoms.iter().enumerate() {
        let score = symptom
            .similarity_percent()
            .map(|percent| format!(" {percent}%").dark_grey().to_string())
            .unwrap_or_default();
        let category = symptom
            .category
            .as_deref()
            .map(|category| format!(" [{category}]").dark_grey().to_string())
            .unwrap_or_default();
        println!("  {:>2}. {}{}{}", index + 1, symptom.name, category, score);
    }
    println!("{}", "  /pick <n> pour sélectionner".dark_grey());
}

fn print_selection(state: &UiState) {
    let selection = &state.selection;
    let names: Vec<&str> = selection
        .ids()
        .iter()
        .map(|id| state.display_name(id))
        .collect();
    let counter = format!("{}/{}", selection.len(), selection.capacity());
    let counter = if selection.is_full() {
        counter.red().to_string()
    } else {
        counter.green().to_string()
    };
    if names.is_empty() {
        println!("Sélection {counter}");
    } else {
        println!("Sélection {counter}: {}", names.join(", "));
    }
}

fn print_result(result: &DiagnosticResult) {
    let severity = match result.severity {
        Severity::Light => result.severity.label().green(),
        Severity::Medium => result.severity.label().yellow(),
        Severity::Critical => result.severity.label().red(),
        Severity::Unknown => result.severity.label().dark_grey(),
    };
    println!();
    println!("{}", result.diagnosis.as_str().bold());
    if let Some(description) = &result.description {
        println!("{description}");
    }
    println!("  Gravité: {severity}");
    println!("  Coût estimé: {}", result.estimated_cost);
    if let Some(confidence) = &result.confidence {
        println!("  Confiance: {confidence}");
    }
    if let Some(score) = result.score {
        println!("  Score: {:.0}%", score * 100.0);
    }
    if let Some(explanation) = &result.explanation {
        println!("{}", "Explication:".yellow());
        println!("  {explanation}");
    }
    if let Some(advice) = &result.advice {
        println!("{}", "Conseils:".yellow());
        println!("  {advice}");
    }
    if !result.used_symptoms.is_empty() {
        println!(
            "{}",
            format!("Symptômes analysés: {}", result.used_symptoms.join(", ")).dark_grey()
        );
    }
    println!("{}", "/close pour fermer, /reset pour recommencer".dark_grey());
}
