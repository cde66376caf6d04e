use crate::api::{DiagnosticResult, Symptom};
use crate::core::{SearchController, SelectionSet};
use crate::services::DiagnosticOrchestrator;

/// The symptom catalogue as last loaded
#[derive(Debug, Default)]
pub struct CatalogState {
    pub symptoms: Vec<Symptom>,
    pub loading: bool,
}

impl CatalogState {
    pub fn get(&self, id: &str) -> Option<&Symptom> {
        self.symptoms.iter().find(|symptom| symptom.id == id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadingFlags {
    pub symptoms: bool,
    pub searching: bool,
    pub diagnosing: bool,
}

/// Session state, partitioned by owner. Only the app controller touches more
/// than one slice.
#[derive(Debug, Default)]
pub struct UiState {
    pub catalog: CatalogState,
    pub search: SearchController,
    pub selection: SelectionSet,
    pub diagnostic: DiagnosticOrchestrator,
    pub error: Option<String>,
}

impl UiState {
    pub fn loading_flags(&self) -> LoadingFlags {
        LoadingFlags {
            symptoms: self.catalog.loading,
            searching: self.search.is_searching(),
            diagnosing: self.diagnostic.is_submitting(),
        }
    }

    pub fn search_results(&self) -> &[Symptom] {
        self.search.results()
    }

    pub fn suggestions(&self) -> &[Symptom] {
        self.search.suggestions()
    }

    pub fn selected_ids(&self) -> &[String] {
        self.selection.ids()
    }

    pub fn diagnostic_result(&self) -> Option<&DiagnosticResult> {
        self.diagnostic.result()
    }

    pub fn is_result_open(&self) -> bool {
        self.diagnostic.is_result_open()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Name of a selected id, falling back to the id itself
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.catalog
            .get(id)
            .or_else(|| self.search.find(id))
            .map(|symptom| symptom.name.as_str())
            .unwrap_or(id)
    }
}
