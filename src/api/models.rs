use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt;

fn default_weight() -> f64 {
    1.0
}

/// A symptom as published by the diagnosis service. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symptom {
    pub id: String,
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "categorie", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Importance of the symptom for scoring (0.0 to 1.0)
    #[serde(rename = "poids", default = "default_weight")]
    pub weight: f64,
    /// Only present on search results
    #[serde(
        rename = "score_similarite",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub similarity_score: Option<f64>,
}

impl Symptom {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            category: None,
            weight: default_weight(),
            similarity_score: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Similarity as a whole percentage, for display
    pub fn similarity_percent(&self) -> Option<u32> {
        self.similarity_score
            .map(|score| (score.clamp(0.0, 1.0) * 100.0).round() as u32)
    }
}

/// Severity of a diagnosis. The service sends free-text labels; anything
/// outside the known set becomes `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Light,
    Medium,
    Critical,
    Unknown,
}

impl Severity {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "léger" | "leger" => Severity::Light,
            "moyen" => Severity::Medium,
            "critique" => Severity::Critical,
            _ => Severity::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Light => "Léger",
            Severity::Medium => "Moyen",
            Severity::Critical => "Critique",
            Severity::Unknown => "Inconnu",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured cost bounds, only filled when the service sends them as numbers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostRange {
    pub min: u64,
    pub max: u64,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticResult {
    pub diagnosis: String,
    pub description: Option<String>,
    pub severity: Severity,
    /// Cost label exactly as sent by the service
    pub estimated_cost: String,
    pub cost_range: Option<CostRange>,
    pub confidence: Option<String>,
    /// Match score in `0.0..=1.0`
    pub score: Option<f64>,
    pub explanation: Option<String>,
    pub advice: Option<String>,
    /// Symptoms the service actually used, as reported by it
    pub used_symptoms: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchRequest<'a> {
    pub texte: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct DiagnoseRequest<'a> {
    pub symptomes: &'a [String],
}

#[derive(Debug, Deserialize)]
pub(crate) struct SymptomsResponse {
    pub symptomes: Vec<Symptom>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub succes: Option<bool>,
    #[serde(default)]
    pub texte_recherche: Option<String>,
    pub resultats: Vec<Symptom>,
}

/// Error envelope used by every endpoint
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub erreur: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DiagnoseResponse {
    #[serde(default)]
    pub succes: Option<bool>,
    #[serde(default)]
    pub erreur: Option<String>,
    #[serde(default)]
    pub diagnostic: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub gravite: Option<String>,
    #[serde(default)]
    pub cout_estimatif: Option<String>,
    #[serde(default)]
    pub cout_min: Option<u64>,
    #[serde(default)]
    pub cout_max: Option<u64>,
    #[serde(default)]
    pub devise: Option<String>,
    #[serde(default)]
    pub confiance: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub explication_ia: Option<String>,
    #[serde(default)]
    pub conseils: Option<String>,
    #[serde(default)]
    pub symptomes_utilises: Vec<String>,
}

pub(crate) const DEFAULT_DIAGNOSIS_ERROR: &str = "Erreur lors du diagnostic";

impl DiagnoseResponse {
    pub fn into_result(self) -> Result<DiagnosticResult, ApiError> {
        if let Some(message) = self.erreur {
            return Err(ApiError::Diagnosis(message));
        }
        if self.succes == Some(false) {
            return Err(ApiError::Diagnosis(DEFAULT_DIAGNOSIS_ERROR.to_string()));
        }

        let diagnosis = self
            .diagnostic
            .ok_or_else(|| ApiError::Protocol("missing field `diagnostic`".to_string()))?;
        let estimated_cost = self
            .cout_estimatif
            .ok_or_else(|| ApiError::Protocol("missing field `cout_estimatif`".to_string()))?;

        if let Some(score) = self.score {
            if !(0.0..=1.0).contains(&score) {
                return Err(ApiError::Protocol(format!(
                    "score {} outside 0..1",
                    score
                )));
            }
        }

        let cost_range = match (self.cout_min, self.cout_max) {
            (Some(min), Some(max)) if min <= max => Some(CostRange {
                min,
                max,
                currency: self.devise,
            }),
            _ => None,
        };

        Ok(DiagnosticResult {
            diagnosis,
            description: self.description,
            severity: self
                .gravite
                .as_deref()
                .map(Severity::from_label)
                .unwrap_or(Severity::Unknown),
            estimated_cost,
            cost_range,
            confidence: self.confiance,
            score: self.score,
            explanation: self.explication_ia,
            advice: self.conseils,
            used_symptoms: self.symptomes_utilises,
        })
    }
}
