use crate::api::models::{
    DiagnoseRequest, DiagnoseResponse, DiagnosticResult, ErrorResponse, SearchRequest,
    SearchResponse, Symptom, SymptomsResponse, DEFAULT_DIAGNOSIS_ERROR,
};
use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// The three operations offered by the diagnosis service.
///
/// Each call is a single request/response cycle: no retry, no caching.
#[async_trait]
pub trait SymptomApi: Send + Sync {
    /// `GET /symptomes`
    async fn fetch_symptoms(&self) -> Result<Vec<Symptom>, ApiError>;

    /// `POST /rechercher`. The query is sent verbatim.
    async fn search_symptoms(&self, query: &str) -> Result<Vec<Symptom>, ApiError>;

    /// `POST /diagnostiquer`. Callers guarantee `symptom_ids` is non-empty.
    async fn diagnose(&self, symptom_ids: &[String]) -> Result<DiagnosticResult, ApiError>;
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, None)
    }

    /// A `None` timeout leaves the transport defaults in place
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Network(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

fn network(err: reqwest::Error) -> ApiError {
    ApiError::Network(err.to_string())
}

async fn read_body(response: reqwest::Response) -> Result<(StatusCode, String), ApiError> {
    let status = response.status();
    let body = response.text().await.map_err(network)?;
    Ok((status, body))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Protocol(e.to_string()))
}

/// Server-supplied `erreur` if the body carries one, the fallback otherwise
fn server_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.erreur)
        .unwrap_or_else(|| fallback.to_string())
}

fn status_error(status: StatusCode, body: &str, fallback: &str) -> ApiError {
    ApiError::Status {
        status: status.as_u16(),
        message: server_message(body, fallback),
    }
}

#[async_trait]
impl SymptomApi for ApiClient {
    async fn fetch_symptoms(&self) -> Result<Vec<Symptom>, ApiError> {
        let url = self.endpoint("symptomes");
        debug!(target: "api", "GET {}", url);

        let response = self.client.get(&url).send().await.map_err(network)?;
        let (status, body) = read_body(response).await?;

        if !status.is_success() {
            warn!(target: "api", "GET {} returned {}", url, status);
            return Err(status_error(
                status,
                &body,
                "Erreur lors du chargement des symptômes",
            ));
        }

        let parsed: SymptomsResponse = decode(&body)?;
        debug!(target: "api", "Catalogue holds {} symptoms", parsed.symptomes.len());
        Ok(parsed.symptomes)
    }

    async fn search_symptoms(&self, query: &str) -> Result<Vec<Symptom>, ApiError> {
        let url = self.endpoint("rechercher");
        debug!(target: "api", "POST {} texte={:?}", url, query);

        let response = self
            .client
            .post(&url)
            .json(&SearchRequest { texte: query })
            .send()
            .await
            .map_err(network)?;
        let (status, body) = read_body(response).await?;

        if !status.is_success() {
            warn!(target: "api", "POST {} returned {}", url, status);
            return Err(status_error(status, &body, "Erreur lors de la recherche"));
        }

        let parsed: SearchResponse = decode(&body)?;
        if parsed.succes == Some(false) {
            return Err(status_error(status, &body, "Erreur lors de la recherche"));
        }
        debug!(
            target: "api",
            "Search {:?} matched {} symptoms",
            parsed.texte_recherche.as_deref().unwrap_or(query),
            parsed.resultats.len()
        );
        Ok(parsed.resultats)
    }

    async fn diagnose(&self, symptom_ids: &[String]) -> Result<DiagnosticResult, ApiError> {
        debug_assert!(!symptom_ids.is_empty(), "diagnose needs at least one symptom");

        let url = self.endpoint("diagnostiquer");
        debug!(target: "api", "POST {} symptomes={:?}", url, symptom_ids);

        let response = self
            .client
            .post(&url)
            .json(&DiagnoseRequest {
                symptomes: symptom_ids,
            })
            .send()
            .await
            .map_err(network)?;
        let (status, body) = read_body(response).await?;

        if !status.is_success() {
            warn!(target: "api", "POST {} returned {}", url, status);
            return Err(ApiError::Diagnosis(server_message(
                &body,
                DEFAULT_DIAGNOSIS_ERROR,
            )));
        }

        let parsed: DiagnoseResponse = decode(&body)?;
        parsed.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = ApiClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(
            client.endpoint("symptomes"),
            "http://localhost:5000/symptomes"
        );
    }

    #[test]
    fn test_server_message_falls_back() {
        assert_eq!(
            server_message(r#"{"succes":false,"erreur":"Format de requête invalide"}"#, "x"),
            "Format de requête invalide"
        );
        assert_eq!(server_message("<html>502</html>", "fallback"), "fallback");
        assert_eq!(server_message("{}", "fallback"), "fallback");
    }
}
