//! Error taxonomy shared by the controllers and the API client
//!
//! Display strings are the messages shown in the error banner, so they are
//! written in the language of the service (French).

/// Local input errors. These are detected before any request is built and
/// never reach the network layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Veuillez sélectionner au moins un symptôme")]
    EmptySelection,
    #[error("Maximum {max} symptômes autorisés")]
    CapacityExceeded { max: usize },
    #[error("Le texte est trop long (maximum {max} caractères)")]
    QueryTooLong { max: usize },
}

/// Failures of a single request/response cycle with the remote service
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Transport failed: connection refused, DNS, timeout, truncated body
    #[error("Impossible de contacter le serveur. Vérifiez qu'il est démarré. ({0})")]
    Network(String),
    /// Response arrived but could not be decoded
    #[error("Réponse invalide du serveur: {0}")]
    Protocol(String),
    /// The service explicitly reported a failed diagnosis
    #[error("{0}")]
    Diagnosis(String),
    /// Non-success status on the catalogue or search endpoints
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },
}

/// Everything a controller operation can reject or fail with
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    /// A diagnosis is already being computed; the new request is not queued
    #[error("Un diagnostic est déjà en cours")]
    SubmissionInFlight,
}

impl ClientError {
    /// Local rejections never touched the network
    pub fn is_local(&self) -> bool {
        !matches!(self, ClientError::Api(_))
    }
}
