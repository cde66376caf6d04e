pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod services;
pub mod state;
pub mod utils;

pub use api::{ApiClient, DiagnosticResult, Severity, Symptom, SymptomApi};
pub use error::{ApiError, ClientError, ValidationError};
pub use state::{Event, Runtime, RuntimeHandle, StateSubscriber, UiState};
