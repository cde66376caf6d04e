//! Diagnosis service client and models
//!
//! This module handles communication with the remote diagnosis service
//! and defines the data models for its requests/responses.

pub mod client;
pub mod models;

pub use client::{ApiClient, SymptomApi};
pub use models::{CostRange, DiagnosticResult, Severity, Symptom};
