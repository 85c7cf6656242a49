//! # Clinica
//!
//! Clinic patient management: registers patients, schedules and tracks
//! appointments, records treatments and produces aggregate reports.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Entities, value objects and stateless domain services
//! - `ports`: Trait definitions for the storage collaborator
//! - `adapters`: Concrete implementations (SQLite)
//! - `application`: Use cases orchestrating domain and ports
//!
//! The domain layer is synchronous, performs no I/O and holds no shared
//! state; every operation takes its inputs explicitly and concurrency,
//! if any, is the calling system's concern.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use domain::{Appointment, Patient, Treatment, ValidationError};

/// Result type for Clinica operations
pub type Result<T> = std::result::Result<T, ClinicaError>;

/// Main error type for Clinica
#[derive(Debug, thiserror::Error)]
pub enum ClinicaError {
    #[error("Invalid input: {0}")]
    Validation(#[from] domain::ValidationError),

    #[error("Storage operation failed: {0}")]
    Storage(#[from] adapters::StorageError),

    #[error("No {entity} found with id '{id}'")]
    NotFound { entity: &'static str, id: String },
}
