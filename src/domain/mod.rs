//! Domain layer: entities, value objects and domain services.
//!
//! This module contains pure types with strict validation and no I/O.
//! Everything here is synchronous and free of shared state; callers own
//! persistence and presentation.

mod appointment;
mod patient;
mod treatment;
mod value_objects;

pub mod dto;
pub mod services;

pub use appointment::{Appointment, AppointmentStatus};
pub use patient::Patient;
pub use treatment::{Treatment, TreatmentStatus};
pub use value_objects::{
    Age, Contact, Diagnosis, Gender, MedicalHistory, PatientId, Prescription, ValidationError,
    NO_HISTORY,
};
