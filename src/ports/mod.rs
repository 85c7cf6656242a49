//! Ports layer: trait definitions for external collaborators.

mod storage;

pub use storage::{AppointmentStore, PatientStore, TreatmentStore};
