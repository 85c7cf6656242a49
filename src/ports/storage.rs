//! Storage ports: traits for the persistence collaborator.
//!
//! One trait per entity family. The domain core never performs I/O
//! itself; use cases talk to these traits and adapters implement them.

use crate::domain::dto::PatientSearch;
use crate::domain::{Appointment, Patient, PatientId, Treatment};

/// Persistence operations for patients.
pub trait PatientStore: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a new patient or update an existing one by identifier.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn save(&self, patient: &Patient) -> Result<(), Self::Error>;

    /// Look up a patient by identifier.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn find_by_id(&self, id: &PatientId) -> Result<Option<Patient>, Self::Error>;

    /// All patients, ordered by name.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn find_all(&self) -> Result<Vec<Patient>, Self::Error>;

    /// Patients matching every present criterion, ordered by name.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn search(&self, criteria: &PatientSearch) -> Result<Vec<Patient>, Self::Error>;

    /// Delete a patient by identifier.
    ///
    /// # Returns
    /// `true` if a patient was removed.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn delete(&self, id: &PatientId) -> Result<bool, Self::Error>;
}

/// Persistence operations for appointments.
pub trait AppointmentStore: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a new appointment or update an existing one by identifier.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn save(&self, appointment: &Appointment) -> Result<(), Self::Error>;

    /// Look up an appointment by identifier.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn find_by_id(&self, id: &str) -> Result<Option<Appointment>, Self::Error>;

    /// All appointments, ordered by date.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn find_all(&self) -> Result<Vec<Appointment>, Self::Error>;

    /// All appointments for one patient, ordered by date.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn find_by_patient(&self, patient_id: &PatientId) -> Result<Vec<Appointment>, Self::Error>;
}

/// Persistence operations for treatments.
pub trait TreatmentStore: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a new treatment or update an existing one by identifier.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn save(&self, treatment: &Treatment) -> Result<(), Self::Error>;

    /// Look up a treatment by identifier.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn find_by_id(&self, id: &str) -> Result<Option<Treatment>, Self::Error>;

    /// All treatments, ordered by start date.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn find_all(&self) -> Result<Vec<Treatment>, Self::Error>;

    /// All treatments for one patient, ordered by start date.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn find_by_patient(&self, patient_id: &PatientId) -> Result<Vec<Treatment>, Self::Error>;
}
