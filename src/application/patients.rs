//! Patient use cases: registration, lookup, mutation and search.
//!
//! Resolves identifiers against the patient store, delegates the business
//! rules to the domain services, persists the outcome and hands flat
//! records back to the caller.

use std::sync::Arc;

use crate::domain::dto::{PatientDto, PatientSearch};
use crate::domain::services::PatientService;
use crate::domain::{Patient, PatientId};
use crate::ports::PatientStore;
use crate::ClinicaError;

/// Use cases for patient management.
pub struct PatientUseCase<S>
where
    S: PatientStore,
{
    store: Arc<S>,
}

impl<S> PatientUseCase<S>
where
    S: PatientStore,
    S::Error: Into<crate::adapters::StorageError>,
{
    /// Create the use case over a patient store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Register a new patient from primitive values.
    ///
    /// # Errors
    /// Returns a validation error naming the offending field, or a
    /// storage error.
    pub fn register(
        &self,
        name: &str,
        age: u8,
        gender: &str,
        medical_history: &str,
        contact: &str,
    ) -> Result<PatientDto, ClinicaError> {
        let patient = PatientService::create(name, age, gender, medical_history, contact)?;
        self.save(&patient)?;
        tracing::info!("Registered patient {}", patient.id);
        Ok(PatientDto::from_entity(&patient))
    }

    /// All patients on file.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    pub fn get_all(&self) -> Result<Vec<PatientDto>, ClinicaError> {
        let patients = self
            .store
            .find_all()
            .map_err(|e| ClinicaError::Storage(e.into()))?;
        Ok(patients.iter().map(PatientDto::from_entity).collect())
    }

    /// Look up one patient; `None` if the id is unknown.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    pub fn get(&self, patient_id: &str) -> Result<Option<PatientDto>, ClinicaError> {
        let patient = self
            .store
            .find_by_id(&PatientId::from_string(patient_id))
            .map_err(|e| ClinicaError::Storage(e.into()))?;
        Ok(patient.as_ref().map(PatientDto::from_entity))
    }

    /// Replace a patient's medical history.
    ///
    /// # Errors
    /// Returns [`ClinicaError::NotFound`] for an unknown id, or a
    /// storage error.
    pub fn update_medical_history(
        &self,
        patient_id: &str,
        new_history: &str,
    ) -> Result<PatientDto, ClinicaError> {
        let mut patient = self.resolve(patient_id)?;
        PatientService::update_medical_history(&mut patient, new_history);
        self.save(&patient)?;
        tracing::debug!("Updated medical history for patient {}", patient.id);
        Ok(PatientDto::from_entity(&patient))
    }

    /// Replace a patient's contact info.
    ///
    /// # Errors
    /// Returns [`ClinicaError::NotFound`] for an unknown id, a
    /// validation error for blank contact info, or a storage error.
    pub fn update_contact(
        &self,
        patient_id: &str,
        new_contact: &str,
    ) -> Result<PatientDto, ClinicaError> {
        let mut patient = self.resolve(patient_id)?;
        PatientService::update_contact(&mut patient, new_contact)?;
        self.save(&patient)?;
        tracing::debug!("Updated contact for patient {}", patient.id);
        Ok(PatientDto::from_entity(&patient))
    }

    /// Patients matching every present criterion.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    pub fn search(&self, criteria: &PatientSearch) -> Result<Vec<PatientDto>, ClinicaError> {
        let patients = self
            .store
            .search(criteria)
            .map_err(|e| ClinicaError::Storage(e.into()))?;
        Ok(patients.iter().map(PatientDto::from_entity).collect())
    }

    /// Delete a patient by id.
    ///
    /// # Returns
    /// `true` if a patient was removed.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    pub fn remove(&self, patient_id: &str) -> Result<bool, ClinicaError> {
        self.store
            .delete(&PatientId::from_string(patient_id))
            .map_err(|e| ClinicaError::Storage(e.into()))
    }

    fn resolve(&self, patient_id: &str) -> Result<Patient, ClinicaError> {
        self.store
            .find_by_id(&PatientId::from_string(patient_id))
            .map_err(|e| ClinicaError::Storage(e.into()))?
            .ok_or_else(|| ClinicaError::NotFound {
                entity: "patient",
                id: patient_id.to_string(),
            })
    }

    fn save(&self, patient: &Patient) -> Result<(), ClinicaError> {
        self.store
            .save(patient)
            .map_err(|e| ClinicaError::Storage(e.into()))
    }
}
