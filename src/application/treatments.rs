//! Treatment use cases: starting courses and driving them to an end
//! state against storage.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::dto::TreatmentDto;
use crate::domain::services::TreatmentService;
use crate::domain::{PatientId, Treatment};
use crate::ports::{PatientStore, TreatmentStore};
use crate::ClinicaError;

/// Use cases for treatment management.
pub struct TreatmentUseCase<T, P>
where
    T: TreatmentStore,
    P: PatientStore,
{
    treatments: Arc<T>,
    patients: Arc<P>,
}

impl<T, P> TreatmentUseCase<T, P>
where
    T: TreatmentStore,
    P: PatientStore,
    T::Error: Into<crate::adapters::StorageError>,
    P::Error: Into<crate::adapters::StorageError>,
{
    /// Create the use case over treatment and patient stores.
    pub fn new(treatments: Arc<T>, patients: Arc<P>) -> Self {
        Self {
            treatments,
            patients,
        }
    }

    /// Start a treatment for an existing patient. `start_date` defaults
    /// to the current time.
    ///
    /// # Errors
    /// Returns [`ClinicaError::NotFound`] for an unknown patient, a
    /// validation error for blank diagnosis or prescription, or a
    /// storage error.
    pub fn start(
        &self,
        patient_id: &str,
        diagnosis: &str,
        prescription: &str,
        start_date: Option<DateTime<Utc>>,
    ) -> Result<TreatmentDto, ClinicaError> {
        let patient = self
            .patients
            .find_by_id(&PatientId::from_string(patient_id))
            .map_err(|e| ClinicaError::Storage(e.into()))?
            .ok_or_else(|| ClinicaError::NotFound {
                entity: "patient",
                id: patient_id.to_string(),
            })?;

        let treatment =
            TreatmentService::create(patient.id, diagnosis, prescription, start_date)?;
        self.save(&treatment)?;
        tracing::info!(
            "Started treatment {} for patient {}",
            treatment.id,
            treatment.patient_id
        );
        Ok(TreatmentDto::from_entity(&treatment))
    }

    /// All treatments on file.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    pub fn get_all(&self) -> Result<Vec<TreatmentDto>, ClinicaError> {
        let treatments = self
            .treatments
            .find_all()
            .map_err(|e| ClinicaError::Storage(e.into()))?;
        Ok(treatments.iter().map(TreatmentDto::from_entity).collect())
    }

    /// All treatments for one patient.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    pub fn by_patient(&self, patient_id: &str) -> Result<Vec<TreatmentDto>, ClinicaError> {
        let treatments = self
            .treatments
            .find_by_patient(&PatientId::from_string(patient_id))
            .map_err(|e| ClinicaError::Storage(e.into()))?;
        Ok(treatments.iter().map(TreatmentDto::from_entity).collect())
    }

    /// Mark a treatment as completed, stamping its end date.
    ///
    /// # Errors
    /// Returns [`ClinicaError::NotFound`] for an unknown id, a
    /// validation error if the treatment is already terminal, or a
    /// storage error.
    pub fn complete(&self, treatment_id: &str) -> Result<TreatmentDto, ClinicaError> {
        let mut treatment = self.resolve(treatment_id)?;
        TreatmentService::complete(&mut treatment)?;
        self.save(&treatment)?;
        tracing::info!("Completed treatment {}", treatment.id);
        Ok(TreatmentDto::from_entity(&treatment))
    }

    /// Discontinue a treatment, stamping its end date.
    ///
    /// # Errors
    /// Returns [`ClinicaError::NotFound`] for an unknown id, a
    /// validation error if the treatment is already terminal, or a
    /// storage error.
    pub fn discontinue(&self, treatment_id: &str) -> Result<TreatmentDto, ClinicaError> {
        let mut treatment = self.resolve(treatment_id)?;
        TreatmentService::discontinue(&mut treatment)?;
        self.save(&treatment)?;
        tracing::info!("Discontinued treatment {}", treatment.id);
        Ok(TreatmentDto::from_entity(&treatment))
    }

    /// Treatments that are still active.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    pub fn active(&self) -> Result<Vec<TreatmentDto>, ClinicaError> {
        let all = self
            .treatments
            .find_all()
            .map_err(|e| ClinicaError::Storage(e.into()))?;
        Ok(TreatmentService::active_only(&all)
            .into_iter()
            .map(TreatmentDto::from_entity)
            .collect())
    }

    fn resolve(&self, treatment_id: &str) -> Result<Treatment, ClinicaError> {
        self.treatments
            .find_by_id(treatment_id)
            .map_err(|e| ClinicaError::Storage(e.into()))?
            .ok_or_else(|| ClinicaError::NotFound {
                entity: "treatment",
                id: treatment_id.to_string(),
            })
    }

    fn save(&self, treatment: &Treatment) -> Result<(), ClinicaError> {
        self.treatments
            .save(treatment)
            .map_err(|e| ClinicaError::Storage(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::SqliteStore;
    use crate::application::PatientUseCase;
    use crate::domain::ValidationError;

    struct Fixture {
        treatments: TreatmentUseCase<SqliteStore, SqliteStore>,
        patient_id: String,
    }

    fn create_fixture() -> Fixture {
        let store = Arc::new(SqliteStore::in_memory().expect("Should create db"));
        let patients = PatientUseCase::new(store.clone());
        let patient = patients
            .register("Luis Vega", 61, "Masculino", "", "555-0150")
            .expect("Should register");
        Fixture {
            treatments: TreatmentUseCase::new(store.clone(), store),
            patient_id: patient.id,
        }
    }

    #[test]
    fn test_start_requires_existing_patient_and_fields() {
        let fixture = create_fixture();

        let missing = fixture
            .treatments
            .start("missing", "Gripe", "Reposo", None);
        assert!(matches!(
            missing,
            Err(ClinicaError::NotFound { entity: "patient", .. })
        ));

        let blank = fixture
            .treatments
            .start(&fixture.patient_id, "", "Reposo", None);
        assert!(matches!(
            blank,
            Err(ClinicaError::Validation(ValidationError::EmptyField("diagnosis")))
        ));

        let dto = fixture
            .treatments
            .start(&fixture.patient_id, "Gripe", "Reposo", None)
            .expect("Should start");
        assert_eq!(dto.status, "active");
        assert!(dto.end_date.is_none());
    }

    #[test]
    fn test_complete_and_discontinue_stamp_end_date() {
        let fixture = create_fixture();
        let first = fixture
            .treatments
            .start(&fixture.patient_id, "Gripe", "Reposo", None)
            .expect("Should start");
        let second = fixture
            .treatments
            .start(&fixture.patient_id, "Otitis", "Gotas", None)
            .expect("Should start");

        let done = fixture.treatments.complete(&first.id).expect("Should complete");
        assert_eq!(done.status, "completed");
        assert!(done.end_date.expect("Should have end date") >= done.start_date);

        let dropped = fixture
            .treatments
            .discontinue(&second.id)
            .expect("Should discontinue");
        assert_eq!(dropped.status, "discontinued");

        let again = fixture.treatments.complete(&first.id);
        assert!(matches!(
            again,
            Err(ClinicaError::Validation(ValidationError::InvalidTransition { .. }))
        ));
    }

    #[test]
    fn test_active_filter_and_patient_scope() {
        let fixture = create_fixture();
        let first = fixture
            .treatments
            .start(&fixture.patient_id, "Gripe", "Reposo", None)
            .expect("Should start");
        let second = fixture
            .treatments
            .start(&fixture.patient_id, "Otitis", "Gotas", None)
            .expect("Should start");
        fixture.treatments.complete(&second.id).expect("Should complete");

        let active = fixture.treatments.active().expect("Should filter");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, first.id);

        let by_patient = fixture
            .treatments
            .by_patient(&fixture.patient_id)
            .expect("Should list");
        assert_eq!(by_patient.len(), 2);
        assert_eq!(fixture.treatments.get_all().expect("Should list").len(), 2);
    }
}
