//! Appointment use cases: scheduling and lifecycle against storage.
//!
//! Appointments are only created against an existing patient; the
//! terminal transitions and the upcoming-window filter come from the
//! domain service.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::dto::AppointmentDto;
use crate::domain::services::{AppointmentService, DEFAULT_UPCOMING_HORIZON_DAYS};
use crate::domain::{Appointment, PatientId};
use crate::ports::{AppointmentStore, PatientStore};
use crate::ClinicaError;

/// Use cases for appointment management.
pub struct AppointmentUseCase<A, P>
where
    A: AppointmentStore,
    P: PatientStore,
{
    appointments: Arc<A>,
    patients: Arc<P>,
}

impl<A, P> AppointmentUseCase<A, P>
where
    A: AppointmentStore,
    P: PatientStore,
    A::Error: Into<crate::adapters::StorageError>,
    P::Error: Into<crate::adapters::StorageError>,
{
    /// Create the use case over appointment and patient stores.
    pub fn new(appointments: Arc<A>, patients: Arc<P>) -> Self {
        Self {
            appointments,
            patients,
        }
    }

    /// Schedule an appointment for an existing patient.
    ///
    /// # Errors
    /// Returns [`ClinicaError::NotFound`] for an unknown patient, a
    /// validation error for a non-future date or blank fields, or a
    /// storage error.
    pub fn schedule(
        &self,
        patient_id: &str,
        date: DateTime<Utc>,
        doctor_name: &str,
        reason: &str,
        notes: Option<String>,
    ) -> Result<AppointmentDto, ClinicaError> {
        let patient = self
            .patients
            .find_by_id(&PatientId::from_string(patient_id))
            .map_err(|e| ClinicaError::Storage(e.into()))?
            .ok_or_else(|| ClinicaError::NotFound {
                entity: "patient",
                id: patient_id.to_string(),
            })?;

        let appointment =
            AppointmentService::create(patient.id, date, doctor_name, reason, notes)?;
        self.save(&appointment)?;
        tracing::info!(
            "Scheduled appointment {} for patient {}",
            appointment.id,
            appointment.patient_id
        );
        Ok(AppointmentDto::from_entity(&appointment))
    }

    /// All appointments on file.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    pub fn get_all(&self) -> Result<Vec<AppointmentDto>, ClinicaError> {
        let appointments = self
            .appointments
            .find_all()
            .map_err(|e| ClinicaError::Storage(e.into()))?;
        Ok(appointments.iter().map(AppointmentDto::from_entity).collect())
    }

    /// All appointments for one patient.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    pub fn by_patient(&self, patient_id: &str) -> Result<Vec<AppointmentDto>, ClinicaError> {
        let appointments = self
            .appointments
            .find_by_patient(&PatientId::from_string(patient_id))
            .map_err(|e| ClinicaError::Storage(e.into()))?;
        Ok(appointments.iter().map(AppointmentDto::from_entity).collect())
    }

    /// Mark an appointment as completed.
    ///
    /// # Errors
    /// Returns [`ClinicaError::NotFound`] for an unknown id, a
    /// validation error if the appointment is already terminal, or a
    /// storage error.
    pub fn complete(&self, appointment_id: &str) -> Result<AppointmentDto, ClinicaError> {
        let mut appointment = self.resolve(appointment_id)?;
        AppointmentService::complete(&mut appointment)?;
        self.save(&appointment)?;
        tracing::info!("Completed appointment {}", appointment.id);
        Ok(AppointmentDto::from_entity(&appointment))
    }

    /// Cancel an appointment.
    ///
    /// # Errors
    /// Returns [`ClinicaError::NotFound`] for an unknown id, a
    /// validation error if the appointment is already terminal, or a
    /// storage error.
    pub fn cancel(&self, appointment_id: &str) -> Result<AppointmentDto, ClinicaError> {
        let mut appointment = self.resolve(appointment_id)?;
        AppointmentService::cancel(&mut appointment)?;
        self.save(&appointment)?;
        tracing::info!("Cancelled appointment {}", appointment.id);
        Ok(AppointmentDto::from_entity(&appointment))
    }

    /// Scheduled appointments dated up to the default seven-day window
    /// from now.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    pub fn upcoming(&self) -> Result<Vec<AppointmentDto>, ClinicaError> {
        self.upcoming_within(DEFAULT_UPCOMING_HORIZON_DAYS)
    }

    /// Scheduled appointments dated up to `horizon_days` from now.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    pub fn upcoming_within(&self, horizon_days: i64) -> Result<Vec<AppointmentDto>, ClinicaError> {
        let all = self
            .appointments
            .find_all()
            .map_err(|e| ClinicaError::Storage(e.into()))?;
        Ok(AppointmentService::upcoming(&all, horizon_days)
            .into_iter()
            .map(AppointmentDto::from_entity)
            .collect())
    }

    fn resolve(&self, appointment_id: &str) -> Result<Appointment, ClinicaError> {
        self.appointments
            .find_by_id(appointment_id)
            .map_err(|e| ClinicaError::Storage(e.into()))?
            .ok_or_else(|| ClinicaError::NotFound {
                entity: "appointment",
                id: appointment_id.to_string(),
            })
    }

    fn save(&self, appointment: &Appointment) -> Result<(), ClinicaError> {
        self.appointments
            .save(appointment)
            .map_err(|e| ClinicaError::Storage(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::SqliteStore;
    use crate::application::PatientUseCase;
    use crate::domain::ValidationError;
    use chrono::Duration;

    struct Fixture {
        appointments: AppointmentUseCase<SqliteStore, SqliteStore>,
        patient_id: String,
    }

    fn create_fixture() -> Fixture {
        let store = Arc::new(SqliteStore::in_memory().expect("Should create db"));
        let patients = PatientUseCase::new(store.clone());
        let patient = patients
            .register("Ana Morales", 34, "Femenino", "", "555-0142")
            .expect("Should register");
        Fixture {
            appointments: AppointmentUseCase::new(store.clone(), store),
            patient_id: patient.id,
        }
    }

    #[test]
    fn test_schedule_requires_existing_patient() {
        let fixture = create_fixture();
        let date = Utc::now() + Duration::days(2);

        let missing =
            fixture
                .appointments
                .schedule("missing", date, "Dr. Ríos", "Control", None);
        assert!(matches!(
            missing,
            Err(ClinicaError::NotFound { entity: "patient", .. })
        ));

        let dto = fixture
            .appointments
            .schedule(&fixture.patient_id, date, "Dr. Ríos", "Control", None)
            .expect("Should schedule");
        assert_eq!(dto.status, "scheduled");
        assert_eq!(dto.patient_id, fixture.patient_id);
    }

    #[test]
    fn test_schedule_rejects_past_date() {
        let fixture = create_fixture();
        let result = fixture.appointments.schedule(
            &fixture.patient_id,
            Utc::now() - Duration::seconds(1),
            "Dr. Ríos",
            "Control",
            None,
        );
        assert!(matches!(
            result,
            Err(ClinicaError::Validation(ValidationError::DateNotInFuture(_)))
        ));
    }

    #[test]
    fn test_complete_and_cancel_persist() {
        let fixture = create_fixture();
        let date = Utc::now() + Duration::days(2);

        let first = fixture
            .appointments
            .schedule(&fixture.patient_id, date, "Dr. Ríos", "Control", None)
            .expect("Should schedule");
        let second = fixture
            .appointments
            .schedule(&fixture.patient_id, date, "Dra. Herrera", "Vacuna", None)
            .expect("Should schedule");

        let done = fixture.appointments.complete(&first.id).expect("Should complete");
        assert_eq!(done.status, "completed");

        let dropped = fixture.appointments.cancel(&second.id).expect("Should cancel");
        assert_eq!(dropped.status, "cancelled");

        // Terminal states persist and refuse further transitions.
        let again = fixture.appointments.complete(&second.id);
        assert!(matches!(
            again,
            Err(ClinicaError::Validation(ValidationError::InvalidTransition { .. }))
        ));

        let by_patient = fixture
            .appointments
            .by_patient(&fixture.patient_id)
            .expect("Should list");
        assert_eq!(by_patient.len(), 2);
    }

    #[test]
    fn test_upcoming_uses_window_filter() {
        let fixture = create_fixture();

        let soon = fixture
            .appointments
            .schedule(
                &fixture.patient_id,
                Utc::now() + Duration::days(3),
                "Dr. Ríos",
                "Control",
                None,
            )
            .expect("Should schedule");
        fixture
            .appointments
            .schedule(
                &fixture.patient_id,
                Utc::now() + Duration::days(10),
                "Dr. Ríos",
                "Control",
                None,
            )
            .expect("Should schedule");

        let upcoming = fixture.appointments.upcoming().expect("Should filter");
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].id, soon.id);

        let wide = fixture
            .appointments
            .upcoming_within(30)
            .expect("Should filter");
        assert_eq!(wide.len(), 2);
    }
}
