//! Report use case: point-in-time aggregation over the whole clinic.

use std::sync::Arc;

use crate::domain::dto::PatientReport;
use crate::domain::services::ReportService;
use crate::ports::{AppointmentStore, PatientStore, TreatmentStore};
use crate::ClinicaError;

/// Use case producing the clinic-wide report.
pub struct ReportUseCase<P, A, T>
where
    P: PatientStore,
    A: AppointmentStore,
    T: TreatmentStore,
{
    patients: Arc<P>,
    appointments: Arc<A>,
    treatments: Arc<T>,
}

impl<P, A, T> ReportUseCase<P, A, T>
where
    P: PatientStore,
    A: AppointmentStore,
    T: TreatmentStore,
    P::Error: Into<crate::adapters::StorageError>,
    A::Error: Into<crate::adapters::StorageError>,
    T::Error: Into<crate::adapters::StorageError>,
{
    /// Create the use case over the three stores.
    pub fn new(patients: Arc<P>, appointments: Arc<A>, treatments: Arc<T>) -> Self {
        Self {
            patients,
            appointments,
            treatments,
        }
    }

    /// Load every collection and build the report snapshot.
    ///
    /// # Errors
    /// Returns error if any storage operation fails.
    pub fn generate(&self) -> Result<PatientReport, ClinicaError> {
        let patients = self
            .patients
            .find_all()
            .map_err(|e| ClinicaError::Storage(e.into()))?;
        let appointments = self
            .appointments
            .find_all()
            .map_err(|e| ClinicaError::Storage(e.into()))?;
        let treatments = self
            .treatments
            .find_all()
            .map_err(|e| ClinicaError::Storage(e.into()))?;

        let report = ReportService::generate(&patients, &appointments, &treatments);

        tracing::info!(
            "Generated report: {} patients, {} recent, {} active treatments, {} upcoming appointments",
            report.total_patients,
            report.recent_patients.len(),
            report.active_treatments,
            report.upcoming_appointments
        );

        Ok(report)
    }
}
