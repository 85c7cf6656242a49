//! Stateless domain services.
//!
//! Each service is a set of associated functions operating on entities
//! and value objects: no fields, no I/O, no hidden state. Callers hand
//! in everything a function needs and persist the results themselves.

use chrono::{DateTime, Duration, Utc};

use super::appointment::{Appointment, AppointmentStatus};
use super::dto::{AgeBreakdown, GenderBreakdown, PatientDto, PatientReport};
use super::patient::Patient;
use super::treatment::{Treatment, TreatmentStatus};
use super::value_objects::{
    Age, Contact, Diagnosis, Gender, MedicalHistory, PatientId, Prescription, ValidationError,
};

/// Default window, in days, for the upcoming-appointments filter.
pub const DEFAULT_UPCOMING_HORIZON_DAYS: i64 = 7;

/// Window, in days, within which a registration counts as recent.
const RECENT_PATIENT_DAYS: i64 = 30;

/// Validation and mutation of patients.
pub struct PatientService;

impl PatientService {
    /// Create a patient from primitive values.
    ///
    /// Each field is validated on its own (the first failure propagates,
    /// naming the field), then the assembled patient is re-checked as a
    /// whole. The aggregate re-check is practically redundant but kept
    /// as part of the contract.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] identifying the offending field.
    pub fn create(
        name: &str,
        age: u8,
        gender: &str,
        medical_history: &str,
        contact: &str,
    ) -> Result<Patient, ValidationError> {
        let age = Age::new(age)?;
        let gender: Gender = gender.parse()?;
        let medical_history = MedicalHistory::new(medical_history);
        let contact = Contact::new(contact)?;

        let patient = Patient::new(name, age, gender, medical_history, contact)?;
        if !patient.is_valid() {
            return Err(ValidationError::InvalidPatient);
        }
        Ok(patient)
    }

    /// Replace a patient's medical history. Any text is accepted.
    pub fn update_medical_history(patient: &mut Patient, new_history: &str) {
        patient.update_medical_history(MedicalHistory::new(new_history));
    }

    /// Replace a patient's contact info.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyField`] if the new contact is blank.
    pub fn update_contact(patient: &mut Patient, new_contact: &str) -> Result<(), ValidationError> {
        patient.update_contact(Contact::new(new_contact)?);
        Ok(())
    }

    /// Re-evaluate the aggregate validity predicate without failing.
    #[must_use]
    pub fn validate(patient: &Patient) -> bool {
        patient.is_valid()
    }
}

/// Scheduling and lifecycle of appointments.
pub struct AppointmentService;

impl AppointmentService {
    /// Schedule an appointment for an existing patient.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] if the date is not strictly in the
    /// future or the doctor name or reason is blank.
    pub fn create(
        patient_id: PatientId,
        date: DateTime<Utc>,
        doctor_name: &str,
        reason: &str,
        notes: Option<String>,
    ) -> Result<Appointment, ValidationError> {
        Appointment::new(patient_id, date, doctor_name, reason, notes)
    }

    /// Mark an appointment as completed.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidTransition`] if the appointment
    /// already reached a terminal state.
    pub fn complete(appointment: &mut Appointment) -> Result<(), ValidationError> {
        appointment.complete()
    }

    /// Cancel an appointment.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidTransition`] if the appointment
    /// already reached a terminal state.
    pub fn cancel(appointment: &mut Appointment) -> Result<(), ValidationError> {
        appointment.cancel()
    }

    /// Filter to scheduled appointments dated up to `horizon_days` from
    /// now. Only the upper bound is checked, so overdue appointments
    /// that were never completed or cancelled are included.
    #[must_use]
    pub fn upcoming(appointments: &[Appointment], horizon_days: i64) -> Vec<&Appointment> {
        let cutoff = Utc::now() + Duration::days(horizon_days);
        appointments
            .iter()
            .filter(|apt| apt.status == AppointmentStatus::Scheduled && apt.date <= cutoff)
            .collect()
    }
}

/// Lifecycle of treatments.
pub struct TreatmentService;

impl TreatmentService {
    /// Start a treatment for an existing patient. `start_date` defaults
    /// to the current time.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyField`] if the diagnosis or
    /// prescription is blank.
    pub fn create(
        patient_id: PatientId,
        diagnosis: &str,
        prescription: &str,
        start_date: Option<DateTime<Utc>>,
    ) -> Result<Treatment, ValidationError> {
        let diagnosis = Diagnosis::new(diagnosis)?;
        let prescription = Prescription::new(prescription)?;
        Ok(Treatment::new(patient_id, diagnosis, prescription, start_date))
    }

    /// Mark a treatment as completed, stamping its end date.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidTransition`] if the treatment
    /// already reached a terminal state.
    pub fn complete(treatment: &mut Treatment) -> Result<(), ValidationError> {
        treatment.complete()
    }

    /// Discontinue a treatment, stamping its end date.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidTransition`] if the treatment
    /// already reached a terminal state.
    pub fn discontinue(treatment: &mut Treatment) -> Result<(), ValidationError> {
        treatment.discontinue()
    }

    /// Filter to treatments that are still active.
    #[must_use]
    pub fn active_only(treatments: &[Treatment]) -> Vec<&Treatment> {
        treatments
            .iter()
            .filter(|trt| trt.status == TreatmentStatus::Active)
            .collect()
    }
}

/// Pure aggregation over the clinic's data.
pub struct ReportService;

impl ReportService {
    /// Build a point-in-time report snapshot. No external calls; the
    /// caller supplies every collection.
    #[must_use]
    pub fn generate(
        patients: &[Patient],
        appointments: &[Appointment],
        treatments: &[Treatment],
    ) -> PatientReport {
        let now = Utc::now();

        let mut patients_by_gender = GenderBreakdown::default();
        let mut patients_by_age_range = AgeBreakdown::default();
        for patient in patients {
            patients_by_gender.record(patient.gender);
            patients_by_age_range.record(patient.age);
        }

        let recent_cutoff = now - Duration::days(RECENT_PATIENT_DAYS);
        let recent_patients = patients
            .iter()
            .filter(|p| p.created_at >= recent_cutoff)
            .map(PatientDto::from_entity)
            .collect();

        let active_treatments = TreatmentService::active_only(treatments).len();

        // Unbounded future count, unlike the horizon filter above.
        let upcoming_appointments = appointments
            .iter()
            .filter(|apt| apt.status == AppointmentStatus::Scheduled && apt.date > now)
            .count();

        PatientReport {
            total_patients: patients.len(),
            patients_by_gender,
            patients_by_age_range,
            recent_patients,
            active_treatments,
            upcoming_appointments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient_with(name: &str, age: u8, gender: Gender) -> Patient {
        Patient::new(
            name,
            Age::new(age).expect("Should build"),
            gender,
            MedicalHistory::new(""),
            Contact::new("555-0100").expect("Should build"),
        )
        .expect("Should build patient")
    }

    fn backdated(mut patient: Patient, days_ago: i64) -> Patient {
        patient.created_at = Utc::now() - Duration::days(days_ago);
        patient.updated_at = patient.created_at;
        patient
    }

    fn scheduled(date: DateTime<Utc>) -> Appointment {
        Appointment::restore(
            format!("apt_test_{}", date.timestamp()),
            PatientId::generate(),
            date,
            "Dr. Ríos".to_string(),
            "Control".to_string(),
            AppointmentStatus::Scheduled,
            None,
        )
    }

    #[test]
    fn test_create_patient_validates_each_field() {
        let patient = PatientService::create("Ana", 30, "Femenino", "", "555-0100")
            .expect("Should create");
        assert!(PatientService::validate(&patient));

        assert_eq!(
            PatientService::create("Ana", 151, "Femenino", "", "555-0100"),
            Err(ValidationError::AgeOutOfRange(151))
        );
        assert_eq!(
            PatientService::create("Ana", 30, "F", "", "555-0100"),
            Err(ValidationError::UnknownGender("F".to_string()))
        );
        assert_eq!(
            PatientService::create("Ana", 30, "Femenino", "", "  "),
            Err(ValidationError::EmptyField("contact"))
        );
        assert_eq!(
            PatientService::create("", 30, "Femenino", "", "555-0100"),
            Err(ValidationError::EmptyField("name"))
        );
    }

    #[test]
    fn test_updates_keep_updated_at_non_decreasing() {
        let mut patient = patient_with("Ana", 30, Gender::Femenino);
        PatientService::update_contact(&mut patient, "555-0111").expect("Should update");
        let after_contact = patient.updated_at;
        PatientService::update_medical_history(&mut patient, "Migraña crónica");
        assert!(patient.updated_at >= after_contact);
        assert!(patient.updated_at >= patient.created_at);
    }

    #[test]
    fn test_update_contact_rejects_blank() {
        let mut patient = patient_with("Ana", 30, Gender::Femenino);
        let before = patient.updated_at;
        assert_eq!(
            PatientService::update_contact(&mut patient, " "),
            Err(ValidationError::EmptyField("contact"))
        );
        // Failed update leaves the entity untouched.
        assert_eq!(patient.updated_at, before);
        assert_eq!(patient.contact.as_str(), "555-0100");
    }

    #[test]
    fn test_upcoming_window_bounds_only_from_above() {
        let in_three_days = scheduled(Utc::now() + Duration::days(3));
        let in_ten_days = scheduled(Utc::now() + Duration::days(10));
        // Overdue but never completed or cancelled: still included.
        let yesterday = scheduled(Utc::now() - Duration::days(1));
        let mut cancelled = scheduled(Utc::now() + Duration::days(2));
        cancelled.cancel().expect("Should cancel");

        let all = vec![in_three_days, in_ten_days, yesterday, cancelled];
        let upcoming = AppointmentService::upcoming(&all, DEFAULT_UPCOMING_HORIZON_DAYS);

        let ids: Vec<&str> = upcoming.iter().map(|apt| apt.id.as_str()).collect();
        assert_eq!(upcoming.len(), 2);
        assert!(ids.contains(&all[0].id.as_str()));
        assert!(ids.contains(&all[2].id.as_str()));
    }

    #[test]
    fn test_treatment_creation_requires_diagnosis_and_prescription() {
        let patient_id = PatientId::generate();
        assert_eq!(
            TreatmentService::create(patient_id.clone(), "", "Ibuprofeno", None),
            Err(ValidationError::EmptyField("diagnosis"))
        );
        assert_eq!(
            TreatmentService::create(patient_id.clone(), "Esguince", " ", None),
            Err(ValidationError::EmptyField("prescription"))
        );

        let treatment = TreatmentService::create(patient_id, "Esguince", "Ibuprofeno", None)
            .expect("Should create");
        assert_eq!(treatment.status, TreatmentStatus::Active);
        assert!(Utc::now() - treatment.start_date < Duration::seconds(5));
    }

    #[test]
    fn test_active_only_filter() {
        let patient_id = PatientId::generate();
        let active = TreatmentService::create(patient_id.clone(), "Gripe", "Reposo", None)
            .expect("Should create");
        let mut done = TreatmentService::create(patient_id, "Otitis", "Gotas", None)
            .expect("Should create");
        TreatmentService::complete(&mut done).expect("Should complete");

        let all = vec![active, done];
        let filtered = TreatmentService::active_only(&all);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, all[0].id);
    }

    #[test]
    fn test_report_age_buckets_one_patient_each() {
        let patients: Vec<Patient> = [10u8, 25, 45, 65, 85]
            .iter()
            .map(|&age| patient_with("Paciente", age, Gender::Otro))
            .collect();

        let report = ReportService::generate(&patients, &[], &[]);
        assert_eq!(report.total_patients, 5);
        assert_eq!(report.patients_by_age_range.range_0_18, 1);
        assert_eq!(report.patients_by_age_range.range_19_30, 1);
        assert_eq!(report.patients_by_age_range.range_31_50, 1);
        assert_eq!(report.patients_by_age_range.range_51_70, 1);
        assert_eq!(report.patients_by_age_range.range_71_plus, 1);
        assert_eq!(report.patients_by_gender.count(Gender::Otro), 5);
    }

    #[test]
    fn test_report_recent_patients_window() {
        let recent = backdated(patient_with("Reciente", 40, Gender::Masculino), 5);
        let old = backdated(patient_with("Antiguo", 40, Gender::Masculino), 31);
        let recent_id = recent.id.to_string();

        let report = ReportService::generate(&[recent, old], &[], &[]);
        assert_eq!(report.recent_patients.len(), 1);
        assert_eq!(report.recent_patients[0].id, recent_id);
    }

    #[test]
    fn test_report_counts_are_point_in_time() {
        let patient = patient_with("Ana", 30, Gender::Femenino);

        // Upcoming count is unbounded in the future, unlike the
        // seven-day window filter.
        let far_future = scheduled(Utc::now() + Duration::days(60));
        let overdue = scheduled(Utc::now() - Duration::days(1));
        let mut completed = scheduled(Utc::now() + Duration::days(1));
        completed.complete().expect("Should complete");

        let active = TreatmentService::create(patient.id.clone(), "Gripe", "Reposo", None)
            .expect("Should create");
        let mut dropped = TreatmentService::create(patient.id.clone(), "Tos", "Jarabe", None)
            .expect("Should create");
        TreatmentService::discontinue(&mut dropped).expect("Should discontinue");

        let report = ReportService::generate(
            &[patient],
            &[far_future, overdue, completed],
            &[active, dropped],
        );
        assert_eq!(report.upcoming_appointments, 1);
        assert_eq!(report.active_treatments, 1);
    }
}
