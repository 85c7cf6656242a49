//! Flat transfer records for exchange with external layers.
//!
//! Entities never cross the crate boundary directly; these records carry
//! their flattened form and are the serialization surface. Search
//! criteria and report shapes live here as well.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::appointment::Appointment;
use super::patient::Patient;
use super::treatment::Treatment;
use super::value_objects::{Age, Gender};

/// Flattened patient record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDto {
    pub id: String,
    pub name: String,
    pub age: u8,
    pub gender: String,
    pub medical_history: String,
    pub contact: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PatientDto {
    /// Flatten a patient entity.
    #[must_use]
    pub fn from_entity(patient: &Patient) -> Self {
        Self {
            id: patient.id.to_string(),
            name: patient.name.clone(),
            age: patient.age.value(),
            gender: patient.gender.as_str().to_string(),
            medical_history: patient.medical_history.as_str().to_string(),
            contact: patient.contact.as_str().to_string(),
            created_at: patient.created_at,
            updated_at: patient.updated_at,
        }
    }
}

/// Flattened appointment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDto {
    pub id: String,
    pub patient_id: String,
    pub date: DateTime<Utc>,
    pub doctor_name: String,
    pub reason: String,
    pub status: String,
    pub notes: Option<String>,
}

impl AppointmentDto {
    /// Flatten an appointment entity.
    #[must_use]
    pub fn from_entity(appointment: &Appointment) -> Self {
        Self {
            id: appointment.id.clone(),
            patient_id: appointment.patient_id.to_string(),
            date: appointment.date,
            doctor_name: appointment.doctor_name.clone(),
            reason: appointment.reason.clone(),
            status: appointment.status.as_str().to_string(),
            notes: appointment.notes.clone(),
        }
    }
}

/// Flattened treatment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentDto {
    pub id: String,
    pub patient_id: String,
    pub diagnosis: String,
    pub prescription: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: String,
}

impl TreatmentDto {
    /// Flatten a treatment entity.
    #[must_use]
    pub fn from_entity(treatment: &Treatment) -> Self {
        Self {
            id: treatment.id.clone(),
            patient_id: treatment.patient_id.to_string(),
            diagnosis: treatment.diagnosis.as_str().to_string(),
            prescription: treatment.prescription.as_str().to_string(),
            start_date: treatment.start_date,
            end_date: treatment.end_date,
            status: treatment.status.as_str().to_string(),
        }
    }
}

/// Optional, conjunctive patient search criteria. Absent criteria impose
/// no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientSearch {
    /// Name substring.
    pub name: Option<String>,
    /// Inclusive lower age bound.
    pub age_min: Option<u8>,
    /// Inclusive upper age bound.
    pub age_max: Option<u8>,
    /// Exact gender.
    pub gender: Option<Gender>,
    /// Contact substring.
    pub contact: Option<String>,
}

impl PatientSearch {
    /// Whether no criterion is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age_min.is_none()
            && self.age_max.is_none()
            && self.gender.is_none()
            && self.contact.is_none()
    }
}

/// Patient counts per gender. The category set is closed, so the
/// breakdown is a fixed struct rather than an open map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenderBreakdown {
    #[serde(rename = "Masculino")]
    pub masculino: usize,
    #[serde(rename = "Femenino")]
    pub femenino: usize,
    #[serde(rename = "Otro")]
    pub otro: usize,
}

impl GenderBreakdown {
    /// Count one patient of the given gender.
    pub fn record(&mut self, gender: Gender) {
        match gender {
            Gender::Masculino => self.masculino += 1,
            Gender::Femenino => self.femenino += 1,
            Gender::Otro => self.otro += 1,
        }
    }

    /// The count for one gender.
    #[must_use]
    pub fn count(&self, gender: Gender) -> usize {
        match gender {
            Gender::Masculino => self.masculino,
            Gender::Femenino => self.femenino,
            Gender::Otro => self.otro,
        }
    }
}

/// Patient counts per fixed, inclusive age bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AgeBreakdown {
    #[serde(rename = "0-18")]
    pub range_0_18: usize,
    #[serde(rename = "19-30")]
    pub range_19_30: usize,
    #[serde(rename = "31-50")]
    pub range_31_50: usize,
    #[serde(rename = "51-70")]
    pub range_51_70: usize,
    #[serde(rename = "71+")]
    pub range_71_plus: usize,
}

impl AgeBreakdown {
    /// Count one patient of the given age into its bucket.
    pub fn record(&mut self, age: Age) {
        match age.value() {
            0..=18 => self.range_0_18 += 1,
            19..=30 => self.range_19_30 += 1,
            31..=50 => self.range_31_50 += 1,
            51..=70 => self.range_51_70 += 1,
            _ => self.range_71_plus += 1,
        }
    }
}

/// Point-in-time aggregate report over the whole clinic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientReport {
    pub total_patients: usize,
    pub patients_by_gender: GenderBreakdown,
    pub patients_by_age_range: AgeBreakdown,
    /// Patients registered within the last 30 days.
    pub recent_patients: Vec<PatientDto>,
    pub active_treatments: usize,
    /// Scheduled appointments dated strictly after the report instant,
    /// with no upper bound.
    pub upcoming_appointments: usize,
}
