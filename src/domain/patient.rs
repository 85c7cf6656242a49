//! Patient entity.
//!
//! A patient keeps its identity for its whole lifetime; all attribute
//! changes go through mutation methods that revalidate the new value and
//! refresh `updated_at`.

use chrono::{DateTime, Utc};

use super::value_objects::{Age, Contact, Gender, MedicalHistory, PatientId, ValidationError};

/// A registered patient.
#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    /// Unique identity, generated at registration.
    pub id: PatientId,
    /// Full name (required, non-blank).
    pub name: String,
    pub age: Age,
    pub gender: Gender,
    pub medical_history: MedicalHistory,
    pub contact: Contact,
    /// Registration instant.
    pub created_at: DateTime<Utc>,
    /// Last mutation instant; never decreases.
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Create a new patient with a freshly generated identifier and
    /// current timestamps.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyField`] if the name is blank.
    pub fn new(
        name: impl Into<String>,
        age: Age,
        gender: Gender,
        medical_history: MedicalHistory,
        contact: Contact,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        let now = Utc::now();
        Ok(Self {
            id: PatientId::generate(),
            name,
            age,
            gender,
            medical_history,
            contact,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild a patient from persisted storage, keeping the stored
    /// identifier and timestamps.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: PatientId,
        name: String,
        age: Age,
        gender: Gender,
        medical_history: MedicalHistory,
        contact: Contact,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            age,
            gender,
            medical_history,
            contact,
            created_at,
            updated_at,
        }
    }

    /// Replace the medical history and refresh `updated_at`.
    pub fn update_medical_history(&mut self, new_history: MedicalHistory) {
        self.medical_history = new_history;
        self.touch();
    }

    /// Replace the contact info and refresh `updated_at`.
    pub fn update_contact(&mut self, new_contact: Contact) {
        self.contact = new_contact;
        self.touch();
    }

    /// Check the aggregate validity predicate: name present and every
    /// required field valid (medical history is always valid).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
            && self.age.is_valid()
            && self.gender.is_valid()
            && self.contact.is_valid()
    }

    // updated_at must never go backwards, even if the clock does.
    fn touch(&mut self) {
        self.updated_at = self.updated_at.max(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_patient() -> Patient {
        Patient::new(
            "Ana Morales",
            Age::new(34).expect("Should build"),
            Gender::Femenino,
            MedicalHistory::new(""),
            Contact::new("555-0142").expect("Should build"),
        )
        .expect("Should build patient")
    }

    #[test]
    fn test_new_patient_gets_id_and_timestamps() {
        let patient = sample_patient();
        assert_eq!(patient.id.as_str().len(), 36);
        assert_eq!(patient.created_at, patient.updated_at);
        assert!(patient.is_valid());
    }

    #[test]
    fn test_blank_name_rejected() {
        let result = Patient::new(
            "  ",
            Age::new(34).expect("Should build"),
            Gender::Femenino,
            MedicalHistory::new(""),
            Contact::new("555-0142").expect("Should build"),
        );
        assert_eq!(result, Err(ValidationError::EmptyField("name")));
    }

    #[test]
    fn test_mutations_bump_updated_at_monotonically() {
        let mut patient = sample_patient();
        let created = patient.created_at;

        patient.update_contact(Contact::new("555-0143").expect("Should build"));
        let after_contact = patient.updated_at;
        assert!(after_contact >= created);

        patient.update_medical_history(MedicalHistory::new("Asma leve"));
        assert!(patient.updated_at >= after_contact);
        assert_eq!(patient.medical_history.as_str(), "Asma leve");
        assert_eq!(patient.contact.as_str(), "555-0143");
    }

    #[test]
    fn test_restore_keeps_stored_identity() {
        let original = sample_patient();
        let restored = Patient::restore(
            PatientId::from_string(original.id.as_str()),
            original.name.clone(),
            original.age,
            original.gender,
            original.medical_history.clone(),
            original.contact.clone(),
            original.created_at,
            original.updated_at,
        );
        assert_eq!(restored, original);
    }
}
