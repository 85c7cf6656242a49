//! Treatment entity and its status state machine.

use chrono::{DateTime, Utc};

use super::value_objects::{uuid_v4, Diagnosis, PatientId, Prescription, ValidationError};

/// Lifecycle state of a treatment.
///
/// The only allowed moves are `Active -> Completed` and
/// `Active -> Discontinued`; both targets are terminal and stamp the
/// treatment's end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreatmentStatus {
    Active,
    Completed,
    Discontinued,
}

impl TreatmentStatus {
    /// The storage/display label for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Discontinued => "discontinued",
        }
    }

    /// Whether no further transition is defined from this status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Discontinued)
    }
}

impl std::str::FromStr for TreatmentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "discontinued" => Ok(Self::Discontinued),
            other => Err(ValidationError::UnknownStatus {
                entity: "treatment",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for TreatmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A course of treatment prescribed to one patient.
///
/// Holds a non-owning reference to the patient by id.
#[derive(Debug, Clone, PartialEq)]
pub struct Treatment {
    /// Opaque unique id, `trt_` followed by a random token.
    pub id: String,
    pub patient_id: PatientId,
    pub diagnosis: Diagnosis,
    pub prescription: Prescription,
    pub start_date: DateTime<Utc>,
    /// Set when the treatment reaches a terminal state.
    pub end_date: Option<DateTime<Utc>>,
    pub status: TreatmentStatus,
}

impl Treatment {
    /// Start a new treatment. When `start_date` is `None` the current
    /// time is used.
    #[must_use]
    pub fn new(
        patient_id: PatientId,
        diagnosis: Diagnosis,
        prescription: Prescription,
        start_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: format!("trt_{}", uuid_v4()),
            patient_id,
            diagnosis,
            prescription,
            start_date: start_date.unwrap_or_else(Utc::now),
            end_date: None,
            status: TreatmentStatus::Active,
        }
    }

    /// Rebuild a treatment from persisted storage.
    #[must_use]
    pub fn restore(
        id: String,
        patient_id: PatientId,
        diagnosis: Diagnosis,
        prescription: Prescription,
        start_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
        status: TreatmentStatus,
    ) -> Self {
        Self {
            id,
            patient_id,
            diagnosis,
            prescription,
            start_date,
            end_date,
            status,
        }
    }

    /// Mark the treatment as completed, stamping the end date.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidTransition`] unless the
    /// treatment is still active.
    pub fn complete(&mut self) -> Result<(), ValidationError> {
        self.transition(TreatmentStatus::Completed)
    }

    /// Discontinue the treatment, stamping the end date.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidTransition`] unless the
    /// treatment is still active.
    pub fn discontinue(&mut self) -> Result<(), ValidationError> {
        self.transition(TreatmentStatus::Discontinued)
    }

    fn transition(&mut self, to: TreatmentStatus) -> Result<(), ValidationError> {
        if self.status != TreatmentStatus::Active {
            return Err(ValidationError::InvalidTransition {
                entity: "treatment",
                from: self.status.as_str(),
                to: to.as_str(),
            });
        }
        self.status = to;
        self.end_date = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn active_treatment() -> Treatment {
        Treatment::new(
            PatientId::generate(),
            Diagnosis::new("Hipertensión").expect("Should build"),
            Prescription::new("Enalapril 10mg").expect("Should build"),
            None,
        )
    }

    #[test]
    fn test_start_date_defaults_to_now() {
        let treatment = active_treatment();
        assert_eq!(treatment.status, TreatmentStatus::Active);
        assert!(treatment.end_date.is_none());
        assert!(Utc::now() - treatment.start_date < Duration::seconds(5));
        assert!(treatment.id.starts_with("trt_"));
    }

    #[test]
    fn test_explicit_start_date_kept() {
        let start = Utc::now() - Duration::days(3);
        let treatment = Treatment::new(
            PatientId::generate(),
            Diagnosis::new("Bronquitis").expect("Should build"),
            Prescription::new("Amoxicilina 500mg").expect("Should build"),
            Some(start),
        );
        assert_eq!(treatment.start_date, start);
    }

    #[test]
    fn test_complete_stamps_end_date() {
        let mut treatment = active_treatment();
        treatment.complete().expect("Should complete");
        assert_eq!(treatment.status, TreatmentStatus::Completed);
        let end = treatment.end_date.expect("Should have end date");
        assert!(end >= treatment.start_date);
    }

    #[test]
    fn test_discontinue_stamps_end_date() {
        let mut treatment = active_treatment();
        treatment.discontinue().expect("Should discontinue");
        assert_eq!(treatment.status, TreatmentStatus::Discontinued);
        let end = treatment.end_date.expect("Should have end date");
        assert!(end >= treatment.start_date);
    }

    #[test]
    fn test_terminal_states_reject_further_transitions() {
        let mut treatment = active_treatment();
        treatment.complete().expect("Should complete");
        assert_eq!(
            treatment.discontinue(),
            Err(ValidationError::InvalidTransition {
                entity: "treatment",
                from: "completed",
                to: "discontinued",
            })
        );
        assert_eq!(treatment.status, TreatmentStatus::Completed);
    }

    #[test]
    fn test_status_labels_roundtrip() {
        for status in [
            TreatmentStatus::Active,
            TreatmentStatus::Completed,
            TreatmentStatus::Discontinued,
        ] {
            let parsed: TreatmentStatus = status.as_str().parse().expect("Should parse");
            assert_eq!(parsed, status);
        }
        assert!("paused".parse::<TreatmentStatus>().is_err());
    }
}
