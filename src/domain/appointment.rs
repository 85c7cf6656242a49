//! Appointment entity and its status state machine.

use chrono::{DateTime, Utc};

use super::value_objects::{uuid_v4, PatientId, ValidationError};

/// Lifecycle state of an appointment.
///
/// The only allowed moves are `Scheduled -> Completed` and
/// `Scheduled -> Cancelled`; both targets are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// The storage/display label for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether no further transition is defined from this status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ValidationError::UnknownStatus {
                entity: "appointment",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A scheduled visit for one patient.
///
/// Holds a non-owning reference to the patient by id.
#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    /// Opaque unique id, `apt_` followed by a random token.
    pub id: String,
    pub patient_id: PatientId,
    /// Visit date; strictly in the future at scheduling time. Not
    /// re-checked afterwards.
    pub date: DateTime<Utc>,
    pub doctor_name: String,
    pub reason: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

impl Appointment {
    /// Schedule a new appointment.
    ///
    /// # Errors
    /// Returns [`ValidationError::DateNotInFuture`] if `date` is not
    /// strictly after the current time, or
    /// [`ValidationError::EmptyField`] if the doctor name or reason is
    /// blank.
    pub fn new(
        patient_id: PatientId,
        date: DateTime<Utc>,
        doctor_name: impl Into<String>,
        reason: impl Into<String>,
        notes: Option<String>,
    ) -> Result<Self, ValidationError> {
        if date <= Utc::now() {
            return Err(ValidationError::DateNotInFuture(date));
        }
        let doctor_name = doctor_name.into();
        if doctor_name.trim().is_empty() {
            return Err(ValidationError::EmptyField("doctor_name"));
        }
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(ValidationError::EmptyField("reason"));
        }
        Ok(Self {
            id: format!("apt_{}", uuid_v4()),
            patient_id,
            date,
            doctor_name,
            reason,
            status: AppointmentStatus::Scheduled,
            notes,
        })
    }

    /// Rebuild an appointment from persisted storage.
    #[must_use]
    pub fn restore(
        id: String,
        patient_id: PatientId,
        date: DateTime<Utc>,
        doctor_name: String,
        reason: String,
        status: AppointmentStatus,
        notes: Option<String>,
    ) -> Self {
        Self {
            id,
            patient_id,
            date,
            doctor_name,
            reason,
            status,
            notes,
        }
    }

    /// Mark the appointment as completed.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidTransition`] unless the
    /// appointment is still scheduled.
    pub fn complete(&mut self) -> Result<(), ValidationError> {
        self.transition(AppointmentStatus::Completed)
    }

    /// Cancel the appointment.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidTransition`] unless the
    /// appointment is still scheduled.
    pub fn cancel(&mut self) -> Result<(), ValidationError> {
        self.transition(AppointmentStatus::Cancelled)
    }

    fn transition(&mut self, to: AppointmentStatus) -> Result<(), ValidationError> {
        if self.status != AppointmentStatus::Scheduled {
            return Err(ValidationError::InvalidTransition {
                entity: "appointment",
                from: self.status.as_str(),
                to: to.as_str(),
            });
        }
        self.status = to;
        Ok(())
    }
}
