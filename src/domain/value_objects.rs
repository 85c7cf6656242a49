//! Validated value objects for the patient domain.
//!
//! Each type checks its invariant at construction and is immutable
//! afterwards, so a held value is always safe to share. Construction
//! failures are reported as [`ValidationError`] values, never panics.

use serde::{Deserialize, Serialize};

/// Placeholder shown for an empty medical history.
pub const NO_HISTORY: &str = "Sin historial médico";

/// Error produced when a value object or entity transition violates an
/// invariant. The variant identifies the offending field or constraint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("age {0} out of range [0, 150]")]
    AgeOutOfRange(u8),

    #[error("gender '{0}' must be one of: Masculino, Femenino, Otro")]
    UnknownGender(String),

    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("appointment date {0} is not in the future")]
    DateNotInFuture(chrono::DateTime<chrono::Utc>),

    #[error("patient data failed aggregate validation")]
    InvalidPatient,

    #[error("cannot transition {entity} from '{from}' to '{to}'")]
    InvalidTransition {
        entity: &'static str,
        from: &'static str,
        to: &'static str,
    },

    #[error("unknown {entity} status '{value}'")]
    UnknownStatus { entity: &'static str, value: String },
}

/// Opaque unique identifier for a patient.
///
/// Generated once at registration and never reassigned. Externally
/// supplied ids (from storage or another layer) are wrapped verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatientId(String);

impl PatientId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid_v4())
    }

    /// Wrap an externally supplied identifier verbatim.
    #[must_use]
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PatientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Patient age in whole years, restricted to `[0, 150]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Age(u8);

impl Age {
    /// Create an age, rejecting values above 150.
    ///
    /// # Errors
    /// Returns [`ValidationError::AgeOutOfRange`] for values outside `[0, 150]`.
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if value > 150 {
            return Err(ValidationError::AgeOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// The age in years.
    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Re-check the range invariant.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.0 <= 150
    }
}

impl std::fmt::Display for Age {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Patient gender, a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "Masculino")]
    Masculino,
    #[serde(rename = "Femenino")]
    Femenino,
    #[serde(rename = "Otro")]
    Otro,
}

impl Gender {
    /// All accepted values, in display form.
    pub const ALL: [Gender; 3] = [Gender::Masculino, Gender::Femenino, Gender::Otro];

    /// The display label for this gender.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Masculino => "Masculino",
            Self::Femenino => "Femenino",
            Self::Otro => "Otro",
        }
    }

    /// Genders are valid by construction; kept for the aggregate check.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        true
    }
}

impl std::str::FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Masculino" => Ok(Self::Masculino),
            "Femenino" => Ok(Self::Femenino),
            "Otro" => Ok(Self::Otro),
            other => Err(ValidationError::UnknownGender(other.to_string())),
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Patient contact information: any non-blank string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact(String);

impl Contact {
    /// Create contact info, rejecting blank input.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyField`] if the value is empty or
    /// whitespace-only.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::EmptyField("contact"));
        }
        Ok(Self(value))
    }

    /// The contact info as entered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Re-check the non-blank invariant.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

impl std::fmt::Display for Contact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Free-text medical history. Any content is accepted, including none;
/// an empty history displays as [`NO_HISTORY`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicalHistory(String);

impl MedicalHistory {
    /// Wrap a history text; always succeeds.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw history text (possibly empty).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for MedicalHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            write!(f, "{NO_HISTORY}")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Medical diagnosis text: non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosis(String);

impl Diagnosis {
    /// Create a diagnosis, rejecting blank input.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyField`] if the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::EmptyField("diagnosis"));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Prescription text: non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prescription(String);

impl Prescription {
    /// Create a prescription, rejecting blank input.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyField`] if the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::EmptyField("prescription"));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Prescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generate a simple UUID v4 (random) using CSPRNG.
///
/// Uses ChaCha20Rng seeded from OS entropy so identifiers are unique and
/// unpredictable on all platforms, including under rapid successive
/// creation.
pub(crate) fn uuid_v4() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 16] = rng.gen();

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        (bytes[6] & 0x0f) | 0x40, bytes[7],
        (bytes[8] & 0x3f) | 0x80, bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}
