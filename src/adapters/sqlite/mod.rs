//! SQLite adapter: implementation of the storage ports.
//!
//! One store holds the connection and implements all three port traits.
//! Timestamps are stored as RFC 3339 text so date ordering works with
//! plain text comparison.
//!
//! # Mutex Behavior
//!
//! The connection is protected by a `Mutex`. A poisoned mutex (from a
//! panic in another thread) causes a panic here as well; the domain core
//! assumes a single writer.

use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use crate::domain::dto::PatientSearch;
use crate::domain::{
    Age, Appointment, AppointmentStatus, Contact, Diagnosis, Gender, MedicalHistory, Patient,
    PatientId, Prescription, Treatment, TreatmentStatus,
};
use crate::ports::{AppointmentStore, PatientStore, TreatmentStore};

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("corrupt stored value: {0}")]
    Corrupt(String),
}

/// SQLite storage for patients, appointments and treatments.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

type PatientRow = (String, String, i64, String, String, String, String, String);
type AppointmentRow = (String, String, String, String, String, String, Option<String>);
type TreatmentRow = (String, String, String, String, String, Option<String>, String);

const PATIENT_COLUMNS: &str =
    "id, nombre, edad, genero, historial_medico, contacto, created_at, updated_at";
const APPOINTMENT_COLUMNS: &str = "id, patient_id, fecha, doctor, razon, estado, notas";
const TREATMENT_COLUMNS: &str =
    "id, patient_id, diagnostico, prescripcion, fecha_inicio, fecha_fin, estado";

impl SqliteStore {
    /// Open (or create) a database at the given path.
    ///
    /// # Errors
    /// Returns error if the database cannot be opened or initialized.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory database (for testing).
    ///
    /// # Errors
    /// Returns error if the database cannot be created.
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.conn.lock().expect("Lock failed");

        // The bundled SQLite is built with SQLITE_DEFAULT_FOREIGN_KEYS=1, which
        // flips SQLite's documented default (enforcement OFF). This code relies
        // on the standard default, so restore it explicitly.
        conn.pragma_update(None, "foreign_keys", false)?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS pacientes (
                id TEXT PRIMARY KEY,
                nombre TEXT NOT NULL,
                edad INTEGER NOT NULL,
                genero TEXT NOT NULL,
                historial_medico TEXT NOT NULL,
                contacto TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS citas (
                id TEXT PRIMARY KEY,
                patient_id TEXT NOT NULL REFERENCES pacientes(id),
                fecha TEXT NOT NULL,
                doctor TEXT NOT NULL,
                razon TEXT NOT NULL,
                estado TEXT NOT NULL,
                notas TEXT
            );

            CREATE TABLE IF NOT EXISTS tratamientos (
                id TEXT PRIMARY KEY,
                patient_id TEXT NOT NULL REFERENCES pacientes(id),
                diagnostico TEXT NOT NULL,
                prescripcion TEXT NOT NULL,
                fecha_inicio TEXT NOT NULL,
                fecha_fin TEXT,
                estado TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_citas_patient ON citas(patient_id);
            CREATE INDEX IF NOT EXISTS idx_tratamientos_patient ON tratamientos(patient_id);
            ",
        )?;

        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::Corrupt(format!("bad timestamp '{raw}': {e}")))
}

fn patient_from_row(row: PatientRow) -> Result<Patient, StorageError> {
    let (id, nombre, edad, genero, historial, contacto, created_at, updated_at) = row;

    let age = u8::try_from(edad)
        .ok()
        .and_then(|v| Age::new(v).ok())
        .ok_or_else(|| StorageError::Corrupt(format!("bad age {edad}")))?;
    let gender = Gender::from_str(&genero).map_err(|e| StorageError::Corrupt(e.to_string()))?;
    let contact = Contact::new(contacto).map_err(|e| StorageError::Corrupt(e.to_string()))?;

    Ok(Patient::restore(
        PatientId::from_string(id),
        nombre,
        age,
        gender,
        MedicalHistory::new(historial),
        contact,
        parse_timestamp(&created_at)?,
        parse_timestamp(&updated_at)?,
    ))
}

fn appointment_from_row(row: AppointmentRow) -> Result<Appointment, StorageError> {
    let (id, patient_id, fecha, doctor, razon, estado, notas) = row;

    let status =
        AppointmentStatus::from_str(&estado).map_err(|e| StorageError::Corrupt(e.to_string()))?;

    Ok(Appointment::restore(
        id,
        PatientId::from_string(patient_id),
        parse_timestamp(&fecha)?,
        doctor,
        razon,
        status,
        notas,
    ))
}

fn treatment_from_row(row: TreatmentRow) -> Result<Treatment, StorageError> {
    let (id, patient_id, diagnostico, prescripcion, fecha_inicio, fecha_fin, estado) = row;

    let diagnosis =
        Diagnosis::new(diagnostico).map_err(|e| StorageError::Corrupt(e.to_string()))?;
    let prescription =
        Prescription::new(prescripcion).map_err(|e| StorageError::Corrupt(e.to_string()))?;
    let status =
        TreatmentStatus::from_str(&estado).map_err(|e| StorageError::Corrupt(e.to_string()))?;
    let end_date = fecha_fin.as_deref().map(parse_timestamp).transpose()?;

    Ok(Treatment::restore(
        id,
        PatientId::from_string(patient_id),
        diagnosis,
        prescription,
        parse_timestamp(&fecha_inicio)?,
        end_date,
        status,
    ))
}

impl PatientStore for SqliteStore {
    type Error = StorageError;

    fn save(&self, patient: &Patient) -> Result<(), Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");

        conn.execute(
            r"
            INSERT OR REPLACE INTO pacientes (
                id, nombre, edad, genero, historial_medico, contacto,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
            params![
                patient.id.as_str(),
                patient.name,
                i64::from(patient.age.value()),
                patient.gender.as_str(),
                patient.medical_history.as_str(),
                patient.contact.as_str(),
                patient.created_at.to_rfc3339(),
                patient.updated_at.to_rfc3339(),
            ],
        )?;

        tracing::debug!("Saved patient {}", patient.id);
        Ok(())
    }

    fn find_by_id(&self, id: &PatientId) -> Result<Option<Patient>, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");

        let row: Option<PatientRow> = conn
            .query_row(
                &format!("SELECT {PATIENT_COLUMNS} FROM pacientes WHERE id = ?1"),
                params![id.as_str()],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                        row.get(7)?,
                    ))
                },
            )
            .optional()?;

        row.map(patient_from_row).transpose()
    }

    fn find_all(&self) -> Result<Vec<Patient>, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");

        let mut stmt =
            conn.prepare(&format!("SELECT {PATIENT_COLUMNS} FROM pacientes ORDER BY nombre"))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                ))
            })?
            .collect::<Result<Vec<PatientRow>, _>>()?;

        rows.into_iter().map(patient_from_row).collect()
    }

    fn search(&self, criteria: &PatientSearch) -> Result<Vec<Patient>, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");

        let mut sql = format!("SELECT {PATIENT_COLUMNS} FROM pacientes WHERE 1=1");
        let mut values: Vec<Value> = Vec::new();

        if let Some(name) = &criteria.name {
            sql.push_str(" AND nombre LIKE ?");
            values.push(Value::Text(format!("%{name}%")));
        }
        if let Some(age_min) = criteria.age_min {
            sql.push_str(" AND edad >= ?");
            values.push(Value::Integer(i64::from(age_min)));
        }
        if let Some(age_max) = criteria.age_max {
            sql.push_str(" AND edad <= ?");
            values.push(Value::Integer(i64::from(age_max)));
        }
        if let Some(gender) = criteria.gender {
            sql.push_str(" AND genero = ?");
            values.push(Value::Text(gender.as_str().to_string()));
        }
        if let Some(contact) = &criteria.contact {
            sql.push_str(" AND contacto LIKE ?");
            values.push(Value::Text(format!("%{contact}%")));
        }
        sql.push_str(" ORDER BY nombre");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                ))
            })?
            .collect::<Result<Vec<PatientRow>, _>>()?;

        rows.into_iter().map(patient_from_row).collect()
    }

    fn delete(&self, id: &PatientId) -> Result<bool, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");
        let affected = conn.execute("DELETE FROM pacientes WHERE id = ?1", params![id.as_str()])?;
        if affected > 0 {
            tracing::info!("Deleted patient {id}");
        }
        Ok(affected > 0)
    }
}

impl AppointmentStore for SqliteStore {
    type Error = StorageError;

    fn save(&self, appointment: &Appointment) -> Result<(), Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");

        conn.execute(
            r"
            INSERT OR REPLACE INTO citas (
                id, patient_id, fecha, doctor, razon, estado, notas
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
            params![
                appointment.id,
                appointment.patient_id.as_str(),
                appointment.date.to_rfc3339(),
                appointment.doctor_name,
                appointment.reason,
                appointment.status.as_str(),
                appointment.notes,
            ],
        )?;

        tracing::debug!("Saved appointment {}", appointment.id);
        Ok(())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Appointment>, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");

        let row: Option<AppointmentRow> = conn
            .query_row(
                &format!("SELECT {APPOINTMENT_COLUMNS} FROM citas WHERE id = ?1"),
                params![id],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                    ))
                },
            )
            .optional()?;

        row.map(appointment_from_row).transpose()
    }

    fn find_all(&self) -> Result<Vec<Appointment>, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");

        let mut stmt =
            conn.prepare(&format!("SELECT {APPOINTMENT_COLUMNS} FROM citas ORDER BY fecha"))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            })?
            .collect::<Result<Vec<AppointmentRow>, _>>()?;

        rows.into_iter().map(appointment_from_row).collect()
    }

    fn find_by_patient(&self, patient_id: &PatientId) -> Result<Vec<Appointment>, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");

        let mut stmt = conn.prepare(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM citas WHERE patient_id = ?1 ORDER BY fecha"
        ))?;
        let rows = stmt
            .query_map(params![patient_id.as_str()], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            })?
            .collect::<Result<Vec<AppointmentRow>, _>>()?;

        rows.into_iter().map(appointment_from_row).collect()
    }
}

impl TreatmentStore for SqliteStore {
    type Error = StorageError;

    fn save(&self, treatment: &Treatment) -> Result<(), Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");

        conn.execute(
            r"
            INSERT OR REPLACE INTO tratamientos (
                id, patient_id, diagnostico, prescripcion, fecha_inicio,
                fecha_fin, estado
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
            params![
                treatment.id,
                treatment.patient_id.as_str(),
                treatment.diagnosis.as_str(),
                treatment.prescription.as_str(),
                treatment.start_date.to_rfc3339(),
                treatment.end_date.map(|dt| dt.to_rfc3339()),
                treatment.status.as_str(),
            ],
        )?;

        tracing::debug!("Saved treatment {}", treatment.id);
        Ok(())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Treatment>, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");

        let row: Option<TreatmentRow> = conn
            .query_row(
                &format!("SELECT {TREATMENT_COLUMNS} FROM tratamientos WHERE id = ?1"),
                params![id],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                    ))
                },
            )
            .optional()?;

        row.map(treatment_from_row).transpose()
    }

    fn find_all(&self) -> Result<Vec<Treatment>, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");

        let mut stmt = conn.prepare(&format!(
            "SELECT {TREATMENT_COLUMNS} FROM tratamientos ORDER BY fecha_inicio"
        ))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            })?
            .collect::<Result<Vec<TreatmentRow>, _>>()?;

        rows.into_iter().map(treatment_from_row).collect()
    }

    fn find_by_patient(&self, patient_id: &PatientId) -> Result<Vec<Treatment>, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");

        let mut stmt = conn.prepare(&format!(
            "SELECT {TREATMENT_COLUMNS} FROM tratamientos WHERE patient_id = ?1 ORDER BY fecha_inicio"
        ))?;
        let rows = stmt
            .query_map(params![patient_id.as_str()], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            })?
            .collect::<Result<Vec<TreatmentRow>, _>>()?;

        rows.into_iter().map(treatment_from_row).collect()
    }
}
