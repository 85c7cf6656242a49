//! Clinica: clinic patient management.
//!
//! Main entry point. Opens the configured database, wires the use cases
//! and logs a report snapshot; any richer surface (CLI, GUI, API) sits
//! on top of the library crate.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use clinica::adapters::sqlite::SqliteStore;
use clinica::application::{AppointmentUseCase, ReportUseCase};
use clinica::config::Config;

fn main() -> Result<()> {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting clinica (database: {})", config.database_path);

    let store = Arc::new(SqliteStore::new(&config.database_path)?);

    let reports = ReportUseCase::new(store.clone(), store.clone(), store.clone());
    let report = reports.generate()?;
    tracing::info!(
        "{} patients on file ({} recent), {} active treatments, {} upcoming appointments",
        report.total_patients,
        report.recent_patients.len(),
        report.active_treatments,
        report.upcoming_appointments
    );

    let appointments = AppointmentUseCase::new(store.clone(), store);
    for apt in appointments.upcoming()? {
        tracing::info!(
            "Upcoming: {} with {} on {} ({})",
            apt.id,
            apt.doctor_name,
            apt.date,
            apt.reason
        );
    }

    tracing::info!("Clinica shutdown complete.");
    Ok(())
}
