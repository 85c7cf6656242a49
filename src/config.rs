//! Environment-driven configuration.

/// Database path variable; defaults to a file in the working directory.
const DB_PATH_ENV: &str = "CLINICA_DB_PATH";

/// Log filter variable; standard `tracing` filter syntax.
const LOG_ENV: &str = "CLINICA_LOG";

/// Runtime configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Where the SQLite database lives.
    pub database_path: String,
    /// Default log filter when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Config {
    /// Read the configuration, falling back to defaults for anything
    /// unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            database_path: std::env::var(DB_PATH_ENV)
                .unwrap_or_else(|_| "clinica.db".to_string()),
            log_filter: std::env::var(LOG_ENV).unwrap_or_else(|_| "info".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        // The variables are never set by other tests.
        let config = Config::from_env();
        assert_eq!(config.database_path, "clinica.db");
        assert_eq!(config.log_filter, "info");
    }
}
