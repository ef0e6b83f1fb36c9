//! Server Configuration
//!
//! All settings come from environment variables (with a `.env` file loaded
//! at startup) and fall back to development defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::notify::SmtpConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory for everything the server persists
    pub work_dir: String,
    /// HTTP listen port
    pub http_port: u16,
    /// "development" | "production"
    pub environment: String,
    /// tracing filter directive
    pub log_level: String,
    /// Write logs to a daily-rolling file under work_dir/logs
    pub log_to_file: bool,
    /// Outbound mail relay
    #[serde(skip)]
    pub smtp: Option<SmtpConfig>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./souk_data".to_string()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_to_file: std::env::var("LOG_TO_FILE")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(false),
            smtp: Some(SmtpConfig::from_env()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Create the work directory layout if missing
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }

    pub fn smtp(&self) -> SmtpConfig {
        self.smtp.clone().unwrap_or_else(SmtpConfig::disabled)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
