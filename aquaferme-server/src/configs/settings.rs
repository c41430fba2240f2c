use std::env;
use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::configs::normalize_path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub migration_path: Option<String>,
    pub clean_start: bool,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSeed {
    pub nom: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auth {
    pub secret: String,
    /// Token lifetime in seconds
    pub expiration: u64,
    /// Account created on an empty user table
    pub admin: Option<AdminSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Iot {
    /// Seconds without traffic before a device is considered offline
    pub offline_timeout: u64,
    /// Seconds between two presence sweeps
    pub sweep_interval: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Historique {
    /// Default trailing window for statistics, in days
    pub window_days: i64,
}

impl Default for Iot {
    fn default() -> Self {
        Self {
            offline_timeout: 120,
            sweep_interval: 30,
        }
    }
}

impl Default for Historique {
    fn default() -> Self {
        Self { window_days: 30 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub database: Database,
    pub auth: Auth,
    #[serde(default)]
    pub iot: Iot,
    #[serde(default)]
    pub historique: Historique,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let mut settings: Settings = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("AQUAFERME").separator("__"))
            .build()?
            .try_deserialize()?;

        if let Some(migrate) = &settings.database.migration_path {
            if Path::new(migrate).is_dir() {
                let migrate_path = normalize_path(migrate)
                    .map_err(|e| ConfigError::Message(e.to_string()))?
                    .to_string_lossy()
                    .to_string();

                settings.database.migration_path = Some(migrate_path);
            } else {
                tracing::warn!("migration path {migrate} is not a directory, skipping migrations");
                settings.database.migration_path = None;
            }
        }

        if settings.auth.secret.is_empty() {
            return Err(ConfigError::Message("auth.secret must not be empty".into()));
        }

        Ok(settings)
    }
}
