// pgvault/src/config/mod.rs
use std::env;
use std::path::PathBuf;

use crate::errors::{BackupError, Result};

/// Fixed spool directory for dump files unless overridden via
/// PGVAULT_SPOOL_DIR.
const DEFAULT_SPOOL_DIR: &str = "/tmp/pgvault";

const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_DB_USER: &str = "postgres";

/// Connection parameters for the source cluster. The password is handed to
/// pg_dumpall through its environment only, never on the command line.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

/// Destination bucket plus the non-interactive credentials used to reach it.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket_name: String,
    pub endpoint_url: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub spool_dir: PathBuf,
}

impl AppConfig {
    /// Reads the full configuration from the process environment. Called once
    /// at startup; every component receives this struct explicitly and never
    /// touches the environment itself.
    pub fn from_env() -> Result<Self> {
        let database = DatabaseConfig {
            host: env::var("PGHOST").unwrap_or_else(|_| DEFAULT_DB_HOST.to_string()),
            port: parse_port(env::var("PGPORT").ok())?,
            user: env::var("PGUSER").unwrap_or_else(|_| DEFAULT_DB_USER.to_string()),
            password: required("PGPASSWORD", env::var("PGPASSWORD").ok())?,
        };

        let storage = StorageConfig {
            bucket_name: required("PGVAULT_S3_BUCKET", env::var("PGVAULT_S3_BUCKET").ok())?,
            endpoint_url: required(
                "PGVAULT_S3_ENDPOINT_URL",
                env::var("PGVAULT_S3_ENDPOINT_URL").ok(),
            )?,
            region: required("PGVAULT_S3_REGION", env::var("PGVAULT_S3_REGION").ok())?,
            access_key_id: required(
                "PGVAULT_S3_ACCESS_KEY_ID",
                env::var("PGVAULT_S3_ACCESS_KEY_ID").ok(),
            )?,
            secret_access_key: required(
                "PGVAULT_S3_SECRET_ACCESS_KEY",
                env::var("PGVAULT_S3_SECRET_ACCESS_KEY").ok(),
            )?,
        };

        let spool_dir = env::var("PGVAULT_SPOOL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SPOOL_DIR));

        Ok(AppConfig {
            database,
            storage,
            spool_dir,
        })
    }
}

fn required(name: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(BackupError::Config(format!("{name} must be set"))),
    }
}

fn parse_port(raw: Option<String>) -> Result<u16> {
    match raw {
        None => Ok(DEFAULT_DB_PORT),
        Some(s) => s.trim().parse().map_err(|_| {
            BackupError::Config(format!("PGPORT is not a valid port number: {s}"))
        }),
    }
}
