use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::db::DEFAULT_MAX_POOL_SIZE;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_pool_size: u32,
    pub server_host: String,
    pub server_port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub cors_allowed_origin: Option<String>,
    pub enforce_team_rules: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "./hiring.db".to_string());
        let database_max_pool_size = match env::var("DATABASE_MAX_POOL_SIZE") {
            Ok(value) => parse_pool_size(&value)?,
            Err(_) => DEFAULT_MAX_POOL_SIZE,
        };
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let server_port = env::var("SERVER_PORT")
            .or_else(|_| env::var("PORT"))
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .context("SERVER_PORT must be a valid u16")?;
        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));
        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(value) => value
                .parse()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };
        let cors_allowed_origin = env::var("CORS_ALLOWED_ORIGIN").ok();
        let enforce_team_rules = env::var("ENFORCE_TEAM_RULES")
            .map(|v| parse_flag(&v))
            .unwrap_or(true);

        Ok(Self {
            database_url,
            database_max_pool_size,
            server_host,
            server_port,
            upload_dir,
            max_upload_bytes,
            cors_allowed_origin,
            enforce_team_rules,
        })
    }

    /// Filesystem path handed to the SQLite connection manager.
    pub fn database_path(&self) -> &str {
        sqlite_path(&self.database_url)
    }
}

fn sqlite_path(raw: &str) -> &str {
    raw.strip_prefix("sqlite://")
        .or_else(|| raw.strip_prefix("sqlite:"))
        .unwrap_or(raw)
}

fn parse_pool_size(value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .context("DATABASE_MAX_POOL_SIZE must be an integer")
}

fn parse_flag(value: &str) -> bool {
    !(value == "0" || value.eq_ignore_ascii_case("false") || value.eq_ignore_ascii_case("no"))
}
