use alumni_common::AlumniServerError;
use std::env;
use std::time::Duration;

pub const MONGO_URI: &str = "MONGO_URI";
pub const DATABASE_NAME: &str = "DATABASE_NAME";
pub const MONGO_CONNECT_TIMEOUT_SECS: &str = "MONGO_CONNECT_TIMEOUT_SECS";

const DEFAULT_DATABASE: &str = "alumni";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub uri: String,
    pub database: String,
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    /// Reads the process environment (after `.env` has been loaded).
    pub fn from_env() -> Result<Self, AlumniServerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AlumniServerError> {
        let uri = lookup(MONGO_URI)
            .filter(|uri| !uri.trim().is_empty())
            .ok_or_else(|| AlumniServerError::Config(format!("{} must be set", MONGO_URI)))?;
        let database = lookup(DATABASE_NAME)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());
        let connect_timeout = match lookup(MONGO_CONNECT_TIMEOUT_SECS) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                AlumniServerError::Config(format!(
                    "{} must be a whole number of seconds, got `{}`",
                    MONGO_CONNECT_TIMEOUT_SECS, raw
                ))
            })?,
            None => DEFAULT_CONNECT_TIMEOUT_SECS,
        };
        Ok(Self {
            uri,
            database,
            connect_timeout: Duration::from_secs(connect_timeout),
        })
    }
}
