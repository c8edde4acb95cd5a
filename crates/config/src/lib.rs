use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

/// Which user store the service runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Sqlite,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" | "inmemory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!("unknown storage backend '{other}', expected 'memory' or 'sqlite'")),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_host: String,
    pub api_port: u16,
    pub storage_backend: StorageBackend,
    pub database_path: String,
    pub seed_demo_users: bool,
}

impl Config {
    /// Load configuration from the process environment, reading a `.env`
    /// file first if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source; unset variables
    /// fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        Ok(Config {
            api_host: var("API_HOST", "127.0.0.1"),
            api_port: parse("API_PORT", &var("API_PORT", "3000"))?,
            storage_backend: parse("STORAGE_BACKEND", &var("STORAGE_BACKEND", "memory"))?,
            database_path: var("DATABASE_PATH", "practice.db"),
            seed_demo_users: parse_flag("SEED_DEMO_USERS", &var("SEED_DEMO_USERS", "false"))?,
        })
    }

    pub fn api_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

fn parse<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        message: e.to_string(),
    })
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::Invalid {
            name,
            message: format!("expected a boolean, got '{other}'"),
        }),
    }
}
