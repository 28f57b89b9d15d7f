//! Application configuration module
//!
//! Handles loading and validating configuration from environment variables.

use crate::dao::GovernanceSettings;
use crate::identity::Principal;
use serde::Deserialize;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::new(0, 0, 0, 0),
            port: 3000,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3001".to_string()],
        }
    }
}

/// State persistence configuration
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// Snapshot restored at startup and written at shutdown
    pub state_file: Option<PathBuf>,
}

/// Complete application settings
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub governance: GovernanceSettings,
    /// Principals allowed to change governance settings; empty means anyone identified
    pub admins: Vec<Principal>,
    pub storage: StorageConfig,
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        let server = ServerConfig {
            host: parse_or(&lookup, "HOST", defaults.server.host)?,
            port: parse_or(&lookup, "PORT", defaults.server.port)?,
        };

        let cors = CorsConfig {
            allowed_origins: match lookup("ALLOWED_ORIGINS") {
                Some(list) => Self::parse_origins(&list)?,
                None => defaults.cors.allowed_origins,
            },
        };

        let governance = GovernanceSettings {
            min_proposal_duration: parse_or(
                &lookup,
                "MIN_PROPOSAL_DURATION_SECS",
                defaults.governance.min_proposal_duration,
            )?,
            quorum_percentage: parse_percentage(&lookup, "QUORUM_PERCENTAGE", defaults.governance.quorum_percentage)?,
            approval_threshold: parse_percentage(&lookup, "APPROVAL_THRESHOLD", defaults.governance.approval_threshold)?,
        };

        let admins = match lookup("GOVERNANCE_ADMINS") {
            Some(list) => split_list(&list)
                .map(|text| {
                    Principal::parse(text)
                        .map_err(|e| ConfigError::InvalidValue(format!("GOVERNANCE_ADMINS: {}", e)))
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let storage = StorageConfig {
            state_file: lookup("STATE_FILE")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
        };

        Ok(Self {
            server,
            cors,
            governance,
            admins,
            storage,
        })
    }

    /// Parse a comma separated list of origins (http://host:port)
    fn parse_origins(list: &str) -> Result<Vec<String>, ConfigError> {
        split_list(list)
            .map(|origin| match url::Url::parse(origin) {
                Ok(parsed) if parsed.has_host() => Ok(origin.trim_end_matches('/').to_string()),
                _ => Err(ConfigError::InvalidValue(format!(
                    "Invalid origin '{}' in ALLOWED_ORIGINS (expected scheme://host[:port])",
                    origin
                ))),
            })
            .collect()
    }
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::ParseError(format!("{} has an invalid value '{}'", key, raw))),
        None => Ok(default),
    }
}

fn parse_percentage<F>(lookup: &F, key: &str, default: u8) -> Result<u8, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(lookup, key, default)?;
    if value > 100 {
        return Err(ConfigError::InvalidValue(format!("{} cannot exceed 100", key)));
    }
    Ok(value)
}
