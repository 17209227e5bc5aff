//! Configuration management for streakboard.
//!
//! Configuration can be set via environment variables:
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `DATA_DIR` - Optional. Directory holding the per-user CSV logs. Defaults to current directory.
//! - `USERS` - Optional. Comma-separated participant names. Defaults to `Deep,Prayas,Shivanshu`.
//! - `CHALLENGE_DAYS` - Optional. Length of the challenge. Defaults to `75`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("USERS must name at least one participant")]
    NoUsers,
}

/// Application configuration.
///
/// The participant list and their storage paths are resolved here once at
/// startup and injected into the handlers, rather than read from globals.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Directory holding the per-user CSV record logs
    pub data_dir: PathBuf,

    /// Fixed participant list; users are not dynamically registered
    pub users: Vec<String>,

    /// Challenge length in days, used for the progress fraction
    pub challenge_days: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `PORT` or `CHALLENGE_DAYS` do not
    /// parse, and `ConfigError::NoUsers` if `USERS` is set but names nobody.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        let users = parse_user_list(
            &std::env::var("USERS").unwrap_or_else(|_| "Deep,Prayas,Shivanshu".to_string()),
        )?;

        let challenge_days = std::env::var("CHALLENGE_DAYS")
            .unwrap_or_else(|_| "75".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("CHALLENGE_DAYS".to_string(), format!("{}", e))
            })?;

        Ok(Self {
            host,
            port,
            data_dir,
            users,
            challenge_days,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(data_dir: PathBuf, users: Vec<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            data_dir,
            users,
            challenge_days: 75,
        }
    }

    /// Path of one user's CSV record log.
    pub fn log_path(&self, user: &str) -> PathBuf {
        self.data_dir.join(format!("{}_tasks.csv", user))
    }
}

/// Split a comma-separated user list, trimming whitespace and dropping empties.
fn parse_user_list(raw: &str) -> Result<Vec<String>, ConfigError> {
    let users: Vec<String> = raw
        .split(',')
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .collect();

    if users.is_empty() {
        return Err(ConfigError::NoUsers);
    }
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_list_trims_and_drops_empties() {
        let users = parse_user_list(" Deep, Prayas ,,Shivanshu ").unwrap();
        assert_eq!(users, vec!["Deep", "Prayas", "Shivanshu"]);
    }

    #[test]
    fn user_list_rejects_all_blank() {
        assert!(matches!(parse_user_list(" , , "), Err(ConfigError::NoUsers)));
    }

    #[test]
    fn log_path_is_per_user() {
        let config = Config::new(PathBuf::from("/tmp/data"), vec!["Deep".to_string()]);
        assert_eq!(config.log_path("Deep"), PathBuf::from("/tmp/data/Deep_tasks.csv"));
    }
}
