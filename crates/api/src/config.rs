//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;

use thiserror::Error;

use gatehouse_auth::PasswordCheck;
use gatehouse_observability::{LogFormat, ParseLogFormatError};

pub const BIND_ADDR_VAR: &str = "GATEHOUSE_BIND_ADDR";
pub const PASSWORD_CHECK_VAR: &str = "GATEHOUSE_PASSWORD_CHECK";
pub const LOG_FORMAT_VAR: &str = "GATEHOUSE_LOG_FORMAT";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("GATEHOUSE_BIND_ADDR: invalid socket address '{0}'")]
    InvalidBindAddr(String),

    #[error("GATEHOUSE_PASSWORD_CHECK: expected 'presence' or 'exact', got '{0}'")]
    InvalidPasswordCheck(String),

    #[error("GATEHOUSE_LOG_FORMAT: {0}")]
    InvalidLogFormat(#[from] ParseLogFormatError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub password_check: PasswordCheck,
    pub log_format: LogFormat,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            password_check: PasswordCheck::PresenceOnly,
            log_format: LogFormat::Json,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source. Unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBindAddr(bind_addr.clone()))?;

        let password_check = match lookup(PASSWORD_CHECK_VAR) {
            None => PasswordCheck::default(),
            Some(v) => match v.trim().to_ascii_lowercase().as_str() {
                "presence" => PasswordCheck::PresenceOnly,
                "exact" => PasswordCheck::Exact,
                _ => return Err(ConfigError::InvalidPasswordCheck(v)),
            },
        };

        let log_format = match lookup(LOG_FORMAT_VAR) {
            None => LogFormat::default(),
            Some(v) => v.parse()?,
        };

        Ok(Self {
            bind_addr,
            password_check,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ApiConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = ApiConfig::from_lookup(lookup(&[
            (BIND_ADDR_VAR, "127.0.0.1:9000"),
            (PASSWORD_CHECK_VAR, "Exact"),
            (LOG_FORMAT_VAR, "pretty"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.password_check, PasswordCheck::Exact);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn rejects_invalid_values() {
        assert_eq!(
            ApiConfig::from_lookup(lookup(&[(BIND_ADDR_VAR, "nope")])),
            Err(ConfigError::InvalidBindAddr("nope".into()))
        );
        assert_eq!(
            ApiConfig::from_lookup(lookup(&[(PASSWORD_CHECK_VAR, "bcrypt")])),
            Err(ConfigError::InvalidPasswordCheck("bcrypt".into()))
        );
        assert!(matches!(
            ApiConfig::from_lookup(lookup(&[(LOG_FORMAT_VAR, "xml")])),
            Err(ConfigError::InvalidLogFormat(_))
        ));
    }
}
