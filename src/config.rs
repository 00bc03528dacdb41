//! Runtime configuration from the environment (`.env` is honored).
//!
//! | variable                   | default                 |
//! |----------------------------|-------------------------|
//! | `HOMEPRICE_API_BASE`       | `http://localhost:5000` |
//! | `HOMEPRICE_TIMEOUT_SECS`   | `20`                    |
//! | `HOMEPRICE_CACHE_TTL_SECS` | `3600`                  |
//! | `HOMEPRICE_DATA_DIR`       | `.homeprice`            |
//! | `HOMEPRICE_EXPORT_DIR`     | `.`                     |
//! | `HOMEPRICE_LOG`            | `info`                  |

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_API_BASE: &str = "http://localhost:5000";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);
const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base: String,
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
    pub data_dir: PathBuf,
    pub export_dir: PathBuf,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: DEFAULT_CACHE_TTL,
            data_dir: PathBuf::from(".homeprice"),
            export_dir: PathBuf::from("."),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup (lets tests avoid the process env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let request_timeout = match non_empty("HOMEPRICE_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_secs("HOMEPRICE_TIMEOUT_SECS", &raw)?),
            None => defaults.request_timeout,
        };
        let cache_ttl = match non_empty("HOMEPRICE_CACHE_TTL_SECS") {
            Some(raw) => Duration::from_secs(parse_secs("HOMEPRICE_CACHE_TTL_SECS", &raw)?),
            None => defaults.cache_ttl,
        };

        Ok(Self {
            api_base: non_empty("HOMEPRICE_API_BASE").unwrap_or(defaults.api_base),
            request_timeout,
            cache_ttl,
            data_dir: non_empty("HOMEPRICE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            export_dir: non_empty("HOMEPRICE_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            log_level: non_empty("HOMEPRICE_LOG").unwrap_or(defaults.log_level),
        })
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<u64, AppError> {
    raw.parse::<u64>()
        .map_err(|e| AppError::config(format!("Invalid {key} '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset_or_blank() {
        let config = AppConfig::from_lookup(lookup(&[("HOMEPRICE_API_BASE", "  ")])).unwrap();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.request_timeout, Duration::from_secs(20));
        assert_eq!(config.data_dir, PathBuf::from(".homeprice"));
    }

    #[test]
    fn overrides_are_read() {
        let config = AppConfig::from_lookup(lookup(&[
            ("HOMEPRICE_API_BASE", "https://api.example.test"),
            ("HOMEPRICE_CACHE_TTL_SECS", "60"),
            ("HOMEPRICE_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.api_base, "https://api.example.test");
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn malformed_numbers_are_config_errors() {
        let err = AppConfig::from_lookup(lookup(&[("HOMEPRICE_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }
}
