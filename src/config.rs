//! Runtime settings read from the environment (and `.env`, when present).

use std::{env, fmt, time::Duration};

use log::LevelFilter;
use thiserror::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_LISTINGS_TTL_SECS: u64 = 300;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be a whole number, got `{value}`")]
    InvalidNumber { key: &'static str, value: String },
    #[error("EBAY_ENVIRONMENT must be `sandbox` or `production`, got `{0}`")]
    InvalidEnvironment(String),
    #[error("LOG_LEVEL `{0}` is not one of off, error, warn, info, debug, trace")]
    InvalidLogLevel(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EbayEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl EbayEnvironment {
    pub fn auth_url(&self) -> &'static str {
        match self {
            EbayEnvironment::Sandbox => "https://api.sandbox.ebay.com/identity/v1/oauth2/token",
            EbayEnvironment::Production => "https://api.ebay.com/identity/v1/oauth2/token",
        }
    }

    pub fn browse_url(&self) -> &'static str {
        match self {
            EbayEnvironment::Sandbox => "https://api.sandbox.ebay.com/buy/browse/v1/",
            EbayEnvironment::Production => "https://api.ebay.com/buy/browse/v1/",
        }
    }
}

impl fmt::Display for EbayEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EbayEnvironment::Sandbox => f.write_str("sandbox"),
            EbayEnvironment::Production => f.write_str("production"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EbayConfig {
    pub environment: EbayEnvironment,
    pub app_id: Option<String>,
    pub dev_id: Option<String>,
    pub cert_id: Option<String>,
}

/// Client-credentials pair used for the OAuth token request.
#[derive(Clone, Debug, PartialEq)]
pub struct EbayCredentials {
    pub app_id: String,
    pub cert_id: String,
}

impl EbayConfig {
    pub fn credentials(&self) -> Option<EbayCredentials> {
        Some(EbayCredentials {
            app_id: self.app_id.clone()?,
            cert_id: self.cert_id.clone()?,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SupabaseConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
}

impl SupabaseConfig {
    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.anon_key.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HttpConfig {
    pub timeout: Duration,
    /// Total attempts for idempotent requests, including the first.
    pub retry_attempts: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub ebay: EbayConfig,
    pub supabase: SupabaseConfig,
    pub http: HttpConfig,
    pub listings_cache_ttl: Duration,
    pub log_level: LevelFilter,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ebay: EbayConfig::default(),
            supabase: SupabaseConfig::default(),
            http: HttpConfig::default(),
            listings_cache_ttl: Duration::from_secs(DEFAULT_LISTINGS_TTL_SECS),
            log_level: LevelFilter::Info,
        }
    }
}

impl AppConfig {
    /// Loads `.env` if one exists, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Blank values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let environment = match get("EBAY_ENVIRONMENT").as_deref() {
            None => EbayEnvironment::default(),
            Some(value) if value.eq_ignore_ascii_case("sandbox") => EbayEnvironment::Sandbox,
            Some(value) if value.eq_ignore_ascii_case("production") => EbayEnvironment::Production,
            Some(other) => return Err(ConfigError::InvalidEnvironment(other.to_string())),
        };

        let log_level = match get("LOG_LEVEL") {
            None => LevelFilter::Info,
            Some(value) => value
                .parse::<LevelFilter>()
                .map_err(|_| ConfigError::InvalidLogLevel(value))?,
        };

        Ok(Self {
            ebay: EbayConfig {
                environment,
                app_id: get("EBAY_APP_ID"),
                dev_id: get("EBAY_DEV_ID"),
                cert_id: get("EBAY_CERT_ID"),
            },
            supabase: SupabaseConfig {
                url: get("SUPABASE_URL"),
                anon_key: get("SUPABASE_ANON_KEY"),
            },
            http: HttpConfig {
                timeout: Duration::from_secs(parse_number(
                    "API_TIMEOUT_SECS",
                    get("API_TIMEOUT_SECS"),
                    DEFAULT_TIMEOUT_SECS,
                )?),
                retry_attempts: parse_number(
                    "API_RETRY_ATTEMPTS",
                    get("API_RETRY_ATTEMPTS"),
                    DEFAULT_RETRY_ATTEMPTS,
                )?
                .max(1),
            },
            listings_cache_ttl: Duration::from_secs(parse_number(
                "LISTINGS_CACHE_TTL_SECS",
                get("LISTINGS_CACHE_TTL_SECS"),
                DEFAULT_LISTINGS_TTL_SECS,
            )?),
            log_level,
        })
    }

    /// Human-readable notes about collaborators that will run degraded.
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.ebay.credentials().is_none() {
            issues.push(
                "eBay credentials missing (EBAY_APP_ID / EBAY_CERT_ID); live listings are disabled"
                    .to_string(),
            );
        } else if self.ebay.dev_id.is_none() {
            issues.push("EBAY_DEV_ID is not set".to_string());
        }
        if !self.supabase.is_configured() {
            issues.push(
                "Supabase not configured (SUPABASE_URL / SUPABASE_ANON_KEY); analyses are saved locally"
                    .to_string(),
            );
        }
        issues
    }

    /// Installs the global logger. `RUST_LOG` still refines per-module levels.
    pub fn init_logging(&self) {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(self.log_level);
        if let Ok(filters) = env::var("RUST_LOG") {
            builder.parse_filters(&filters);
        }
        if builder.try_init().is_err() {
            log::debug!("logger already initialised");
        }
    }
}

fn parse_number<T: std::str::FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.http.timeout, Duration::from_secs(30));
        assert_eq!(config.http.retry_attempts, 3);
        assert_eq!(config.listings_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.issues().len(), 2);
    }

    #[test]
    fn reads_credentials_and_overrides() {
        let config = config_from(&[
            ("EBAY_ENVIRONMENT", "Production"),
            ("EBAY_APP_ID", "app"),
            ("EBAY_DEV_ID", "dev"),
            ("EBAY_CERT_ID", "cert"),
            ("SUPABASE_URL", "https://demo.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("API_TIMEOUT_SECS", "10"),
            ("API_RETRY_ATTEMPTS", "5"),
            ("LISTINGS_CACHE_TTL_SECS", "60"),
            ("LOG_LEVEL", "debug"),
        ])
        .unwrap();

        assert_eq!(config.ebay.environment, EbayEnvironment::Production);
        assert_eq!(
            config.ebay.credentials(),
            Some(EbayCredentials {
                app_id: "app".to_string(),
                cert_id: "cert".to_string(),
            })
        );
        assert!(config.supabase.is_configured());
        assert_eq!(config.http.timeout, Duration::from_secs(10));
        assert_eq!(config.http.retry_attempts, 5);
        assert_eq!(config.listings_cache_ttl, Duration::from_secs(60));
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert!(config.issues().is_empty());
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[("EBAY_APP_ID", "  "), ("EBAY_CERT_ID", "cert")]).unwrap();
        assert_eq!(config.ebay.app_id, None);
        assert_eq!(config.ebay.credentials(), None);
    }

    #[test]
    fn rejects_malformed_values() {
        assert_eq!(
            config_from(&[("API_TIMEOUT_SECS", "soon")]),
            Err(ConfigError::InvalidNumber {
                key: "API_TIMEOUT_SECS",
                value: "soon".to_string(),
            })
        );
        assert_eq!(
            config_from(&[("EBAY_ENVIRONMENT", "staging")]),
            Err(ConfigError::InvalidEnvironment("staging".to_string()))
        );
        assert_eq!(
            config_from(&[("LOG_LEVEL", "loud")]),
            Err(ConfigError::InvalidLogLevel("loud".to_string()))
        );
    }

    #[test]
    fn zero_retries_still_makes_one_attempt() {
        let config = config_from(&[("API_RETRY_ATTEMPTS", "0")]).unwrap();
        assert_eq!(config.http.retry_attempts, 1);
    }

    #[test]
    fn environment_selects_endpoints() {
        assert!(EbayEnvironment::Sandbox.auth_url().contains("sandbox"));
        assert!(!EbayEnvironment::Production.browse_url().contains("sandbox"));
        assert_eq!(EbayEnvironment::Production.to_string(), "production");
    }
}
