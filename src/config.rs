//! Launch configuration read from the environment

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer token expected on the tool endpoint
    pub auth_token: String,
    /// Phone number returned by the `validate` tool
    pub phone_number: String,
    pub imgbb_api_key: Option<String>,
    pub serpapi_api_key: Option<String>,
    pub port: u16,
    /// Base URL used when building upload and download links
    pub public_url: String,
    pub upload_dir: PathBuf,
    pub token_ttl: Duration,
    pub file_retention: Duration,
    pub sweep_interval: Duration,
    pub upstream_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));
        let secs = |name: &'static str, default: u64| -> Result<Duration, ConfigError> {
            parse_or(get(name), name, default).map(Duration::from_secs)
        };
        // Timers and deadlines cannot run on a zero period
        let nonzero_secs = |name: &'static str, default: u64| -> Result<Duration, ConfigError> {
            let value = secs(name, default)?;
            if value.is_zero() {
                return Err(ConfigError::Invalid {
                    name,
                    value: "0".to_string(),
                });
            }
            Ok(value)
        };

        let port = parse_or(get("KIOSK_PORT"), "KIOSK_PORT", 8086)?;
        let public_url = get("KIOSK_PUBLIC_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            auth_token: required("AUTH_TOKEN")?,
            phone_number: required("MY_NUMBER")?,
            imgbb_api_key: get("IMGBB_API_KEY"),
            serpapi_api_key: get("SERPAPI_API_KEY"),
            port,
            public_url,
            upload_dir: get("KIOSK_UPLOAD_DIR").map_or_else(|| PathBuf::from("uploads"), PathBuf::from),
            token_ttl: secs("KIOSK_TOKEN_TTL_SECS", 3600)?,
            file_retention: secs("KIOSK_FILE_RETENTION_SECS", 86_400)?,
            sweep_interval: nonzero_secs("KIOSK_SWEEP_INTERVAL_SECS", 300)?,
            upstream_timeout: nonzero_secs("KIOSK_UPSTREAM_TIMEOUT_SECS", 30)?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
