use anyhow::Result;
use axum::http::HeaderName;
use std::env;
use std::fmt;
use std::str::FromStr;

use crate::utils::signature::DEFAULT_MAX_AGE_SECS;

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub port: u16,
    /// Header carrying `algorithm=hex,timestamp,nonce`
    pub signature_header_key: HeaderName,
    pub signature: SignatureConfig,
    pub request_timeout: u64,
    pub log_format: LogFormat,
}

/// Inputs to signature verification, fixed at startup.
#[derive(Clone)]
pub struct SignatureConfig {
    pub shared_secret: String,
    pub canonical_url: String,
    pub max_age_secs: u64,
}

impl SignatureConfig {
    pub fn new(shared_secret: impl Into<String>, canonical_url: impl Into<String>) -> Self {
        Self {
            shared_secret: shared_secret.into(),
            canonical_url: canonical_url.into(),
            max_age_secs: DEFAULT_MAX_AGE_SECS,
        }
    }

    pub fn with_max_age(mut self, max_age_secs: u64) -> Self {
        self.max_age_secs = max_age_secs;
        self
    }
}

// The secret must never reach the logs.
impl fmt::Debug for SignatureConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureConfig")
            .field("shared_secret", &"<redacted>")
            .field("canonical_url", &self.canonical_url)
            .field("max_age_secs", &self.max_age_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow::anyhow!("Unknown LOG_FORMAT: {}", other)),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            var(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("{} environment variable is required", key))
        };

        let header_key = required("SIGNATURE_HEADER_KEY")?;
        let signature_header_key = HeaderName::from_bytes(header_key.trim().as_bytes())
            .map_err(|e| anyhow::anyhow!("SIGNATURE_HEADER_KEY is not a valid header name: {}", e))?;

        Ok(Config {
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            port: var("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("PORT must be a valid port number: {}", e))?,
            signature_header_key,
            signature: SignatureConfig {
                shared_secret: required("API_TOKEN")?,
                canonical_url: required("WEBHOOK_URL")?,
                max_age_secs: var("SIGNATURE_MAX_AGE_SECS")
                    .map(|value| value.parse::<u64>())
                    .transpose()
                    .map_err(|e| anyhow::anyhow!("SIGNATURE_MAX_AGE_SECS must be an integer: {}", e))?
                    .unwrap_or(DEFAULT_MAX_AGE_SECS),
            },
            request_timeout: var("REQUEST_TIMEOUT")
                .unwrap_or_else(|| "30".to_string())
                .parse::<u64>()
                .map_err(|e| {
                    anyhow::anyhow!("REQUEST_TIMEOUT must be an integer number of seconds: {}", e)
                })?,
            log_format: var("LOG_FORMAT")
                .map(|value| value.parse::<LogFormat>())
                .transpose()?
                .unwrap_or_default(),
        })
    }
}
