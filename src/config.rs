//! Process configuration, read once from the environment at startup.
//!
//! `main` loads a `.env` file from the working directory (via `dotenvy`)
//! before calling [`Config::from_env`]; variables already set in the process
//! environment take precedence over the file.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `CTA_API_KEY` | required | vendor API key sent as `key=` on every call |
//! | `ALLOWED_ORIGINS` | `http://localhost:8000` | comma-separated CORS allow-list for `/api/*` |
//! | `PORT` | `8080` | listening port |
//! | `BUSTIME_BASE_URL` | CTA v2 endpoint | vendor base URL |
//! | `LOG_FORMAT` | `json` | `json` or `text` |

use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://www.ctabustracker.com/bustime/api/v2";
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:8000";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("CTA_API_KEY is required")]
    MissingApiKey,
    #[error("invalid PORT `{0}`")]
    InvalidPort(String),
    #[error("invalid BUSTIME_BASE_URL `{value}`: {source}")]
    InvalidBaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid LOG_FORMAT `{0}` (expected `json` or `text`)")]
    InvalidLogFormat(String),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogFormat {
    Json,
    Text,
}

/// Everything the service needs from its environment.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: String,
    pub allowed_origins: Vec<String>,
    pub port: u16,
    pub base_url: Url,
    pub log_format: LogFormat,
}

impl Config {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, so tests can supply a fake
    /// environment without touching process state.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("CTA_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let allowed_origins = parse_origins(
            &lookup("ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_owned()),
        );

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let raw_url = lookup("BUSTIME_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let base_url = Url::parse(&raw_url)
            .map_err(|source| ConfigError::InvalidBaseUrl { value: raw_url.clone(), source })?;

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("json") => LogFormat::Json,
            Some("text") => LogFormat::Text,
            Some(other) => return Err(ConfigError::InvalidLogFormat(other.to_owned())),
        };

        Ok(Self { api_key, allowed_origins, port, base_url, log_format })
    }

    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_owned)
        .collect()
}
