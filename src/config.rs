//! Client configuration.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file:
//! - `NANSEN_BASE_URL`: API base URL, defaults to [`DEFAULT_BASE_URL`]
//! - `apiKey` (or `API_KEY`): API key, required
//! - `NANSEN_CANDLES_PATH`: endpoint path for token candles, optional
//! - `NANSEN_TIMEOUT_SECONDS`: per-call timeout between 30 and 45 seconds,
//!   defaults to 45s

use std::{ops::RangeInclusive, time::Duration};

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.nansen.ai/api/beta";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(45);

/// Per-call timeouts accepted from the environment, in seconds.
pub const TIMEOUT_RANGE_SECS: RangeInclusive<u64> = 30..=45;

/// Raw environment configuration.
///
/// Variable names are matched case-insensitively.
#[derive(Debug, Default, serde::Deserialize)]
pub struct EnvConfig {
    /// API base URL
    pub nansen_base_url: Option<String>,

    /// API key, as `apiKey`
    pub apikey: Option<String>,

    /// API key, as `API_KEY`
    pub api_key: Option<String>,

    /// Token candles endpoint path
    pub nansen_candles_path: Option<String>,

    /// Per-call timeout in seconds
    pub nansen_timeout_seconds: Option<u64>,
}

impl EnvConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// First non-blank API key.
    pub fn api_key(&self) -> Option<&str> {
        [&self.apikey, &self.api_key]
            .into_iter()
            .flatten()
            .map(|k| k.trim())
            .find(|k| !k.is_empty())
    }
}

/// Connection details of the upstream API.
#[derive(Clone, derive_more::Debug)]
pub struct ClientConfig {
    base_url: Url,
    #[debug("<redacted>")]
    api_key: String,
    candles_path: Option<String>,
    timeout: Duration,
}

impl ClientConfig {
    /// Configuration for the public API with the given key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(Self {
            base_url: parse_base_url(DEFAULT_BASE_URL)?,
            api_key,
            candles_path: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Loads `.env` if present and reads the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        _ = dotenvy::dotenv();
        Self::from_env_config(EnvConfig::from_env()?)
    }

    pub fn from_env_config(env: EnvConfig) -> Result<Self, ConfigError> {
        let mut config = Self::new(env.api_key().ok_or(ConfigError::MissingApiKey)?)?;
        if let Some(base_url) = env.nansen_base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            config = config.with_base_url(base_url)?;
        }
        if let Some(path) = env.nansen_candles_path {
            config = config.with_candles_path(path);
        }
        if let Some(secs) = env.nansen_timeout_seconds {
            if !TIMEOUT_RANGE_SECS.contains(&secs) {
                return Err(ConfigError::TimeoutOutOfRange(secs));
            }
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    pub fn with_candles_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.candles_path = (!path.trim().is_empty()).then_some(path);
        self
    }

    /// Overrides the per-call timeout. Unlike the environment value, this is
    /// not range-checked.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn candles_path(&self) -> Option<&str> {
        self.candles_path.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, ConfigError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    Url::parse(trimmed).map_err(|e| ConfigError::InvalidBaseUrl(base_url.to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key() {
        assert!(matches!(
            ClientConfig::from_env_config(EnvConfig::default()),
            Err(ConfigError::MissingApiKey)
        ));
        assert!(matches!(
            ClientConfig::new("   "),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn test_from_env_config() {
        let env = EnvConfig {
            nansen_base_url: Some("http://localhost:8080/api/".to_string()),
            apikey: None,
            api_key: Some("secret".to_string()),
            nansen_candles_path: Some("tgm/candles".to_string()),
            nansen_timeout_seconds: Some(30),
        };
        let config = ClientConfig::from_env_config(env).unwrap();
        assert_eq!(config.base_url().as_str(), "http://localhost:8080/api");
        assert_eq!(config.api_key(), "secret");
        assert_eq!(config.candles_path(), Some("tgm/candles"));
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_timeout_out_of_range() {
        for secs in [0, 29, 46, 3600] {
            let env = EnvConfig {
                api_key: Some("k".to_string()),
                nansen_timeout_seconds: Some(secs),
                ..Default::default()
            };
            assert!(matches!(
                ClientConfig::from_env_config(env),
                Err(ConfigError::TimeoutOutOfRange(s)) if s == secs
            ));
        }

        let env = EnvConfig {
            api_key: Some("k".to_string()),
            nansen_timeout_seconds: Some(45),
            ..Default::default()
        };
        let config = ClientConfig::from_env_config(env).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(45));
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("key").unwrap();
        assert_eq!(config.base_url().as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.candles_path(), None);
        assert_eq!(config.with_candles_path("  ").candles_path(), None);
    }

    #[test]
    fn test_api_key_precedence() {
        let env = EnvConfig {
            apikey: Some(" ".to_string()),
            api_key: Some("fallback".to_string()),
            ..Default::default()
        };
        assert_eq!(env.api_key(), Some("fallback"));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ClientConfig::new("key").unwrap().with_base_url("not a url"),
            Err(ConfigError::InvalidBaseUrl(_, _))
        ));
    }

    #[test]
    fn test_api_key_is_redacted() {
        let config = ClientConfig::new("super-secret").unwrap();
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
