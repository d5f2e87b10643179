use reqwest::StatusCode;

/// Error raised while assembling client configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing API key, set `apiKey` in the environment or .env file")]
    MissingApiKey,

    #[error("API key contains characters not allowed in an HTTP header")]
    InvalidApiKey,

    #[error("invalid base URL {0}: {1}")]
    InvalidBaseUrl(String, url::ParseError),

    #[error("environment configuration error: {0}")]
    Env(#[from] envy::Error),

    #[error("missing candles endpoint path, set `NANSEN_CANDLES_PATH` or pass it explicitly")]
    MissingCandlesPath,

    #[error("timeout of {0}s is outside the allowed 30..=45s")]
    TimeoutOutOfRange(u64),
}

/// Error returned by the upstream API client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("upstream responded with {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid endpoint path: {0}")]
    InvalidPath(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(value.to_string())
        }
    }
}

impl ApiError {
    /// HTTP status of the failed response, if the upstream answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
