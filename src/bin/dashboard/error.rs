//! Error types for the dashboard.

use smart_money_sdk::error::{ApiError, ConfigError as SdkConfigError};

use crate::config::ConfigError;

/// Main error type for the dashboard.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Failed to write snapshot: {0}")]
    Snapshot(#[from] std::io::Error),
}

impl Error {
    /// Hint shown below the error message, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Error::Api(ApiError::Config(SdkConfigError::MissingApiKey)) => Some(
                "Create a .env file in the working directory with `apiKey=<your key>` \
                 and keep it out of version control.",
            ),
            Error::Api(ApiError::Config(SdkConfigError::TimeoutOutOfRange(_))) => {
                Some("Set NANSEN_TIMEOUT_SECONDS to a value between 30 and 45, or unset it.")
            }
            Error::Api(ApiError::Timeout) => {
                Some("The upstream API did not answer in time, try again later.")
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
