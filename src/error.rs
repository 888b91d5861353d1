use figment::Error as FigmentError;
use reqwest::{Error as ReqwestError, StatusCode};
use thiserror::Error;

use crate::credentials::AuthenticationError;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of an API call. Every variant wraps the original error, so
/// callers see exactly what went wrong rather than a generic stand-in.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Auth(#[from] AuthenticationError),
    #[error("Network failure: {0}")]
    Network(#[source] ReqwestError),
    #[error("Server rejected request: {0}")]
    Http(#[source] ReqwestError),
    #[error("Unexpected response body: {0}")]
    Decode(#[source] ReqwestError),
}

impl Error {
    /// The HTTP status of the failed response, if the server sent one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http(err) | Self::Decode(err) | Self::Network(err) => err.status(),
            Self::Auth(_) => None,
        }
    }

    /// Is this a missing or unusable credential? The caller should send the
    /// user back through the login flow.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

impl From<ReqwestError> for Error {
    fn from(err: ReqwestError) -> Self {
        if err.is_status() {
            Self::Http(err)
        } else if err.is_decode() {
            Self::Decode(err)
        } else {
            Self::Network(err)
        }
    }
}

/// Failures while loading a [`crate::config::ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Figment(#[from] FigmentError),
    #[error("Invalid base URL: {0:?}")]
    BaseUrl(String),
}
