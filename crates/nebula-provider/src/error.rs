use std::fmt;

use serde::{Deserialize, Serialize};

use crate::de::null_as_default;

/// Error code carried by every [`ProviderError`].
///
/// The named variants are owned by this crate. Any other code a backend reports is kept in
/// [`ErrorCode::Other`] and serialized back exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorCode {
    SystemError,
    UserNotFound,
    InvalidRequestFormat,
    AuthenticationFailed,
    Other(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::SystemError => "SYSTEM_ERROR",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::InvalidRequestFormat => "INVALID_REQUEST_FORMAT",
            ErrorCode::AuthenticationFailed => "AUTHENTICATION_FAILED",
            ErrorCode::Other(code) => code,
        }
    }
}

impl From<String> for ErrorCode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "SYSTEM_ERROR" => ErrorCode::SystemError,
            "USER_NOT_FOUND" => ErrorCode::UserNotFound,
            "INVALID_REQUEST_FORMAT" => ErrorCode::InvalidRequestFormat,
            "AUTHENTICATION_FAILED" => ErrorCode::AuthenticationFailed,
            _ => ErrorCode::Other(value),
        }
    }
}

impl From<&str> for ErrorCode {
    fn from(value: &str) -> Self {
        value.to_owned().into()
    }
}

impl From<ErrorCode> for String {
    fn from(value: ErrorCode) -> Self {
        match value {
            ErrorCode::Other(code) => code,
            code => code.as_str().to_owned(),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure returned by every provider operation, whichever backend is behind it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("{code}: {message} ({description})")]
pub struct ProviderError {
    pub code: ErrorCode,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

impl ProviderError {
    pub fn new(code: ErrorCode, message: impl Into<String>, description: impl Into<String>) -> Self {
        Self { code, message: message.into(), description: description.into() }
    }

    /// Failure of this layer's own mechanics. `cause` ends up in the description and is logged.
    pub fn system(message: impl Into<String>, cause: impl fmt::Display) -> Self {
        let message = message.into();
        tracing::error!("{message}: {cause}");
        Self::new(ErrorCode::SystemError, message, cause.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
