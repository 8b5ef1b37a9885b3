//! services/app/src/error.rs
//!
//! Error types for the client side.

use kids_learning_core::ports::PortError;

/// The one error type every API client call fails with.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    /// The request never produced a response.
    #[error("Network failure: {0}")]
    Transport(String),

    /// A 2xx response whose body was not what the call expected.
    #[error("Could not decode response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised by the application controller.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error("Incorrect parental PIN")]
    WrongPin,

    #[error("Not allowed: {0}")]
    NotAllowed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
