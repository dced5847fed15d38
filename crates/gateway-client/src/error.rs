use thiserror::Error;

use crate::classify::{ErrorClass, Operation};

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Error types for the gateway client
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Malformed construction inputs. No client is returned.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The gateway answered with an error that was not absorbed as idempotent.
    #[error("Failed to {operation} {resource:?}: {message}")]
    Provider { operation: Operation, resource: String, code: Option<String>, class: ErrorClass, message: String },

    /// Network, TLS or timeout failure before a gateway answer was received.
    #[error("Failed to {operation} {resource:?}: transport error: {message}")]
    Transport { operation: Operation, resource: String, message: String },

    /// The object body arrived but could not be decoded as text.
    #[error("Failed to {operation} {resource:?}: undecodable body: {message}")]
    Body { operation: Operation, resource: String, message: String },
}

impl GatewayError {
    /// Outcome category of this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            GatewayError::Configuration(_) => ErrorClass::Fatal,
            GatewayError::Provider { class, .. } => *class,
            GatewayError::Transport { .. } => ErrorClass::Transient,
            GatewayError::Body { .. } => ErrorClass::Caller,
        }
    }

    /// Whether a caller-driven retry may succeed.
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Transient
    }

    /// Provider error code, when the gateway sent one.
    pub fn code(&self) -> Option<&str> {
        match self {
            GatewayError::Provider { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Operation the error was raised for, `None` for construction errors.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            GatewayError::Configuration(_) => None,
            GatewayError::Provider { operation, .. }
            | GatewayError::Transport { operation, .. }
            | GatewayError::Body { operation, .. } => Some(*operation),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        GatewayError::Configuration(message.into())
    }
}
