//! Unified error types and result handling.
//!
//! Every layer returns [`Error`]; the HTTP adapter maps the variants onto
//! status codes in [`crate::api::error`].

use crate::gateway::GatewayError;
use sea_orm::DbErr;
use thiserror::Error;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong with the configuration
        message: String,
    },

    /// Failure reported by the SQL layer
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Invalid credentials or an unusable bearer token
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Reason shown to the caller
        message: String,
    },

    /// Authenticated caller lacks the required role
    #[error("Not authorized: {message}")]
    Authorization {
        /// Reason shown to the caller
        message: String,
    },

    /// Request input failed validation
    #[error("Validation error: {message}")]
    Validation {
        /// Which rule was violated
        message: String,
    },

    /// A referenced row does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of row that was looked up
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// Vendor API failure
    #[error("Vendor gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// The scheduler was started before its sync dependencies were configured
    #[error("Scheduler is misconfigured: sync dependencies are not set")]
    SchedulerMisconfigured,

    /// I/O failure (config file, socket binding)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::Authentication`].
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::Authorization`].
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::Config`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
