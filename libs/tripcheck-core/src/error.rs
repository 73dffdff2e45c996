//! Error types for the tripcheck core library

use crate::models::EntityRef;
use thiserror::Error;

/// Result type alias for tripcheck operations
pub type Result<T> = std::result::Result<T, TripError>;

/// Main error type for tripcheck operations
#[derive(Error, Debug)]
pub enum TripError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Trip not found: {id}")]
    TripNotFound { id: String },

    #[error(transparent)]
    Submit(#[from] SubmitError),
}

impl TripError {
    /// Create a database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Failure of the remote collaborator while a submission was in flight
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("remote answered with status {code}")]
    Status { code: u16 },

    #[error("malformed response body: {0}")]
    MalformedBody(String),

    #[error("could not encode request document: {0}")]
    Encode(String),
}

/// A submission that did not reach an acknowledged state
///
/// Names the entity so the caller can report it and retry the same value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Submission of {entity} failed: {source}")]
pub struct SubmitError {
    pub entity: EntityRef,
    pub source: TransportError,
}

impl SubmitError {
    #[must_use]
    pub fn new(entity: EntityRef, source: TransportError) -> Self {
        Self { entity, source }
    }
}
