//! The module contains the errors the engine can produce.
//!
//! The main split is between [`Invalid`], which carries every violated rule
//! of a candidate record at once, and the storage-side errors
//! ([`KeyNotFound`], [`Document`], [`Database`]).
//!
//! [`Invalid`]: EngineError::Invalid
//! [`KeyNotFound`]: EngineError::KeyNotFound
//! [`Document`]: EngineError::Document
//! [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

use crate::validate::ViolationSet;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A candidate record violated one or more validation rules.
    #[error("validation failed: {0}")]
    Invalid(ViolationSet),
    #[error("\"{0}\" not found")]
    KeyNotFound(String),
    /// A timestamp value could not be mapped to a canonical instant.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    /// A stored document is missing a field or holds an unusable value.
    #[error("malformed document: {0}")]
    Document(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Invalid(a), Self::Invalid(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidTimestamp(a), Self::InvalidTimestamp(b)) => a == b,
            (Self::Document(a), Self::Document(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
