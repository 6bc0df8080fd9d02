//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`MissingFields`] thrown when a new expense lacks a required field.
//! - [`Validation`] thrown when a field is malformed or out of bounds.
//! - [`KeyNotFound`] thrown when an expense id is unknown.
//!
//!  [`MissingFields`]: EngineError::MissingFields
//!  [`Validation`]: EngineError::Validation
//!  [`KeyNotFound`]: EngineError::KeyNotFound
use rust_xlsxwriter::XlsxError;
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Missing required fields: {0}")]
    MissingFields(String),
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Export(#[from] XlsxError),
}

impl EngineError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MissingFields(a), Self::MissingFields(b)) => a == b,
            (
                Self::Validation {
                    field: a,
                    reason: ra,
                },
                Self::Validation {
                    field: b,
                    reason: rb,
                },
            ) => a == b && ra == rb,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            (Self::Export(a), Self::Export(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
