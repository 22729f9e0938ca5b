//! Error types for the screening core
//!
//! Every variant is recoverable: the failing step keeps control and the
//! message is shown to the user. The command layer flattens these into
//! `String`s at the shell boundary.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Form field a validation message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Name,
    Age,
    Email,
    /// Questionnaire entry at the given catalog index
    Question(usize),
}

/// A single field-specific validation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

impl FieldError {
    pub fn new(field: FormField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// One or more field errors raised by a single validation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: FormField, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// Message for a given field, if that field failed
    pub fn message_for(&self, field: FormField) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Error)]
pub enum ScreeningError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Please upload a valid image file (PNG or JPEG)")]
    InvalidFileType { declared: String },

    #[error("File size must be less than 10MB")]
    FileTooLarge { size_bytes: u64 },

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("An analysis is already running")]
    AnalysisInProgress,

    #[error("Failed to generate report: {0}")]
    ReportFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScreeningError>;
