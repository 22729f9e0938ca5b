//! Patient information step
//!
//! Turns raw form input into an [`Identity`]. All fields are checked in one
//! pass so the shell can show every message at once.

use super::types::Identity;
use crate::error::{FieldError, FormField, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const MIN_AGE: i64 = 1;
pub const MAX_AGE: i64 = 120;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Form values exactly as the shell collected them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientForm {
    pub name: String,
    pub age: String,
    pub email: String,
}

impl PatientForm {
    pub fn new(name: impl Into<String>, age: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: age.into(),
            email: email.into(),
        }
    }

    /// Pre-fill from an identity already in the session (re-entry)
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            name: identity.name.clone(),
            age: identity.age.to_string(),
            email: identity.email.clone(),
        }
    }

    pub fn validate(&self) -> Result<Identity, ValidationError> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldError::new(FormField::Name, "Name is required"));
        }

        let age = match self.age.trim().parse::<i64>() {
            Ok(age) if (MIN_AGE..=MAX_AGE).contains(&age) => Some(age as u8),
            _ => {
                errors.push(FieldError::new(
                    FormField::Age,
                    format!("Please enter a valid age ({}-{})", MIN_AGE, MAX_AGE),
                ));
                None
            }
        };

        let email = self.email.trim();
        if email.is_empty() || !EMAIL_RE.is_match(email) {
            errors.push(FieldError::new(
                FormField::Email,
                "Please enter a valid email address",
            ));
        }

        match age {
            Some(age) if errors.is_empty() => Ok(Identity {
                name: name.to_string(),
                age,
                email: email.to_string(),
            }),
            _ => Err(ValidationError { errors }),
        }
    }
}
