//! Field-level request validation.
//!
//! Payloads collect every problem before failing so the client gets the
//! full picture in one `400` response.

use std::collections::HashMap;

use crate::errors::AppError;

pub trait Validate {
    fn validate(&self) -> Result<(), AppError>;
}

#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: HashMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn required(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "is required");
        }
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.add(field, format!("must be at most {} characters", max));
        }
    }

    pub fn non_negative(&mut self, field: &str, value: Option<i32>) {
        if matches!(value, Some(v) if v < 0) {
            self.add(field, "must not be negative");
        }
    }

    pub fn no_blank_entries(&mut self, field: &str, values: &[String]) {
        if values.iter().any(|v| v.trim().is_empty()) {
            self.add(field, "must not contain blank entries");
        }
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::ValidationErrors(self.errors))
        }
    }
}
