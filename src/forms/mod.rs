//! HTML form payloads and their validation state.
//!
//! Each form is an explicit value: the route hands the submitted fields to
//! `submit`, which either yields a typed payload or returns the form with
//! per-field messages to re-render.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

pub mod categories;
pub mod listings;

/// Where a form is in its lifecycle. Validation failures keep the form in
/// [`FormPhase::Editing`]; a successful submit consumes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormPhase {
    /// Freshly opened, nothing typed yet.
    #[default]
    Idle,
    /// The user changed at least one field or a submit was rejected.
    Editing,
}

/// Per-field error messages; a field without an entry is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Message for `field`, if it failed validation.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Record an error for `field`, replacing any previous one.
    pub fn set(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    /// Drop the error for `field`.
    pub fn clear(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, list) in errors.field_errors() {
            if let Some(message) = list.iter().find_map(|e| e.message.as_ref()) {
                fields.set(&field, message.to_string());
            }
        }
        fields
    }
}

/// Build a validation error carrying a user-facing message.
pub(crate) fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Check that a text field is non-empty after trimming.
pub(crate) fn require_text(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(field_error("required", message))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_set_and_clear() {
        let mut errors = FieldErrors::new();
        errors.set("title", "Title is required");
        assert_eq!(errors.get("title"), Some("Title is required"));
        errors.clear("title");
        assert!(errors.is_empty());
    }

    #[test]
    fn serializes_as_plain_map() {
        let mut errors = FieldErrors::new();
        errors.set("name", "Category name is required");
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({"name": "Category name is required"})
        );
    }
}
