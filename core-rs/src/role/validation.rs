//! Role record validation
//!
//! Validation failures are values, not errors: a rejected save returns them
//! to the caller and nothing is written.

use serde::Serialize;
use std::fmt;

use crate::errors::Result;
use crate::store::{RoleId, RoleStore};

/// One failed rule on one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every failed rule for one record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        ValidationErrors::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Messages recorded against `field`
    pub fn on(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    /// "Name has already been taken" style messages
    pub fn full_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| format!("{} {}", capitalize(&e.field), e.message))
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_messages().join(", "))
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub const BLANK: &str = "can't be blank";
pub const TAKEN: &str = "has already been taken";

/// Validate a role name about to be saved
///
/// `id` is the role being updated, if any, so a role never collides with
/// itself. Uniqueness ignores case.
pub fn validate_role_name(
    store: &dyn RoleStore,
    name: &str,
    id: Option<RoleId>,
) -> Result<ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if name.trim().is_empty() {
        errors.add("name", BLANK);
        return Ok(errors);
    }

    let wanted = name.to_lowercase();
    let taken = store
        .roles()?
        .iter()
        .any(|r| Some(r.id) != id && r.name.to_lowercase() == wanted);
    if taken {
        errors.add("name", TAKEN);
    }

    Ok(errors)
}
