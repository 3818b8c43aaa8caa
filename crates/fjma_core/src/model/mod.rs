//! Record model for credentials, officers and tribe-partitioned members.
//!
//! # Responsibility
//! - Define the canonical row shapes shared by stores and services.
//! - Own tribe parsing so storage identifiers never come from raw input.
//!
//! # Invariants
//! - `school_id` and `username` are immutable identity keys.
//! - Archived rows are read-only snapshots stamped with `deleted_at`.

pub mod credential;
pub mod member;
pub mod officer;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field-level validation failure for a record about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty or whitespace only.
    EmptyField(&'static str),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "required field `{field}` is empty"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}
