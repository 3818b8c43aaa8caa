//! Officer records and their archived snapshots.

use super::{require, ValidationError};
use serde::{Deserialize, Serialize};

/// Live officer row keyed by `school_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Officer {
    pub school_id: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub position: String,
    /// Free-form date text as entered, e.g. `2024-06-01`.
    pub date_appointed: String,
    pub date_joined: String,
    pub email_address: String,
    pub phone_number: String,
}

impl Officer {
    /// Checks required fields before any write.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("school_id", &self.school_id)?;
        require("first_name", &self.first_name)?;
        require("last_name", &self.last_name)?;
        require("position", &self.position)?;
        Ok(())
    }
}

/// Officer row moved out of live storage by a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerArchiveEntry {
    /// Surrogate key; the same `school_id` may be archived more than once.
    pub archive_id: i64,
    pub officer: Officer,
    /// RFC 3339 local timestamp of the delete.
    pub deleted_at: String,
}
