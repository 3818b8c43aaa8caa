//! Administrator credential records.

use serde::{Deserialize, Serialize};

/// Stored administrator login row.
///
/// `password_hash` is an opaque digest produced by the hashing collaborator
/// and is never exposed through list operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password_hash: Vec<u8>,
    pub email: String,
}

/// Public projection of a credential row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAccount {
    pub username: String,
    pub email: String,
}
