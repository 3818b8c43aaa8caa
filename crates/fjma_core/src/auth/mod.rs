//! Password hashing collaborator.
//!
//! # Responsibility
//! - Turn plaintext passwords into salted one-way digests.
//! - Verify plaintext against stored digests.
//!
//! # Invariants
//! - Plaintext and digests never appear in log events.

pub mod password;
