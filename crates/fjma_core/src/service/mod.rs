//! Record use-case services.
//!
//! # Responsibility
//! - Orchestrate repositories and the hashing collaborator.
//! - Emit one structured log event per mutating use-case.
//!
//! # Invariants
//! - Services never bypass repository validation or transactions.
//! - Services remain storage-agnostic.

pub mod credential_service;
pub mod member_service;
pub mod officer_service;

use log::{info, warn};
use std::fmt::Display;

/// Logs the outcome of one mutating use-case without record contents.
pub(crate) fn log_outcome<T, E: Display>(event: &str, key: &str, result: &Result<T, E>) {
    match result {
        Ok(_) => info!("event={event} module=service status=ok key={key}"),
        Err(err) => warn!("event={event} module=service status=error key={key} error={err}"),
    }
}
