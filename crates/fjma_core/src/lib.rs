//! Membership-records data layer for the FJMA organization.
//! This crate is the single source of truth for record invariants.

pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use auth::password::{CredentialHasher, HashConfig, HashError};
pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::credential::{AdminAccount, Credential};
pub use model::member::{
    Member, MemberArchiveEntry, MemberDraft, Tribe, TribeMember, TribeMemberArchiveEntry,
    UnknownTribe,
};
pub use model::officer::{Officer, OfficerArchiveEntry};
pub use model::ValidationError;
pub use repo::archive::DeleteOutcome;
pub use repo::credential_repo::{CredentialRepository, SqliteCredentialRepository};
pub use repo::member_repo::{ConsistencyIssue, MemberRepository, SqliteMemberRepository};
pub use repo::officer_repo::{OfficerRepository, SqliteOfficerRepository};
pub use repo::{RepoError, RepoResult};
pub use service::credential_service::{CredentialService, ServiceError, ServiceResult};
pub use service::member_service::MemberService;
pub use service::officer_service::OfficerService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
