//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define record-store contracts for credentials, officers and members.
//! - Isolate SQL details from service orchestration.
//! - Translate SQLite constraint failures into semantic errors.
//!
//! # Invariants
//! - Write paths validate records before any SQL mutation.
//! - Multi-step writes run inside one immediate transaction.
//! - Deleting an absent key is a no-op, never an error.

pub mod archive;
pub mod credential_repo;
pub mod member_repo;
pub mod officer_repo;

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::member::UnknownTribe;
use crate::model::ValidationError;
use rusqlite::{Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Record failed field validation before the write.
    Validation(ValidationError),
    /// Insert collided with an existing identity key.
    DuplicateKey { table: &'static str, key: String },
    /// Update/lookup target is absent.
    NotFound { table: &'static str, key: String },
    /// Tribe name is not one of the four known tribes.
    InvalidTribe(String),
    /// Archive insert collided with an existing archived row.
    ArchiveConflict { table: &'static str, key: String },
    /// Live member rows and tribe mirrors disagree.
    ConsistencyError(String),
    /// Connection schema is not at the expected version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted into a record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateKey { table, key } => write!(f, "duplicate key `{key}` in {table}"),
            Self::NotFound { table, key } => write!(f, "`{key}` not found in {table}"),
            Self::InvalidTribe(value) => write!(
                f,
                "invalid tribe `{value}`; must be one of: Larab, Makani, Lawod, Lasang"
            ),
            Self::ArchiveConflict { table, key } => {
                write!(f, "`{key}` is already archived in {table}")
            }
            Self::ConsistencyError(details) => write!(f, "inconsistent member state: {details}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "records store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "records store requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<UnknownTribe> for RepoError {
    fn from(value: UnknownTribe) -> Self {
        Self::InvalidTribe(value.0)
    }
}

/// Maps a unique/primary-key violation on `table` to `DuplicateKey`.
pub(crate) fn map_insert_error(err: rusqlite::Error, table: &'static str, key: &str) -> RepoError {
    if is_unique_violation(&err) {
        return RepoError::DuplicateKey {
            table,
            key: key.to_string(),
        };
    }
    err.into()
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && matches!(
                    failure.extended_code,
                    rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                        | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                )
        }
        _ => false,
    }
}

/// Rejects connections that did not go through `db::open_db*`.
pub(crate) fn ensure_connection_ready(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
