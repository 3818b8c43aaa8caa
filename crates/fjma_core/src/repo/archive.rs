//! Archive-on-delete engine shared by the officer and member stores.
//!
//! # Responsibility
//! - Copy a live row into its archive container stamped with `deleted_at`.
//! - Remove the live row once the archive copy is in place.
//!
//! # Invariants
//! - Archive containers are append-only; archived rows are never updated.
//! - An absent live row is a no-op and leaves every container unchanged.
//! - Copy and removal are visible together or not at all.
//! - Container and column names come only from static `ArchiveSpec`s.

use super::{is_unique_violation, RepoError, RepoResult};
use crate::model::member::Tribe;
use chrono::{Local, SecondsFormat};
use log::debug;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

const OFFICER_COLUMNS: &[&str] = &[
    "school_id",
    "first_name",
    "middle_name",
    "last_name",
    "position",
    "date_appointed",
    "date_joined",
    "email_address",
    "phone_number",
];

const MEMBER_COLUMNS: &[&str] = &[
    "school_id",
    "first_name",
    "middle_name",
    "last_name",
    "year_level",
    "section",
    "email_address",
    "phone_number",
    "tribe",
];

const TRIBE_MEMBER_COLUMNS: &[&str] = &[
    "school_id",
    "first_name",
    "middle_name",
    "last_name",
    "year_level",
    "section",
    "email_address",
    "phone_number",
];

/// Static description of one live/archive container pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveSpec {
    pub live_table: &'static str,
    pub archive_table: &'static str,
    pub key_column: &'static str,
    /// Columns copied verbatim; the archive adds `deleted_at`.
    pub columns: &'static [&'static str],
}

pub const OFFICER_ARCHIVE: ArchiveSpec = ArchiveSpec {
    live_table: "officers",
    archive_table: "officers_archive",
    key_column: "school_id",
    columns: OFFICER_COLUMNS,
};

pub const MEMBER_ARCHIVE: ArchiveSpec = ArchiveSpec {
    live_table: "members",
    archive_table: "members_archive",
    key_column: "school_id",
    columns: MEMBER_COLUMNS,
};

/// Container pair holding the mirrors of one tribe.
pub fn tribe_archive(tribe: Tribe) -> ArchiveSpec {
    ArchiveSpec {
        live_table: tribe.live_table(),
        archive_table: tribe.archive_table(),
        key_column: "school_id",
        columns: TRIBE_MEMBER_COLUMNS,
    }
}

/// Result of a delete routed through the archive engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// No live row had the key; nothing changed.
    Absent,
    /// The live row was archived with this timestamp and removed.
    Archived { deleted_at: String },
}

impl DeleteOutcome {
    pub fn is_archived(&self) -> bool {
        matches!(self, Self::Archived { .. })
    }
}

/// Current local wall-clock time as an RFC 3339 timestamp.
pub fn now_timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Archives and removes one live row inside the caller's transaction.
///
/// Returns `false` when the key is absent. The caller owns commit and
/// rollback, so cascades can share one `deleted_at` and one unit of work.
///
/// # Errors
/// - `ArchiveConflict` when the archive already holds `(key, deleted_at)`.
pub fn archive_and_remove(
    conn: &Connection,
    spec: &ArchiveSpec,
    key: &str,
    deleted_at: &str,
) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1);",
            spec.live_table, spec.key_column
        ),
        [key],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Ok(false);
    }

    let columns = spec.columns.join(", ");
    conn.execute(
        &format!(
            "INSERT INTO {archive} ({columns}, deleted_at)
             SELECT {columns}, ?2
             FROM {live}
             WHERE {key_column} = ?1;",
            archive = spec.archive_table,
            live = spec.live_table,
            key_column = spec.key_column,
        ),
        params![key, deleted_at],
    )
    .map_err(|err| {
        if is_unique_violation(&err) {
            RepoError::ArchiveConflict {
                table: spec.archive_table,
                key: key.to_string(),
            }
        } else {
            err.into()
        }
    })?;

    conn.execute(
        &format!(
            "DELETE FROM {} WHERE {} = ?1;",
            spec.live_table, spec.key_column
        ),
        [key],
    )?;

    debug!(
        "event=archive_row module=repo status=ok table={} archive_table={}",
        spec.live_table, spec.archive_table
    );
    Ok(true)
}

/// Archives and removes one row in its own immediate transaction.
pub fn archive_one(conn: &Connection, spec: &ArchiveSpec, key: &str) -> RepoResult<DeleteOutcome> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let deleted_at = now_timestamp();
    if !archive_and_remove(&tx, spec, key, &deleted_at)? {
        return Ok(DeleteOutcome::Absent);
    }
    tx.commit()?;
    Ok(DeleteOutcome::Archived { deleted_at })
}
