//! Officer repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over live `officers` rows.
//! - Route deletes through the archive engine into `officers_archive`.
//!
//! # Invariants
//! - `school_id` is never rewritten by `update_officer`.
//! - Listing is deterministic: `school_id ASC` (archive adds `archive_id`).

use super::archive::{archive_one, DeleteOutcome, OFFICER_ARCHIVE};
use super::{ensure_connection_ready, map_insert_error, RepoError, RepoResult};
use crate::model::officer::{Officer, OfficerArchiveEntry};
use rusqlite::{params, Connection, OptionalExtension, Row};

const OFFICER_SELECT_SQL: &str = "SELECT
    school_id,
    first_name,
    middle_name,
    last_name,
    position,
    date_appointed,
    date_joined,
    email_address,
    phone_number
FROM officers";

/// Repository interface for officer records.
pub trait OfficerRepository {
    /// Inserts one officer; `DuplicateKey` when `school_id` exists.
    fn add_officer(&self, officer: &Officer) -> RepoResult<()>;
    /// Overwrites every field except `school_id`; `NotFound` when absent.
    fn update_officer(&self, officer: &Officer) -> RepoResult<()>;
    fn get_officer(&self, school_id: &str) -> RepoResult<Option<Officer>>;
    fn list_officers(&self) -> RepoResult<Vec<Officer>>;
    /// Archives and removes one officer. Absent ids are a no-op.
    fn delete_officer(&self, school_id: &str) -> RepoResult<DeleteOutcome>;
    fn list_archived_officers(&self) -> RepoResult<Vec<OfficerArchiveEntry>>;
}

/// SQLite-backed officer repository.
pub struct SqliteOfficerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOfficerRepository<'conn> {
    /// Creates repository from a connection opened through `db::open_db*`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["officers", "officers_archive"])?;
        Ok(Self { conn })
    }
}

impl OfficerRepository for SqliteOfficerRepository<'_> {
    fn add_officer(&self, officer: &Officer) -> RepoResult<()> {
        officer.validate()?;

        self.conn
            .execute(
                "INSERT INTO officers (
                    school_id,
                    first_name,
                    middle_name,
                    last_name,
                    position,
                    date_appointed,
                    date_joined,
                    email_address,
                    phone_number
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
                params![
                    officer.school_id,
                    officer.first_name,
                    officer.middle_name,
                    officer.last_name,
                    officer.position,
                    officer.date_appointed,
                    officer.date_joined,
                    officer.email_address,
                    officer.phone_number,
                ],
            )
            .map_err(|err| map_insert_error(err, "officers", &officer.school_id))?;

        Ok(())
    }

    fn update_officer(&self, officer: &Officer) -> RepoResult<()> {
        officer.validate()?;

        let changed = self.conn.execute(
            "UPDATE officers
             SET
                first_name = ?1,
                middle_name = ?2,
                last_name = ?3,
                position = ?4,
                date_appointed = ?5,
                date_joined = ?6,
                email_address = ?7,
                phone_number = ?8
             WHERE school_id = ?9;",
            params![
                officer.first_name,
                officer.middle_name,
                officer.last_name,
                officer.position,
                officer.date_appointed,
                officer.date_joined,
                officer.email_address,
                officer.phone_number,
                officer.school_id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "officers",
                key: officer.school_id.clone(),
            });
        }

        Ok(())
    }

    fn get_officer(&self, school_id: &str) -> RepoResult<Option<Officer>> {
        let officer = self
            .conn
            .query_row(
                &format!("{OFFICER_SELECT_SQL} WHERE school_id = ?1;"),
                [school_id],
                parse_officer_row,
            )
            .optional()?;
        Ok(officer)
    }

    fn list_officers(&self) -> RepoResult<Vec<Officer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{OFFICER_SELECT_SQL} ORDER BY school_id ASC;"))?;
        let officers = stmt
            .query_map([], parse_officer_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(officers)
    }

    fn delete_officer(&self, school_id: &str) -> RepoResult<DeleteOutcome> {
        archive_one(self.conn, &OFFICER_ARCHIVE, school_id)
    }

    fn list_archived_officers(&self) -> RepoResult<Vec<OfficerArchiveEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                archive_id,
                school_id,
                first_name,
                middle_name,
                last_name,
                position,
                date_appointed,
                date_joined,
                email_address,
                phone_number,
                deleted_at
             FROM officers_archive
             ORDER BY school_id ASC, archive_id ASC;",
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(OfficerArchiveEntry {
                    archive_id: row.get("archive_id")?,
                    officer: parse_officer_row(row)?,
                    deleted_at: row.get("deleted_at")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

fn parse_officer_row(row: &Row<'_>) -> rusqlite::Result<Officer> {
    Ok(Officer {
        school_id: row.get("school_id")?,
        first_name: row.get("first_name")?,
        middle_name: row.get("middle_name")?,
        last_name: row.get("last_name")?,
        position: row.get("position")?,
        date_appointed: row.get("date_appointed")?,
        date_joined: row.get("date_joined")?,
        email_address: row.get("email_address")?,
        phone_number: row.get("phone_number")?,
    })
}
