//! Member/tribe repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over live `members` rows.
//! - Keep exactly one mirror per member in its tribe container.
//! - Cascade deletes through the archive engine into both archives.
//!
//! # Invariants
//! - Member and mirror writes share one immediate transaction.
//! - An unknown tribe is rejected before any container is touched.
//! - Member and mirror archive rows of one delete share `deleted_at`.
//! - A missing mirror does not block a delete; it is logged as drift.

use super::archive::{
    archive_and_remove, now_timestamp, tribe_archive, DeleteOutcome, MEMBER_ARCHIVE,
};
use super::{ensure_connection_ready, map_insert_error, RepoError, RepoResult};
use crate::model::member::{
    Member, MemberArchiveEntry, MemberDraft, Tribe, TribeMember, TribeMemberArchiveEntry,
};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

const MEMBER_SELECT_SQL: &str = "SELECT
    school_id,
    first_name,
    middle_name,
    last_name,
    year_level,
    section,
    email_address,
    phone_number,
    tribe
FROM members";

/// One live member/mirror disagreement found by `check_consistency`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyIssue {
    /// Member row has no mirror in its tribe container.
    MissingMirror { school_id: String, tribe: Tribe },
    /// Mirror row has no member row with a matching tribe.
    OrphanMirror { school_id: String, tribe: Tribe },
    /// Mirror exists but its shared fields differ from the member row.
    MirrorMismatch { school_id: String, tribe: Tribe },
}

impl Display for ConsistencyIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingMirror { school_id, tribe } => {
                write!(f, "member `{school_id}` has no mirror in {tribe}")
            }
            Self::OrphanMirror { school_id, tribe } => {
                write!(f, "{tribe} mirror `{school_id}` has no matching member")
            }
            Self::MirrorMismatch { school_id, tribe } => {
                write!(f, "{tribe} mirror `{school_id}` differs from its member row")
            }
        }
    }
}

/// Repository interface for members and their tribe mirrors.
pub trait MemberRepository {
    /// Inserts a member and its tribe mirror as one unit of work.
    fn add_member(&self, draft: &MemberDraft) -> RepoResult<Member>;
    /// Overwrites every field except `school_id` in member and mirror.
    ///
    /// A tribe change moves the mirror into the new tribe container.
    fn update_member(&self, draft: &MemberDraft) -> RepoResult<Member>;
    fn get_member(&self, school_id: &str) -> RepoResult<Option<Member>>;
    fn list_members(&self) -> RepoResult<Vec<Member>>;
    fn list_tribe_members(&self, tribe: Tribe) -> RepoResult<Vec<TribeMember>>;
    /// Archives and removes a member and its mirror. Absent ids are a no-op.
    fn delete_member(&self, school_id: &str) -> RepoResult<DeleteOutcome>;
    fn list_archived_members(&self) -> RepoResult<Vec<MemberArchiveEntry>>;
    fn list_archived_tribe_members(&self, tribe: Tribe)
        -> RepoResult<Vec<TribeMemberArchiveEntry>>;
    /// Compares live members against all four tribe containers.
    fn check_consistency(&self) -> RepoResult<Vec<ConsistencyIssue>>;
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Creates repository from a connection opened through `db::open_db*`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let mut tables = vec!["members", "members_archive"];
        for tribe in Tribe::ALL {
            tables.push(tribe.live_table());
            tables.push(tribe.archive_table());
        }
        ensure_connection_ready(conn, &tables)?;
        Ok(Self { conn })
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn add_member(&self, draft: &MemberDraft) -> RepoResult<Member> {
        let member = Member::try_from(draft)?;
        member.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        insert_member(&tx, &member)?;
        insert_mirror(&tx, &member.mirror())?;
        tx.commit()?;

        Ok(member)
    }

    fn update_member(&self, draft: &MemberDraft) -> RepoResult<Member> {
        let member = Member::try_from(draft)?;
        member.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let previous_tribe =
            member_tribe(&tx, &member.school_id)?.ok_or_else(|| RepoError::NotFound {
                table: "members",
                key: member.school_id.clone(),
            })?;

        tx.execute(
            "UPDATE members
             SET
                first_name = ?1,
                middle_name = ?2,
                last_name = ?3,
                year_level = ?4,
                section = ?5,
                email_address = ?6,
                phone_number = ?7,
                tribe = ?8
             WHERE school_id = ?9;",
            params![
                member.first_name,
                member.middle_name,
                member.last_name,
                member.year_level,
                member.section,
                member.email_address,
                member.phone_number,
                member.tribe.as_str(),
                member.school_id,
            ],
        )?;

        // Mirror is rewritten wholesale so a tribe change and a field change
        // take the same path.
        tx.execute(
            &format!(
                "DELETE FROM {} WHERE school_id = ?1;",
                previous_tribe.live_table()
            ),
            [member.school_id.as_str()],
        )?;
        insert_mirror(&tx, &member.mirror())?;
        tx.commit()?;

        Ok(member)
    }

    fn get_member(&self, school_id: &str) -> RepoResult<Option<Member>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} WHERE school_id = ?1;"))?;
        let mut rows = stmt.query([school_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_member_row(row)?));
        }
        Ok(None)
    }

    fn list_members(&self) -> RepoResult<Vec<Member>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} ORDER BY school_id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }
        Ok(members)
    }

    fn list_tribe_members(&self, tribe: Tribe) -> RepoResult<Vec<TribeMember>> {
        load_mirrors(self.conn, tribe)
    }

    fn delete_member(&self, school_id: &str) -> RepoResult<DeleteOutcome> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let Some(tribe) = member_tribe(&tx, school_id)? else {
            return Ok(DeleteOutcome::Absent);
        };

        let deleted_at = now_timestamp();
        archive_and_remove(&tx, &MEMBER_ARCHIVE, school_id, &deleted_at)?;
        if !archive_and_remove(&tx, &tribe_archive(tribe), school_id, &deleted_at)? {
            warn!(
                "event=member_delete module=repo status=drift tribe={} reason=mirror_missing",
                tribe
            );
        }
        tx.commit()?;

        Ok(DeleteOutcome::Archived { deleted_at })
    }

    fn list_archived_members(&self) -> RepoResult<Vec<MemberArchiveEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                archive_id,
                school_id,
                first_name,
                middle_name,
                last_name,
                year_level,
                section,
                email_address,
                phone_number,
                tribe,
                deleted_at
             FROM members_archive
             ORDER BY school_id ASC, archive_id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(MemberArchiveEntry {
                archive_id: row.get("archive_id")?,
                member: parse_member_row(row)?,
                deleted_at: row.get("deleted_at")?,
            });
        }
        Ok(entries)
    }

    fn list_archived_tribe_members(
        &self,
        tribe: Tribe,
    ) -> RepoResult<Vec<TribeMemberArchiveEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT
                archive_id,
                school_id,
                first_name,
                middle_name,
                last_name,
                year_level,
                section,
                email_address,
                phone_number,
                deleted_at
             FROM {}
             ORDER BY school_id ASC, archive_id ASC;",
            tribe.archive_table()
        ))?;
        let entries = stmt
            .query_map([], |row| {
                Ok(TribeMemberArchiveEntry {
                    archive_id: row.get("archive_id")?,
                    member: parse_mirror_row(row, tribe)?,
                    deleted_at: row.get("deleted_at")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn check_consistency(&self) -> RepoResult<Vec<ConsistencyIssue>> {
        let mut mirrors: BTreeMap<(String, Tribe), TribeMember> = BTreeMap::new();
        for tribe in Tribe::ALL {
            for mirror in load_mirrors(self.conn, tribe)? {
                mirrors.insert((mirror.school_id.clone(), tribe), mirror);
            }
        }

        let mut issues = Vec::new();
        for member in self.list_members()? {
            let key = (member.school_id.clone(), member.tribe);
            match mirrors.remove(&key) {
                Some(mirror) if mirror.agrees_with(&member) => {}
                Some(_) => issues.push(ConsistencyIssue::MirrorMismatch {
                    school_id: member.school_id,
                    tribe: member.tribe,
                }),
                None => issues.push(ConsistencyIssue::MissingMirror {
                    school_id: member.school_id,
                    tribe: member.tribe,
                }),
            }
        }

        issues.extend(
            mirrors
                .into_keys()
                .map(|(school_id, tribe)| ConsistencyIssue::OrphanMirror { school_id, tribe }),
        );
        Ok(issues)
    }
}

fn insert_member(conn: &Connection, member: &Member) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO members (
            school_id,
            first_name,
            middle_name,
            last_name,
            year_level,
            section,
            email_address,
            phone_number,
            tribe
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
        params![
            member.school_id,
            member.first_name,
            member.middle_name,
            member.last_name,
            member.year_level,
            member.section,
            member.email_address,
            member.phone_number,
            member.tribe.as_str(),
        ],
    )
    .map_err(|err| map_insert_error(err, "members", &member.school_id))?;
    Ok(())
}

fn insert_mirror(conn: &Connection, mirror: &TribeMember) -> RepoResult<()> {
    let table = mirror.tribe.live_table();
    conn.execute(
        &format!(
            "INSERT INTO {table} (
                school_id,
                first_name,
                middle_name,
                last_name,
                year_level,
                section,
                email_address,
                phone_number
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);"
        ),
        params![
            mirror.school_id,
            mirror.first_name,
            mirror.middle_name,
            mirror.last_name,
            mirror.year_level,
            mirror.section,
            mirror.email_address,
            mirror.phone_number,
        ],
    )
    .map_err(|err| map_insert_error(err, table, &mirror.school_id))?;
    Ok(())
}

fn member_tribe(conn: &Connection, school_id: &str) -> RepoResult<Option<Tribe>> {
    let value: Option<String> = conn
        .query_row(
            "SELECT tribe FROM members WHERE school_id = ?1;",
            [school_id],
            |row| row.get(0),
        )
        .optional()?;
    value.map(|text| parse_tribe(&text)).transpose()
}

fn load_mirrors(conn: &Connection, tribe: Tribe) -> RepoResult<Vec<TribeMember>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT
            school_id,
            first_name,
            middle_name,
            last_name,
            year_level,
            section,
            email_address,
            phone_number
         FROM {}
         ORDER BY school_id ASC;",
        tribe.live_table()
    ))?;
    let mirrors = stmt
        .query_map([], |row| parse_mirror_row(row, tribe))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(mirrors)
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let tribe_text: String = row.get("tribe")?;
    Ok(Member {
        school_id: row.get("school_id")?,
        first_name: row.get("first_name")?,
        middle_name: row.get("middle_name")?,
        last_name: row.get("last_name")?,
        year_level: row.get("year_level")?,
        section: row.get("section")?,
        email_address: row.get("email_address")?,
        phone_number: row.get("phone_number")?,
        tribe: parse_tribe(&tribe_text)?,
    })
}

fn parse_mirror_row(row: &Row<'_>, tribe: Tribe) -> rusqlite::Result<TribeMember> {
    Ok(TribeMember {
        tribe,
        school_id: row.get("school_id")?,
        first_name: row.get("first_name")?,
        middle_name: row.get("middle_name")?,
        last_name: row.get("last_name")?,
        year_level: row.get("year_level")?,
        section: row.get("section")?,
        email_address: row.get("email_address")?,
        phone_number: row.get("phone_number")?,
    })
}

fn parse_tribe(value: &str) -> RepoResult<Tribe> {
    Tribe::parse(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid tribe `{value}` in members.tribe")))
}
