//! Records schema history.
//!
//! # Responsibility
//! - Create credential, officer, member and tribe containers.
//! - Upgrade databases written by the earlier records tool, whose archive
//!   tables were keyed by `school_id` alone.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - SQL steps use `IF NOT EXISTS`; upgrade steps are no-ops on current tables.
//! - All pending steps share one transaction; `PRAGMA user_version` is bumped
//!   per step inside it.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, Transaction};

const INIT_SQL: &str = include_str!("0001_init.sql");

/// Archive containers as created at version 1.
const ARCHIVE_TABLES: &[&str] = &[
    "officers_archive",
    "members_archive",
    "larab_members_archive",
    "makani_members_archive",
    "lawod_members_archive",
    "lasang_members_archive",
];

enum Step {
    Sql(&'static str),
    Upgrade(fn(&Transaction<'_>) -> DbResult<()>),
}

struct Migration {
    version: u32,
    step: Step,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        step: Step::Sql(INIT_SQL),
    },
    Migration {
        version: 2,
        step: Step::Sql(include_str!("0002_archive_indexes.sql")),
    },
    Migration {
        version: 3,
        step: Step::Upgrade(rebuild_keyed_archives),
    },
    Migration {
        version: 4,
        step: Step::Sql(include_str!("0004_archive_lookup_indexes.sql")),
    },
];

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending schema steps on the provided connection.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current_version) {
        match migration.step {
            Step::Sql(sql) => tx.execute_batch(sql)?,
            Step::Upgrade(upgrade) => upgrade(&tx)?,
        }
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        current_version, latest
    );
    Ok(())
}

/// Rebuilds archive tables that lack the `archive_id` surrogate.
///
/// Such tables reject a second archive row for the same `school_id`. Rows
/// are copied in their original insertion order.
fn rebuild_keyed_archives(tx: &Transaction<'_>) -> DbResult<()> {
    for &table in ARCHIVE_TABLES {
        let columns = column_names(tx, table)?;
        if columns.is_empty() || columns.iter().any(|name| name == "archive_id") {
            continue;
        }

        let staging = format!("{table}_keyed");
        tx.execute_batch(&format!("ALTER TABLE {table} RENAME TO {staging};"))?;
        tx.execute_batch(INIT_SQL)?;

        let column_list = columns
            .iter()
            .map(|name| format!("\"{name}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let copied = tx.execute(
            &format!(
                "INSERT INTO {table} ({column_list})
                 SELECT {column_list} FROM {staging} ORDER BY rowid ASC;"
            ),
            [],
        )?;
        tx.execute_batch(&format!("DROP TABLE {staging};"))?;

        info!(
            "event=db_migrate module=db status=ok step=archive_rebuild table={} rows={}",
            table, copied
        );
    }
    Ok(())
}

fn column_names(conn: &Connection, table: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid ASC;")?;
    let names = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, column_names, latest_version, MIGRATIONS};
    use rusqlite::Connection;

    #[test]
    fn versions_are_strictly_increasing() {
        assert!(MIGRATIONS
            .windows(2)
            .all(|pair| pair[0].version < pair[1].version));
    }

    #[test]
    fn fresh_archives_are_left_in_place() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        conn.execute_batch(
            "INSERT INTO officers_archive (
                school_id, first_name, last_name, position,
                date_appointed, date_joined, email_address, phone_number, deleted_at
            ) VALUES ('S1', 'A', 'B', 'P', 'd', 'd', 'e', 'p', 't1');
            PRAGMA user_version = 2;",
        )
        .unwrap();

        apply_migrations(&mut conn).unwrap();

        let archive_id: i64 = conn
            .query_row("SELECT archive_id FROM officers_archive;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(archive_id, 1);
        let version: u32 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, latest_version());
    }

    #[test]
    fn keyed_archive_is_rebuilt_with_surrogate_key() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE lawod_members_archive (
                school_id TEXT PRIMARY KEY,
                first_name TEXT NOT NULL,
                middle_name TEXT,
                last_name TEXT NOT NULL,
                year_level TEXT NOT NULL,
                section TEXT NOT NULL,
                email_address TEXT NOT NULL,
                phone_number TEXT NOT NULL,
                deleted_at TEXT NOT NULL
            );",
        )
        .unwrap();

        apply_migrations(&mut conn).unwrap();

        let columns = column_names(&conn, "lawod_members_archive").unwrap();
        assert_eq!(columns.first().map(String::as_str), Some("archive_id"));
        assert!(column_names(&conn, "lawod_members_archive_keyed")
            .unwrap()
            .is_empty());
    }
}
