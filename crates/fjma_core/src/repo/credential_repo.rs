//! Administrator credential repository and SQLite implementation.
//!
//! # Responsibility
//! - Persist username, opaque password digest and email.
//! - Keep digests inside the store; list paths expose only public fields.
//!
//! # Invariants
//! - `username` is the identity key and never rewritten.
//! - Credentials are hard-deleted; there is no archive container.

use super::{ensure_connection_ready, map_insert_error, RepoError, RepoResult};
use crate::model::credential::{AdminAccount, Credential};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

/// Partial credential update; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialPatch<'a> {
    pub password_hash: Option<&'a [u8]>,
    pub email: Option<&'a str>,
}

/// Repository interface for administrator credentials.
pub trait CredentialRepository {
    /// Inserts one credential; `DuplicateKey` when `username` exists.
    fn insert_credential(&self, credential: &Credential) -> RepoResult<()>;
    /// Returns the stored digest, or `None` for unknown usernames.
    fn password_hash(&self, username: &str) -> RepoResult<Option<Vec<u8>>>;
    /// Applies supplied fields atomically; `NotFound` when absent.
    fn update_credential(&self, username: &str, patch: CredentialPatch<'_>) -> RepoResult<()>;
    /// Removes one credential. Returns whether a row existed.
    fn delete_credential(&self, username: &str) -> RepoResult<bool>;
    fn list_accounts(&self) -> RepoResult<Vec<AdminAccount>>;
}

/// SQLite-backed credential repository.
pub struct SqliteCredentialRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCredentialRepository<'conn> {
    /// Creates repository from a connection opened through `db::open_db*`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["login_credentials"])?;
        Ok(Self { conn })
    }
}

impl CredentialRepository for SqliteCredentialRepository<'_> {
    fn insert_credential(&self, credential: &Credential) -> RepoResult<()> {
        self.conn
            .execute(
                "INSERT INTO login_credentials (username, password, email)
                 VALUES (?1, ?2, ?3);",
                params![
                    credential.username,
                    credential.password_hash,
                    credential.email
                ],
            )
            .map_err(|err| map_insert_error(err, "login_credentials", &credential.username))?;
        Ok(())
    }

    fn password_hash(&self, username: &str) -> RepoResult<Option<Vec<u8>>> {
        let hash = self
            .conn
            .query_row(
                "SELECT password FROM login_credentials WHERE username = ?1;",
                [username],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(hash)
    }

    fn update_credential(&self, username: &str, patch: CredentialPatch<'_>) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM login_credentials WHERE username = ?1);",
            [username],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(RepoError::NotFound {
                table: "login_credentials",
                key: username.to_string(),
            });
        }

        if let Some(hash) = patch.password_hash {
            tx.execute(
                "UPDATE login_credentials SET password = ?1 WHERE username = ?2;",
                params![hash, username],
            )?;
        }
        if let Some(email) = patch.email {
            tx.execute(
                "UPDATE login_credentials SET email = ?1 WHERE username = ?2;",
                params![email, username],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_credential(&self, username: &str) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM login_credentials WHERE username = ?1;",
            [username],
        )?;
        Ok(changed > 0)
    }

    fn list_accounts(&self) -> RepoResult<Vec<AdminAccount>> {
        let mut stmt = self
            .conn
            .prepare("SELECT username, email FROM login_credentials ORDER BY username ASC;")?;
        let accounts = stmt
            .query_map([], |row| {
                Ok(AdminAccount {
                    username: row.get("username")?,
                    email: row.get("email")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(accounts)
    }
}
