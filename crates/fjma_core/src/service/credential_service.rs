//! Administrator credential use-case service.
//!
//! # Responsibility
//! - Hash passwords before they reach the credential store.
//! - Verify login attempts against stored digests.
//!
//! # Invariants
//! - Plaintext passwords never reach the repository.
//! - Unknown usernames and unreadable digests verify as `false`.
//! - Empty update fields are treated as not supplied.

use super::log_outcome;
use crate::auth::password::{CredentialHasher, HashConfig, HashError};
use crate::model::credential::{AdminAccount, Credential};
use crate::repo::credential_repo::{CredentialPatch, CredentialRepository};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Credential use-case failure.
#[derive(Debug)]
pub enum ServiceError {
    Repo(RepoError),
    Hash(HashError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Hash(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Hash(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<HashError> for ServiceError {
    fn from(value: HashError) -> Self {
        Self::Hash(value)
    }
}

/// Credential service over a repository implementation.
pub struct CredentialService<R: CredentialRepository> {
    repo: R,
    hasher: CredentialHasher,
}

impl<R: CredentialRepository> CredentialService<R> {
    /// Creates a service hashing new passwords with `hash_config`.
    pub fn new(repo: R, hash_config: &HashConfig) -> ServiceResult<Self> {
        Ok(Self {
            repo,
            hasher: CredentialHasher::new(hash_config)?,
        })
    }

    /// Provisions one administrator.
    ///
    /// Fails with `DuplicateKey` when `username` is taken.
    pub fn add_admin(&self, username: &str, password: &str, email: &str) -> ServiceResult<()> {
        let result = self.hasher.hash(password).map_err(ServiceError::from).and_then(|digest| {
            let credential = Credential {
                username: username.to_string(),
                password_hash: digest,
                email: email.to_string(),
            };
            self.repo
                .insert_credential(&credential)
                .map_err(ServiceError::from)
        });
        log_outcome("admin_add", username, &result);
        result
    }

    /// Checks a login attempt.
    pub fn verify(&self, username: &str, password: &str) -> ServiceResult<bool> {
        let Some(digest) = self.repo.password_hash(username)? else {
            return Ok(false);
        };
        Ok(self.hasher.verify(password, &digest))
    }

    /// Replaces password and/or email. `NotFound` for unknown usernames.
    pub fn update_admin(
        &self,
        username: &str,
        new_password: Option<&str>,
        new_email: Option<&str>,
    ) -> ServiceResult<()> {
        let digest = match new_password.filter(|value| !value.is_empty()) {
            Some(password) => Some(self.hasher.hash(password)?),
            None => None,
        };
        let patch = CredentialPatch {
            password_hash: digest.as_deref(),
            email: new_email.filter(|value| !value.is_empty()),
        };

        let result = self
            .repo
            .update_credential(username, patch)
            .map_err(ServiceError::from);
        log_outcome("admin_update", username, &result);
        result
    }

    /// Removes one administrator. Unknown usernames are a no-op.
    pub fn delete_admin(&self, username: &str) -> ServiceResult<bool> {
        let result = self
            .repo
            .delete_credential(username)
            .map_err(ServiceError::from);
        log_outcome("admin_delete", username, &result);
        result
    }

    pub fn list_admins(&self) -> ServiceResult<Vec<AdminAccount>> {
        Ok(self.repo.list_accounts()?)
    }
}
