//! Officer use-case service.
//!
//! # Responsibility
//! - Provide officer CRUD entry points for callers.
//! - Delegate persistence and archival to the officer repository.

use super::log_outcome;
use crate::model::officer::{Officer, OfficerArchiveEntry};
use crate::repo::archive::DeleteOutcome;
use crate::repo::officer_repo::OfficerRepository;
use crate::repo::RepoResult;

/// Officer service over a repository implementation.
pub struct OfficerService<R: OfficerRepository> {
    repo: R,
}

impl<R: OfficerRepository> OfficerService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Records a newly appointed officer.
    pub fn add_officer(&self, officer: &Officer) -> RepoResult<()> {
        let result = self.repo.add_officer(officer);
        log_outcome("officer_add", &officer.school_id, &result);
        result
    }

    /// Overwrites an officer's details. `NotFound` when absent.
    pub fn update_officer(&self, officer: &Officer) -> RepoResult<()> {
        let result = self.repo.update_officer(officer);
        log_outcome("officer_update", &officer.school_id, &result);
        result
    }

    pub fn get_officer(&self, school_id: &str) -> RepoResult<Option<Officer>> {
        self.repo.get_officer(school_id)
    }

    pub fn list_officers(&self) -> RepoResult<Vec<Officer>> {
        self.repo.list_officers()
    }

    /// Archives and removes an officer. Unknown ids are a no-op.
    pub fn delete_officer(&self, school_id: &str) -> RepoResult<DeleteOutcome> {
        let result = self.repo.delete_officer(school_id);
        log_outcome("officer_delete", school_id, &result);
        result
    }

    pub fn list_archived_officers(&self) -> RepoResult<Vec<OfficerArchiveEntry>> {
        self.repo.list_archived_officers()
    }
}
