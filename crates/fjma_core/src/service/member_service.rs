//! Member use-case service.
//!
//! # Responsibility
//! - Provide member CRUD entry points, including per-tribe views.
//! - Surface member/mirror drift as an explicit error on request.
//!
//! # Invariants
//! - Tribe selection and dual writes stay inside the repository.

use super::log_outcome;
use crate::model::member::{
    Member, MemberArchiveEntry, MemberDraft, Tribe, TribeMember, TribeMemberArchiveEntry,
};
use crate::repo::archive::DeleteOutcome;
use crate::repo::member_repo::{ConsistencyIssue, MemberRepository};
use crate::repo::{RepoError, RepoResult};

/// Member service over a repository implementation.
pub struct MemberService<R: MemberRepository> {
    repo: R,
}

impl<R: MemberRepository> MemberService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Enrolls a member into its tribe.
    ///
    /// # Contract
    /// - Tribe matching ignores case; unknown tribes fail with `InvalidTribe`.
    /// - Member row and tribe mirror are written together or not at all.
    pub fn add_member(&self, draft: &MemberDraft) -> RepoResult<Member> {
        let result = self.repo.add_member(draft);
        log_outcome("member_add", &draft.school_id, &result);
        result
    }

    /// Overwrites a member's details, moving the mirror on tribe change.
    pub fn update_member(&self, draft: &MemberDraft) -> RepoResult<Member> {
        let result = self.repo.update_member(draft);
        log_outcome("member_update", &draft.school_id, &result);
        result
    }

    pub fn get_member(&self, school_id: &str) -> RepoResult<Option<Member>> {
        self.repo.get_member(school_id)
    }

    pub fn list_members(&self) -> RepoResult<Vec<Member>> {
        self.repo.list_members()
    }

    pub fn list_tribe_members(&self, tribe: Tribe) -> RepoResult<Vec<TribeMember>> {
        self.repo.list_tribe_members(tribe)
    }

    /// Archives and removes a member and its mirror. Unknown ids are a no-op.
    pub fn delete_member(&self, school_id: &str) -> RepoResult<DeleteOutcome> {
        let result = self.repo.delete_member(school_id);
        log_outcome("member_delete", school_id, &result);
        result
    }

    pub fn list_archived_members(&self) -> RepoResult<Vec<MemberArchiveEntry>> {
        self.repo.list_archived_members()
    }

    pub fn list_archived_tribe_members(
        &self,
        tribe: Tribe,
    ) -> RepoResult<Vec<TribeMemberArchiveEntry>> {
        self.repo.list_archived_tribe_members(tribe)
    }

    /// Lists every member/mirror disagreement.
    pub fn check_consistency(&self) -> RepoResult<Vec<ConsistencyIssue>> {
        self.repo.check_consistency()
    }

    /// Fails with `ConsistencyError` when any drift exists.
    pub fn ensure_consistent(&self) -> RepoResult<()> {
        let issues = self.repo.check_consistency()?;
        if issues.is_empty() {
            return Ok(());
        }
        let details = issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(RepoError::ConsistencyError(details))
    }
}
