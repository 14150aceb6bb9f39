//! Application service for the admin-only member directory.

use std::sync::Arc;

use crate::domain::error::Error;
use crate::domain::member::{
    Member, MemberId, MemberProfile, MemberUpdate, MemberValidationError, NewMember, TeamRoster,
};
use crate::domain::ports::{MemberRepository, MemberRepositoryError};

const MEMBER_NOT_FOUND: &str = "member not found";
const EMPTY_UPDATE: &str = "no fields to update";

/// Coordinates team and member administration behind [`MemberRepository`].
#[derive(Clone)]
pub struct MemberService {
    repo: Arc<dyn MemberRepository>,
}

impl MemberService {
    /// Builds the service over a repository implementation.
    #[must_use]
    pub fn new(repo: Arc<dyn MemberRepository>) -> Self {
        Self { repo }
    }

    /// Lists every team with its members.
    pub async fn list_teams(&self) -> Result<Vec<TeamRoster>, Error> {
        self.repo.list_rosters().await.map_err(storage_error)
    }

    /// Loads one member with their team and client book.
    pub async fn get_profile(&self, id: MemberId) -> Result<MemberProfile, Error> {
        self.repo
            .find_profile(id)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| Error::not_found(MEMBER_NOT_FOUND))
    }

    /// Adds a member to the directory.
    ///
    /// # Errors
    /// A username collision surfaces as `conflict`.
    pub async fn create(&self, member: &NewMember) -> Result<Member, Error> {
        self.repo.create(member).await.map_err(storage_error)
    }

    /// Applies a partial update to one member.
    ///
    /// The contact number is deliberately absent from [`MemberUpdate`];
    /// it never changes through this path.
    pub async fn update(&self, id: MemberId, update: &MemberUpdate) -> Result<Member, Error> {
        if update.is_empty() {
            return Err(Error::invalid_request(EMPTY_UPDATE));
        }
        update.validate().map_err(invalid)?;
        self.repo
            .update(id, update)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| Error::not_found(MEMBER_NOT_FOUND))
    }

    /// Removes a member from the directory.
    pub async fn remove(&self, id: MemberId) -> Result<(), Error> {
        let removed = self.repo.delete(id).await.map_err(storage_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found(MEMBER_NOT_FOUND))
        }
    }
}

fn invalid(err: MemberValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

fn storage_error(err: MemberRepositoryError) -> Error {
    match err {
        MemberRepositoryError::DuplicateUsername { .. } => Error::conflict(err.to_string()),
        MemberRepositoryError::Connection { .. } => {
            tracing::error!(error = %err, "member repository failure");
            Error::service_unavailable("the member directory is temporarily unavailable")
        }
        MemberRepositoryError::Query { .. } => {
            tracing::error!(error = %err, "member repository failure");
            Error::internal("member directory access failed")
        }
    }
}

#[cfg(test)]
#[path = "member_service_tests.rs"]
mod tests;
