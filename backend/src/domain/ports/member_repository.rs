//! Driven port for the member directory.

use async_trait::async_trait;
use chrono::Utc;

use super::define_port_error;
use crate::domain::member::{
    Member, MemberId, MemberProfile, MemberUpdate, NewMember, TeamRoster,
};

define_port_error! {
    /// Errors raised by [`MemberRepository`] adapters.
    pub enum MemberRepositoryError {
        /// The backing store could not be reached.
        #[error("member store connection failed: {message}")]
        Connection { message: String },
        /// A statement failed once connected.
        #[error("member store query failed: {message}")]
        Query { message: String },
        /// An insert or update collided with an existing username.
        #[error("username {username} is already taken")]
        DuplicateUsername { username: String },
    }
}

/// Persistence port for teams and their members.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Lists every team with its members.
    async fn list_rosters(&self) -> Result<Vec<TeamRoster>, MemberRepositoryError>;

    /// Loads one member with their team and client book.
    async fn find_profile(
        &self,
        id: MemberId,
    ) -> Result<Option<MemberProfile>, MemberRepositoryError>;

    /// Inserts a member; usernames are unique across the directory.
    async fn create(&self, member: &NewMember) -> Result<Member, MemberRepositoryError>;

    /// Applies the provided fields of `update` to one member.
    async fn update(
        &self,
        id: MemberId,
        update: &MemberUpdate,
    ) -> Result<Option<Member>, MemberRepositoryError>;

    /// Deletes one member. Returns whether a row was removed.
    async fn delete(&self, id: MemberId) -> Result<bool, MemberRepositoryError>;
}

/// Inert directory for tests that wire the port without touching it.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMemberRepository;

#[async_trait]
impl MemberRepository for FixtureMemberRepository {
    async fn list_rosters(&self) -> Result<Vec<TeamRoster>, MemberRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_profile(
        &self,
        _id: MemberId,
    ) -> Result<Option<MemberProfile>, MemberRepositoryError> {
        Ok(None)
    }

    async fn create(&self, member: &NewMember) -> Result<Member, MemberRepositoryError> {
        let now = Utc::now();
        Ok(Member {
            id: MemberId(1),
            username: member.username().to_owned(),
            firstname: member.firstname().to_owned(),
            lastname: member.lastname().to_owned(),
            number: member.number().to_owned(),
            team_id: member.team_id(),
            status: member.status(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn update(
        &self,
        _id: MemberId,
        _update: &MemberUpdate,
    ) -> Result<Option<Member>, MemberRepositoryError> {
        Ok(None)
    }

    async fn delete(&self, _id: MemberId) -> Result<bool, MemberRepositoryError> {
        Ok(false)
    }
}
