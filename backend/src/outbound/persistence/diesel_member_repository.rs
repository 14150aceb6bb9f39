//! PostgreSQL-backed `MemberRepository` implementation using Diesel.
//!
//! The directory is read by administrators only, so nothing here is
//! owner-scoped. Username collisions surface as their own error variant;
//! the unique index on `members.username` is the source of truth.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::client::Client;
use crate::domain::member::{
    Member, MemberId, MemberProfile, MemberStatus, MemberUpdate, NewMember, Team, TeamId,
    TeamRoster,
};
use crate::domain::ports::{ClientRepositoryError, MemberRepository, MemberRepositoryError};

use super::diesel_client_repository::row_to_client;
use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ClientRow, MemberChangeset, MemberRow, NewMemberRow, TeamRow};
use super::pool::DbPool;
use super::schema::{clients, members, teams};

/// Diesel-backed implementation of the `MemberRepository` port.
#[derive(Clone)]
pub struct DieselMemberRepository {
    pool: DbPool,
}

impl DieselMemberRepository {
    /// Create a new repository with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Convert a database row to a domain [`Member`].
///
/// The status column is only ever written from the enum, so unreadable
/// text means the row was edited out of band.
fn row_to_member(row: MemberRow) -> Result<Member, MemberRepositoryError> {
    let status = MemberStatus::parse(&row.status).ok_or_else(|| {
        MemberRepositoryError::query(format!(
            "member {} has unreadable status {:?}",
            row.id, row.status
        ))
    })?;
    Ok(Member {
        id: MemberId(row.id),
        username: row.username,
        firstname: row.firstname,
        lastname: row.lastname,
        number: row.number,
        team_id: TeamId(row.team_id),
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn row_to_team(row: TeamRow) -> Team {
    Team {
        id: TeamId(row.id),
        name: row.name,
    }
}

/// Convert a client row for a member profile, rehoming conversion
/// failures under this port's error type.
fn row_to_owned_client(row: ClientRow) -> Result<Client, MemberRepositoryError> {
    row_to_client(row).map_err(|err| match err {
        ClientRepositoryError::Connection { message } | ClientRepositoryError::Query { message } => {
            MemberRepositoryError::query(message)
        }
    })
}

/// Fold a write failure into the port error, surfacing username
/// collisions as their own variant.
fn duplicate_or_other(error: diesel::result::Error, username: &str) -> MemberRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) = &error {
        return MemberRepositoryError::duplicate_username(username);
    }
    map_diesel_error(error)
}

/// Pair every team with its members, keeping both in id order.
fn group_rosters(
    team_rows: Vec<TeamRow>,
    member_rows: Vec<MemberRow>,
) -> Result<Vec<TeamRoster>, MemberRepositoryError> {
    let mut grouped: HashMap<i32, Vec<Member>> = HashMap::new();
    for row in member_rows {
        let team_id = row.team_id;
        grouped
            .entry(team_id)
            .or_default()
            .push(row_to_member(row)?);
    }
    Ok(team_rows
        .into_iter()
        .map(|team_row| {
            let members = grouped.remove(&team_row.id).unwrap_or_default();
            TeamRoster {
                team: row_to_team(team_row),
                members,
            }
        })
        .collect())
}

/// Rows backing one member profile.
type ProfileRows = (MemberRow, Option<TeamRow>, Vec<ClientRow>);

#[async_trait]
impl MemberRepository for DieselMemberRepository {
    async fn list_rosters(&self) -> Result<Vec<TeamRoster>, MemberRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Both SELECTs run in one transaction so a member moved between
        // teams mid-read does not appear twice or vanish.
        let (team_rows, member_rows) = conn
            .transaction(|conn| {
                async move {
                    let team_rows: Vec<TeamRow> = teams::table
                        .order_by(teams::id.asc())
                        .select(TeamRow::as_select())
                        .load(conn)
                        .await?;
                    let member_rows: Vec<MemberRow> = members::table
                        .order_by((members::team_id.asc(), members::id.asc()))
                        .select(MemberRow::as_select())
                        .load(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>((team_rows, member_rows))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        group_rosters(team_rows, member_rows)
    }

    async fn find_profile(
        &self,
        id: MemberId,
    ) -> Result<Option<MemberProfile>, MemberRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let snapshot: Option<ProfileRows> = conn
            .transaction(|conn| {
                async move {
                    let member_row: Option<MemberRow> = members::table
                        .filter(members::id.eq(id.0))
                        .select(MemberRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(member_row) = member_row else {
                        return Ok::<_, diesel::result::Error>(None);
                    };
                    let team_row: Option<TeamRow> = teams::table
                        .filter(teams::id.eq(member_row.team_id))
                        .select(TeamRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;
                    let client_rows: Vec<ClientRow> = clients::table
                        .filter(clients::member_id.eq(member_row.id))
                        .order_by(clients::id.asc())
                        .select(ClientRow::as_select())
                        .load(conn)
                        .await?;
                    Ok(Some((member_row, team_row, client_rows)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let Some((member_row, team_row, client_rows)) = snapshot else {
            return Ok(None);
        };
        let team_row = team_row.ok_or_else(|| {
            MemberRepositoryError::query(format!(
                "member {} references a missing team",
                member_row.id
            ))
        })?;
        let member = row_to_member(member_row)?;
        let clients = client_rows
            .into_iter()
            .map(row_to_owned_client)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(MemberProfile {
            member,
            team: row_to_team(team_row),
            clients,
        }))
    }

    async fn create(&self, member: &NewMember) -> Result<Member, MemberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: MemberRow = diesel::insert_into(members::table)
            .values(NewMemberRow {
                username: member.username(),
                password: member.password(),
                firstname: member.firstname(),
                lastname: member.lastname(),
                number: member.number(),
                team_id: member.team_id().0,
                status: member.status().as_str(),
            })
            .returning(MemberRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|error| duplicate_or_other(error, member.username()))?;
        row_to_member(row)
    }

    async fn update(
        &self,
        id: MemberId,
        update: &MemberUpdate,
    ) -> Result<Option<Member>, MemberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = MemberChangeset {
            username: update.username.as_deref(),
            password: update.password.as_deref().map(String::as_str),
            firstname: update.firstname.as_deref(),
            lastname: update.lastname.as_deref(),
            team_id: update.team_id.map(|team| team.0),
            status: update.status.map(MemberStatus::as_str),
            updated_at: Utc::now(),
        };
        let row: Option<MemberRow> = diesel::update(members::table.filter(members::id.eq(id.0)))
            .set(changeset)
            .returning(MemberRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|error| {
                duplicate_or_other(error, update.username.as_deref().unwrap_or_default())
            })?;
        row.map(row_to_member).transpose()
    }

    async fn delete(&self, id: MemberId) -> Result<bool, MemberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // The member's clients go with them via ON DELETE CASCADE.
        let deleted = diesel::delete(members::table.filter(members::id.eq(id.0)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
