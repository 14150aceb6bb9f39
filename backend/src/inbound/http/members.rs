//! Member directory HTTP handlers.
//!
//! Admin-only surface: team rosters, member profiles, and member CRUD.
//! A member's contact number is captured at creation and never edited
//! through this surface.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::member::{
    Member, MemberId, MemberProfile, MemberStatus, MemberUpdate, MemberValidationError, NewMember,
    Team, TeamId, TeamRoster,
};
use crate::domain::{Error, auth::Role};
use crate::inbound::http::ApiResult;
use crate::inbound::http::clients_dto::ClientResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Deserialize)]
struct MemberPath {
    id: i32,
}

/// Request payload for creating a member.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    pub username: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub number: String,
    /// Team assignment; doubles as the role code.
    pub team_id: i32,
    /// `Active` or `Inactive`.
    pub status: String,
}

/// Partial update for a member; absent keys leave stored values alone.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    /// Team assignment; doubles as the role code.
    pub team_id: Option<i32>,
    /// `Active` or `Inactive`.
    pub status: Option<String>,
}

/// A directory member as returned to callers.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub id: i32,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    /// Full name shown in application chrome.
    pub display_name: String,
    pub number: String,
    /// Team assignment; doubles as the role code.
    pub team_id: i32,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A team row.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamResponse {
    pub id: i32,
    pub name: String,
}

/// A team with its current members.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamRosterResponse {
    pub id: i32,
    pub name: String,
    pub members: Vec<MemberResponse>,
}

/// Every team with its roster, as shown on the admin home page.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamListResponse {
    pub teams: Vec<TeamRosterResponse>,
}

/// A member with their team and client book.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfileResponse {
    pub member: MemberResponse,
    pub team: TeamResponse,
    pub clients: Vec<ClientResponse>,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        let display_name = member.display_name();
        Self {
            id: member.id.0,
            username: member.username,
            firstname: member.firstname,
            lastname: member.lastname,
            display_name,
            number: member.number,
            team_id: member.team_id.0,
            status: member.status.as_str().to_owned(),
            created_at: member.created_at.to_rfc3339(),
            updated_at: member.updated_at.to_rfc3339(),
        }
    }
}

impl From<Team> for TeamResponse {
    fn from(team: Team) -> Self {
        Self {
            id: team.id.0,
            name: team.name,
        }
    }
}

impl From<TeamRoster> for TeamRosterResponse {
    fn from(roster: TeamRoster) -> Self {
        Self {
            id: roster.team.id.0,
            name: roster.team.name,
            members: roster
                .members
                .into_iter()
                .map(MemberResponse::from)
                .collect(),
        }
    }
}

impl From<MemberProfile> for MemberProfileResponse {
    fn from(profile: MemberProfile) -> Self {
        Self {
            member: MemberResponse::from(profile.member),
            team: TeamResponse::from(profile.team),
            clients: profile
                .clients
                .into_iter()
                .map(ClientResponse::from)
                .collect(),
        }
    }
}

fn require_admin(session: &SessionContext) -> Result<(), Error> {
    session.require_role(Role::Admin)?;
    Ok(())
}

fn map_member_validation_error(err: MemberValidationError) -> Error {
    let (field, code) = match err {
        MemberValidationError::EmptyUsername => ("username", "empty_username"),
        MemberValidationError::EmptyFirstname => ("firstname", "empty_firstname"),
        MemberValidationError::EmptyLastname => ("lastname", "empty_lastname"),
        MemberValidationError::EmptyNumber => ("number", "empty_number"),
        MemberValidationError::InvalidPasswordLength => ("password", "invalid_password_length"),
        MemberValidationError::UnknownStatus => ("status", "unknown_status"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

fn parse_member_status(value: &str) -> Result<MemberStatus, Error> {
    MemberStatus::parse(value)
        .ok_or_else(|| map_member_validation_error(MemberValidationError::UnknownStatus))
}

/// List every team with its current roster.
#[utoipa::path(
    get,
    path = "/api/v1/teams",
    responses(
        (status = 200, description = "Teams with rosters", body = TeamListResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["members"],
    operation_id = "listTeams",
    security(("SessionCookie" = []))
)]
#[get("/teams")]
pub async fn list_teams(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<TeamListResponse>> {
    require_admin(&session)?;
    let rosters = state.members.list_teams().await?;
    Ok(web::Json(TeamListResponse {
        teams: rosters.into_iter().map(TeamRosterResponse::from).collect(),
    }))
}

/// Fetch one member with their team and client book.
#[utoipa::path(
    get,
    path = "/api/v1/members/{id}",
    params(
        ("id" = i32, Path, description = "Member identifier")
    ),
    responses(
        (status = 200, description = "Member profile", body = MemberProfileResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["members"],
    operation_id = "getMemberProfile",
    security(("SessionCookie" = []))
)]
#[get("/members/{id}")]
pub async fn get_member(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<MemberPath>,
) -> ApiResult<web::Json<MemberProfileResponse>> {
    require_admin(&session)?;
    let profile = state
        .members
        .get_profile(MemberId(path.into_inner().id))
        .await?;
    Ok(web::Json(MemberProfileResponse::from(profile)))
}

/// Create a member in the directory.
#[utoipa::path(
    post,
    path = "/api/v1/members",
    request_body = CreateMemberRequest,
    responses(
        (status = 201, description = "Member created", body = MemberResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "Username taken", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["members"],
    operation_id = "createMember",
    security(("SessionCookie" = []))
)]
#[post("/members")]
pub async fn create_member(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateMemberRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&session)?;
    let payload = payload.into_inner();
    let status = parse_member_status(&payload.status)?;
    let new_member = NewMember::new(
        &payload.username,
        &payload.password,
        &payload.firstname,
        &payload.lastname,
        &payload.number,
        TeamId(payload.team_id),
        status,
    )
    .map_err(map_member_validation_error)?;

    let member = state.members.create(&new_member).await?;
    Ok(HttpResponse::Created().json(MemberResponse::from(member)))
}

/// Apply a partial update to one member.
#[utoipa::path(
    patch,
    path = "/api/v1/members/{id}",
    request_body = UpdateMemberRequest,
    params(
        ("id" = i32, Path, description = "Member identifier")
    ),
    responses(
        (status = 200, description = "Updated member", body = MemberResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Username taken", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["members"],
    operation_id = "updateMember",
    security(("SessionCookie" = []))
)]
#[patch("/members/{id}")]
pub async fn update_member(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<MemberPath>,
    payload: web::Json<UpdateMemberRequest>,
) -> ApiResult<web::Json<MemberResponse>> {
    require_admin(&session)?;
    let payload = payload.into_inner();
    let update = MemberUpdate {
        username: payload.username,
        password: payload.password.map(Zeroizing::new),
        firstname: payload.firstname,
        lastname: payload.lastname,
        team_id: payload.team_id.map(TeamId),
        status: payload
            .status
            .as_deref()
            .map(parse_member_status)
            .transpose()?,
    };
    let member = state
        .members
        .update(MemberId(path.into_inner().id), &update)
        .await?;
    Ok(web::Json(MemberResponse::from(member)))
}

/// Delete one member from the directory.
#[utoipa::path(
    delete,
    path = "/api/v1/members/{id}",
    params(
        ("id" = i32, Path, description = "Member identifier")
    ),
    responses(
        (status = 204, description = "Member deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["members"],
    operation_id = "deleteMember",
    security(("SessionCookie" = []))
)]
#[delete("/members/{id}")]
pub async fn delete_member(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<MemberPath>,
) -> ApiResult<HttpResponse> {
    require_admin(&session)?;
    state.members.remove(MemberId(path.into_inner().id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "members_tests.rs"]
mod tests;
