//! Client aggregate HTTP handlers.
//!
//! All endpoints require a sales session; the signed-in member id scopes
//! every read and write, so one member can never see or touch another
//! member's book. Mutations return the full updated sub-entity so callers
//! can merge state without refetching the aggregate.

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde_json::json;

use crate::domain::client::{
    AddressFieldUpdate, ClientFieldPatch, ClientId, ClientStatus, ClientValidationError,
    ContactDetailId, MeetingId, MeetingPatch, NewClient, NewClientFields, SummaryUpdate,
};
use crate::domain::member::MemberId;
use crate::domain::{Error, auth::Role};
use crate::inbound::http::ApiResult;
use crate::inbound::http::clients_dto::{
    AddressFieldRequest, AddressResponse, ClientDetailResponse, ClientListResponse, ClientPath,
    ClientResponse, ClientSummaryResponse, ContactPath, ContactRequest, ContactResponse,
    CreateClientRequest, CreateMeetingRequest, MeetingPath, MeetingResponse, UpdateClientRequest,
    UpdateMeetingRequest, UpdateSummaryRequest, deal_value_to_minor, parse_behaviour,
    parse_deal_status, parse_timestamp,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Resolve the signed-in sales member whose book is being edited.
fn require_sales_owner(session: &SessionContext) -> Result<MemberId, Error> {
    let claims = session.require_role(Role::Sales)?;
    Ok(MemberId(claims.user_id))
}

fn map_client_validation_error(err: ClientValidationError) -> Error {
    let (field, code) = match err {
        ClientValidationError::EmptyName => ("name", "empty_name"),
        ClientValidationError::EmptyCompany => ("company", "empty_company"),
        ClientValidationError::EmptyNumber => ("number", "empty_number"),
        ClientValidationError::NumberTooLong => ("number", "number_too_long"),
        ClientValidationError::NegativeDealValue => ("dealValue", "negative_deal_value"),
        ClientValidationError::NegativeFieldVisits => ("fieldVisits", "negative_field_visits"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

fn parse_field_patch(request: UpdateClientRequest) -> Result<ClientFieldPatch, Error> {
    Ok(ClientFieldPatch {
        name: request.name,
        description: request.description,
        company: request.company,
        status: request.status.map(ClientStatus::from_code),
        remarks: request.remarks,
        behaviour: request
            .behaviour
            .as_deref()
            .map(parse_behaviour)
            .transpose()?,
        deal_value: request
            .deal_value
            .map(|value| deal_value_to_minor(value, "dealValue"))
            .transpose()?,
        deal_status: request
            .deal_status
            .as_deref()
            .map(parse_deal_status)
            .transpose()?,
        field_visits: request.field_visits,
        detailed_remarks: request.detailed_remarks,
    })
}

fn parse_meeting_patch(request: UpdateMeetingRequest) -> Result<MeetingPatch, Error> {
    Ok(MeetingPatch {
        date: request
            .date
            .as_deref()
            .map(|value| parse_timestamp(value, "date"))
            .transpose()?,
        notes: request.notes,
    })
}

/// Create a client with its first contact number and a blank address.
#[utoipa::path(
    post,
    path = "/api/v1/clients",
    request_body = CreateClientRequest,
    responses(
        (status = 201, description = "Client created", body = ClientDetailResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["clients"],
    operation_id = "createClient",
    security(("SessionCookie" = []))
)]
#[post("/clients")]
pub async fn create_client(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateClientRequest>,
) -> ApiResult<HttpResponse> {
    let owner = require_sales_owner(&session)?;
    let payload = payload.into_inner();
    let behaviour = parse_behaviour(&payload.behaviour)?;
    let deal_value = deal_value_to_minor(payload.deal_value, "dealValue")?;
    let new_client = NewClient::new(NewClientFields {
        name: &payload.name,
        description: &payload.description,
        company: &payload.company,
        number: &payload.number,
        status: ClientStatus::from_code(payload.status),
        behaviour,
        deal_value,
        remarks: &payload.remarks,
    })
    .map_err(map_client_validation_error)?;

    let aggregate = state.clients.create(owner, &new_client).await?;
    Ok(HttpResponse::Created().json(ClientDetailResponse::from(aggregate)))
}

/// List the owner's clients as lead-table summary rows.
#[utoipa::path(
    get,
    path = "/api/v1/clients",
    responses(
        (status = 200, description = "Summary rows", body = ClientListResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["clients"],
    operation_id = "listClients",
    security(("SessionCookie" = []))
)]
#[get("/clients")]
pub async fn list_clients(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ClientListResponse>> {
    let owner = require_sales_owner(&session)?;
    let summaries = state.clients.list(owner).await?;
    Ok(web::Json(ClientListResponse {
        clients: summaries
            .into_iter()
            .map(ClientSummaryResponse::from)
            .collect(),
    }))
}

/// Fetch one client with contacts, address, and meetings.
#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}",
    params(
        ("id" = i32, Path, description = "Client identifier")
    ),
    responses(
        (status = 200, description = "Client aggregate", body = ClientDetailResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["clients"],
    operation_id = "getClient",
    security(("SessionCookie" = []))
)]
#[get("/clients/{id}")]
pub async fn get_client(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ClientPath>,
) -> ApiResult<web::Json<ClientDetailResponse>> {
    let owner = require_sales_owner(&session)?;
    let aggregate = state
        .clients
        .get(owner, ClientId(path.into_inner().id))
        .await?;
    Ok(web::Json(ClientDetailResponse::from(aggregate)))
}

/// Apply a partial update to one client's editable fields.
#[utoipa::path(
    patch,
    path = "/api/v1/clients/{id}",
    request_body = UpdateClientRequest,
    params(
        ("id" = i32, Path, description = "Client identifier")
    ),
    responses(
        (status = 200, description = "Updated client", body = ClientResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["clients"],
    operation_id = "updateClientFields",
    security(("SessionCookie" = []))
)]
#[patch("/clients/{id}")]
pub async fn update_client(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ClientPath>,
    payload: web::Json<UpdateClientRequest>,
) -> ApiResult<web::Json<ClientResponse>> {
    let owner = require_sales_owner(&session)?;
    let field_patch = parse_field_patch(payload.into_inner())?;
    let client = state
        .clients
        .update_fields(owner, ClientId(path.into_inner().id), &field_patch)
        .await?;
    Ok(web::Json(ClientResponse::from(client)))
}

/// Rewrite the lead-table row: summary fields plus the primary number.
#[utoipa::path(
    put,
    path = "/api/v1/clients/{id}/summary",
    request_body = UpdateSummaryRequest,
    params(
        ("id" = i32, Path, description = "Client identifier")
    ),
    responses(
        (status = 200, description = "Updated summary row", body = ClientSummaryResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["clients"],
    operation_id = "updateClientSummary",
    security(("SessionCookie" = []))
)]
#[put("/clients/{id}/summary")]
pub async fn update_client_summary(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ClientPath>,
    payload: web::Json<UpdateSummaryRequest>,
) -> ApiResult<web::Json<ClientSummaryResponse>> {
    let owner = require_sales_owner(&session)?;
    let payload = payload.into_inner();
    let update = SummaryUpdate::new(
        &payload.name,
        &payload.company,
        ClientStatus::from_code(payload.status),
        &payload.remarks,
        &payload.number,
    )
    .map_err(map_client_validation_error)?;

    let summary = state
        .clients
        .update_summary(owner, ClientId(path.into_inner().id), &update)
        .await?;
    Ok(web::Json(ClientSummaryResponse::from(summary)))
}

/// Delete a client and everything hanging off it.
#[utoipa::path(
    delete,
    path = "/api/v1/clients/{id}",
    params(
        ("id" = i32, Path, description = "Client identifier")
    ),
    responses(
        (status = 204, description = "Client deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["clients"],
    operation_id = "deleteClient",
    security(("SessionCookie" = []))
)]
#[delete("/clients/{id}")]
pub async fn delete_client(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ClientPath>,
) -> ApiResult<HttpResponse> {
    let owner = require_sales_owner(&session)?;
    state
        .clients
        .delete(owner, ClientId(path.into_inner().id))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Attach a further contact number to a client.
#[utoipa::path(
    post,
    path = "/api/v1/clients/{id}/contacts",
    request_body = ContactRequest,
    params(
        ("id" = i32, Path, description = "Client identifier")
    ),
    responses(
        (status = 201, description = "Contact added", body = ContactResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["clients"],
    operation_id = "addClientContact",
    security(("SessionCookie" = []))
)]
#[post("/clients/{id}/contacts")]
pub async fn add_contact(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ClientPath>,
    payload: web::Json<ContactRequest>,
) -> ApiResult<HttpResponse> {
    let owner = require_sales_owner(&session)?;
    let contact = state
        .clients
        .add_contact(owner, ClientId(path.into_inner().id), &payload.number)
        .await?;
    Ok(HttpResponse::Created().json(ContactResponse::from(contact)))
}

/// Replace the number on one existing contact.
#[utoipa::path(
    put,
    path = "/api/v1/clients/{id}/contacts/{contact_id}",
    request_body = ContactRequest,
    params(
        ("id" = i32, Path, description = "Client identifier"),
        ("contact_id" = i32, Path, description = "Contact identifier")
    ),
    responses(
        (status = 200, description = "Updated contact", body = ContactResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["clients"],
    operation_id = "updateClientContact",
    security(("SessionCookie" = []))
)]
#[put("/clients/{id}/contacts/{contact_id}")]
pub async fn update_contact(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ContactPath>,
    payload: web::Json<ContactRequest>,
) -> ApiResult<web::Json<ContactResponse>> {
    let owner = require_sales_owner(&session)?;
    let path = path.into_inner();
    let contact = state
        .clients
        .update_contact(
            owner,
            ClientId(path.id),
            ContactDetailId(path.contact_id),
            &payload.number,
        )
        .await?;
    Ok(web::Json(ContactResponse::from(contact)))
}

/// Remove a contact number, refusing to remove the client's last one.
#[utoipa::path(
    delete,
    path = "/api/v1/clients/{id}/contacts/{contact_id}",
    params(
        ("id" = i32, Path, description = "Client identifier"),
        ("contact_id" = i32, Path, description = "Contact identifier")
    ),
    responses(
        (status = 204, description = "Contact removed"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Last remaining contact", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["clients"],
    operation_id = "removeClientContact",
    security(("SessionCookie" = []))
)]
#[delete("/clients/{id}/contacts/{contact_id}")]
pub async fn remove_contact(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ContactPath>,
) -> ApiResult<HttpResponse> {
    let owner = require_sales_owner(&session)?;
    let path = path.into_inner();
    state
        .clients
        .remove_contact(owner, ClientId(path.id), ContactDetailId(path.contact_id))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Write one address field, or the coordinate pair as a unit.
#[utoipa::path(
    put,
    path = "/api/v1/clients/{id}/address",
    request_body = AddressFieldRequest,
    params(
        ("id" = i32, Path, description = "Client identifier")
    ),
    responses(
        (status = 200, description = "Updated address", body = AddressResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["clients"],
    operation_id = "updateClientAddress",
    security(("SessionCookie" = []))
)]
#[put("/clients/{id}/address")]
pub async fn update_address(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ClientPath>,
    payload: web::Json<AddressFieldRequest>,
) -> ApiResult<web::Json<AddressResponse>> {
    let owner = require_sales_owner(&session)?;
    let update = AddressFieldUpdate::from(payload.into_inner());
    let address = state
        .clients
        .update_address(owner, ClientId(path.into_inner().id), &update)
        .await?;
    Ok(web::Json(AddressResponse::from(address)))
}

/// Record a meeting; notes start empty and are edited afterwards.
#[utoipa::path(
    post,
    path = "/api/v1/clients/{id}/meetings",
    request_body = CreateMeetingRequest,
    params(
        ("id" = i32, Path, description = "Client identifier")
    ),
    responses(
        (status = 201, description = "Meeting recorded", body = MeetingResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["clients"],
    operation_id = "addClientMeeting",
    security(("SessionCookie" = []))
)]
#[post("/clients/{id}/meetings")]
pub async fn add_meeting(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ClientPath>,
    payload: web::Json<CreateMeetingRequest>,
) -> ApiResult<HttpResponse> {
    let owner = require_sales_owner(&session)?;
    let date = parse_timestamp(&payload.date, "date")?;
    let meeting = state
        .clients
        .add_meeting(owner, ClientId(path.into_inner().id), date)
        .await?;
    Ok(HttpResponse::Created().json(MeetingResponse::from(meeting)))
}

/// Merge a partial update into one meeting, last write per field.
#[utoipa::path(
    patch,
    path = "/api/v1/clients/{id}/meetings/{meeting_id}",
    request_body = UpdateMeetingRequest,
    params(
        ("id" = i32, Path, description = "Client identifier"),
        ("meeting_id" = i32, Path, description = "Meeting identifier")
    ),
    responses(
        (status = 200, description = "Updated meeting", body = MeetingResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["clients"],
    operation_id = "updateClientMeeting",
    security(("SessionCookie" = []))
)]
#[patch("/clients/{id}/meetings/{meeting_id}")]
pub async fn update_meeting(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<MeetingPath>,
    payload: web::Json<UpdateMeetingRequest>,
) -> ApiResult<web::Json<MeetingResponse>> {
    let owner = require_sales_owner(&session)?;
    let meeting_patch = parse_meeting_patch(payload.into_inner())?;
    let path = path.into_inner();
    let meeting = state
        .clients
        .update_meeting(
            owner,
            ClientId(path.id),
            MeetingId(path.meeting_id),
            &meeting_patch,
        )
        .await?;
    Ok(web::Json(MeetingResponse::from(meeting)))
}

/// Delete one meeting.
#[utoipa::path(
    delete,
    path = "/api/v1/clients/{id}/meetings/{meeting_id}",
    params(
        ("id" = i32, Path, description = "Client identifier"),
        ("meeting_id" = i32, Path, description = "Meeting identifier")
    ),
    responses(
        (status = 204, description = "Meeting deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["clients"],
    operation_id = "removeClientMeeting",
    security(("SessionCookie" = []))
)]
#[delete("/clients/{id}/meetings/{meeting_id}")]
pub async fn remove_meeting(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<MeetingPath>,
) -> ApiResult<HttpResponse> {
    let owner = require_sales_owner(&session)?;
    let path = path.into_inner();
    state
        .clients
        .remove_meeting(owner, ClientId(path.id), MeetingId(path.meeting_id))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "clients_tests.rs"]
mod tests;
