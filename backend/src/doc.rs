//! OpenAPI document assembly.
//!
//! [`ApiDoc`] gathers every inbound path (auth, clients, members, geocode,
//! health), the request and response DTOs, the wrapper schemas that stand
//! in for framework-free domain types ([`ErrorSchema`], [`ErrorCodeSchema`],
//! [`SignInPortalSchema`]), and the session cookie security scheme into one
//! generated document.
//!
//! Swagger UI serves the document in debug builds; `cargo run --bin
//! openapi-dump` writes it out for external tooling.

use crate::inbound::http::auth::{ClaimsResponse, SignInRequest};
use crate::inbound::http::clients_dto::{
    AddressFieldRequest, AddressResponse, ClientDetailResponse, ClientListResponse,
    ClientResponse, ClientSummaryResponse, ContactRequest, ContactResponse, CreateClientRequest,
    CreateMeetingRequest, MeetingResponse, UpdateClientRequest, UpdateMeetingRequest,
    UpdateSummaryRequest,
};
use crate::inbound::http::geocode::{GeocodeRequest, GeocodeResponse};
use crate::inbound::http::members::{
    CreateMemberRequest, MemberProfileResponse, MemberResponse, TeamListResponse, TeamResponse,
    TeamRosterResponse, UpdateMemberRequest,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, SignInPortalSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/signin.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "CRM backend API",
        description = "HTTP interface for the sales CRM: session sign-in, \
                       client aggregates, member directory, and geocoding.",
        license(name = "ISC")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::sign_in,
        crate::inbound::http::auth::sign_out,
        crate::inbound::http::clients::create_client,
        crate::inbound::http::clients::list_clients,
        crate::inbound::http::clients::get_client,
        crate::inbound::http::clients::update_client,
        crate::inbound::http::clients::update_client_summary,
        crate::inbound::http::clients::delete_client,
        crate::inbound::http::clients::add_contact,
        crate::inbound::http::clients::update_contact,
        crate::inbound::http::clients::remove_contact,
        crate::inbound::http::clients::update_address,
        crate::inbound::http::clients::add_meeting,
        crate::inbound::http::clients::update_meeting,
        crate::inbound::http::clients::remove_meeting,
        crate::inbound::http::members::list_teams,
        crate::inbound::http::members::get_member,
        crate::inbound::http::members::create_member,
        crate::inbound::http::members::update_member,
        crate::inbound::http::members::delete_member,
        crate::inbound::http::geocode::geocode,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        SignInRequest,
        ClaimsResponse,
        CreateClientRequest,
        UpdateClientRequest,
        UpdateSummaryRequest,
        ContactRequest,
        AddressFieldRequest,
        CreateMeetingRequest,
        UpdateMeetingRequest,
        ClientResponse,
        ContactResponse,
        AddressResponse,
        MeetingResponse,
        ClientDetailResponse,
        ClientSummaryResponse,
        ClientListResponse,
        CreateMemberRequest,
        UpdateMemberRequest,
        MemberResponse,
        TeamResponse,
        TeamRosterResponse,
        TeamListResponse,
        MemberProfileResponse,
        GeocodeRequest,
        GeocodeResponse,
        ErrorSchema,
        ErrorCodeSchema,
        SignInPortalSchema
    )),
    tags(
        (name = "auth", description = "Portal sign-in and sign-out"),
        (name = "clients", description = "Client aggregates owned by the signed-in member"),
        (name = "members", description = "Administrator directory of teams and members"),
        (name = "geocode", description = "Address to coordinate resolution"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
