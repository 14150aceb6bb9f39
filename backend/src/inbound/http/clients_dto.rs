//! Client aggregate DTOs and parsing helpers.
//!
//! Wire payloads are camelCase; deal values arrive in major currency units
//! and leave in the minor units the store keeps. Enumerated fields arrive
//! as text and are parsed strictly, except the lifecycle status code whose
//! decode is deliberately total.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::client::{
    AddressFieldUpdate, Behaviour, Client, ClientAddress, ClientAggregate, ClientMeeting,
    ClientSummary, ContactDetail, DealStatus,
};

#[derive(Debug, Deserialize)]
pub(super) struct ClientPath {
    pub(super) id: i32,
}

#[derive(Debug, Deserialize)]
pub(super) struct ContactPath {
    pub(super) id: i32,
    pub(super) contact_id: i32,
}

#[derive(Debug, Deserialize)]
pub(super) struct MeetingPath {
    pub(super) id: i32,
    pub(super) meeting_id: i32,
}

/// Request payload for creating a client.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub company: String,
    /// First contact number for the client.
    pub number: String,
    /// Lifecycle status code: 0 inactive, 2 active, anything else pending.
    pub status: i32,
    /// One of `cool`, `hot-headed`, `professional`, `indecisive`.
    pub behaviour: String,
    /// Deal value in major currency units, e.g. `2500.00`.
    pub deal_value: f64,
    #[serde(default)]
    pub remarks: String,
}

/// Partial update for a client row; absent keys leave stored values alone.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub company: Option<String>,
    /// Lifecycle status code.
    pub status: Option<i32>,
    pub remarks: Option<String>,
    /// One of `cool`, `hot-headed`, `professional`, `indecisive`.
    pub behaviour: Option<String>,
    /// Deal value in major currency units.
    pub deal_value: Option<f64>,
    /// One of `Accepted`, `Completed`, `In-Progress`, `Rejected`.
    pub deal_status: Option<String>,
    pub field_visits: Option<i32>,
    pub detailed_remarks: Option<String>,
}

/// Request payload for the lead-table row edit.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummaryRequest {
    pub name: String,
    pub company: String,
    /// Lifecycle status code.
    pub status: i32,
    #[serde(default)]
    pub remarks: String,
    /// Replacement primary contact number.
    pub number: String,
}

/// Request payload carrying one contact number.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub number: String,
}

/// Single-field address update, tagged by field name.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(tag = "field", rename_all = "camelCase")]
pub enum AddressFieldRequest {
    /// Replace the door or unit number.
    DoorNumber { value: String },
    /// Replace the street address.
    StreetAddress { value: String },
    /// Replace both coordinates together.
    Coordinates { lat: f64, lng: f64 },
}

impl From<AddressFieldRequest> for AddressFieldUpdate {
    fn from(request: AddressFieldRequest) -> Self {
        match request {
            AddressFieldRequest::DoorNumber { value } => Self::DoorNumber { value },
            AddressFieldRequest::StreetAddress { value } => Self::StreetAddress { value },
            AddressFieldRequest::Coordinates { lat, lng } => Self::Coordinates { lat, lng },
        }
    }
}

/// Request payload for recording a meeting.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingRequest {
    /// RFC 3339 meeting time.
    pub date: String,
}

/// Partial update for one meeting; absent keys leave stored values alone.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeetingRequest {
    /// RFC 3339 meeting time.
    pub date: Option<String>,
    pub notes: Option<String>,
}

/// A client row as returned to callers.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub company: String,
    /// Lifecycle status code: 0 inactive, 1 pending, 2 active.
    pub status: i32,
    pub remarks: String,
    pub behaviour: String,
    /// Deal value in minor currency units.
    pub deal_value: i64,
    pub deal_status: String,
    pub field_visits: i32,
    pub detailed_remarks: String,
    pub created_at: String,
    pub updated_at: String,
}

/// One contact number.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub id: i32,
    pub number: String,
}

/// The singleton address attached to a client.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponse {
    pub door_number: String,
    pub street_address: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// A meeting entry.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeetingResponse {
    pub id: i32,
    /// RFC 3339 meeting time.
    pub date: String,
    pub notes: String,
}

/// A client with all nested collections populated.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientDetailResponse {
    pub client: ClientResponse,
    pub contacts: Vec<ContactResponse>,
    pub address: Option<AddressResponse>,
    pub meetings: Vec<MeetingResponse>,
}

/// Summary row for the lead table.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummaryResponse {
    pub id: i32,
    pub name: String,
    /// First contact number in insertion order; empty when none exist.
    pub number: String,
    pub company: String,
    /// Lifecycle status code.
    pub status: i32,
    pub remarks: String,
}

/// The owner's whole lead book.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientListResponse {
    pub clients: Vec<ClientSummaryResponse>,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            id: client.id.0,
            name: client.name,
            description: client.description,
            company: client.company,
            status: client.status.code(),
            remarks: client.remarks,
            behaviour: client.behaviour.as_str().to_owned(),
            deal_value: client.deal_value,
            deal_status: client.deal_status.as_str().to_owned(),
            field_visits: client.field_visits,
            detailed_remarks: client.detailed_remarks,
            created_at: client.created_at.to_rfc3339(),
            updated_at: client.updated_at.to_rfc3339(),
        }
    }
}

impl From<ContactDetail> for ContactResponse {
    fn from(contact: ContactDetail) -> Self {
        Self {
            id: contact.id.0,
            number: contact.number,
        }
    }
}

impl From<ClientAddress> for AddressResponse {
    fn from(address: ClientAddress) -> Self {
        Self {
            door_number: address.door_number,
            street_address: address.street_address,
            lat: address.lat,
            lng: address.lng,
        }
    }
}

impl From<ClientMeeting> for MeetingResponse {
    fn from(meeting: ClientMeeting) -> Self {
        Self {
            id: meeting.id.0,
            date: meeting.date.to_rfc3339(),
            notes: meeting.notes,
        }
    }
}

impl From<ClientAggregate> for ClientDetailResponse {
    fn from(aggregate: ClientAggregate) -> Self {
        Self {
            client: ClientResponse::from(aggregate.client),
            contacts: aggregate
                .contacts
                .into_iter()
                .map(ContactResponse::from)
                .collect(),
            address: aggregate.address.map(AddressResponse::from),
            meetings: aggregate
                .meetings
                .into_iter()
                .map(MeetingResponse::from)
                .collect(),
        }
    }
}

impl From<ClientSummary> for ClientSummaryResponse {
    fn from(summary: ClientSummary) -> Self {
        Self {
            id: summary.id.0,
            name: summary.name,
            number: summary.primary_number,
            company: summary.company,
            status: summary.status.code(),
            remarks: summary.remarks,
        }
    }
}

pub(super) fn parse_behaviour(value: &str) -> Result<Behaviour, Error> {
    Behaviour::parse(value).ok_or_else(|| {
        Error::invalid_request(
            "behaviour must be one of: cool, hot-headed, professional, indecisive",
        )
        .with_details(json!({
            "field": "behaviour",
            "value": value,
            "code": "unknown_behaviour",
        }))
    })
}

pub(super) fn parse_deal_status(value: &str) -> Result<DealStatus, Error> {
    DealStatus::parse(value).ok_or_else(|| {
        Error::invalid_request(
            "dealStatus must be one of: Accepted, Completed, In-Progress, Rejected",
        )
        .with_details(json!({
            "field": "dealStatus",
            "value": value,
            "code": "unknown_deal_status",
        }))
    })
}

pub(super) fn parse_timestamp(value: &str, field: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            Error::invalid_request(format!("{field} must be an RFC 3339 timestamp")).with_details(
                json!({
                    "field": field,
                    "value": value,
                    "code": "invalid_timestamp",
                }),
            )
        })
}

/// Convert a deal value from major to minor currency units, rounding to the
/// nearest minor unit.
pub(super) fn deal_value_to_minor(value: f64, field: &str) -> Result<i64, Error> {
    if !value.is_finite() {
        return Err(
            Error::invalid_request(format!("{field} must be a finite number")).with_details(
                json!({
                    "field": field,
                    "code": "invalid_number",
                }),
            ),
        );
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "finite values beyond i64 range saturate, and negatives are rejected downstream"
    )]
    Ok((value * 100.0).round() as i64)
}
