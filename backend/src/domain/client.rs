//! Client aggregate entities and write payloads.
//!
//! A client is owned by exactly one member and carries three nested
//! collections: contact numbers (at least one at all times), a singleton
//! address created empty alongside the client, and meetings. All operations
//! on the aggregate are scoped by the owning member; these types carry no
//! behaviour beyond validation and encoding.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::member::MemberId;

/// Identifier of a client row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub i32);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a contact number row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactDetailId(pub i32);

impl fmt::Display for ContactDetailId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a meeting row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeetingId(pub i32);

impl fmt::Display for MeetingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a client relationship.
///
/// Stored as a numeric code: 0 is inactive, 2 is active, and every other
/// code reads back as pending. The lenient decode branch is deliberate; it
/// is how historical rows with stray codes keep rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientStatus {
    /// Relationship has lapsed.
    Inactive,
    /// Relationship is being established.
    Pending,
    /// Relationship is live.
    Active,
}

impl ClientStatus {
    /// Decode a stored status code. Unknown codes read as [`Self::Pending`].
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Inactive,
            2 => Self::Active,
            _ => Self::Pending,
        }
    }

    /// The numeric code persisted for this status.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Inactive => 0,
            Self::Pending => 1,
            Self::Active => 2,
        }
    }

    /// Display string shown in summaries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inactive => "Inactive",
            Self::Pending => "Pending",
            Self::Active => "Active",
        }
    }
}

/// Observed temperament of the client, set by the working member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Behaviour {
    /// Calm and easy to work with.
    Cool,
    /// Quick to escalate.
    HotHeaded,
    /// Formal and procedural.
    Professional,
    /// Slow to commit.
    Indecisive,
}

impl Behaviour {
    /// Text form stored for this behaviour.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cool => "cool",
            Self::HotHeaded => "hot-headed",
            Self::Professional => "professional",
            Self::Indecisive => "indecisive",
        }
    }

    /// Parse the stored text form. Unknown text is rejected; this column is
    /// only ever written by the application.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cool" => Some(Self::Cool),
            "hot-headed" => Some(Self::HotHeaded),
            "professional" => Some(Self::Professional),
            "indecisive" => Some(Self::Indecisive),
            _ => None,
        }
    }
}

/// Where the client's deal currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DealStatus {
    /// Client accepted the offer.
    Accepted,
    /// Work is delivered and closed.
    Completed,
    /// Deal is still being worked.
    #[serde(rename = "In-Progress")]
    InProgress,
    /// Client declined.
    Rejected,
}

impl DealStatus {
    /// Text form stored for this deal status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "Accepted",
            Self::Completed => "Completed",
            Self::InProgress => "In-Progress",
            Self::Rejected => "Rejected",
        }
    }

    /// Parse the stored text form.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Accepted" => Some(Self::Accepted),
            "Completed" => Some(Self::Completed),
            "In-Progress" => Some(Self::InProgress),
            "Rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// A client relationship owned by a member.
///
/// `deal_value` is held in minor currency units; conversion from the major
/// units shown to users happens at the HTTP boundary, never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Row identifier.
    pub id: ClientId,
    /// Owning member; every read and write is scoped by this.
    pub owner_id: MemberId,
    /// Client's name.
    pub name: String,
    /// Free-text description captured at intake.
    pub description: String,
    /// Company the client represents.
    pub company: String,
    /// Lifecycle state.
    pub status: ClientStatus,
    /// Short working notes shown in summaries.
    pub remarks: String,
    /// Observed temperament.
    pub behaviour: Behaviour,
    /// Deal value in minor currency units.
    pub deal_value: i64,
    /// Deal stage.
    pub deal_status: DealStatus,
    /// Count of in-person visits; starts at one for the intake visit.
    pub field_visits: i32,
    /// Long-form notes kept on the detail page.
    pub detailed_remarks: String,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// One phone number attached to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetail {
    /// Row identifier.
    pub id: ContactDetailId,
    /// Owning client.
    pub client_id: ClientId,
    /// The phone number, in wire form such as `+911234567890`.
    pub number: String,
}

/// The singleton address attached to a client.
///
/// Created empty alongside the client and only ever updated field-wise, so
/// it is identified by its client rather than carrying its own id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientAddress {
    /// Owning client.
    pub client_id: ClientId,
    /// Door or unit number; empty until captured.
    pub door_number: String,
    /// Street address; empty until captured.
    pub street_address: String,
    /// Geocoded latitude, when resolved.
    pub lat: Option<f64>,
    /// Geocoded longitude, when resolved.
    pub lng: Option<f64>,
}

/// A scheduled or past meeting with a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientMeeting {
    /// Row identifier.
    pub id: MeetingId,
    /// Owning client.
    pub client_id: ClientId,
    /// When the meeting happens.
    pub date: DateTime<Utc>,
    /// Notes taken for the meeting; empty until edited.
    pub notes: String,
}

/// A client with all nested collections populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientAggregate {
    /// The client row.
    pub client: Client,
    /// Contact numbers in insertion order; the first is "primary".
    pub contacts: Vec<ContactDetail>,
    /// The singleton address. Always present for clients created here;
    /// optional to stay honest about pre-invariant rows.
    pub address: Option<ClientAddress>,
    /// Meetings sorted by date ascending.
    pub meetings: Vec<ClientMeeting>,
}

/// Summary row for the owner's lead table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSummary {
    /// Row identifier.
    pub id: ClientId,
    /// Client's name.
    pub name: String,
    /// First contact number in insertion order, or empty when none exist.
    pub primary_number: String,
    /// Company the client represents.
    pub company: String,
    /// Lifecycle state.
    pub status: ClientStatus,
    /// Short working notes.
    pub remarks: String,
}

/// Widest phone number accepted, covering a country code and subscriber
/// number with headroom.
pub const MAX_NUMBER_LEN: usize = 20;

/// Validation failures for client write payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientValidationError {
    /// Name was blank once trimmed.
    EmptyName,
    /// Company was blank once trimmed.
    EmptyCompany,
    /// Contact number was blank once trimmed.
    EmptyNumber,
    /// Contact number exceeded [`MAX_NUMBER_LEN`] characters.
    NumberTooLong,
    /// Deal value was negative.
    NegativeDealValue,
    /// Field visit count was negative.
    NegativeFieldVisits,
}

impl fmt::Display for ClientValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyCompany => write!(f, "company must not be empty"),
            Self::EmptyNumber => write!(f, "contact number must not be empty"),
            Self::NumberTooLong => {
                write!(f, "contact number must be at most {MAX_NUMBER_LEN} characters")
            }
            Self::NegativeDealValue => write!(f, "deal value must not be negative"),
            Self::NegativeFieldVisits => write!(f, "field visits must not be negative"),
        }
    }
}

impl std::error::Error for ClientValidationError {}

/// Trims a contact number and checks it is non-empty and within
/// [`MAX_NUMBER_LEN`] characters, returning the cleaned value.
pub fn validate_contact_number(number: &str) -> Result<String, ClientValidationError> {
    let trimmed = number.trim();
    if trimmed.is_empty() {
        return Err(ClientValidationError::EmptyNumber);
    }
    if trimmed.chars().count() > MAX_NUMBER_LEN {
        return Err(ClientValidationError::NumberTooLong);
    }
    Ok(trimmed.to_owned())
}

/// Validated payload for creating a client.
///
/// Deal status is not part of intake; a fresh client starts in
/// `In-Progress`. Field visits start at one and detailed remarks start
/// empty, both set by the service rather than the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    name: String,
    description: String,
    company: String,
    number: String,
    status: ClientStatus,
    behaviour: Behaviour,
    deal_value: i64,
    remarks: String,
}

/// Raw field values for [`NewClient::new`].
#[derive(Debug, Clone)]
pub struct NewClientFields<'a> {
    /// Client's name; required.
    pub name: &'a str,
    /// Intake description; may be empty.
    pub description: &'a str,
    /// Company; required.
    pub company: &'a str,
    /// First contact number; required.
    pub number: &'a str,
    /// Initial lifecycle state.
    pub status: ClientStatus,
    /// Observed temperament.
    pub behaviour: Behaviour,
    /// Deal value in minor currency units; must not be negative.
    pub deal_value: i64,
    /// Short working notes; may be empty.
    pub remarks: &'a str,
}

impl NewClient {
    /// Validate and assemble a client creation payload.
    pub fn new(fields: NewClientFields<'_>) -> Result<Self, ClientValidationError> {
        let name = fields.name.trim();
        if name.is_empty() {
            return Err(ClientValidationError::EmptyName);
        }
        let company = fields.company.trim();
        if company.is_empty() {
            return Err(ClientValidationError::EmptyCompany);
        }
        let number = validate_contact_number(fields.number)?;
        if fields.deal_value < 0 {
            return Err(ClientValidationError::NegativeDealValue);
        }
        Ok(Self {
            name: name.to_owned(),
            description: fields.description.to_owned(),
            company: company.to_owned(),
            number,
            status: fields.status,
            behaviour: fields.behaviour,
            deal_value: fields.deal_value,
            remarks: fields.remarks.to_owned(),
        })
    }

    /// Client's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Intake description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Company the client represents.
    #[must_use]
    pub fn company(&self) -> &str {
        &self.company
    }

    /// First contact number.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Initial lifecycle state.
    #[must_use]
    pub const fn status(&self) -> ClientStatus {
        self.status
    }

    /// Observed temperament.
    #[must_use]
    pub const fn behaviour(&self) -> Behaviour {
        self.behaviour
    }

    /// Deal value in minor currency units.
    #[must_use]
    pub const fn deal_value(&self) -> i64 {
        self.deal_value
    }

    /// Short working notes.
    #[must_use]
    pub fn remarks(&self) -> &str {
        &self.remarks
    }
}

/// Partial update for a client row; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientFieldPatch {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement company.
    pub company: Option<String>,
    /// Replacement lifecycle state.
    pub status: Option<ClientStatus>,
    /// Replacement short notes.
    pub remarks: Option<String>,
    /// Replacement temperament.
    pub behaviour: Option<Behaviour>,
    /// Replacement deal value in minor units.
    pub deal_value: Option<i64>,
    /// Replacement deal stage.
    pub deal_status: Option<DealStatus>,
    /// Replacement visit count.
    pub field_visits: Option<i32>,
    /// Replacement long-form notes.
    pub detailed_remarks: Option<String>,
}

impl ClientFieldPatch {
    /// True when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.company.is_none()
            && self.status.is_none()
            && self.remarks.is_none()
            && self.behaviour.is_none()
            && self.deal_value.is_none()
            && self.deal_status.is_none()
            && self.field_visits.is_none()
            && self.detailed_remarks.is_none()
    }

    /// Validate the populated fields.
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self
            .name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(ClientValidationError::EmptyName);
        }
        if self
            .company
            .as_deref()
            .is_some_and(|company| company.trim().is_empty())
        {
            return Err(ClientValidationError::EmptyCompany);
        }
        if self.deal_value.is_some_and(|value| value < 0) {
            return Err(ClientValidationError::NegativeDealValue);
        }
        if self.field_visits.is_some_and(|visits| visits < 0) {
            return Err(ClientValidationError::NegativeFieldVisits);
        }
        Ok(())
    }
}

/// Validated payload for the lead-table row edit: the four summary fields
/// plus the primary contact number, written together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryUpdate {
    name: String,
    company: String,
    status: ClientStatus,
    remarks: String,
    number: String,
}

impl SummaryUpdate {
    /// Validate and assemble a summary update.
    pub fn new(
        name: &str,
        company: &str,
        status: ClientStatus,
        remarks: &str,
        number: &str,
    ) -> Result<Self, ClientValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientValidationError::EmptyName);
        }
        let company = company.trim();
        if company.is_empty() {
            return Err(ClientValidationError::EmptyCompany);
        }
        let number = validate_contact_number(number)?;
        Ok(Self {
            name: name.to_owned(),
            company: company.to_owned(),
            status,
            remarks: remarks.to_owned(),
            number,
        })
    }

    /// Replacement name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replacement company.
    #[must_use]
    pub fn company(&self) -> &str {
        &self.company
    }

    /// Replacement lifecycle state.
    #[must_use]
    pub const fn status(&self) -> ClientStatus {
        self.status
    }

    /// Replacement short notes.
    #[must_use]
    pub fn remarks(&self) -> &str {
        &self.remarks
    }

    /// Replacement primary contact number.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }
}

/// Single-field update for the singleton address.
///
/// Field names are carried in the type so an unknown field cannot reach the
/// store. Coordinates travel as a pair because a geocode result is atomic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "camelCase")]
pub enum AddressFieldUpdate {
    /// Replace the door or unit number.
    DoorNumber {
        /// New door number; may be empty to clear.
        value: String,
    },
    /// Replace the street address.
    StreetAddress {
        /// New street address; may be empty to clear.
        value: String,
    },
    /// Replace both coordinates with a geocode result.
    Coordinates {
        /// Latitude in decimal degrees.
        lat: f64,
        /// Longitude in decimal degrees.
        lng: f64,
    },
}

/// Partial update for a meeting; absent fields are left alone.
///
/// Updates are last-write-wins per field, not per record: sending only
/// `notes` must never clobber `date` and vice versa.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeetingPatch {
    /// Replacement meeting time.
    pub date: Option<DateTime<Utc>>,
    /// Replacement notes.
    pub notes: Option<String>,
}

impl MeetingPatch {
    /// True when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.date.is_none() && self.notes.is_none()
    }
}

/// A resolved geographic position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
