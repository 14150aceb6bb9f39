//! Member directory entities.
//!
//! Sales members are the principals that own client relationships. Teams
//! group members; the team code doubles as the member's role (see
//! [`crate::domain::auth::Role`]). Administrators live in a separate
//! directory table and never appear here.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::auth::{PASSWORD_MAX_LEN, PASSWORD_MIN_LEN};
use crate::domain::client::Client;

/// Identifier of a member row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub i32);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a team row. The admin team is code 0, sales is code 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub i32);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Directory state of a member. Bookkeeping only; sign-in does not
/// consult it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    /// The member is working and visible in rosters.
    Active,
    /// The member has left or is paused but is retained for history.
    Inactive,
}

impl MemberStatus {
    /// Text form stored in the directory.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }

    /// Parse the stored text form.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Active" => Some(Self::Active),
            "Inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// A sales-team member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Directory row identifier.
    pub id: MemberId,
    /// Unique login name.
    pub username: String,
    /// Given name.
    pub firstname: String,
    /// Family name.
    pub lastname: String,
    /// Contact phone number.
    pub number: String,
    /// Team the member belongs to; doubles as the role code.
    pub team_id: TeamId,
    /// Directory state.
    pub status: MemberStatus,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last directory update time.
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Name shown in application chrome.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

/// A team row from the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Team identifier; doubles as the role code of its members.
    pub id: TeamId,
    /// Team display name.
    pub name: String,
}

/// A team together with its members, as shown on the admin home page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRoster {
    /// The team row.
    pub team: Team,
    /// Members currently assigned to the team.
    pub members: Vec<Member>,
}

/// A member profile with its team and owned clients, for the admin detail
/// page.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberProfile {
    /// The member row.
    pub member: Member,
    /// The member's team.
    pub team: Team,
    /// Clients owned by the member.
    pub clients: Vec<Client>,
}

/// Validation failures for member write payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberValidationError {
    /// Username was blank once trimmed.
    EmptyUsername,
    /// First name was blank once trimmed.
    EmptyFirstname,
    /// Last name was blank once trimmed.
    EmptyLastname,
    /// Phone number was blank once trimmed.
    EmptyNumber,
    /// Password fell outside the 8 to 32 character window.
    InvalidPasswordLength,
    /// Status text was not a known member status.
    UnknownStatus,
}

impl fmt::Display for MemberValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyFirstname => write!(f, "firstname must not be empty"),
            Self::EmptyLastname => write!(f, "lastname must not be empty"),
            Self::EmptyNumber => write!(f, "number must not be empty"),
            Self::InvalidPasswordLength => write!(
                f,
                "password must be {PASSWORD_MIN_LEN} to {PASSWORD_MAX_LEN} characters"
            ),
            Self::UnknownStatus => write!(f, "status must be Active or Inactive"),
        }
    }
}

impl std::error::Error for MemberValidationError {}

fn validate_password(password: &str) -> Result<(), MemberValidationError> {
    let len = password.chars().count();
    if (PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        Ok(())
    } else {
        Err(MemberValidationError::InvalidPasswordLength)
    }
}

/// Validated payload for creating a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    username: String,
    password: Zeroizing<String>,
    firstname: String,
    lastname: String,
    number: String,
    team_id: TeamId,
    status: MemberStatus,
}

impl NewMember {
    /// Validate and assemble a member creation payload.
    pub fn new(
        username: &str,
        password: &str,
        firstname: &str,
        lastname: &str,
        number: &str,
        team_id: TeamId,
        status: MemberStatus,
    ) -> Result<Self, MemberValidationError> {
        let username = non_blank(username, MemberValidationError::EmptyUsername)?;
        let firstname = non_blank(firstname, MemberValidationError::EmptyFirstname)?;
        let lastname = non_blank(lastname, MemberValidationError::EmptyLastname)?;
        let number = non_blank(number, MemberValidationError::EmptyNumber)?;
        validate_password(password)?;
        Ok(Self {
            username,
            password: Zeroizing::new(password.to_owned()),
            firstname,
            lastname,
            number,
            team_id,
            status,
        })
    }

    /// Unique login name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Raw password to store for the sign-in check.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Given name.
    #[must_use]
    pub fn firstname(&self) -> &str {
        &self.firstname
    }

    /// Family name.
    #[must_use]
    pub fn lastname(&self) -> &str {
        &self.lastname
    }

    /// Contact phone number.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Team assignment.
    #[must_use]
    pub const fn team_id(&self) -> TeamId {
        self.team_id
    }

    /// Initial status.
    #[must_use]
    pub const fn status(&self) -> MemberStatus {
        self.status
    }
}

/// Partial update for a member row; absent fields are left alone.
///
/// The contact number is deliberately not updatable here: it is set at
/// creation and the directory screens never edit it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberUpdate {
    /// Replacement login name.
    pub username: Option<String>,
    /// Replacement password.
    pub password: Option<Zeroizing<String>>,
    /// Replacement given name.
    pub firstname: Option<String>,
    /// Replacement family name.
    pub lastname: Option<String>,
    /// Replacement team assignment.
    pub team_id: Option<TeamId>,
    /// Replacement status.
    pub status: Option<MemberStatus>,
}

impl MemberUpdate {
    /// True when no field is set, in which case the update is a no-op and
    /// handlers reject it instead of touching the row.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.firstname.is_none()
            && self.lastname.is_none()
            && self.team_id.is_none()
            && self.status.is_none()
    }

    /// Validate the populated fields.
    pub fn validate(&self) -> Result<(), MemberValidationError> {
        let blank = |value: &Option<String>| {
            value
                .as_deref()
                .is_some_and(|text| text.trim().is_empty())
        };
        if blank(&self.username) {
            return Err(MemberValidationError::EmptyUsername);
        }
        if blank(&self.firstname) {
            return Err(MemberValidationError::EmptyFirstname);
        }
        if blank(&self.lastname) {
            return Err(MemberValidationError::EmptyLastname);
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        Ok(())
    }
}

fn non_blank(value: &str, error: MemberValidationError) -> Result<String, MemberValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(error);
    }
    Ok(trimmed.to_owned())
}
