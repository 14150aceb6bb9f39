//! Authentication primitives: roles, sign-in portals, credentials, claims.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Role a signed-in principal holds, encoded as the team code it belongs to.
///
/// Code `0` is the administrative team; code `1` is the sales team. Any
/// other code is unrepresentable: decoding fails and callers treat the
/// session as anonymous rather than guessing at an entitlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Role {
    /// Directory administration (team code 0).
    Admin,
    /// Client-facing sales work (team code 1).
    Sales,
}

/// Error returned when a role code is outside the known set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown role code {0}")]
pub struct UnknownRoleCode(pub i32);

impl Role {
    /// Decode a role from its stored team code.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Admin),
            1 => Some(Self::Sales),
            _ => None,
        }
    }

    /// The team code persisted in sessions and the member directory.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Admin => 0,
            Self::Sales => 1,
        }
    }

    /// Landing page a principal with this role is sent to after sign-in.
    #[must_use]
    pub const fn home_path(self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Sales => "/sales/overview",
        }
    }
}

impl TryFrom<i32> for Role {
    type Error = UnknownRoleCode;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(UnknownRoleCode(code))
    }
}

impl From<Role> for i32 {
    fn from(role: Role) -> Self {
        role.code()
    }
}

/// Which sign-in surface the credentials were submitted through.
///
/// The admin portal authenticates against the administrator directory, the
/// user portal against the member directory. The split mirrors the two
/// sign-in pages the gate exempts from redirection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignInPortal {
    /// `/signin/admin` — administrator directory.
    Admin,
    /// `/signin/user` — member directory.
    User,
}

/// Session payload written at sign-in and read by the gate and handlers.
///
/// The role travels as its integer team code; a stored code outside the
/// known set makes the whole payload undecodable, which downstream logic
/// treats as an anonymous session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Primary key of the signed-in principal in its directory table.
    pub user_id: i32,
    /// Entitlement role derived from the principal's team.
    pub role: Role,
    /// Login name, kept for audit logging.
    pub username: String,
    /// Name shown in the application chrome.
    pub display_name: String,
}

/// Domain error returned when sign-in payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was shorter than the minimum of eight characters.
    PasswordTooShort,
    /// Password exceeded the maximum of thirty-two characters.
    PasswordTooLong,
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::PasswordTooShort => {
                write!(f, "password must be at least {PASSWORD_MIN_LEN} characters")
            }
            Self::PasswordTooLong => {
                write!(f, "password must be at most {PASSWORD_MAX_LEN} characters")
            }
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

/// Minimum accepted password length, matching the sign-in form contract.
pub const PASSWORD_MIN_LEN: usize = 8;
/// Maximum accepted password length, matching the sign-in form contract.
pub const PASSWORD_MAX_LEN: usize = 32;

/// Validated sign-in credentials used by authentication services.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is 8 to 32 characters and retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use crm_backend::domain::Credentials;
///
/// let creds = Credentials::try_from_parts("asmith", "password").unwrap();
/// assert_eq!(creds.username(), "asmith");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(CredentialsValidationError::EmptyUsername);
        }

        let password_chars = password.chars().count();
        if password_chars < PASSWORD_MIN_LEN {
            return Err(CredentialsValidationError::PasswordTooShort);
        }
        if password_chars > PASSWORD_MAX_LEN {
            return Err(CredentialsValidationError::PasswordTooLong);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for directory lookups.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Directory identity returned by a successful credential check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Primary key of the principal within its directory table.
    pub id: i32,
    /// Role derived from the principal's team code.
    pub role: Role,
    /// Login name as stored in the directory.
    pub username: String,
    /// Human-readable name for display.
    pub display_name: String,
}

impl AuthenticatedUser {
    /// Build the session claims representing this identity.
    #[must_use]
    pub fn into_claims(self) -> SessionClaims {
        SessionClaims {
            user_id: self.id,
            role: self.role,
            username: self.username,
            display_name: self.display_name,
        }
    }
}
