//! Domain model for the CRM backend.
//!
//! Pure types and rules live here: the session-scoped access gate, the
//! client aggregate with its invariants, the member directory, and the
//! ports through which adapters reach the outside world. Nothing in this
//! module depends on the web framework or the database.

pub mod access;
pub mod auth;
pub mod client;
pub mod error;
pub mod member;
pub mod ports;

mod client_service;
mod member_service;
mod trace_id;

pub use auth::{AuthenticatedUser, Credentials, Role, SessionClaims, SignInPortal};
pub use client_service::ClientService;
pub use error::{Error, ErrorCode};
pub use member_service::MemberService;
pub use trace_id::{TRACE_ID_HEADER, TraceId};
