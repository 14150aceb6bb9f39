//! Request middleware.
//!
//! Purpose: Define middleware components for request lifecycle concerns:
//! trace propagation and the session-scoped page access gate.

pub mod access_gate;
pub mod trace;

pub use access_gate::AccessGate;
pub use trace::Trace;
