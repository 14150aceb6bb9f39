//! Outbound adapters: PostgreSQL persistence and third-party geocoding.

pub mod geocoding;
pub mod persistence;
