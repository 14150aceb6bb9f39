//! HTTP inbound adapter exposing the REST surface.

pub mod auth;
pub mod clients;
pub mod clients_dto;
pub mod error;
pub mod geocode;
pub mod health;
pub mod members;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;
