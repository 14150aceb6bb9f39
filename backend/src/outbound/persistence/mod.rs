//! PostgreSQL persistence adapters built on Diesel.
//!
//! Repositories here only translate between Diesel rows and domain types;
//! ownership scoping and business rules arrive encoded in the queries, not
//! as logic of their own. Row structs (`models.rs`) and the table
//! definitions (`schema.rs`) are internal to this module and never cross
//! into the domain. Connections come from a `bb8` pool over
//! `diesel-async`, and every failure is mapped onto the owning port's
//! error type before it leaves the adapter.

mod diesel_client_repository;
mod diesel_login_service;
mod diesel_member_repository;
pub(crate) mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_client_repository::DieselClientRepository;
pub use diesel_login_service::DieselLoginService;
pub use diesel_member_repository::DieselMemberRepository;
pub use migrations::{MigrationsError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
