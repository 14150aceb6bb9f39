//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer; these never cross
//! into the domain. Read structs select exactly the columns the adapters
//! need, so audit columns the domain does not carry stay out of the
//! queries entirely.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{
    admins, client_addresses, client_contact_details, client_meetings, clients, members, teams,
};

// ---------------------------------------------------------------------------
// Portal accounts
// ---------------------------------------------------------------------------

/// Credential row for the admin portal.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = admins)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AdminLoginRow {
    pub id: i32,
    pub username: String,
    pub password: String,
    pub name: String,
}

/// Credential row for the user portal.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MemberLoginRow {
    pub id: i32,
    pub username: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
}

// ---------------------------------------------------------------------------
// Member directory
// ---------------------------------------------------------------------------

/// Row struct for reading members; the password column stays out of
/// directory reads.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MemberRow {
    pub id: i32,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub number: String,
    pub team_id: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating member records.
#[derive(Debug, Insertable)]
#[diesel(table_name = members)]
pub(crate) struct NewMemberRow<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub firstname: &'a str,
    pub lastname: &'a str,
    pub number: &'a str,
    pub team_id: i32,
    pub status: &'a str,
}

/// Changeset for partial member updates; `None` leaves a column alone.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = members)]
pub(crate) struct MemberChangeset<'a> {
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
    pub firstname: Option<&'a str>,
    pub lastname: Option<&'a str>,
    pub team_id: Option<i32>,
    pub status: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading teams.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = teams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TeamRow {
    pub id: i32,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Client aggregate
// ---------------------------------------------------------------------------

/// Row struct for reading from the clients table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = clients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ClientRow {
    pub id: i32,
    pub member_id: i32,
    pub name: String,
    pub description: String,
    pub company: String,
    pub status: i32,
    pub remarks: String,
    pub behaviour: String,
    pub deal_value: i64,
    pub deal_status: String,
    pub field_visits: i32,
    pub detailed_remarks: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating client records.
#[derive(Debug, Insertable)]
#[diesel(table_name = clients)]
pub(crate) struct NewClientRow<'a> {
    pub member_id: i32,
    pub name: &'a str,
    pub description: &'a str,
    pub company: &'a str,
    pub status: i32,
    pub remarks: &'a str,
    pub behaviour: &'a str,
    pub deal_value: i64,
    pub deal_status: &'a str,
    pub field_visits: i32,
    pub detailed_remarks: &'a str,
}

/// Changeset for partial client updates; `updated_at` is always written.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = clients)]
pub(crate) struct ClientChangeset<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub company: Option<&'a str>,
    pub status: Option<i32>,
    pub remarks: Option<&'a str>,
    pub behaviour: Option<&'a str>,
    pub deal_value: Option<i64>,
    pub deal_status: Option<&'a str>,
    pub field_visits: Option<i32>,
    pub detailed_remarks: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading contact numbers.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = client_contact_details)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ContactRow {
    pub id: i32,
    pub client_id: i32,
    pub number: String,
}

/// Insertable struct for attaching a contact number.
#[derive(Debug, Insertable)]
#[diesel(table_name = client_contact_details)]
pub(crate) struct NewContactRow<'a> {
    pub client_id: i32,
    pub number: &'a str,
}

/// Row struct for reading the singleton address; the surrogate id stays
/// internal to the table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = client_addresses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AddressRow {
    pub client_id: i32,
    pub door_number: String,
    pub street_address: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Insertable struct for the blank address created with each client.
#[derive(Debug, Insertable)]
#[diesel(table_name = client_addresses)]
pub(crate) struct NewAddressRow<'a> {
    pub client_id: i32,
    pub door_number: &'a str,
    pub street_address: &'a str,
}

/// Changeset for single-field address writes; coordinates always arrive
/// as a pair.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = client_addresses)]
pub(crate) struct AddressChangeset<'a> {
    pub door_number: Option<&'a str>,
    pub street_address: Option<&'a str>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Row struct for reading meetings; the audit timestamp stays in the
/// table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = client_meetings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MeetingRow {
    pub id: i32,
    pub client_id: i32,
    pub date: DateTime<Utc>,
    pub notes: String,
}

/// Insertable struct for recording a meeting.
#[derive(Debug, Insertable)]
#[diesel(table_name = client_meetings)]
pub(crate) struct NewMeetingRow<'a> {
    pub client_id: i32,
    pub date: DateTime<Utc>,
    pub notes: &'a str,
}

/// Changeset for per-field meeting merges.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = client_meetings)]
pub(crate) struct MeetingChangeset<'a> {
    pub date: Option<DateTime<Utc>>,
    pub notes: Option<&'a str>,
}
