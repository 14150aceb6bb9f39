//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match the migrations exactly; regenerate with
//! `diesel print-schema` after a migration changes the shape of a table.

diesel::table! {
    /// Administrator accounts for the admin portal.
    admins (id) {
        id -> Int4,
        /// Unique login name.
        username -> Varchar,
        password -> Varchar,
        /// Display name shown after sign-in.
        name -> Varchar,
        /// Always zero; admins sit outside the sales teams.
        team_id -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Sales teams members are grouped under.
    teams (id) {
        id -> Int4,
        name -> Varchar,
    }
}

diesel::table! {
    /// Sales member accounts for the user portal.
    members (id) {
        id -> Int4,
        /// Unique login name across the directory.
        username -> Varchar,
        password -> Varchar,
        firstname -> Varchar,
        lastname -> Varchar,
        /// Contact phone number.
        number -> Varchar,
        team_id -> Int4,
        /// `Active` or `Inactive`.
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Client (lead) records, each owned by one member.
    clients (id) {
        id -> Int4,
        /// Owning member; every query filters on this together with `id`.
        member_id -> Int4,
        name -> Varchar,
        description -> Text,
        company -> Varchar,
        /// Numeric lifecycle code: 0 inactive, 1 pending, 2 active.
        status -> Int4,
        remarks -> Text,
        /// Stored behaviour text, written only by the application.
        behaviour -> Varchar,
        /// Deal value in minor currency units.
        deal_value -> Int8,
        deal_status -> Varchar,
        field_visits -> Int4,
        detailed_remarks -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Phone numbers attached to a client, many per client.
    client_contact_details (id) {
        id -> Int4,
        client_id -> Int4,
        number -> Varchar,
    }
}

diesel::table! {
    /// Singleton address per client, created blank with the client.
    client_addresses (id) {
        id -> Int4,
        /// Unique: at most one address row per client.
        client_id -> Int4,
        door_number -> Varchar,
        street_address -> Text,
        lat -> Nullable<Float8>,
        lng -> Nullable<Float8>,
    }
}

diesel::table! {
    /// Meetings recorded against a client.
    client_meetings (id) {
        id -> Int4,
        client_id -> Int4,
        date -> Timestamptz,
        notes -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(members -> teams (team_id));
diesel::joinable!(clients -> members (member_id));
diesel::joinable!(client_contact_details -> clients (client_id));
diesel::joinable!(client_addresses -> clients (client_id));
diesel::joinable!(client_meetings -> clients (client_id));

diesel::allow_tables_to_appear_in_same_query!(
    admins,
    teams,
    members,
    clients,
    client_contact_details,
    client_addresses,
    client_meetings,
);
