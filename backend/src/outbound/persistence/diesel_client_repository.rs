//! PostgreSQL-backed `ClientRepository` implementation using Diesel.
//!
//! Every query combines the client id with the owning member id, so a
//! mismatched owner reads exactly like a missing row. Multi-row writes
//! (creation, summary rewrite, guarded contact removal) run in
//! transactions; single-row writes rely on an ownership subquery in
//! their WHERE clause.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::client::{
    AddressFieldUpdate, Behaviour, Client, ClientAddress, ClientAggregate, ClientFieldPatch,
    ClientId, ClientMeeting, ClientStatus, ClientSummary, ContactDetail, ContactDetailId,
    DealStatus, MeetingId, MeetingPatch, NewClient, SummaryUpdate,
};
use crate::domain::member::MemberId;
use crate::domain::ports::{ClientRepository, ClientRepositoryError, ContactRemoval};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    AddressChangeset, AddressRow, ClientChangeset, ClientRow, ContactRow, MeetingChangeset,
    MeetingRow, NewAddressRow, NewClientRow, NewContactRow, NewMeetingRow,
};
use super::pool::DbPool;
use super::schema::{client_addresses, client_contact_details, client_meetings, clients};

/// Diesel-backed implementation of the `ClientRepository` port.
#[derive(Clone)]
pub struct DieselClientRepository {
    pool: DbPool,
}

impl DieselClientRepository {
    /// Create a new repository with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Subquery yielding `$client`'s id only while `$owner` holds it.
macro_rules! owned_client_ids {
    ($owner:expr, $client:expr) => {
        clients::table
            .filter(
                clients::id
                    .eq($client.0)
                    .and(clients::member_id.eq($owner.0)),
            )
            .select(clients::id)
    };
}

/// Convert a database row to a domain [`Client`].
///
/// The behaviour and deal status columns are only ever written from the
/// enums, so unreadable text means the row was edited out of band and is
/// reported as a query error naming the column.
pub(crate) fn row_to_client(row: ClientRow) -> Result<Client, ClientRepositoryError> {
    let behaviour = Behaviour::parse(&row.behaviour).ok_or_else(|| {
        ClientRepositoryError::query(format!(
            "client {} has unreadable behaviour {:?}",
            row.id, row.behaviour
        ))
    })?;
    let deal_status = DealStatus::parse(&row.deal_status).ok_or_else(|| {
        ClientRepositoryError::query(format!(
            "client {} has unreadable deal status {:?}",
            row.id, row.deal_status
        ))
    })?;
    Ok(Client {
        id: ClientId(row.id),
        owner_id: MemberId(row.member_id),
        name: row.name,
        description: row.description,
        company: row.company,
        status: ClientStatus::from_code(row.status),
        remarks: row.remarks,
        behaviour,
        deal_value: row.deal_value,
        deal_status,
        field_visits: row.field_visits,
        detailed_remarks: row.detailed_remarks,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Convert a client row plus its first contact number to a summary.
fn row_to_summary(row: ClientRow, primary_number: String) -> ClientSummary {
    ClientSummary {
        id: ClientId(row.id),
        name: row.name,
        primary_number,
        company: row.company,
        status: ClientStatus::from_code(row.status),
        remarks: row.remarks,
    }
}

fn row_to_contact(row: ContactRow) -> ContactDetail {
    ContactDetail {
        id: ContactDetailId(row.id),
        client_id: ClientId(row.client_id),
        number: row.number,
    }
}

fn row_to_address(row: AddressRow) -> ClientAddress {
    ClientAddress {
        client_id: ClientId(row.client_id),
        door_number: row.door_number,
        street_address: row.street_address,
        lat: row.lat,
        lng: row.lng,
    }
}

fn row_to_meeting(row: MeetingRow) -> ClientMeeting {
    ClientMeeting {
        id: MeetingId(row.id),
        client_id: ClientId(row.client_id),
        date: row.date,
        notes: row.notes,
    }
}

/// Build the column changeset for a partial client update.
fn changeset_for<'a>(
    patch: &'a ClientFieldPatch,
    updated_at: DateTime<Utc>,
) -> ClientChangeset<'a> {
    ClientChangeset {
        name: patch.name.as_deref(),
        description: patch.description.as_deref(),
        company: patch.company.as_deref(),
        status: patch.status.map(ClientStatus::code),
        remarks: patch.remarks.as_deref(),
        behaviour: patch.behaviour.map(Behaviour::as_str),
        deal_value: patch.deal_value,
        deal_status: patch.deal_status.map(DealStatus::as_str),
        field_visits: patch.field_visits,
        detailed_remarks: patch.detailed_remarks.as_deref(),
        updated_at,
    }
}

/// Rows backing one aggregate snapshot.
type AggregateRows = (ClientRow, Vec<ContactRow>, Option<AddressRow>, Vec<MeetingRow>);

#[async_trait]
impl ClientRepository for DieselClientRepository {
    async fn create(
        &self,
        owner: MemberId,
        client: &NewClient,
    ) -> Result<ClientAggregate, ClientRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // One transaction so the client never exists without its first
        // contact and its blank address row.
        let (client_row, contact_row, address_row) = conn
            .transaction(|conn| {
                async move {
                    let client_row: ClientRow = diesel::insert_into(clients::table)
                        .values(NewClientRow {
                            member_id: owner.0,
                            name: client.name(),
                            description: client.description(),
                            company: client.company(),
                            status: client.status().code(),
                            remarks: client.remarks(),
                            behaviour: client.behaviour().as_str(),
                            deal_value: client.deal_value(),
                            deal_status: DealStatus::InProgress.as_str(),
                            field_visits: 1,
                            detailed_remarks: "",
                        })
                        .returning(ClientRow::as_returning())
                        .get_result(conn)
                        .await?;
                    let contact_row: ContactRow =
                        diesel::insert_into(client_contact_details::table)
                            .values(NewContactRow {
                                client_id: client_row.id,
                                number: client.number(),
                            })
                            .returning(ContactRow::as_returning())
                            .get_result(conn)
                            .await?;
                    let address_row: AddressRow = diesel::insert_into(client_addresses::table)
                        .values(NewAddressRow {
                            client_id: client_row.id,
                            door_number: "",
                            street_address: "",
                        })
                        .returning(AddressRow::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>((client_row, contact_row, address_row))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(ClientAggregate {
            client: row_to_client(client_row)?,
            contacts: vec![row_to_contact(contact_row)],
            address: Some(row_to_address(address_row)),
            meetings: Vec::new(),
        })
    }

    async fn find_aggregate(
        &self,
        owner: MemberId,
        id: ClientId,
    ) -> Result<Option<ClientAggregate>, ClientRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // All four SELECTs run in one transaction so the nested
        // collections observe a single snapshot of the client.
        let snapshot: Option<AggregateRows> = conn
            .transaction(|conn| {
                async move {
                    let client_row: Option<ClientRow> = clients::table
                        .filter(clients::id.eq(id.0).and(clients::member_id.eq(owner.0)))
                        .select(ClientRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(client_row) = client_row else {
                        return Ok::<_, diesel::result::Error>(None);
                    };
                    let contacts: Vec<ContactRow> = client_contact_details::table
                        .filter(client_contact_details::client_id.eq(client_row.id))
                        .order_by(client_contact_details::id.asc())
                        .select(ContactRow::as_select())
                        .load(conn)
                        .await?;
                    let address: Option<AddressRow> = client_addresses::table
                        .filter(client_addresses::client_id.eq(client_row.id))
                        .select(AddressRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;
                    let meetings: Vec<MeetingRow> = client_meetings::table
                        .filter(client_meetings::client_id.eq(client_row.id))
                        .order_by(client_meetings::date.asc())
                        .select(MeetingRow::as_select())
                        .load(conn)
                        .await?;
                    Ok(Some((client_row, contacts, address, meetings)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let Some((client_row, contacts, address, meetings)) = snapshot else {
            return Ok(None);
        };
        Ok(Some(ClientAggregate {
            client: row_to_client(client_row)?,
            contacts: contacts.into_iter().map(row_to_contact).collect(),
            address: address.map(row_to_address),
            meetings: meetings.into_iter().map(row_to_meeting).collect(),
        }))
    }

    async fn list_summaries(
        &self,
        owner: MemberId,
    ) -> Result<Vec<ClientSummary>, ClientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ClientRow> = clients::table
            .filter(clients::member_id.eq(owner.0))
            .order_by(clients::id.asc())
            .select(ClientRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
        let contact_rows: Vec<ContactRow> = client_contact_details::table
            .filter(client_contact_details::client_id.eq_any(&ids))
            .order_by((
                client_contact_details::client_id.asc(),
                client_contact_details::id.asc(),
            ))
            .select(ContactRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        // First contact per client in insertion order is the primary
        // number; a client without contacts renders an empty one.
        let mut primary: HashMap<i32, String> = HashMap::new();
        for contact in contact_rows {
            primary.entry(contact.client_id).or_insert(contact.number);
        }
        Ok(rows
            .into_iter()
            .map(|row| {
                let number = primary.remove(&row.id).unwrap_or_default();
                row_to_summary(row, number)
            })
            .collect())
    }

    async fn update_fields(
        &self,
        owner: MemberId,
        id: ClientId,
        patch: &ClientFieldPatch,
    ) -> Result<Option<Client>, ClientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ClientRow> = diesel::update(
            clients::table.filter(clients::id.eq(id.0).and(clients::member_id.eq(owner.0))),
        )
        .set(changeset_for(patch, Utc::now()))
        .returning(ClientRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        row.map(row_to_client).transpose()
    }

    async fn update_summary(
        &self,
        owner: MemberId,
        id: ClientId,
        update: &SummaryUpdate,
    ) -> Result<Option<ClientSummary>, ClientRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // The card fields and the primary number change together or not
        // at all.
        let summary = conn
            .transaction(|conn| {
                async move {
                    let client_row: Option<ClientRow> = diesel::update(
                        clients::table
                            .filter(clients::id.eq(id.0).and(clients::member_id.eq(owner.0))),
                    )
                    .set(ClientChangeset {
                        name: Some(update.name()),
                        description: None,
                        company: Some(update.company()),
                        status: Some(update.status().code()),
                        remarks: Some(update.remarks()),
                        behaviour: None,
                        deal_value: None,
                        deal_status: None,
                        field_visits: None,
                        detailed_remarks: None,
                        updated_at: Utc::now(),
                    })
                    .returning(ClientRow::as_returning())
                    .get_result(conn)
                    .await
                    .optional()?;
                    let Some(client_row) = client_row else {
                        return Ok::<_, diesel::result::Error>(None);
                    };
                    let first: Option<ContactRow> = client_contact_details::table
                        .filter(client_contact_details::client_id.eq(client_row.id))
                        .order_by(client_contact_details::id.asc())
                        .select(ContactRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;
                    let number = if let Some(first) = first {
                        diesel::update(
                            client_contact_details::table
                                .filter(client_contact_details::id.eq(first.id)),
                        )
                        .set(client_contact_details::number.eq(update.number()))
                        .execute(conn)
                        .await?;
                        update.number().to_owned()
                    } else {
                        String::new()
                    };
                    Ok(Some(row_to_summary(client_row, number)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(summary)
    }

    async fn delete(&self, owner: MemberId, id: ClientId) -> Result<bool, ClientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Contacts, the address, and meetings go with the client via the
        // ON DELETE CASCADE on their foreign keys.
        let deleted = diesel::delete(
            clients::table.filter(clients::id.eq(id.0).and(clients::member_id.eq(owner.0))),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn add_contact(
        &self,
        owner: MemberId,
        client: ClientId,
        number: &str,
    ) -> Result<Option<ContactDetail>, ClientRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    let owned: Option<i32> = owned_client_ids!(owner, client)
                        .first(conn)
                        .await
                        .optional()?;
                    if owned.is_none() {
                        return Ok::<_, diesel::result::Error>(None);
                    }
                    let row: ContactRow = diesel::insert_into(client_contact_details::table)
                        .values(NewContactRow {
                            client_id: client.0,
                            number,
                        })
                        .returning(ContactRow::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok(Some(row))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_contact))
    }

    async fn update_contact(
        &self,
        owner: MemberId,
        client: ClientId,
        contact: ContactDetailId,
        number: &str,
    ) -> Result<Option<ContactDetail>, ClientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ContactRow> = diesel::update(
            client_contact_details::table.filter(
                client_contact_details::id
                    .eq(contact.0)
                    .and(client_contact_details::client_id.eq_any(owned_client_ids!(owner, client))),
            ),
        )
        .set(client_contact_details::number.eq(number))
        .returning(ContactRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        Ok(row.map(row_to_contact))
    }

    async fn remove_contact(
        &self,
        owner: MemberId,
        client: ClientId,
        contact: ContactDetailId,
    ) -> Result<ContactRemoval, ClientRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let outcome = conn
            .transaction(|conn| {
                async move {
                    // The parent row lock serialises concurrent removals
                    // for this client, so two of them cannot both pass
                    // the remaining-contact check.
                    let owned: Option<i32> = owned_client_ids!(owner, client)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    if owned.is_none() {
                        return Ok::<_, diesel::result::Error>(ContactRemoval::Missing);
                    }
                    let contact_ids: Vec<i32> = client_contact_details::table
                        .filter(client_contact_details::client_id.eq(client.0))
                        .order_by(client_contact_details::id.asc())
                        .select(client_contact_details::id)
                        .load(conn)
                        .await?;
                    if !contact_ids.contains(&contact.0) {
                        return Ok(ContactRemoval::Missing);
                    }
                    if contact_ids.len() <= 1 {
                        return Ok(ContactRemoval::LastContact);
                    }
                    diesel::delete(
                        client_contact_details::table
                            .filter(client_contact_details::id.eq(contact.0)),
                    )
                    .execute(conn)
                    .await?;
                    Ok(ContactRemoval::Removed)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(outcome)
    }

    async fn update_address(
        &self,
        owner: MemberId,
        client: ClientId,
        update: &AddressFieldUpdate,
    ) -> Result<Option<ClientAddress>, ClientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = match update {
            AddressFieldUpdate::DoorNumber { value } => AddressChangeset {
                door_number: Some(value.as_str()),
                street_address: None,
                lat: None,
                lng: None,
            },
            AddressFieldUpdate::StreetAddress { value } => AddressChangeset {
                door_number: None,
                street_address: Some(value.as_str()),
                lat: None,
                lng: None,
            },
            AddressFieldUpdate::Coordinates { lat, lng } => AddressChangeset {
                door_number: None,
                street_address: None,
                lat: Some(*lat),
                lng: Some(*lng),
            },
        };
        let row: Option<AddressRow> = diesel::update(
            client_addresses::table.filter(
                client_addresses::client_id.eq_any(owned_client_ids!(owner, client)),
            ),
        )
        .set(changeset)
        .returning(AddressRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        Ok(row.map(row_to_address))
    }

    async fn add_meeting(
        &self,
        owner: MemberId,
        client: ClientId,
        date: DateTime<Utc>,
    ) -> Result<Option<ClientMeeting>, ClientRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    let owned: Option<i32> = owned_client_ids!(owner, client)
                        .first(conn)
                        .await
                        .optional()?;
                    if owned.is_none() {
                        return Ok::<_, diesel::result::Error>(None);
                    }
                    let row: MeetingRow = diesel::insert_into(client_meetings::table)
                        .values(NewMeetingRow {
                            client_id: client.0,
                            date,
                            notes: "",
                        })
                        .returning(MeetingRow::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok(Some(row))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_meeting))
    }

    async fn update_meeting(
        &self,
        owner: MemberId,
        client: ClientId,
        meeting: MeetingId,
        patch: &MeetingPatch,
    ) -> Result<Option<ClientMeeting>, ClientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<MeetingRow> = diesel::update(
            client_meetings::table.filter(
                client_meetings::id
                    .eq(meeting.0)
                    .and(client_meetings::client_id.eq_any(owned_client_ids!(owner, client))),
            ),
        )
        .set(MeetingChangeset {
            date: patch.date,
            notes: patch.notes.as_deref(),
        })
        .returning(MeetingRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        Ok(row.map(row_to_meeting))
    }

    async fn remove_meeting(
        &self,
        owner: MemberId,
        client: ClientId,
        meeting: MeetingId,
    ) -> Result<bool, ClientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            client_meetings::table.filter(
                client_meetings::id
                    .eq(meeting.0)
                    .and(client_meetings::client_id.eq_any(owned_client_ids!(owner, client))),
            ),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
