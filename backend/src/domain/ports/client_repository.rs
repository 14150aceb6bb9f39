//! Driven port for storing and retrieving client aggregates.
//!
//! Every method is scoped to the owning salesperson: adapters must combine
//! the owner id with the record id in their lookups so one member can never
//! read or mutate another member's book. "Not found" and "not yours" are
//! deliberately indistinguishable at this boundary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::define_port_error;
use crate::domain::client::{
    AddressFieldUpdate, Client, ClientAddress, ClientAggregate, ClientFieldPatch, ClientId,
    ClientMeeting, ClientSummary, ContactDetail, ContactDetailId, DealStatus, MeetingId,
    MeetingPatch, NewClient, SummaryUpdate,
};
use crate::domain::member::MemberId;

define_port_error! {
    /// Errors raised by [`ClientRepository`] adapters.
    pub enum ClientRepositoryError {
        /// The backing store could not be reached.
        #[error("client store connection failed: {message}")]
        Connection { message: String },
        /// A statement failed once connected.
        #[error("client store query failed: {message}")]
        Query { message: String },
    }
}

/// Outcome of a guarded contact removal.
///
/// The guard runs inside the adapter's transaction so a concurrent removal
/// cannot strip the final contact from a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactRemoval {
    /// The contact existed and was deleted.
    Removed,
    /// The contact is the client's only one and was kept.
    LastContact,
    /// No such contact under this owner and client.
    Missing,
}

/// Persistence port for the client aggregate.
///
/// Creation is atomic: the client row, its first contact, and its empty
/// address row all land together or not at all. Update methods return
/// `Ok(None)` when the owner has no matching record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Persists a new client with its first contact and a blank address.
    async fn create(
        &self,
        owner: MemberId,
        client: &NewClient,
    ) -> Result<ClientAggregate, ClientRepositoryError>;

    /// Loads one client with contacts, address, and meetings.
    async fn find_aggregate(
        &self,
        owner: MemberId,
        id: ClientId,
    ) -> Result<Option<ClientAggregate>, ClientRepositoryError>;

    /// Lists summary rows for the owner's whole book.
    async fn list_summaries(
        &self,
        owner: MemberId,
    ) -> Result<Vec<ClientSummary>, ClientRepositoryError>;

    /// Applies the provided fields of `patch` to one client.
    async fn update_fields(
        &self,
        owner: MemberId,
        id: ClientId,
        patch: &ClientFieldPatch,
    ) -> Result<Option<Client>, ClientRepositoryError>;

    /// Rewrites the summary card and the primary contact number together.
    async fn update_summary(
        &self,
        owner: MemberId,
        id: ClientId,
        update: &SummaryUpdate,
    ) -> Result<Option<ClientSummary>, ClientRepositoryError>;

    /// Deletes a client and everything hanging off it. Returns whether a
    /// row was removed.
    async fn delete(&self, owner: MemberId, id: ClientId) -> Result<bool, ClientRepositoryError>;

    /// Attaches a further contact number to a client.
    async fn add_contact(
        &self,
        owner: MemberId,
        client: ClientId,
        number: &str,
    ) -> Result<Option<ContactDetail>, ClientRepositoryError>;

    /// Replaces the number on one existing contact.
    async fn update_contact(
        &self,
        owner: MemberId,
        client: ClientId,
        contact: ContactDetailId,
        number: &str,
    ) -> Result<Option<ContactDetail>, ClientRepositoryError>;

    /// Removes a contact unless it is the client's last one.
    async fn remove_contact(
        &self,
        owner: MemberId,
        client: ClientId,
        contact: ContactDetailId,
    ) -> Result<ContactRemoval, ClientRepositoryError>;

    /// Writes one field (or the coordinate pair) of the client's address.
    async fn update_address(
        &self,
        owner: MemberId,
        client: ClientId,
        update: &AddressFieldUpdate,
    ) -> Result<Option<ClientAddress>, ClientRepositoryError>;

    /// Records a meeting at `date`; notes start empty.
    async fn add_meeting(
        &self,
        owner: MemberId,
        client: ClientId,
        date: DateTime<Utc>,
    ) -> Result<Option<ClientMeeting>, ClientRepositoryError>;

    /// Merges the provided fields of `patch` into one meeting.
    async fn update_meeting(
        &self,
        owner: MemberId,
        client: ClientId,
        meeting: MeetingId,
        patch: &MeetingPatch,
    ) -> Result<Option<ClientMeeting>, ClientRepositoryError>;

    /// Deletes one meeting. Returns whether a row was removed.
    async fn remove_meeting(
        &self,
        owner: MemberId,
        client: ClientId,
        meeting: MeetingId,
    ) -> Result<bool, ClientRepositoryError>;
}

/// Inert repository for tests that wire the port without touching it.
///
/// `create` echoes the submitted client back as a freshly stored aggregate;
/// every lookup reports an empty book.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureClientRepository;

#[async_trait]
impl ClientRepository for FixtureClientRepository {
    async fn create(
        &self,
        owner: MemberId,
        client: &NewClient,
    ) -> Result<ClientAggregate, ClientRepositoryError> {
        let id = ClientId(1);
        let now = Utc::now();
        Ok(ClientAggregate {
            client: Client {
                id,
                owner_id: owner,
                name: client.name().to_owned(),
                description: client.description().to_owned(),
                company: client.company().to_owned(),
                status: client.status(),
                remarks: client.remarks().to_owned(),
                behaviour: client.behaviour(),
                deal_value: client.deal_value(),
                deal_status: DealStatus::InProgress,
                field_visits: 1,
                detailed_remarks: String::new(),
                created_at: now,
                updated_at: now,
            },
            contacts: vec![ContactDetail {
                id: ContactDetailId(1),
                client_id: id,
                number: client.number().to_owned(),
            }],
            address: Some(ClientAddress {
                client_id: id,
                door_number: String::new(),
                street_address: String::new(),
                lat: None,
                lng: None,
            }),
            meetings: Vec::new(),
        })
    }

    async fn find_aggregate(
        &self,
        _owner: MemberId,
        _id: ClientId,
    ) -> Result<Option<ClientAggregate>, ClientRepositoryError> {
        Ok(None)
    }

    async fn list_summaries(
        &self,
        _owner: MemberId,
    ) -> Result<Vec<ClientSummary>, ClientRepositoryError> {
        Ok(Vec::new())
    }

    async fn update_fields(
        &self,
        _owner: MemberId,
        _id: ClientId,
        _patch: &ClientFieldPatch,
    ) -> Result<Option<Client>, ClientRepositoryError> {
        Ok(None)
    }

    async fn update_summary(
        &self,
        _owner: MemberId,
        _id: ClientId,
        _update: &SummaryUpdate,
    ) -> Result<Option<ClientSummary>, ClientRepositoryError> {
        Ok(None)
    }

    async fn delete(&self, _owner: MemberId, _id: ClientId) -> Result<bool, ClientRepositoryError> {
        Ok(false)
    }

    async fn add_contact(
        &self,
        _owner: MemberId,
        _client: ClientId,
        _number: &str,
    ) -> Result<Option<ContactDetail>, ClientRepositoryError> {
        Ok(None)
    }

    async fn update_contact(
        &self,
        _owner: MemberId,
        _client: ClientId,
        _contact: ContactDetailId,
        _number: &str,
    ) -> Result<Option<ContactDetail>, ClientRepositoryError> {
        Ok(None)
    }

    async fn remove_contact(
        &self,
        _owner: MemberId,
        _client: ClientId,
        _contact: ContactDetailId,
    ) -> Result<ContactRemoval, ClientRepositoryError> {
        Ok(ContactRemoval::Missing)
    }

    async fn update_address(
        &self,
        _owner: MemberId,
        _client: ClientId,
        _update: &AddressFieldUpdate,
    ) -> Result<Option<ClientAddress>, ClientRepositoryError> {
        Ok(None)
    }

    async fn add_meeting(
        &self,
        _owner: MemberId,
        _client: ClientId,
        _date: DateTime<Utc>,
    ) -> Result<Option<ClientMeeting>, ClientRepositoryError> {
        Ok(None)
    }

    async fn update_meeting(
        &self,
        _owner: MemberId,
        _client: ClientId,
        _meeting: MeetingId,
        _patch: &MeetingPatch,
    ) -> Result<Option<ClientMeeting>, ClientRepositoryError> {
        Ok(None)
    }

    async fn remove_meeting(
        &self,
        _owner: MemberId,
        _client: ClientId,
        _meeting: MeetingId,
    ) -> Result<bool, ClientRepositoryError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::client::NewClientFields;

    fn sample_client() -> NewClient {
        NewClient::new(NewClientFields {
            name: "Nadia Okafor",
            description: "Warehouse automation buyer",
            company: "Okafor Logistics",
            number: "07700900123",
            status: crate::domain::client::ClientStatus::Active,
            behaviour: crate::domain::client::Behaviour::Professional,
            deal_value: 250_000,
            remarks: "Met at expo",
        })
        .unwrap()
    }

    #[tokio::test]
    async fn fixture_create_seeds_the_aggregate() {
        let repo = FixtureClientRepository;
        let stored = repo.create(MemberId(7), &sample_client()).await.unwrap();
        assert_eq!(stored.client.owner_id, MemberId(7));
        assert_eq!(stored.client.field_visits, 1);
        assert_eq!(stored.client.deal_status, DealStatus::InProgress);
        assert_eq!(stored.contacts.len(), 1);
        assert_eq!(stored.contacts[0].number, "07700900123");
        let address = stored.address.expect("blank address row");
        assert!(address.door_number.is_empty());
        assert_eq!(address.lat, None);
        assert!(stored.meetings.is_empty());
    }

    #[tokio::test]
    async fn fixture_lookups_report_an_empty_book() {
        let repo = FixtureClientRepository;
        assert!(repo.list_summaries(MemberId(7)).await.unwrap().is_empty());
        assert!(
            repo.find_aggregate(MemberId(7), ClientId(1))
                .await
                .unwrap()
                .is_none()
        );
        assert!(!repo.delete(MemberId(7), ClientId(1)).await.unwrap());
        assert_eq!(
            repo.remove_contact(MemberId(7), ClientId(1), ContactDetailId(1))
                .await
                .unwrap(),
            ContactRemoval::Missing
        );
    }

    #[test]
    fn error_constructors_build_the_matching_variant() {
        assert_eq!(
            ClientRepositoryError::connection("refused"),
            ClientRepositoryError::Connection {
                message: "refused".into()
            }
        );
        assert_eq!(
            ClientRepositoryError::query("syntax").to_string(),
            "client store query failed: syntax"
        );
    }
}
