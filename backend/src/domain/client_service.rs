//! Application service managing the client aggregate.
//!
//! All operations act on behalf of one owning salesperson; the owner id
//! comes from the verified session, never from the request body. Records
//! another member owns are reported as missing rather than forbidden, so
//! the API does not leak which ids exist.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::client::{
    AddressFieldUpdate, Client, ClientAddress, ClientAggregate, ClientFieldPatch, ClientId,
    ClientMeeting, ClientSummary, ClientValidationError, ContactDetail, ContactDetailId,
    MeetingId, MeetingPatch, NewClient, SummaryUpdate, validate_contact_number,
};
use crate::domain::error::Error;
use crate::domain::member::MemberId;
use crate::domain::ports::{ClientRepository, ClientRepositoryError, ContactRemoval};

const CLIENT_NOT_FOUND: &str = "client not found";
const CONTACT_NOT_FOUND: &str = "contact number not found";
const ADDRESS_NOT_FOUND: &str = "client address not found";
const MEETING_NOT_FOUND: &str = "meeting not found";
const EMPTY_PATCH: &str = "no fields to update";
const LAST_CONTACT: &str = "a client must keep at least one contact number";

/// Coordinates the client aggregate behind [`ClientRepository`].
#[derive(Clone)]
pub struct ClientService {
    repo: Arc<dyn ClientRepository>,
}

impl ClientService {
    /// Builds the service over a repository implementation.
    #[must_use]
    pub fn new(repo: Arc<dyn ClientRepository>) -> Self {
        Self { repo }
    }

    /// Creates a client with its first contact and a blank address.
    ///
    /// # Errors
    /// Returns a storage error when the repository fails; the payload is
    /// already validated by [`NewClient::new`].
    pub async fn create(
        &self,
        owner: MemberId,
        client: &NewClient,
    ) -> Result<ClientAggregate, Error> {
        self.repo
            .create(owner, client)
            .await
            .map_err(storage_error)
    }

    /// Loads one client with contacts, address, and meetings.
    pub async fn get(&self, owner: MemberId, id: ClientId) -> Result<ClientAggregate, Error> {
        self.repo
            .find_aggregate(owner, id)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| Error::not_found(CLIENT_NOT_FOUND))
    }

    /// Lists summary cards for the owner's whole book.
    pub async fn list(&self, owner: MemberId) -> Result<Vec<ClientSummary>, Error> {
        self.repo.list_summaries(owner).await.map_err(storage_error)
    }

    /// Applies a partial update to one client's editable fields.
    ///
    /// # Errors
    /// Rejects an empty patch and invalid field values as
    /// `invalid_request` before touching storage.
    pub async fn update_fields(
        &self,
        owner: MemberId,
        id: ClientId,
        patch: &ClientFieldPatch,
    ) -> Result<Client, Error> {
        if patch.is_empty() {
            return Err(Error::invalid_request(EMPTY_PATCH));
        }
        patch.validate().map_err(invalid)?;
        self.repo
            .update_fields(owner, id, patch)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| Error::not_found(CLIENT_NOT_FOUND))
    }

    /// Rewrites the summary card and primary contact number together.
    pub async fn update_summary(
        &self,
        owner: MemberId,
        id: ClientId,
        update: &SummaryUpdate,
    ) -> Result<ClientSummary, Error> {
        self.repo
            .update_summary(owner, id, update)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| Error::not_found(CLIENT_NOT_FOUND))
    }

    /// Deletes a client and everything hanging off it.
    pub async fn delete(&self, owner: MemberId, id: ClientId) -> Result<(), Error> {
        let removed = self.repo.delete(owner, id).await.map_err(storage_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found(CLIENT_NOT_FOUND))
        }
    }

    /// Attaches a further contact number to a client.
    pub async fn add_contact(
        &self,
        owner: MemberId,
        client: ClientId,
        number: &str,
    ) -> Result<ContactDetail, Error> {
        let number = validate_contact_number(number).map_err(invalid)?;
        self.repo
            .add_contact(owner, client, &number)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| Error::not_found(CLIENT_NOT_FOUND))
    }

    /// Replaces the number on one existing contact.
    pub async fn update_contact(
        &self,
        owner: MemberId,
        client: ClientId,
        contact: ContactDetailId,
        number: &str,
    ) -> Result<ContactDetail, Error> {
        let number = validate_contact_number(number).map_err(invalid)?;
        self.repo
            .update_contact(owner, client, contact, &number)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| Error::not_found(CONTACT_NOT_FOUND))
    }

    /// Removes a contact number.
    ///
    /// # Errors
    /// Returns `conflict` when the contact is the client's last one; the
    /// guard runs inside the repository transaction.
    pub async fn remove_contact(
        &self,
        owner: MemberId,
        client: ClientId,
        contact: ContactDetailId,
    ) -> Result<(), Error> {
        match self
            .repo
            .remove_contact(owner, client, contact)
            .await
            .map_err(storage_error)?
        {
            ContactRemoval::Removed => Ok(()),
            ContactRemoval::LastContact => Err(Error::conflict(LAST_CONTACT)),
            ContactRemoval::Missing => Err(Error::not_found(CONTACT_NOT_FOUND)),
        }
    }

    /// Writes one address field, or the coordinate pair as a unit.
    pub async fn update_address(
        &self,
        owner: MemberId,
        client: ClientId,
        update: &AddressFieldUpdate,
    ) -> Result<ClientAddress, Error> {
        if let AddressFieldUpdate::Coordinates { lat, lng } = update {
            validate_coordinates(*lat, *lng)?;
        }
        self.repo
            .update_address(owner, client, update)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| Error::not_found(ADDRESS_NOT_FOUND))
    }

    /// Records a meeting at `date`; notes start empty.
    pub async fn add_meeting(
        &self,
        owner: MemberId,
        client: ClientId,
        date: DateTime<Utc>,
    ) -> Result<ClientMeeting, Error> {
        self.repo
            .add_meeting(owner, client, date)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| Error::not_found(CLIENT_NOT_FOUND))
    }

    /// Merges a partial update into one meeting, last write per field.
    pub async fn update_meeting(
        &self,
        owner: MemberId,
        client: ClientId,
        meeting: MeetingId,
        patch: &MeetingPatch,
    ) -> Result<ClientMeeting, Error> {
        if patch.is_empty() {
            return Err(Error::invalid_request(EMPTY_PATCH));
        }
        self.repo
            .update_meeting(owner, client, meeting, patch)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| Error::not_found(MEETING_NOT_FOUND))
    }

    /// Deletes one meeting.
    pub async fn remove_meeting(
        &self,
        owner: MemberId,
        client: ClientId,
        meeting: MeetingId,
    ) -> Result<(), Error> {
        let removed = self
            .repo
            .remove_meeting(owner, client, meeting)
            .await
            .map_err(storage_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found(MEETING_NOT_FOUND))
        }
    }
}

fn invalid(err: ClientValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

fn validate_coordinates(lat: f64, lng: f64) -> Result<(), Error> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(Error::invalid_request("latitude must be within -90 and 90"));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(Error::invalid_request(
            "longitude must be within -180 and 180",
        ));
    }
    Ok(())
}

fn storage_error(err: ClientRepositoryError) -> Error {
    tracing::error!(error = %err, "client repository failure");
    match err {
        ClientRepositoryError::Connection { .. } => {
            Error::service_unavailable("client records are temporarily unavailable")
        }
        ClientRepositoryError::Query { .. } => Error::internal("client record access failed"),
    }
}

#[cfg(test)]
#[path = "client_service_tests.rs"]
mod tests;
