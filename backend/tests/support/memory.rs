//! Stateful in-memory port implementations for end-to-end journeys.
//!
//! Unlike the fixture ports, these keep what they are given, so a suite can
//! create a record through one endpoint and read it back through another.
//! They honour the same contracts the Diesel adapters do: owner scoping on
//! every client lookup, the last-contact guard, unique usernames, and
//! meetings sorted by date.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crm_backend::domain::client::{
    AddressFieldUpdate, Client, ClientAddress, ClientAggregate, ClientFieldPatch, ClientId,
    ClientMeeting, ClientSummary, ContactDetail, ContactDetailId, DealStatus, MeetingId,
    MeetingPatch, NewClient, SummaryUpdate,
};
use crm_backend::domain::member::{
    Member, MemberId, MemberProfile, MemberUpdate, NewMember, Team, TeamId, TeamRoster,
};
use crm_backend::domain::ports::{
    ClientRepository, ClientRepositoryError, ContactRemoval, MemberRepository,
    MemberRepositoryError,
};

// -----------------------------------------------------------------------------
// Client book
// -----------------------------------------------------------------------------

struct BookState {
    aggregates: Vec<ClientAggregate>,
    next_client: i32,
    next_contact: i32,
    next_meeting: i32,
}

/// Client store holding aggregates in memory.
pub struct InMemoryClientStore {
    inner: Mutex<BookState>,
}

impl InMemoryClientStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(BookState {
                aggregates: Vec::new(),
                next_client: 1,
                next_contact: 1,
                next_meeting: 1,
            }),
        }
    }
}

impl Default for InMemoryClientStore {
    fn default() -> Self {
        Self::new()
    }
}

fn find_owned<'a>(
    state: &'a mut BookState,
    owner: MemberId,
    id: ClientId,
) -> Option<&'a mut ClientAggregate> {
    state
        .aggregates
        .iter_mut()
        .find(|aggregate| aggregate.client.id == id && aggregate.client.owner_id == owner)
}

fn summary_of(aggregate: &ClientAggregate) -> ClientSummary {
    ClientSummary {
        id: aggregate.client.id,
        name: aggregate.client.name.clone(),
        primary_number: aggregate
            .contacts
            .first()
            .map(|contact| contact.number.clone())
            .unwrap_or_default(),
        company: aggregate.client.company.clone(),
        status: aggregate.client.status,
        remarks: aggregate.client.remarks.clone(),
    }
}

#[async_trait]
impl ClientRepository for InMemoryClientStore {
    async fn create(
        &self,
        owner: MemberId,
        client: &NewClient,
    ) -> Result<ClientAggregate, ClientRepositoryError> {
        let mut state = self.inner.lock().expect("client store lock");
        let id = ClientId(state.next_client);
        state.next_client += 1;
        let contact_id = ContactDetailId(state.next_contact);
        state.next_contact += 1;
        let now = Utc::now();
        let aggregate = ClientAggregate {
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
                id: contact_id,
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
        };
        state.aggregates.push(aggregate.clone());
        Ok(aggregate)
    }

    async fn find_aggregate(
        &self,
        owner: MemberId,
        id: ClientId,
    ) -> Result<Option<ClientAggregate>, ClientRepositoryError> {
        let state = self.inner.lock().expect("client store lock");
        Ok(state
            .aggregates
            .iter()
            .find(|aggregate| aggregate.client.id == id && aggregate.client.owner_id == owner)
            .cloned())
    }

    async fn list_summaries(
        &self,
        owner: MemberId,
    ) -> Result<Vec<ClientSummary>, ClientRepositoryError> {
        let state = self.inner.lock().expect("client store lock");
        Ok(state
            .aggregates
            .iter()
            .filter(|aggregate| aggregate.client.owner_id == owner)
            .map(summary_of)
            .collect())
    }

    async fn update_fields(
        &self,
        owner: MemberId,
        id: ClientId,
        patch: &ClientFieldPatch,
    ) -> Result<Option<Client>, ClientRepositoryError> {
        let mut state = self.inner.lock().expect("client store lock");
        let Some(aggregate) = find_owned(&mut state, owner, id) else {
            return Ok(None);
        };
        let client = &mut aggregate.client;
        if let Some(name) = &patch.name {
            client.name = name.clone();
        }
        if let Some(description) = &patch.description {
            client.description = description.clone();
        }
        if let Some(company) = &patch.company {
            client.company = company.clone();
        }
        if let Some(status) = patch.status {
            client.status = status;
        }
        if let Some(remarks) = &patch.remarks {
            client.remarks = remarks.clone();
        }
        if let Some(behaviour) = patch.behaviour {
            client.behaviour = behaviour;
        }
        if let Some(deal_value) = patch.deal_value {
            client.deal_value = deal_value;
        }
        if let Some(deal_status) = patch.deal_status {
            client.deal_status = deal_status;
        }
        if let Some(field_visits) = patch.field_visits {
            client.field_visits = field_visits;
        }
        if let Some(detailed_remarks) = &patch.detailed_remarks {
            client.detailed_remarks = detailed_remarks.clone();
        }
        client.updated_at = Utc::now();
        Ok(Some(client.clone()))
    }

    async fn update_summary(
        &self,
        owner: MemberId,
        id: ClientId,
        update: &SummaryUpdate,
    ) -> Result<Option<ClientSummary>, ClientRepositoryError> {
        let mut state = self.inner.lock().expect("client store lock");
        let next_contact = state.next_contact;
        let Some(aggregate) = find_owned(&mut state, owner, id) else {
            return Ok(None);
        };
        aggregate.client.name = update.name().to_owned();
        aggregate.client.company = update.company().to_owned();
        aggregate.client.status = update.status();
        aggregate.client.remarks = update.remarks().to_owned();
        aggregate.client.updated_at = Utc::now();
        let mut minted = false;
        match aggregate.contacts.first_mut() {
            Some(primary) => primary.number = update.number().to_owned(),
            None => {
                aggregate.contacts.push(ContactDetail {
                    id: ContactDetailId(next_contact),
                    client_id: id,
                    number: update.number().to_owned(),
                });
                minted = true;
            }
        }
        let summary = summary_of(aggregate);
        if minted {
            state.next_contact += 1;
        }
        Ok(Some(summary))
    }

    async fn delete(&self, owner: MemberId, id: ClientId) -> Result<bool, ClientRepositoryError> {
        let mut state = self.inner.lock().expect("client store lock");
        let before = state.aggregates.len();
        state
            .aggregates
            .retain(|aggregate| !(aggregate.client.id == id && aggregate.client.owner_id == owner));
        Ok(state.aggregates.len() < before)
    }

    async fn add_contact(
        &self,
        owner: MemberId,
        client: ClientId,
        number: &str,
    ) -> Result<Option<ContactDetail>, ClientRepositoryError> {
        let mut state = self.inner.lock().expect("client store lock");
        let id = ContactDetailId(state.next_contact);
        let Some(aggregate) = find_owned(&mut state, owner, client) else {
            return Ok(None);
        };
        let contact = ContactDetail {
            id,
            client_id: client,
            number: number.to_owned(),
        };
        aggregate.contacts.push(contact.clone());
        state.next_contact += 1;
        Ok(Some(contact))
    }

    async fn update_contact(
        &self,
        owner: MemberId,
        client: ClientId,
        contact: ContactDetailId,
        number: &str,
    ) -> Result<Option<ContactDetail>, ClientRepositoryError> {
        let mut state = self.inner.lock().expect("client store lock");
        let Some(aggregate) = find_owned(&mut state, owner, client) else {
            return Ok(None);
        };
        let Some(stored) = aggregate.contacts.iter_mut().find(|c| c.id == contact) else {
            return Ok(None);
        };
        stored.number = number.to_owned();
        Ok(Some(stored.clone()))
    }

    async fn remove_contact(
        &self,
        owner: MemberId,
        client: ClientId,
        contact: ContactDetailId,
    ) -> Result<ContactRemoval, ClientRepositoryError> {
        let mut state = self.inner.lock().expect("client store lock");
        let Some(aggregate) = find_owned(&mut state, owner, client) else {
            return Ok(ContactRemoval::Missing);
        };
        if !aggregate.contacts.iter().any(|c| c.id == contact) {
            return Ok(ContactRemoval::Missing);
        }
        if aggregate.contacts.len() == 1 {
            return Ok(ContactRemoval::LastContact);
        }
        aggregate.contacts.retain(|c| c.id != contact);
        Ok(ContactRemoval::Removed)
    }

    async fn update_address(
        &self,
        owner: MemberId,
        client: ClientId,
        update: &AddressFieldUpdate,
    ) -> Result<Option<ClientAddress>, ClientRepositoryError> {
        let mut state = self.inner.lock().expect("client store lock");
        let Some(aggregate) = find_owned(&mut state, owner, client) else {
            return Ok(None);
        };
        let Some(address) = aggregate.address.as_mut() else {
            return Ok(None);
        };
        match update {
            AddressFieldUpdate::DoorNumber { value } => address.door_number = value.clone(),
            AddressFieldUpdate::StreetAddress { value } => address.street_address = value.clone(),
            AddressFieldUpdate::Coordinates { lat, lng } => {
                address.lat = Some(*lat);
                address.lng = Some(*lng);
            }
        }
        Ok(Some(address.clone()))
    }

    async fn add_meeting(
        &self,
        owner: MemberId,
        client: ClientId,
        date: DateTime<Utc>,
    ) -> Result<Option<ClientMeeting>, ClientRepositoryError> {
        let mut state = self.inner.lock().expect("client store lock");
        let id = MeetingId(state.next_meeting);
        let Some(aggregate) = find_owned(&mut state, owner, client) else {
            return Ok(None);
        };
        let meeting = ClientMeeting {
            id,
            client_id: client,
            date,
            notes: String::new(),
        };
        aggregate.meetings.push(meeting.clone());
        aggregate.meetings.sort_by_key(|m| m.date);
        state.next_meeting += 1;
        Ok(Some(meeting))
    }

    async fn update_meeting(
        &self,
        owner: MemberId,
        client: ClientId,
        meeting: MeetingId,
        patch: &MeetingPatch,
    ) -> Result<Option<ClientMeeting>, ClientRepositoryError> {
        let mut state = self.inner.lock().expect("client store lock");
        let Some(aggregate) = find_owned(&mut state, owner, client) else {
            return Ok(None);
        };
        let Some(stored) = aggregate.meetings.iter_mut().find(|m| m.id == meeting) else {
            return Ok(None);
        };
        if let Some(date) = patch.date {
            stored.date = date;
        }
        if let Some(notes) = &patch.notes {
            stored.notes = notes.clone();
        }
        let updated = stored.clone();
        aggregate.meetings.sort_by_key(|m| m.date);
        Ok(Some(updated))
    }

    async fn remove_meeting(
        &self,
        owner: MemberId,
        client: ClientId,
        meeting: MeetingId,
    ) -> Result<bool, ClientRepositoryError> {
        let mut state = self.inner.lock().expect("client store lock");
        let Some(aggregate) = find_owned(&mut state, owner, client) else {
            return Ok(false);
        };
        let before = aggregate.meetings.len();
        aggregate.meetings.retain(|m| m.id != meeting);
        Ok(aggregate.meetings.len() < before)
    }
}

// -----------------------------------------------------------------------------
// Member directory
// -----------------------------------------------------------------------------

struct DirectoryState {
    teams: Vec<Team>,
    members: Vec<Member>,
    next_member: i32,
}

/// Member directory holding rows in memory.
///
/// Seeded with the admin and sales teams the schema ships with. Passwords
/// are not retained; sign-in in these suites goes through the fixture
/// login service.
pub struct InMemoryMemberDirectory {
    inner: Mutex<DirectoryState>,
}

impl InMemoryMemberDirectory {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(DirectoryState {
                teams: vec![
                    Team {
                        id: TeamId(0),
                        name: "Admin".to_owned(),
                    },
                    Team {
                        id: TeamId(1),
                        name: "Sales".to_owned(),
                    },
                ],
                members: Vec::new(),
                next_member: 1,
            }),
        }
    }
}

impl Default for InMemoryMemberDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemberRepository for InMemoryMemberDirectory {
    async fn list_rosters(&self) -> Result<Vec<TeamRoster>, MemberRepositoryError> {
        let state = self.inner.lock().expect("directory lock");
        Ok(state
            .teams
            .iter()
            .map(|team| TeamRoster {
                team: team.clone(),
                members: state
                    .members
                    .iter()
                    .filter(|member| member.team_id == team.id)
                    .cloned()
                    .collect(),
            })
            .collect())
    }

    async fn find_profile(
        &self,
        id: MemberId,
    ) -> Result<Option<MemberProfile>, MemberRepositoryError> {
        let state = self.inner.lock().expect("directory lock");
        let Some(member) = state.members.iter().find(|member| member.id == id) else {
            return Ok(None);
        };
        let Some(team) = state.teams.iter().find(|team| team.id == member.team_id) else {
            return Ok(None);
        };
        Ok(Some(MemberProfile {
            member: member.clone(),
            team: team.clone(),
            clients: Vec::new(),
        }))
    }

    async fn create(&self, member: &NewMember) -> Result<Member, MemberRepositoryError> {
        let mut state = self.inner.lock().expect("directory lock");
        if state.members.iter().any(|m| m.username == member.username()) {
            return Err(MemberRepositoryError::duplicate_username(member.username()));
        }
        let now = Utc::now();
        let stored = Member {
            id: MemberId(state.next_member),
            username: member.username().to_owned(),
            firstname: member.firstname().to_owned(),
            lastname: member.lastname().to_owned(),
            number: member.number().to_owned(),
            team_id: member.team_id(),
            status: member.status(),
            created_at: now,
            updated_at: now,
        };
        state.next_member += 1;
        state.members.push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: MemberId,
        update: &MemberUpdate,
    ) -> Result<Option<Member>, MemberRepositoryError> {
        let mut state = self.inner.lock().expect("directory lock");
        if let Some(username) = &update.username {
            if state
                .members
                .iter()
                .any(|m| m.id != id && m.username == *username)
            {
                return Err(MemberRepositoryError::duplicate_username(username));
            }
        }
        let Some(member) = state.members.iter_mut().find(|member| member.id == id) else {
            return Ok(None);
        };
        if let Some(username) = &update.username {
            member.username = username.clone();
        }
        if let Some(firstname) = &update.firstname {
            member.firstname = firstname.clone();
        }
        if let Some(lastname) = &update.lastname {
            member.lastname = lastname.clone();
        }
        if let Some(team_id) = update.team_id {
            member.team_id = team_id;
        }
        if let Some(status) = update.status {
            member.status = status;
        }
        member.updated_at = Utc::now();
        Ok(Some(member.clone()))
    }

    async fn delete(&self, id: MemberId) -> Result<bool, MemberRepositoryError> {
        let mut state = self.inner.lock().expect("directory lock");
        let before = state.members.len();
        state.members.retain(|member| member.id != id);
        Ok(state.members.len() < before)
    }
}
