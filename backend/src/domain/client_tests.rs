//! Regression coverage for client aggregate types and encodings.

use rstest::rstest;
use serde_json::json;

use super::*;

#[rstest]
#[case(0, ClientStatus::Inactive)]
#[case(1, ClientStatus::Pending)]
#[case(2, ClientStatus::Active)]
#[case(3, ClientStatus::Pending)]
#[case(-1, ClientStatus::Pending)]
#[case(99, ClientStatus::Pending)]
fn unknown_status_codes_read_as_pending(#[case] code: i32, #[case] expected: ClientStatus) {
    assert_eq!(ClientStatus::from_code(code), expected);
}

#[test]
fn known_status_codes_round_trip() {
    for status in [
        ClientStatus::Inactive,
        ClientStatus::Pending,
        ClientStatus::Active,
    ] {
        assert_eq!(ClientStatus::from_code(status.code()), status);
    }
}

#[rstest]
#[case(Behaviour::Cool, "cool")]
#[case(Behaviour::HotHeaded, "hot-headed")]
#[case(Behaviour::Professional, "professional")]
#[case(Behaviour::Indecisive, "indecisive")]
fn behaviour_text_round_trips(#[case] behaviour: Behaviour, #[case] text: &str) {
    assert_eq!(behaviour.as_str(), text);
    assert_eq!(Behaviour::parse(text), Some(behaviour));
    assert_eq!(serde_json::to_value(behaviour).expect("serialise"), json!(text));
}

#[rstest]
#[case("HotHeaded")]
#[case("calm")]
#[case("")]
fn unknown_behaviour_text_is_rejected(#[case] text: &str) {
    assert_eq!(Behaviour::parse(text), None);
}

#[rstest]
#[case(DealStatus::Accepted, "Accepted")]
#[case(DealStatus::Completed, "Completed")]
#[case(DealStatus::InProgress, "In-Progress")]
#[case(DealStatus::Rejected, "Rejected")]
fn deal_status_text_round_trips(#[case] status: DealStatus, #[case] text: &str) {
    assert_eq!(status.as_str(), text);
    assert_eq!(DealStatus::parse(text), Some(status));
    assert_eq!(serde_json::to_value(status).expect("serialise"), json!(text));
}

fn fields() -> NewClientFields<'static> {
    NewClientFields {
        name: "Acme Corp Lead",
        description: "walk-in",
        company: "Acme",
        number: "+910000000001",
        status: ClientStatus::Active,
        behaviour: Behaviour::Professional,
        deal_value: 250_000,
        remarks: "",
    }
}

#[test]
fn new_client_accepts_valid_fields() {
    let client = NewClient::new(fields()).expect("valid payload");
    assert_eq!(client.name(), "Acme Corp Lead");
    assert_eq!(client.number(), "+910000000001");
    assert_eq!(client.deal_value(), 250_000);
}

#[test]
fn new_client_trims_name_and_number() {
    let client = NewClient::new(NewClientFields {
        name: "  Acme Corp Lead  ",
        number: " +910000000001 ",
        ..fields()
    })
    .expect("valid payload");
    assert_eq!(client.name(), "Acme Corp Lead");
    assert_eq!(client.number(), "+910000000001");
}

#[rstest]
#[case(NewClientFields { name: "  ", ..fields() }, ClientValidationError::EmptyName)]
#[case(NewClientFields { company: "", ..fields() }, ClientValidationError::EmptyCompany)]
#[case(NewClientFields { number: "", ..fields() }, ClientValidationError::EmptyNumber)]
#[case(
    NewClientFields { number: "+91000000000000000000001", ..fields() },
    ClientValidationError::NumberTooLong
)]
#[case(NewClientFields { deal_value: -1, ..fields() }, ClientValidationError::NegativeDealValue)]
fn new_client_rejects_invalid_fields(
    #[case] raw: NewClientFields<'_>,
    #[case] expected: ClientValidationError,
) {
    assert_eq!(NewClient::new(raw).expect_err("must fail"), expected);
}

#[test]
fn field_patch_reports_emptiness() {
    assert!(ClientFieldPatch::default().is_empty());
    let patch = ClientFieldPatch {
        deal_status: Some(DealStatus::Accepted),
        ..ClientFieldPatch::default()
    };
    assert!(!patch.is_empty());
}

#[rstest]
#[case(
    ClientFieldPatch { name: Some("  ".into()), ..ClientFieldPatch::default() },
    ClientValidationError::EmptyName
)]
#[case(
    ClientFieldPatch { deal_value: Some(-5), ..ClientFieldPatch::default() },
    ClientValidationError::NegativeDealValue
)]
#[case(
    ClientFieldPatch { field_visits: Some(-1), ..ClientFieldPatch::default() },
    ClientValidationError::NegativeFieldVisits
)]
fn field_patch_validates_populated_fields(
    #[case] patch: ClientFieldPatch,
    #[case] expected: ClientValidationError,
) {
    assert_eq!(patch.validate().expect_err("must fail"), expected);
}

#[test]
fn field_patch_with_no_fields_validates() {
    assert_eq!(ClientFieldPatch::default().validate(), Ok(()));
}

#[test]
fn summary_update_requires_name_company_and_number() {
    let err = SummaryUpdate::new("", "Acme", ClientStatus::Active, "", "+911234567890")
        .expect_err("empty name must fail");
    assert_eq!(err, ClientValidationError::EmptyName);

    let update = SummaryUpdate::new(
        "Acme Corp Lead",
        "Acme",
        ClientStatus::Pending,
        "call back",
        "+911234567890",
    )
    .expect("valid update");
    assert_eq!(update.number(), "+911234567890");
    assert_eq!(update.status(), ClientStatus::Pending);
}

#[test]
fn address_updates_carry_their_field_in_the_tag() {
    let door = serde_json::to_value(AddressFieldUpdate::DoorNumber {
        value: "12B".into(),
    })
    .expect("serialise");
    assert_eq!(door.get("field"), Some(&json!("doorNumber")));

    let decoded: AddressFieldUpdate =
        serde_json::from_value(json!({ "field": "coordinates", "lat": 12.97, "lng": 77.59 }))
            .expect("decode coordinates");
    assert_eq!(
        decoded,
        AddressFieldUpdate::Coordinates {
            lat: 12.97,
            lng: 77.59
        }
    );
}

#[test]
fn unknown_address_field_tags_are_rejected() {
    let decoded = serde_json::from_value::<AddressFieldUpdate>(
        json!({ "field": "landmark", "value": "opposite the park" }),
    );
    assert!(decoded.is_err());
}

#[test]
fn meeting_patch_reports_emptiness() {
    assert!(MeetingPatch::default().is_empty());
    let patch = MeetingPatch {
        notes: Some("bring the updated quote".into()),
        ..MeetingPatch::default()
    };
    assert!(!patch.is_empty());
}
