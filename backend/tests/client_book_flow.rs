//! End-to-end client book journeys over a stateful store.
//!
//! The handler suites pin each endpoint against mocked ports; these tests
//! instead walk one lead through its whole life, with the in-memory store
//! holding state between requests so each step observes the last.

// The shared harness exposes helpers other suites use.
#[allow(dead_code)]
#[path = "support/app.rs"]
mod app_support;
#[allow(dead_code)]
#[path = "support/memory.rs"]
mod memory_support;

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::{BoxBody, EitherBody};
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use crm_backend::domain::client::{Behaviour, ClientStatus, NewClient, NewClientFields};
use crm_backend::domain::member::MemberId;
use crm_backend::domain::ports::ClientRepository;
use crm_backend::inbound::http::state::HttpStatePorts;
use serde_json::{Value, json};

use crate::app_support::{expect_json, gate_app, sign_in_as};
use crate::memory_support::InMemoryClientStore;

fn book_ports(store: Arc<InMemoryClientStore>) -> HttpStatePorts {
    HttpStatePorts {
        clients: store,
        ..HttpStatePorts::default()
    }
}

fn lead_payload() -> Value {
    json!({
        "name": "Meera Pillai",
        "description": "Referred by the Hosur plant manager",
        "company": "Pillai Exports",
        "number": "+911234567890",
        "status": 2,
        "behaviour": "professional",
        "dealValue": 2500.0,
        "remarks": "Warm intro",
    })
}

async fn create_lead(
    app: &impl Service<
        Request,
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
    >,
    cookie: &Cookie<'static>,
) -> Value {
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/clients")
            .cookie(cookie.clone())
            .set_json(lead_payload())
            .to_request(),
    )
    .await;
    expect_json(res, StatusCode::CREATED).await
}

fn client_id_of(detail: &Value) -> i64 {
    detail
        .pointer("/client/id")
        .and_then(Value::as_i64)
        .expect("created client id")
}

#[actix_web::test]
async fn a_lead_is_created_read_and_updated_through_its_lifecycle() {
    let app = actix_test::init_service(gate_app(book_ports(Arc::new(
        InMemoryClientStore::new(),
    ))))
    .await;
    let cookie = sign_in_as(&app, "asmith", "user").await;

    let created = create_lead(&app, &cookie).await;
    let id = client_id_of(&created);
    // Intake rules: value in minor units, one visit, deal in progress.
    assert_eq!(created.pointer("/client/dealValue"), Some(&json!(250_000)));
    assert_eq!(
        created.pointer("/client/dealStatus").and_then(Value::as_str),
        Some("In-Progress")
    );
    assert_eq!(created.pointer("/client/fieldVisits"), Some(&json!(1)));
    assert_eq!(
        created.pointer("/contacts/0/number").and_then(Value::as_str),
        Some("+911234567890")
    );
    assert_eq!(
        created.pointer("/address/doorNumber").and_then(Value::as_str),
        Some("")
    );
    assert_eq!(created.pointer("/meetings"), Some(&json!([])));

    // The book lists the new lead with its primary number.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/clients")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let book = expect_json(res, StatusCode::OK).await;
    assert_eq!(book.pointer("/clients/0/id"), Some(&json!(id)));
    assert_eq!(
        book.pointer("/clients/0/number").and_then(Value::as_str),
        Some("+911234567890")
    );

    // A partial update touches only the named fields.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/clients/{id}"))
            .cookie(cookie.clone())
            .set_json(json!({ "dealStatus": "Accepted", "fieldVisits": 3 }))
            .to_request(),
    )
    .await;
    let updated = expect_json(res, StatusCode::OK).await;
    assert_eq!(
        updated.get("dealStatus").and_then(Value::as_str),
        Some("Accepted")
    );
    assert_eq!(updated.get("fieldVisits"), Some(&json!(3)));
    assert_eq!(
        updated.get("name").and_then(Value::as_str),
        Some("Meera Pillai")
    );

    // The row edit rewrites the summary card and the primary number.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/clients/{id}/summary"))
            .cookie(cookie.clone())
            .set_json(json!({
                "name": "Meera Pillai",
                "company": "Pillai Exports Ltd",
                "status": 1,
                "remarks": "Negotiating",
                "number": "+911098765432",
            }))
            .to_request(),
    )
    .await;
    let summary = expect_json(res, StatusCode::OK).await;
    assert_eq!(
        summary.get("company").and_then(Value::as_str),
        Some("Pillai Exports Ltd")
    );
    assert_eq!(
        summary.get("number").and_then(Value::as_str),
        Some("+911098765432")
    );

    // The detail view reflects the rewrite.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/clients/{id}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let detail = expect_json(res, StatusCode::OK).await;
    assert_eq!(
        detail.pointer("/contacts/0/number").and_then(Value::as_str),
        Some("+911098765432")
    );
    assert_eq!(detail.pointer("/client/status"), Some(&json!(1)));
    assert_eq!(
        detail.pointer("/client/dealStatus").and_then(Value::as_str),
        Some("Accepted"),
        "the summary rewrite leaves detail fields alone"
    );

    // Deletion empties the book.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/clients/{id}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/clients/{id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    let gone = expect_json(res, StatusCode::NOT_FOUND).await;
    assert_eq!(gone.get("code").and_then(Value::as_str), Some("not_found"));
}

#[actix_web::test]
async fn contact_numbers_grow_and_shrink_but_never_reach_zero() {
    let app = actix_test::init_service(gate_app(book_ports(Arc::new(
        InMemoryClientStore::new(),
    ))))
    .await;
    let cookie = sign_in_as(&app, "asmith", "user").await;

    let created = create_lead(&app, &cookie).await;
    let id = client_id_of(&created);
    let first_contact = created
        .pointer("/contacts/0/id")
        .and_then(Value::as_i64)
        .expect("first contact id");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/clients/{id}/contacts"))
            .cookie(cookie.clone())
            .set_json(json!({ "number": "+919999888877" }))
            .to_request(),
    )
    .await;
    let second = expect_json(res, StatusCode::CREATED).await;
    let second_contact = second.get("id").and_then(Value::as_i64).expect("contact id");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/clients/{id}/contacts/{second_contact}"))
            .cookie(cookie.clone())
            .set_json(json!({ "number": "+918888777766" }))
            .to_request(),
    )
    .await;
    let renumbered = expect_json(res, StatusCode::OK).await;
    assert_eq!(
        renumbered.get("number").and_then(Value::as_str),
        Some("+918888777766")
    );

    // With two contacts the first can go.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/clients/{id}/contacts/{first_contact}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    // The survivor is pinned in place.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/clients/{id}/contacts/{second_contact}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let refused = expect_json(res, StatusCode::CONFLICT).await;
    assert_eq!(refused.get("code").and_then(Value::as_str), Some("conflict"));
    assert_eq!(
        refused.get("message").and_then(Value::as_str),
        Some("a client must keep at least one contact number")
    );

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/clients/{id}/contacts/999"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn the_address_is_edited_field_by_field() {
    let app = actix_test::init_service(gate_app(book_ports(Arc::new(
        InMemoryClientStore::new(),
    ))))
    .await;
    let cookie = sign_in_as(&app, "asmith", "user").await;
    let id = client_id_of(&create_lead(&app, &cookie).await);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/clients/{id}/address"))
            .cookie(cookie.clone())
            .set_json(json!({ "field": "doorNumber", "value": "42A" }))
            .to_request(),
    )
    .await;
    let address = expect_json(res, StatusCode::OK).await;
    assert_eq!(address.get("doorNumber").and_then(Value::as_str), Some("42A"));
    assert_eq!(address.get("streetAddress").and_then(Value::as_str), Some(""));

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/clients/{id}/address"))
            .cookie(cookie.clone())
            .set_json(json!({ "field": "streetAddress", "value": "MG Road, Bengaluru" }))
            .to_request(),
    )
    .await;
    let address = expect_json(res, StatusCode::OK).await;
    assert_eq!(
        address.get("doorNumber").and_then(Value::as_str),
        Some("42A"),
        "earlier fields survive later single-field writes"
    );

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/clients/{id}/address"))
            .cookie(cookie.clone())
            .set_json(json!({ "field": "coordinates", "lat": 12.9716, "lng": 77.5946 }))
            .to_request(),
    )
    .await;
    let address = expect_json(res, StatusCode::OK).await;
    assert_eq!(address.get("lat"), Some(&json!(12.9716)));
    assert_eq!(address.get("lng"), Some(&json!(77.5946)));

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/clients/{id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    let detail = expect_json(res, StatusCode::OK).await;
    assert_eq!(
        detail.pointer("/address").cloned().expect("address present"),
        json!({
            "doorNumber": "42A",
            "streetAddress": "MG Road, Bengaluru",
            "lat": 12.9716,
            "lng": 77.5946,
        })
    );
}

#[actix_web::test]
async fn meetings_are_scheduled_amended_and_cancelled() {
    let app = actix_test::init_service(gate_app(book_ports(Arc::new(
        InMemoryClientStore::new(),
    ))))
    .await;
    let cookie = sign_in_as(&app, "asmith", "user").await;
    let id = client_id_of(&create_lead(&app, &cookie).await);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/clients/{id}/meetings"))
            .cookie(cookie.clone())
            .set_json(json!({ "date": "2026-09-10T10:30:00Z" }))
            .to_request(),
    )
    .await;
    let meeting = expect_json(res, StatusCode::CREATED).await;
    let meeting_id = meeting.get("id").and_then(Value::as_i64).expect("meeting id");
    assert_eq!(meeting.get("notes").and_then(Value::as_str), Some(""));
    assert_eq!(
        meeting.get("date").and_then(Value::as_str),
        Some("2026-09-10T10:30:00+00:00")
    );

    // Notes arrive later without disturbing the date.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/clients/{id}/meetings/{meeting_id}"))
            .cookie(cookie.clone())
            .set_json(json!({ "notes": "Bring the revised quote" }))
            .to_request(),
    )
    .await;
    let noted = expect_json(res, StatusCode::OK).await;
    assert_eq!(
        noted.get("date").and_then(Value::as_str),
        Some("2026-09-10T10:30:00+00:00")
    );
    assert_eq!(
        noted.get("notes").and_then(Value::as_str),
        Some("Bring the revised quote")
    );

    // A reschedule normalises the offset and keeps the notes.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/clients/{id}/meetings/{meeting_id}"))
            .cookie(cookie.clone())
            .set_json(json!({ "date": "2026-09-12T09:00:00+05:30" }))
            .to_request(),
    )
    .await;
    let moved = expect_json(res, StatusCode::OK).await;
    assert_eq!(
        moved.get("date").and_then(Value::as_str),
        Some("2026-09-12T03:30:00+00:00")
    );
    assert_eq!(
        moved.get("notes").and_then(Value::as_str),
        Some("Bring the revised quote")
    );

    // An earlier meeting sorts ahead of it in the aggregate.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/clients/{id}/meetings"))
            .cookie(cookie.clone())
            .set_json(json!({ "date": "2026-09-01T08:00:00Z" }))
            .to_request(),
    )
    .await;
    let earlier = expect_json(res, StatusCode::CREATED).await;
    let earlier_id = earlier.get("id").and_then(Value::as_i64).expect("meeting id");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/clients/{id}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let detail = expect_json(res, StatusCode::OK).await;
    assert_eq!(detail.pointer("/meetings/0/id"), Some(&json!(earlier_id)));
    assert_eq!(detail.pointer("/meetings/1/id"), Some(&json!(meeting_id)));

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/clients/{id}/meetings/{meeting_id}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/clients/{id}/meetings/{meeting_id}"))
            .cookie(cookie)
            .set_json(json!({ "notes": "stale" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn another_members_book_stays_invisible() {
    let store = Arc::new(InMemoryClientStore::new());
    // Seed a lead under a different owner straight through the port.
    let foreign = NewClient::new(NewClientFields {
        name: "Dev Narayan",
        description: "",
        company: "Narayan Textiles",
        number: "+914455667788",
        status: ClientStatus::Active,
        behaviour: Behaviour::Cool,
        deal_value: 90_000,
        remarks: "",
    })
    .expect("valid seed client");
    let seeded = store
        .create(MemberId(12), &foreign)
        .await
        .expect("seed succeeds");
    let foreign_id = seeded.client.id;

    let app = actix_test::init_service(gate_app(book_ports(store))).await;
    let cookie = sign_in_as(&app, "asmith", "user").await;

    // The signed-in member's book is empty.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/clients")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let book = expect_json(res, StatusCode::OK).await;
    assert_eq!(book.get("clients"), Some(&json!([])));

    // Reads and writes against the foreign lead all report missing.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/clients/{foreign_id}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/clients/{foreign_id}"))
            .cookie(cookie.clone())
            .set_json(json!({ "remarks": "mine now" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/clients/{foreign_id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
