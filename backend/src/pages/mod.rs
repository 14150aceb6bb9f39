//! Server-rendered page shells behind the access gate.
//!
//! Each route serves a minimal HTML document with a mount point for the
//! client application; the gate middleware decides whether a request
//! reaches these handlers at all. Shells carry a `data-page` marker so
//! the client knows which view to hydrate.

use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, get, web};

fn shell(title: &str, page: &str, attrs: &str) -> HttpResponse {
    let html = format!(
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title}</title></head>\
         <body><div id=\"root\" data-page=\"{page}\"{attrs}></div></body></html>"
    );
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(html)
}

#[get("/")]
pub async fn root() -> HttpResponse {
    shell("CRM", "root", "")
}

#[get("/signin/user")]
pub async fn sign_in_user() -> HttpResponse {
    shell("Sales sign-in", "signin-user", "")
}

#[get("/signin/admin")]
pub async fn sign_in_admin() -> HttpResponse {
    shell("Admin sign-in", "signin-admin", "")
}

#[get("/admin")]
pub async fn admin_home() -> HttpResponse {
    shell("Teams", "admin-home", "")
}

#[get("/admin/member/{id}")]
pub async fn admin_member(path: web::Path<i32>) -> HttpResponse {
    let id = path.into_inner();
    shell(
        "Member profile",
        "admin-member",
        &format!(" data-member-id=\"{id}\""),
    )
}

#[get("/sales")]
pub async fn sales_root() -> HttpResponse {
    shell("Sales", "sales-root", "")
}

#[get("/sales/overview")]
pub async fn sales_overview() -> HttpResponse {
    shell("Sales overview", "sales-overview", "")
}

#[get("/sales/leads")]
pub async fn sales_leads() -> HttpResponse {
    shell("Leads", "sales-leads", "")
}

#[get("/sales/leads/{id}")]
pub async fn sales_lead_detail(path: web::Path<i32>) -> HttpResponse {
    let id = path.into_inner();
    shell(
        "Lead detail",
        "sales-lead",
        &format!(" data-client-id=\"{id}\""),
    )
}
