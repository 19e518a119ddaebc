//! Views driven against a mock backend

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use test_log::test;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{client_for, fixtures, logging::{init_test_logging, log_test_data, log_test_step}};
use cleanly::api::CleaningApi;
use cleanly::models::Role;
use cleanly::session::{Identity, Session, SessionStore};
use cleanly::ui::book::BookView;
use cleanly::ui::dashboard::{DashboardRole, DashboardView};
use cleanly::ui::home::HomeView;
use cleanly::ui::profile::ProfileView;
use cleanly::ui::{Notice, View};

fn api_for(server: &MockServer) -> Arc<dyn CleaningApi> {
    Arc::new(client_for(server))
}

async fn mount_empty_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

async fn request_bodies(server: &MockServer, request_path: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == request_path)
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}

#[test(tokio::test)]
async fn test_home_placeholders_when_backend_is_down() {
    init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/metrics"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut view = HomeView::new(api_for(&server));
    view.mount(&Session::ephemeral(Identity::default()));
    view.settle().await;

    let values: Vec<String> = view.metric_cells().into_iter().map(|(_, value)| value).collect();
    assert_eq!(values, vec!["—", "—", "—", "—"]);
}

#[test(tokio::test)]
async fn test_guest_booking_sends_guest_customer_id() {
    init_test_logging();
    let server = MockServer::start().await;
    mount_empty_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/bookings"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"price_estimate": 85})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let session = Session::open(SessionStore::new(dir.path().join("session.json"))).unwrap();

    let mut view = BookView::new(api_for(&server));
    view.mount(&session);
    view.settle().await;
    view.submit_booking(&session);
    view.settle().await;

    let bodies = request_bodies(&server, "/api/bookings").await;
    log_test_data("Booking bodies", &bodies);
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["customer_id"], "guest");
    assert_eq!(bodies[0]["service_type"], "standard");
    assert!(bodies[0]["scheduled_start"].is_null());
    assert_eq!(
        view.notice(),
        Some(&Notice::Success("Booking submitted. Price estimate $85".to_string()))
    );
}

#[test(tokio::test)]
async fn test_catalog_replaces_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::eco_catalog()))
        .mount(&server)
        .await;

    let mut view = BookView::new(api_for(&server));
    view.mount(&Session::ephemeral(Identity::default()));
    view.settle().await;

    let options = view.service_options();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].value, "eco");
    assert_eq!(options[0].label, "Eco Clean");
}

#[test(tokio::test)]
async fn test_estimate_does_not_create_booking() {
    let server = MockServer::start().await;
    mount_empty_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/bookings/estimate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"price_estimate": 84.5})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/bookings"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let session = Session::ephemeral(Identity::default());
    let mut view = BookView::new(api_for(&server));
    view.mount(&session);
    view.request_estimate(&session);
    view.settle().await;

    assert_eq!(view.estimate_line().as_deref(), Some("Estimated Price: $84.5"));
}

#[test(tokio::test)]
async fn test_role_switch_discards_slow_customer_listing() {
    init_test_logging();
    log_test_step("Customer listing is delayed, cleaner listing is immediate");
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/customers/u-1/bookings"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([fixtures::booking_body("customer-1", "requested")]))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cleaners/u-1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([fixtures::booking_body("job-1", "assigned")])))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = Session::ephemeral(Identity::new("u-1", Role::Customer));
    let mut view = DashboardView::new(api_for(&server));
    view.mount(&session);
    view.switch_role(DashboardRole::Cleaner, &mut session);
    view.settle().await;

    // Anything the aborted request could still deliver arrives within the delay
    tokio::time::sleep(Duration::from_millis(500)).await;
    view.update(&mut session).unwrap();

    let ids: Vec<String> = view
        .bookings()
        .loaded()
        .unwrap()
        .iter()
        .map(|booking| booking.id.clone())
        .collect();
    assert_eq!(ids, vec!["job-1"]);
    assert_eq!(session.role(), Role::Cleaner);
}

#[test(tokio::test)]
async fn test_latest_completed_auth_call_wins() {
    init_test_logging();
    log_test_step("Signup starts first but completes after login");
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/signup"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(fixtures::auth_body("signup-user", "cleaner"))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::auth_body("login-user", "admin")))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));
    let mut session = Session::open(store.clone()).unwrap();

    let mut view = ProfileView::new(api_for(&server));
    view.mount(&session);
    view.set_email("ana@example.com");
    view.sign_up();
    view.log_in();
    view.settle(&mut session).await;

    assert_eq!(session.identity(), &Identity::new("signup-user", Role::Cleaner));
    assert_eq!(store.load().unwrap(), Identity::new("signup-user", Role::Cleaner));
    assert_eq!(
        view.notice().map(|notice| notice.message()),
        Some("Signed up. Your user id is saved locally.")
    );
}
