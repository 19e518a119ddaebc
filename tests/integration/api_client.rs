//! BackendClient against a mock backend

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_log::test;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{client_for, fixtures, logging::init_test_logging};
use cleanly::api::CleaningApi;
use cleanly::error::ClientError;
use cleanly::models::{JobStatus, LoginRequest, NewService, Role, SignupRequest};

#[test(tokio::test)]
async fn test_metrics_keep_backend_order() {
    init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::metrics_body()))
        .expect(1)
        .mount(&server)
        .await;

    let metrics = client_for(&server).admin_metrics().await.unwrap();
    let keys: Vec<&str> = metrics.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["total_bookings", "revenue_paid", "active_cleaners", "users", "cancelled"]);
    assert!(metrics["cancelled"].is_null());
}

#[test(tokio::test)]
async fn test_non_success_status_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/services"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client_for(&server).list_services().await.unwrap_err();
    assert_matches!(err, ClientError::Status { status: 500, ref body } if body == "boom");
}

#[test(tokio::test)]
async fn test_unexpected_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .login(&LoginRequest {
            email: "a@b.c".to_string(),
        })
        .await
        .unwrap_err();
    assert_matches!(err, ClientError::Decode(_));
}

#[test(tokio::test)]
async fn test_booking_ids_are_path_segment_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/customers/a%20b%2Fc/bookings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([fixtures::booking_body("b-1", "requested")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let bookings = client_for(&server).customer_bookings("a b/c").await.unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].id, "b-1");
    assert_eq!(bookings[0].price_estimate, Some(85.0));
}

#[test(tokio::test)]
async fn test_status_update_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/bookings/b-7/status"))
        .and(body_json(json!({"status": "in_progress"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .update_booking_status("b-7", JobStatus::InProgress)
        .await
        .unwrap();
}

#[test(tokio::test)]
async fn test_create_service_sends_null_price() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/services"))
        .and(body_json(json!({
            "name": "eco",
            "display_name": "Eco Clean",
            "base_price": null,
            "hourly_multiplier": 1.0,
            "flat_multiplier": 1.0,
            "is_active": true
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let service = NewService::with_default_multipliers("eco".to_string(), "Eco Clean".to_string(), None);
    tokio_test::assert_ok!(client_for(&server).create_service(&service).await);
}

#[test(tokio::test)]
async fn test_signup_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/signup"))
        .and(body_json(json!({"email": "ana@example.com", "name": "Ana", "role": "cleaner"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::auth_body("u-9", "cleaner")))
        .mount(&server)
        .await;

    let response = client_for(&server)
        .signup(&SignupRequest {
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            role: Role::Cleaner,
        })
        .await
        .unwrap();
    assert_eq!(response.user_id, "u-9");
    assert_eq!(response.role, Role::Cleaner);
}

#[test(tokio::test)]
async fn test_base_url_with_path_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/backend/api/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::eco_catalog()))
        .expect(1)
        .mount(&server)
        .await;

    let config = cleanly::models::Config::for_backend(&format!("{}/backend/", server.uri()));
    let client = cleanly::api::BackendClient::new(&config).unwrap();
    let services = client.list_services().await.unwrap();
    assert_eq!(services[0].display_name, "Eco Clean");
}
