//! Integration tests for resource operations.
//!
//! These tests verify that every ResourceGateway operation:
//! - Acquires a fresh token before acting
//! - Sends the expected form fields to the right endpoint
//! - Composes builder URLs from the token
//! - Reports every failure as a Failure value

mod common;

use common::{FailingCipher, RecordingTransport, test_config};
use coursebuilder_core::{
    Failure, ReqwestTransport, ResourceAttributes, ResourceGateway, ResourceType, to_envelope,
};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, method, path},
};

fn gateway(transport: &RecordingTransport) -> ResourceGateway<RecordingTransport, FailingCipher> {
    ResourceGateway::with_parts(
        test_config("https://license.test/", "https://cb.test/"),
        transport.clone(),
        FailingCipher,
    )
}

#[tokio::test]
async fn test_preview_url_with_params_and_wrapper() {
    let transport = RecordingTransport::new().respond(json!({"token": "TOK", "valid": true}));

    let payload = gateway(&transport)
        .get_preview_url(42, [("a", "1"), ("b", "2")], true)
        .await
        .unwrap();

    assert_eq!(payload.url, "https://cb.test/token/TOK/preview/42/1#a=1&b=2");
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_preview_url_without_params_or_wrapper() {
    let transport = RecordingTransport::new().respond(json!({"token": "TOK", "valid": true}));

    let params: Vec<(String, String)> = Vec::new();
    let payload = gateway(&transport)
        .get_preview_url("c-9", params, false)
        .await
        .unwrap();

    assert_eq!(payload.url, "https://cb.test/token/TOK/preview/c-9/0");
}

#[tokio::test]
async fn test_create_url_binds_callback() {
    let transport = RecordingTransport::new().respond(json!({"token": "TOK", "valid": true}));

    let payload = gateway(&transport)
        .get_create_url(ResourceType::Course, "https://cb.test/cb")
        .await
        .unwrap();

    assert_eq!(payload.url, "https://cb.test/token/TOK/courses/create");
    assert_eq!(
        transport.request(0).get("save_callback_url"),
        Some("https://cb.test/cb")
    );
}

#[tokio::test]
async fn test_create_url_per_type() {
    let transport = RecordingTransport::new()
        .respond(json!({"token": "T1", "valid": true}))
        .respond(json!({"token": "T2", "valid": true}));
    let gateway = gateway(&transport);

    let template = gateway
        .get_create_template_url("https://lms.test/saved")
        .await
        .unwrap();
    let certificate = gateway
        .get_create_certificate_url("https://lms.test/saved")
        .await
        .unwrap();

    assert_eq!(template.url, "https://cb.test/token/T1/templates/create");
    assert_eq!(certificate.url, "https://cb.test/token/T2/certificates/create");
}

#[tokio::test]
async fn test_resource_url() {
    let transport = RecordingTransport::new().respond(json!({"token": "TOK", "valid": true}));

    let payload = gateway(&transport)
        .get_course_url(17, "https://lms.test/saved")
        .await
        .unwrap();

    assert_eq!(payload.url, "https://cb.test/token/TOK/show/17");
    assert_eq!(
        transport.request(0).get("save_callback_url"),
        Some("https://lms.test/saved")
    );
}

#[tokio::test]
async fn test_create_resource_posts_attributes() {
    let transport =
        RecordingTransport::new().token_then("TOK", json!({"status": true, "id": 99}));

    let attributes = ResourceAttributes::new("Onboarding")
        .with_description("First week")
        .with_keywords("hr,intro")
        .with_notes("draft");
    let response = gateway(&transport)
        .create_resource(ResourceType::Template, &attributes)
        .await
        .unwrap();

    assert_eq!(response, json!({"status": true, "id": 99}));

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].get("save_callback_url"), None);

    let create = &requests[1];
    assert_eq!(create.url, "https://cb.test/api");
    assert_eq!(create.get("action"), Some("create"));
    assert_eq!(create.get("type"), Some("template"));
    assert_eq!(create.get("token"), Some("TOK"));
    assert_eq!(create.get("resources"), Some("[]"));
    assert_eq!(create.get("tags"), Some("{}"));

    let sent: Value = serde_json::from_str(create.get("attributes").unwrap()).unwrap();
    assert_eq!(
        sent,
        json!({
            "title": "Onboarding",
            "description": "First week",
            "keywords": "hr,intro",
            "notes": "draft"
        })
    );
}

#[tokio::test]
async fn test_details_and_preview_requests() {
    let transport = RecordingTransport::new()
        .token_then("T1", json!({"id": 5, "slides": []}))
        .token_then("T2", json!({"html": "<!DOCTYPE html><html></html>"}));
    let gateway = gateway(&transport);

    let details = gateway.get_certificate_details(5).await.unwrap();
    assert_eq!(details, json!({"id": 5, "slides": []}));

    let preview = gateway.get_preview(5).await.unwrap();
    assert_eq!(preview, json!({"html": "<!DOCTYPE html><html></html>"}));

    let requests = transport.requests();
    assert_eq!(requests[1].url, "https://cb.test/api");
    assert_eq!(requests[1].get("action"), Some("details"));
    assert_eq!(requests[1].get("id"), Some("5"));
    assert_eq!(requests[1].get("token"), Some("T1"));

    assert_eq!(requests[3].get("action"), Some("preview"));
    assert_eq!(requests[3].get("token"), Some("T2"));
}

#[tokio::test]
async fn test_account_details_goes_to_verification_endpoint() {
    let transport =
        RecordingTransport::new().token_then("TOK", json!({"customer": 42, "seats": 10}));

    let account = gateway(&transport).get_account_details().await.unwrap();
    assert_eq!(account, json!({"customer": 42, "seats": 10}));

    let request = transport.request(1);
    assert_eq!(request.url, "https://license.test/api/token/info");
    assert_eq!(request.get("action"), Some("account-info"));
    assert_eq!(request.get("token"), Some("TOK"));
}

#[tokio::test]
async fn test_every_token_is_fresh() {
    let transport = RecordingTransport::new()
        .respond(json!({"token": "FIRST", "valid": true}))
        .respond(json!({"token": "SECOND", "valid": true}));
    let gateway = gateway(&transport);

    let first = gateway.get_course_url(1, "https://lms.test/cb").await.unwrap();
    let second = gateway.get_course_url(1, "https://lms.test/cb").await.unwrap();

    assert_eq!(first.url, "https://cb.test/token/FIRST/show/1");
    assert_eq!(second.url, "https://cb.test/token/SECOND/show/1");
    assert_eq!(transport.requests().len(), 2);
}

fn assert_failure<T: std::fmt::Debug>(result: Result<T, Failure>) {
    let failure = result.unwrap_err();
    assert!(!failure.message.is_empty());
}

#[tokio::test]
async fn test_connection_failure_fails_every_operation() {
    let transport = RecordingTransport::new()
        .fail()
        .fail()
        .fail()
        .fail()
        .fail()
        .fail()
        .fail();
    let gateway = gateway(&transport);
    let attributes = ResourceAttributes::new("x");

    assert_failure(gateway.create_resource(ResourceType::Course, &attributes).await);
    assert_failure(gateway.get_resource_details(1).await);
    assert_failure(gateway.get_create_url(ResourceType::Course, "https://cb.test/cb").await);
    assert_failure(gateway.get_resource_url(1, "https://cb.test/cb").await);
    assert_failure(gateway.get_preview(1).await);
    assert_failure(gateway.get_preview_url(1, [("a", "1")], true).await);
    assert_failure(gateway.get_account_details().await);

    // Only the token endpoint was contacted.
    let requests = transport.requests();
    assert_eq!(requests.len(), 7);
    assert!(
        requests
            .iter()
            .all(|request| request.url == "https://license.test/api/token/get")
    );
}

#[tokio::test]
async fn test_invalid_token_becomes_failure_envelope() {
    let transport = RecordingTransport::new().respond(json!({
        "token": "",
        "valid": true,
        "message": ["unknown license", "check key"]
    }));

    let result = gateway(&transport)
        .get_create_url(ResourceType::Course, "https://cb.test/cb")
        .await;

    assert_eq!(
        to_envelope(&result),
        json!({"status": false, "message": "token is empty: [unknown license; check key]"})
    );
}

#[tokio::test]
async fn test_follow_on_failure_becomes_failure() {
    let transport = RecordingTransport::new()
        .respond(json!({"token": "TOK", "valid": true}))
        .fail();

    let result = gateway(&transport).get_resource_details(3).await;
    let failure = result.unwrap_err();
    assert!(failure.message.contains("connection"));
}

#[tokio::test]
async fn test_create_course_over_http() {
    let license = MockServer::start().await;
    let builder = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/token/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "HTTP-TOKEN",
            "valid": true
        })))
        .expect(1)
        .mount(&license)
        .await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .and(body_string_contains("action=create"))
        .and(body_string_contains("type=course"))
        .and(body_string_contains("token=HTTP-TOKEN"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "id": 314
        })))
        .expect(1)
        .mount(&builder)
        .await;

    let gateway = ResourceGateway::with_parts(
        test_config(&license.uri(), &builder.uri()),
        ReqwestTransport::new(),
        FailingCipher,
    );

    let response = gateway
        .create_course(&ResourceAttributes::new("Safety 101"))
        .await
        .unwrap();
    assert_eq!(response["id"], 314);
}

#[tokio::test]
async fn test_unreachable_verification_endpoint() {
    // Port 9 (discard) is not expected to accept HTTP connections.
    let gateway = ResourceGateway::with_parts(
        test_config("http://127.0.0.1:9", "http://127.0.0.1:9"),
        ReqwestTransport::new(),
        FailingCipher,
    );

    let result = gateway.get_account_details().await;
    assert_failure(result);
}
