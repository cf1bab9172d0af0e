//! Gateway-level tests against a WireMock provider.

use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use onesignal_gateway::config::OneSignalConfig;
use onesignal_gateway::provider::{
    push_payload, tag_patch_payload, ProviderError, ProviderGateway, Target,
};

fn gateway_for(server: &MockServer) -> ProviderGateway {
    ProviderGateway::new(&OneSignalConfig {
        app_id: "app-1".to_string(),
        api_key: "os_v2_secret".to_string(),
        api_url: server.uri(),
        legacy_api_url: format!("{}/legacy", server.uri()),
    })
    .expect("gateway should build")
}

#[tokio::test]
async fn create_notification_sends_key_auth_and_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notifications"))
        .and(header("Authorization", "Key os_v2_secret"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "n-1", "recipients": 1})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let payload = push_payload(
        "app-1",
        &Target::ExternalUser("u1".to_string()),
        "T",
        "B",
        None,
        None,
    );

    let response = gateway.create_notification(&payload).await.unwrap();
    assert_eq!(response["id"], json!("n-1"));
}

#[tokio::test]
async fn non_2xx_surfaces_status_and_error_details() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notifications"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [{"code": "bad-target", "message": "No recipients"}, "secondary"]
        })))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let payload = push_payload(
        "app-1",
        &Target::Segment("VIP".to_string()),
        "T",
        "B",
        None,
        None,
    );

    let err = gateway.create_notification(&payload).await.unwrap_err();
    match &err {
        ProviderError::Api { status, errors } => {
            assert_eq!(*status, 400);
            assert_eq!(errors[0], "No recipients");
            assert_eq!(errors[1], "secondary");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.detail(), "No recipients");
}

#[tokio::test]
async fn status_and_cancel_address_notification_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notifications/n-7"))
        .and(query_param("app_id", "app-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "n-7"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/notifications/n-7"))
        .and(query_param("app_id", "app-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let status = gateway.notification_status("n-7").await.unwrap();
    assert_eq!(status["id"], json!("n-7"));

    let cancelled = gateway.cancel_notification("n-7").await.unwrap();
    assert_eq!(cancelled["success"], json!(true));
}

#[tokio::test]
async fn update_user_tags_patches_by_external_id() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/apps/app-1/users/by/external_id/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let payload = tag_patch_payload("new_users", "true");
    gateway.update_user_tags("u1", &payload).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body["properties"]["tags"], json!({"new_users": "true"}));
}

#[tokio::test]
async fn probe_short_circuits_on_primary_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apps/app-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "app-1"})))
        .expect(1)
        .mount(&server)
        .await;
    // The legacy path must never be probed when the primary succeeds
    Mock::given(method("GET"))
        .and(path("/legacy/apps/app-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let report = gateway.probe_connectivity().await;

    assert!(report.reachable);
    assert_eq!(report.via, Some("current-api"));
    assert_eq!(report.attempts.len(), 1);
    assert!(report.hint.is_none());
}

#[tokio::test]
async fn probe_falls_back_to_legacy_auth_scheme() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apps/app-1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"errors": ["nope"]})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/legacy/apps/app-1"))
        .and(header("Authorization", "Basic os_v2_secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "app-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let report = gateway.probe_connectivity().await;

    assert!(report.reachable);
    assert_eq!(report.via, Some("legacy-api"));
    assert_eq!(report.attempts.len(), 2);
    assert!(!report.attempts[0].ok);
    assert!(report.attempts[1].ok);
}

#[tokio::test]
async fn probe_reports_combined_failure() {
    let server = MockServer::start().await;
    // Nothing mounted: every strategy gets a 404

    let gateway = gateway_for(&server);
    let report = gateway.probe_connectivity().await;

    assert!(!report.reachable);
    assert!(report.via.is_none());
    assert_eq!(report.attempts.len(), 2);
    assert!(report.hint.is_some());
}

#[tokio::test]
async fn app_info_hits_diagnostic_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apps/app-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "app-1", "players": 42})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let info = gateway.app_info().await.unwrap();
    assert_eq!(info["players"], json!(42));
}
