use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use secrecy::Secret;
use std::sync::Arc;
use tower::util::ServiceExt;
use trading_frontend::config::{IdentityServiceSettings, ProfileStoreSettings, SiteSettings};
use trading_frontend::services::identity_client::IdentityClient;
use trading_frontend::services::profile_store::ProfileStore;
use trading_frontend::startup::build_router;
use trading_frontend::AppState;

/// Router wired against unreachable service endpoints. Handlers that would
/// talk to the network are only exercised up to their local gates.
fn test_app() -> axum::Router {
    let identity = Arc::new(IdentityClient::new(IdentityServiceSettings {
        url: "http://127.0.0.1:9/auth/v1".to_string(),
        api_key: Secret::new("test-anon-key".to_string()),
        google_client_id: "test-client-id".to_string(),
    }));
    let profiles = Arc::new(ProfileStore::new(ProfileStoreSettings {
        url: "http://127.0.0.1:9".to_string(),
        api_key: Secret::new("test-anon-key".to_string()),
    }));

    build_router(AppState::new(
        identity,
        profiles,
        SiteSettings { public_url: None },
    ))
}

#[tokio::test]
async fn health_check_works() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn landing_page_renders_for_anonymous_visitors() {
    let response = test_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.headers().contains_key("x-request-id"));
    assert!(response.headers().contains_key("content-security-policy"));
}
