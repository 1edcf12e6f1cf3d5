//! Integration tests for the authenticator

#[path = "common/mod.rs"]
mod common;

use common::*;
use sentinel_fetch::auth::Authenticator;
use sentinel_fetch::errors::AppError;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_authenticate_returns_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("client_id=cdse-public"))
        .and(body_string_contains("username=user%40example.com"))
        .and(body_string_contains("password=correct-horse"))
        .and(body_string_contains("grant_type=password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "eyJ-token",
            "expires_in": 600,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = mock_config(&server);
    let auth = Authenticator::new(reqwest::Client::new(), &config, test_credentials());
    let token = auth.authenticate().await.unwrap();

    assert_eq!(token.secret(), "eyJ-token");
    assert!(!token.secret().is_empty());
}

#[tokio::test]
async fn test_rejected_credentials_surface_server_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string(
            r#"{"error":"invalid_grant","error_description":"Invalid user credentials"}"#,
        ))
        .mount(&server)
        .await;

    let config = mock_config(&server);
    let result = Authenticator::login(reqwest::Client::new(), &config, test_credentials()).await;

    match result {
        Err(AppError::Authentication { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid user credentials"));
        }
        other => panic!("Expected Authentication error, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn test_success_without_token_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token_type": "Bearer",
        })))
        .mount(&server)
        .await;

    let config = mock_config(&server);
    let auth = Authenticator::new(reqwest::Client::new(), &config, test_credentials());
    assert!(matches!(
        auth.authenticate().await,
        Err(AppError::Authentication { status: 200, .. })
    ));
}

#[tokio::test]
async fn test_unreachable_identity_provider() {
    let server = MockServer::start().await;
    let mut config = mock_config(&server);
    // Nothing listens on port 9 locally
    config.identity_url = "http://127.0.0.1:9/token".to_string();

    let auth = Authenticator::new(reqwest::Client::new(), &config, test_credentials());
    assert!(matches!(
        auth.authenticate().await,
        Err(AppError::Authentication { .. })
    ));
}

#[tokio::test]
async fn test_bearer_reuses_valid_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "long-lived",
            "expires_in": 3600,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = mock_config(&server);
    let mut auth = Authenticator::login(reqwest::Client::new(), &config, test_credentials())
        .await
        .unwrap();

    assert_eq!(auth.bearer().await.unwrap(), "long-lived");
    assert_eq!(auth.bearer().await.unwrap(), "long-lived");
    assert!(auth.token().is_some());
}

#[tokio::test]
async fn test_bearer_refreshes_expiring_token() {
    let server = MockServer::start().await;
    // A lifetime shorter than the refresh margin forces a new grant on every call
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "short-lived",
            "expires_in": 5,
        })))
        .expect(3)
        .mount(&server)
        .await;

    let config = mock_config(&server);
    let mut auth = Authenticator::login(reqwest::Client::new(), &config, test_credentials())
        .await
        .unwrap();

    auth.bearer().await.unwrap();
    auth.bearer().await.unwrap();
}
