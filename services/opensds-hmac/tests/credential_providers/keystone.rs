use http::{Method, StatusCode};
use mcsign_core::{ErrorKind, ProvideCredential};
use mcsign_opensds_hmac::{Credentials, KeystoneCredentialProvider};
use pretty_assertions::assert_eq;

use crate::*;

#[tokio::test]
async fn test_lookup_hit() {
    let mock = MockHttpSend::new([list_credentials(StatusCode::OK, credential_listing())]);
    let ctx = context(&mock);

    let provider = KeystoneCredentialProvider::new(token_client(), "access_key");
    let cred = Credentials::new(provider)
        .get(&ctx)
        .await
        .expect("lookup must succeed");

    assert_eq!(cred.access_key_id, "access_key");
    assert_eq!(cred.secret_access_key, "secret_key");
    assert_eq!(cred.provider_name, "KeystoneProvider");

    let received = mock.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].headers["x-auth-token"], "admin_token");
}

#[tokio::test]
async fn test_lookup_miss() {
    let mock = MockHttpSend::new([list_credentials(StatusCode::OK, credential_listing())]);
    let ctx = context(&mock);

    let provider = KeystoneCredentialProvider::new(token_client(), "access");
    let err = provider
        .provide_credential(&ctx)
        .await
        .expect_err("lookup must miss");

    assert_eq!(err.kind(), ErrorKind::CredentialMissing);
    assert_eq!(err.to_string(), "credential is missing");
    assert!(err.is_credential_error());
}

#[tokio::test]
async fn test_lookup_empty_listing() {
    let mock = MockHttpSend::new([list_credentials(
        StatusCode::OK,
        r#"{"credentials": []}"#.to_string(),
    )]);

    let err = KeystoneCredentialProvider::new(token_client(), "access_key")
        .provide_credential(&context(&mock))
        .await
        .expect_err("lookup must miss");
    assert_eq!(err.kind(), ErrorKind::CredentialMissing);
}

#[tokio::test]
async fn test_lookup_rejected() {
    let mock = MockHttpSend::new([list_credentials(
        StatusCode::FORBIDDEN,
        r#"{"error": {"code": 403, "message": "You are not authorized"}}"#.to_string(),
    )]);

    let err = KeystoneCredentialProvider::new(token_client(), "access_key")
        .provide_credential(&context(&mock))
        .await
        .expect_err("lookup must fail");
    assert_eq!(err.kind(), ErrorKind::CredentialFetchFailed);
}

#[tokio::test]
async fn test_lookup_malformed_listing() {
    let mock = MockHttpSend::new([list_credentials(StatusCode::OK, "<html>".to_string())]);

    let err = KeystoneCredentialProvider::new(token_client(), "access_key")
        .provide_credential(&context(&mock))
        .await
        .expect_err("lookup must fail");
    assert_eq!(err.kind(), ErrorKind::CredentialFetchFailed);
}

#[tokio::test]
async fn test_lookup_malformed_blob() {
    let body = serde_json::json!({
        "credentials": [{ "blob": "not json", "type": "ec2", "id": "broken" }]
    })
    .to_string();
    let mock = MockHttpSend::new([list_credentials(StatusCode::OK, body)]);

    let err = KeystoneCredentialProvider::new(token_client(), "access_key")
        .provide_credential(&context(&mock))
        .await
        .expect_err("lookup must fail");
    assert_eq!(err.kind(), ErrorKind::CredentialFetchFailed);
}

#[tokio::test]
async fn test_transport_failure() {
    // Nothing scripted: the mock fails every request.
    let mock = MockHttpSend::new([]);

    let err = KeystoneCredentialProvider::new(token_client(), "access_key")
        .provide_credential(&context(&mock))
        .await
        .expect_err("lookup must fail");
    assert_eq!(err.kind(), ErrorKind::CredentialFetchFailed);
}

#[tokio::test]
async fn test_password_token_is_reused() {
    let mock = MockHttpSend::new([
        issue_token("issued_token", "2999-01-01T00:00:00.000000Z"),
        list_credentials(StatusCode::OK, credential_listing()),
        list_credentials(StatusCode::OK, credential_listing()),
    ]);
    let ctx = context(&mock);
    let provider = KeystoneCredentialProvider::new(password_client(), "access_key");

    for _ in 0..2 {
        provider
            .provide_credential(&ctx)
            .await
            .expect("lookup must succeed");
    }

    let received = mock.received();
    assert_eq!(received.len(), 3);
    let body: serde_json::Value =
        serde_json::from_slice(&received[0].body).expect("token request must be json");
    assert_eq!(body["auth"]["identity"]["password"]["user"]["name"], "opensds");
    assert_eq!(received[1].headers["x-auth-token"], "issued_token");
    assert_eq!(received[2].headers["x-auth-token"], "issued_token");
}

#[tokio::test]
async fn test_password_token_refreshed_near_expiry() {
    let soon = (chrono::Utc::now() + chrono::TimeDelta::seconds(30)).to_rfc3339();
    let mock = MockHttpSend::new([
        issue_token("short_token", &soon),
        list_credentials(StatusCode::OK, credential_listing()),
        issue_token("fresh_token", "2999-01-01T00:00:00Z"),
        list_credentials(StatusCode::OK, credential_listing()),
    ]);
    let ctx = context(&mock);
    let provider = KeystoneCredentialProvider::new(password_client(), "access_key");

    for _ in 0..2 {
        provider
            .provide_credential(&ctx)
            .await
            .expect("lookup must succeed");
    }

    let received = mock.received();
    assert_eq!(received[3].headers["x-auth-token"], "fresh_token");
    assert_eq!(mock.remaining(), 0);
}

#[tokio::test]
async fn test_rejected_token_fails_and_is_reissued_next_time() {
    let mock = MockHttpSend::new([
        issue_token("revoked_token", "2999-01-01T00:00:00Z"),
        list_credentials(StatusCode::UNAUTHORIZED, "{}".to_string()),
        issue_token("new_token", "2999-01-01T00:00:00Z"),
        list_credentials(StatusCode::OK, credential_listing()),
    ]);
    let ctx = context(&mock);
    let provider = KeystoneCredentialProvider::new(password_client(), "access_key");

    let err = provider
        .provide_credential(&ctx)
        .await
        .expect_err("rejected token must fail the lookup");
    assert_eq!(err.kind(), ErrorKind::CredentialFetchFailed);
    assert_eq!(mock.remaining(), 2, "the listing must not be repeated");

    let cred = provider
        .provide_credential(&ctx)
        .await
        .expect("lookup must succeed")
        .expect("credential must be found");
    assert_eq!(cred.secret_access_key, "secret_key");
    assert_eq!(mock.remaining(), 0);

    let received = mock.received();
    assert_eq!(received[1].headers["x-auth-token"], "revoked_token");
    assert_eq!(received[3].headers["x-auth-token"], "new_token");
}

#[tokio::test]
async fn test_token_issue_failure() {
    let mock = MockHttpSend::new([Exchange::new(
        Method::POST,
        "/identity/v3/auth/tokens",
        StatusCode::UNAUTHORIZED,
        r#"{"error": {"code": 401, "title": "Unauthorized"}}"#.to_string(),
    )]);

    let err = KeystoneCredentialProvider::new(password_client(), "access_key")
        .provide_credential(&context(&mock))
        .await
        .expect_err("lookup must fail");
    assert_eq!(err.kind(), ErrorKind::CredentialFetchFailed);
}
