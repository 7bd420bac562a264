use std::collections::HashMap;

use http::StatusCode;
use mcsign_core::{ErrorKind, StaticEnv};
use mcsign_opensds_hmac::{Config, Credentials, DefaultCredentialProvider};
use pretty_assertions::assert_eq;

use crate::*;

fn env(pairs: &[(&str, &str)]) -> StaticEnv {
    StaticEnv {
        envs: pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
    }
}

#[tokio::test]
async fn test_env_wins_over_keystone() {
    let mock = MockHttpSend::new([]);
    let ctx = context(&mock).with_env(env(&[
        ("OPENSDS_ACCESS_KEY_ID", "env_key"),
        ("OPENSDS_SECRET_ACCESS_KEY", "env_secret"),
        ("OS_AUTH_URL", AUTH_URL),
        ("OS_AUTH_TOKEN", "admin_token"),
    ]));

    let cfg = Config::new().from_env(&ctx);
    let provider = DefaultCredentialProvider::from_config(&cfg).expect("config must be valid");
    let cred = Credentials::new(provider)
        .get(&ctx)
        .await
        .expect("credential must be found");

    assert_eq!(cred.access_key_id, "env_key");
    assert_eq!(cred.provider_name, "EnvProvider");
    assert!(mock.received().is_empty());
}

#[tokio::test]
async fn test_falls_back_to_keystone() {
    let mock = MockHttpSend::new([list_credentials(StatusCode::OK, credential_listing())]);
    let ctx = context(&mock).with_env(env(&[
        ("OS_AUTH_URL", AUTH_URL),
        ("OS_AUTH_TOKEN", "admin_token"),
    ]));

    let cfg = Config::new().with_access_key_id("access_key").from_env(&ctx);
    let provider = DefaultCredentialProvider::from_config(&cfg).expect("config must be valid");
    let cred = Credentials::new(provider)
        .get(&ctx)
        .await
        .expect("credential must be found");

    assert_eq!(cred.secret_access_key, "secret_key");
    assert_eq!(cred.provider_name, "KeystoneProvider");
}

#[tokio::test]
async fn test_nothing_found_is_missing() {
    let mock = MockHttpSend::new([list_credentials(StatusCode::OK, credential_listing())]);
    let ctx = context(&mock).with_env(env(&[]));

    let cfg = Config::new()
        .with_access_key_id("unknown_key")
        .with_auth_url(AUTH_URL)
        .with_auth_token("admin_token");
    let provider = DefaultCredentialProvider::from_config(&cfg).expect("config must be valid");
    let err = Credentials::new(provider)
        .get(&ctx)
        .await
        .expect_err("credential must be missing");

    assert_eq!(err.kind(), ErrorKind::CredentialMissing);
}

#[tokio::test]
async fn test_keystone_outage_is_fetch_failure() {
    let mock = MockHttpSend::new([list_credentials(
        StatusCode::SERVICE_UNAVAILABLE,
        "service unavailable".to_string(),
    )]);
    let ctx = context(&mock).with_env(env(&[
        ("OS_AUTH_URL", AUTH_URL),
        ("OS_AUTH_TOKEN", "admin_token"),
    ]));

    let cfg = Config::new().with_access_key_id("access_key").from_env(&ctx);
    let provider = DefaultCredentialProvider::from_config(&cfg).expect("config must be valid");
    let err = Credentials::new(provider)
        .get(&ctx)
        .await
        .expect_err("outage must not resolve a credential");

    assert_eq!(err.kind(), ErrorKind::CredentialFetchFailed);
    assert!(err.is_credential_error());
    assert_eq!(mock.remaining(), 0);
}
