use http::request::Parts;
use http::{HeaderName, StatusCode};
use mcsign_core::{Context, ErrorKind, Result};
use mcsign_opensds_hmac::{
    Credentials, KeystoneCredentialProvider, RequestSigner, SigningParams,
    StaticCredentialProvider,
};
use pretty_assertions::assert_eq;

use crate::*;

const DATETIME: &str = "20190301T220855Z";
const SCOPE: &str = "access_key/20190301/us-east-1/s3/sign_request";
const SIGNATURE: &str = "f8640cfcd36e79a7eb0d38cc504f256f98ff57398ac7106cf5129fe314ea2f84";

fn static_signer() -> RequestSigner {
    RequestSigner::new(Credentials::new(StaticCredentialProvider::new(
        "access_key",
        "secret_key",
    )))
}

fn params() -> SigningParams {
    SigningParams::from_parts("s3", "us-east-1", DATETIME, "20190301", SCOPE)
}

fn request(uri: &str, headers: &[(&str, &str)]) -> Parts {
    let mut builder = http::Request::get(uri);
    for (k, v) in headers {
        builder = builder.header(*k, *v);
    }
    builder
        .body(())
        .expect("request must be valid")
        .into_parts()
        .0
}

#[tokio::test]
async fn test_canonical_signature_vector() -> Result<()> {
    init_logger();
    let mut req = request(
        "https://s3/us-east-1",
        &[("X-Auth-Date", DATETIME), ("Authorization", "placeholder")],
    );

    let sig = static_signer()
        .sign(&Context::new(), &mut req, b"", &params())
        .await?;

    assert_eq!(sig, SIGNATURE);
    Ok(())
}

#[tokio::test]
async fn test_sign_is_deterministic() -> Result<()> {
    let signer = static_signer();
    let ctx = Context::new();

    let mut first = request("https://s3/bucket/object?x=1", &[("X-Auth-Date", DATETIME)]);
    let mut second = request("https://s3/bucket/object?x=1", &[("X-Auth-Date", DATETIME)]);

    assert_eq!(
        signer.sign(&ctx, &mut first, b"body", &params()).await?,
        signer.sign(&ctx, &mut second, b"body", &params()).await?
    );
    Ok(())
}

#[tokio::test]
async fn test_header_insertion_order_does_not_matter() -> Result<()> {
    let signer = static_signer().with_signed_headers([
        HeaderName::from_static("x-auth-date"),
        HeaderName::from_static("content-type"),
        HeaderName::from_static("x-project-id"),
    ]);
    let ctx = Context::new();

    let mut forward = request(
        "https://gateway/v1/backups",
        &[
            ("X-Auth-Date", DATETIME),
            ("Content-Type", "application/json"),
            ("X-Project-Id", "e5b0f1c2"),
        ],
    );
    let mut backward = request(
        "https://gateway/v1/backups",
        &[
            ("X-Project-Id", "e5b0f1c2"),
            ("Content-Type", "application/json"),
            ("X-Auth-Date", DATETIME),
        ],
    );

    assert_eq!(
        signer.sign(&ctx, &mut forward, b"{}", &params()).await?,
        signer.sign(&ctx, &mut backward, b"{}", &params()).await?
    );
    Ok(())
}

#[tokio::test]
async fn test_query_reencoding_is_idempotent() -> Result<()> {
    let signer = static_signer();
    let ctx = Context::new();
    let mut req = request(
        "https://gateway/v1/backups?name=a+b&limit=10&name=%7Ez",
        &[("X-Auth-Date", DATETIME)],
    );

    let first = signer.sign(&ctx, &mut req, b"", &params()).await?;
    let canonical = req.uri.to_string();
    assert_eq!(
        canonical,
        "https://gateway/v1/backups?limit=10&name=a%20b&name=~z"
    );

    let second = signer.sign(&ctx, &mut req, b"", &params()).await?;
    assert_eq!(first, second);
    assert_eq!(req.uri.to_string(), canonical);
    Ok(())
}

#[tokio::test]
async fn test_signed_header_names_are_case_insensitive() -> Result<()> {
    let ctx = Context::new();
    let mut lower = request("https://s3/us-east-1", &[("x-auth-date", DATETIME)]);
    let mut upper = request("https://s3/us-east-1", &[("X-AUTH-DATE", DATETIME)]);

    let signer = static_signer();
    assert_eq!(signer.sign(&ctx, &mut lower, b"", &params()).await?, SIGNATURE);
    assert_eq!(signer.sign(&ctx, &mut upper, b"", &params()).await?, SIGNATURE);
    Ok(())
}

#[tokio::test]
async fn test_sign_with_keystone_credentials() -> Result<()> {
    let mock = MockHttpSend::new([list_credentials(StatusCode::OK, credential_listing())]);
    let ctx = context(&mock);
    let signer = RequestSigner::new(Credentials::new(KeystoneCredentialProvider::new(
        token_client(),
        "access_key",
    )));

    let mut req = request("https://s3/us-east-1", &[("X-Auth-Date", DATETIME)]);
    assert_eq!(signer.sign(&ctx, &mut req, b"", &params()).await?, SIGNATURE);
    Ok(())
}

#[tokio::test]
async fn test_sign_fails_before_touching_request_on_missing_credential() {
    let mock = MockHttpSend::new([list_credentials(StatusCode::OK, credential_listing())]);
    let ctx = context(&mock);
    let signer = RequestSigner::new(Credentials::new(KeystoneCredentialProvider::new(
        token_client(),
        "revoked_key",
    )));

    let mut req = request("https://s3/bucket?b=1&a=2", &[("X-Auth-Date", DATETIME)]);
    let err = signer
        .sign(&ctx, &mut req, b"", &params())
        .await
        .expect_err("sign must fail");

    assert_eq!(err.kind(), ErrorKind::CredentialMissing);
    assert_eq!(req.uri.to_string(), "https://s3/bucket?b=1&a=2");
}
