use std::fmt::Write;

use http::header::AUTHORIZATION;
use http::request::Parts;
use http::{HeaderMap, HeaderName, HeaderValue};
use log::debug;
use mcsign_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use mcsign_core::time::{format_date, format_iso8601, parse_date, parse_iso8601, DateTime};
use mcsign_core::{Context, Error, Result, SigningRequest};
use percent_encoding::utf8_percent_encode;

use crate::constants::*;
use crate::{AuthorizationHeader, Credential, Credentials};

/// Parameters that bind a signature to a moment, a region and a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningParams {
    /// Service name, for example `s3`.
    pub service: String,
    /// Region name, for example `us-east-1`.
    pub region: String,
    /// Request datetime, `YYYYMMDD'T'HHMMSS'Z'`; must equal the `X-Auth-Date` header.
    pub request_datetime: String,
    /// Request date, `YYYYMMDD`; used to derive the signing key.
    pub request_date: String,
    /// Credential scope, `<ak>/<date>/<region>/<service>/sign_request`.
    pub credential_scope: String,
}

impl SigningParams {
    /// Derive all parameters from one instant.
    pub fn new(access_key_id: &str, service: &str, region: &str, time: DateTime) -> Self {
        let request_date = format_date(time);

        Self {
            service: service.to_string(),
            region: region.to_string(),
            request_datetime: format_iso8601(time),
            credential_scope: format!(
                "{access_key_id}/{request_date}/{region}/{service}/{TERMINATOR}"
            ),
            request_date,
        }
    }

    /// Use parameters exactly as given, for example taken from an incoming request.
    pub fn from_parts(
        service: impl Into<String>,
        region: impl Into<String>,
        request_datetime: impl Into<String>,
        request_date: impl Into<String>,
        credential_scope: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            region: region.into(),
            request_datetime: request_datetime.into(),
            request_date: request_date.into(),
            credential_scope: credential_scope.into(),
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("service", &self.service),
            ("region", &self.region),
            ("credential scope", &self.credential_scope),
        ] {
            if value.is_empty() {
                return Err(Error::invalid_input(format!("{name} must not be empty")));
            }
        }

        parse_iso8601(&self.request_datetime)?;
        parse_date(&self.request_date)?;
        Ok(())
    }
}

/// RequestSigner implements OPENSDS-HMAC-SHA256.
///
/// The signature follows the AWS SigV4 layout with its own algorithm name,
/// secret prefix and scope terminator. Only `X-Auth-Date` is signed unless
/// [`RequestSigner::with_signed_headers`] says otherwise; the verifying side
/// must sign the same set.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    credentials: Credentials,
    signed_headers: Vec<HeaderName>,
}

impl RequestSigner {
    /// Create a signer that reads credentials from `credentials`.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            signed_headers: vec![HeaderName::from_static(X_AUTH_DATE)],
        }
    }

    /// Replace the set of headers taken into the signature.
    ///
    /// Names are case-insensitive. Headers in the set but absent from a
    /// request are skipped, except `x-auth-date` which must be present and
    /// match the request datetime.
    pub fn with_signed_headers(mut self, headers: impl IntoIterator<Item = HeaderName>) -> Self {
        let mut headers: Vec<HeaderName> = headers.into_iter().collect();
        headers.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        headers.dedup();
        self.signed_headers = headers;
        self
    }

    /// Credentials used by this signer.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Sign the request and return the lowercase hex signature.
    ///
    /// The credential is fetched first, so no canonicalization happens when
    /// the lookup fails. The query string of `req` is rewritten to its
    /// canonical form.
    pub async fn sign(
        &self,
        ctx: &Context,
        req: &mut Parts,
        body: &[u8],
        params: &SigningParams,
    ) -> Result<String> {
        let cred = self.credentials.get(ctx).await?;
        self.signature(req, body, params, &cred)
    }

    /// Compute the signature with a credential at hand.
    ///
    /// This performs no I/O.
    pub fn signature(
        &self,
        req: &mut Parts,
        body: &[u8],
        params: &SigningParams,
        cred: &Credential,
    ) -> Result<String> {
        let sig = SignatureContext::build(req, body, params, cred, &self.signed_headers)?;
        Ok(sig.signature)
    }

    /// Stamp `X-Auth-Date` and `Authorization` on the request.
    ///
    /// Parameters are derived from the credential's access key and `now`.
    pub async fn sign_request(
        &self,
        ctx: &Context,
        req: &mut Parts,
        body: &[u8],
        service: &str,
        region: &str,
        now: DateTime,
    ) -> Result<()> {
        let cred = self.credentials.get(ctx).await?;
        let params = SigningParams::new(&cred.access_key_id, service, region, now);

        req.headers.insert(
            HeaderName::from_static(X_AUTH_DATE),
            HeaderValue::try_from(params.request_datetime.as_str())?,
        );
        let sig = SignatureContext::build(req, body, &params, &cred, &self.signed_headers)?;

        let auth = AuthorizationHeader {
            access_key_id: cred.access_key_id,
            date: params.request_date,
            region: params.region,
            service: params.service,
            signed_headers: sig.signed_headers,
            signature: sig.signature,
        };
        let mut value = HeaderValue::try_from(auth.to_string())?;
        value.set_sensitive(true);
        req.headers.insert(AUTHORIZATION, value);

        Ok(())
    }
}

/// Every value derived while signing one request.
///
/// Each phase only reads the ones computed before it.
#[derive(Debug)]
struct SignatureContext {
    payload_digest: String,
    signed_headers: Vec<String>,
    canonical_headers: String,
    canonical_request: String,
    string_to_sign: String,
    signature: String,
}

impl SignatureContext {
    fn build(
        req: &mut Parts,
        body: &[u8],
        params: &SigningParams,
        cred: &Credential,
        allowed: &[HeaderName],
    ) -> Result<Self> {
        params.validate()?;
        if allowed.iter().any(|h| h.as_str() == X_AUTH_DATE) {
            check_auth_date(&req.headers, &params.request_datetime)?;
        }

        let payload_digest = payload_digest(body);

        let mut signing = SigningRequest::build(req);
        let headers = canonicalize_header(&signing.headers, allowed);
        let canonicalized = headers.and_then(|(signed_headers, canonical_headers)| {
            canonicalize_query(&mut signing);
            let canonical_request = canonical_request_string(
                &signing,
                &canonical_headers,
                &signed_headers,
                &payload_digest,
            )?;
            Ok((signed_headers, canonical_headers, canonical_request))
        });
        // Headers go back to the request even when canonicalization failed.
        signing.apply(req)?;
        let (signed_headers, canonical_headers, canonical_request) = canonicalized?;

        let string_to_sign = format!(
            "{ALGORITHM}\n{}\n{}\n{}",
            params.request_datetime,
            params.credential_scope,
            hex_sha256(canonical_request.as_bytes())
        );

        let signing_key = generate_signing_key(
            &cred.secret_access_key,
            &params.request_date,
            &params.region,
            &params.service,
        );
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        let ctx = Self {
            payload_digest,
            signed_headers,
            canonical_headers,
            canonical_request,
            string_to_sign,
            signature,
        };
        debug!(
            "canonical headers: {:?}, payload digest: {}",
            ctx.canonical_headers, ctx.payload_digest
        );
        debug!("calculated canonical request: {}", ctx.canonical_request);
        debug!("calculated string to sign: {}", ctx.string_to_sign);
        Ok(ctx)
    }
}

/// `X-Auth-Date` must be present and carry the datetime the request is signed at.
fn check_auth_date(headers: &HeaderMap, request_datetime: &str) -> Result<()> {
    let value = headers
        .get(X_AUTH_DATE)
        .ok_or_else(|| Error::invalid_input("x-auth-date header is missing"))?;
    let value = value.to_str().map_err(|e| {
        Error::invalid_input("x-auth-date header is not visible ascii").with_source(e)
    })?;

    if value.trim() != request_datetime {
        return Err(Error::invalid_input(format!(
            "x-auth-date {value:?} does not match request datetime {request_datetime:?}"
        )));
    }
    Ok(())
}

fn payload_digest(body: &[u8]) -> String {
    if body.is_empty() {
        EMPTY_STRING_SHA256.to_string()
    } else {
        hex_sha256(body)
    }
}

/// Returns the sorted signed header names and the canonical header block.
///
/// Repeated values keep their order and are joined with `,`; every value is
/// trimmed with interior runs of spaces collapsed.
fn canonicalize_header(
    headers: &HeaderMap,
    allowed: &[HeaderName],
) -> Result<(Vec<String>, String)> {
    let mut pairs = Vec::with_capacity(allowed.len());

    for name in allowed {
        let mut values = headers.get_all(name).iter().peekable();
        if values.peek().is_none() {
            continue;
        }

        let mut joined = String::new();
        for (idx, value) in values.enumerate() {
            if idx != 0 {
                joined.push(',');
            }
            joined.push_str(&SigningRequest::header_value_normalize(value.to_str()?));
        }
        pairs.push((name.as_str().to_string(), joined));
    }

    let mut signed_headers: Vec<String> = pairs.iter().map(|(k, _)| k.clone()).collect();
    signed_headers.sort();

    Ok((
        signed_headers,
        SigningRequest::header_to_string(pairs, ":", "\n"),
    ))
}

/// Sort the query by key, then by value, and encode every key and value.
///
/// Sorting happens on decoded text so the order does not depend on escaping.
fn canonicalize_query(ctx: &mut SigningRequest) {
    if ctx.query.is_empty() {
        return;
    }

    ctx.query.sort();
    ctx.query = ctx
        .query
        .iter()
        .map(|(k, v)| {
            (
                utf8_percent_encode(k, &QUERY_ENCODE_SET).to_string(),
                utf8_percent_encode(v, &QUERY_ENCODE_SET).to_string(),
            )
        })
        .collect();
}

fn canonical_request_string(
    ctx: &SigningRequest,
    canonical_headers: &str,
    signed_headers: &[String],
    payload_digest: &str,
) -> Result<String> {
    // 256 is specially chosen to avoid reallocation for most requests.
    let mut f = String::with_capacity(256);

    writeln!(f, "{}", ctx.method)?;
    writeln!(
        f,
        "{}",
        if ctx.path.is_empty() { "/" } else { &ctx.path }
    )?;
    writeln!(
        f,
        "{}",
        SigningRequest::query_to_string(&ctx.query, "=", "&")
    )?;
    writeln!(f, "{canonical_headers}\n")?;
    writeln!(f, "{}", signed_headers.join(";"))?;
    write!(f, "{payload_digest}")?;

    Ok(f)
}

fn generate_signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("{SECRET_PREFIX}{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), date.as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), TERMINATOR.as_bytes())
}
