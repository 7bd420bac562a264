use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use http::header::AUTHORIZATION;
use http::request::Parts;
use http::HeaderName;
use log::debug;
use mcsign_core::{Context, Error, Result};
use subtle::ConstantTimeEq;

use crate::constants::X_AUTH_DATE;
use crate::provide_credential::KeystoneCredentialProvider;
use crate::{AuthorizationHeader, Credentials, IdentityClient, RequestSigner, SigningParams};

type ResolveCredentials = dyn Fn(&str) -> Credentials + Send + Sync;

/// Verifier checks the signature of an incoming request.
///
/// The secret is looked up for the access key named in the `Authorization`
/// header, and the signature is recomputed over exactly the headers the
/// client listed.
#[derive(Clone)]
pub struct Verifier {
    resolve: Arc<ResolveCredentials>,
}

impl Verifier {
    /// Create a verifier that resolves credentials of an access key with `resolve`.
    pub fn new(resolve: impl Fn(&str) -> Credentials + Send + Sync + 'static) -> Self {
        Self {
            resolve: Arc::new(resolve),
        }
    }

    /// Create a verifier that looks access keys up in Keystone.
    pub fn keystone(client: IdentityClient) -> Self {
        Self::new(move |access_key_id| {
            Credentials::new(KeystoneCredentialProvider::new(
                client.clone(),
                access_key_id,
            ))
        })
    }

    /// Verify the request and return its parsed `Authorization` header.
    ///
    /// The query string of `req` is rewritten to its canonical form.
    pub async fn verify(
        &self,
        ctx: &Context,
        req: &mut Parts,
        body: &[u8],
    ) -> Result<AuthorizationHeader> {
        let auth = header_str(req, &AUTHORIZATION)?
            .ok_or_else(|| Error::invalid_input("signature not found in header"))?;
        let auth = AuthorizationHeader::parse(auth)?;
        let datetime = header_str(req, &HeaderName::from_static(X_AUTH_DATE))?
            .ok_or_else(|| Error::invalid_input("x-auth-date not found in header"))?
            .to_string();

        let signed_headers = auth
            .signed_headers
            .iter()
            .map(|v| HeaderName::try_from(v.as_str()))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let credentials = (self.resolve)(&auth.access_key_id);
        let cred = credentials.get(ctx).await?;
        let params = SigningParams::from_parts(
            auth.service.as_str(),
            auth.region.as_str(),
            datetime,
            auth.date.as_str(),
            auth.credential_scope(),
        );

        let signature = RequestSigner::new(credentials)
            .with_signed_headers(signed_headers)
            .signature(req, body, &params, &cred)?;

        if !bool::from(signature.as_bytes().ct_eq(auth.signature.as_bytes())) {
            debug!(
                "signature of access key {} does not match",
                auth.access_key_id
            );
            return Err(Error::signature_mismatch("signature validation failed"));
        }

        Ok(auth)
    }
}

fn header_str<'a>(req: &'a Parts, name: &HeaderName) -> Result<Option<&'a str>> {
    match req.headers.get(name) {
        None => Ok(None),
        Some(v) => {
            let v = v.to_str()?.trim();
            Ok((!v.is_empty()).then_some(v))
        }
    }
}

impl Debug for Verifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier").finish_non_exhaustive()
    }
}
