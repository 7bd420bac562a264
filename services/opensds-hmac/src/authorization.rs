use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use mcsign_core::{Error, Result};

use crate::constants::{ALGORITHM, TERMINATOR};

/// The `Authorization` header of a signed request.
///
/// ```text
/// OPENSDS-HMAC-SHA256 Credential=<ak>/<date>/<region>/<service>/sign_request,SignedHeaders=<h1;h2>,Signature=<hex>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationHeader {
    /// Access key id of the signer.
    pub access_key_id: String,
    /// Request date, `YYYYMMDD`.
    pub date: String,
    /// Region the signature is bound to.
    pub region: String,
    /// Service the signature is bound to.
    pub service: String,
    /// Lowercase names of the signed headers, sorted.
    pub signed_headers: Vec<String>,
    /// Lowercase hex signature.
    pub signature: String,
}

impl AuthorizationHeader {
    /// Credential scope: `<ak>/<date>/<region>/<service>/sign_request`.
    pub fn credential_scope(&self) -> String {
        format!(
            "{}/{}/{}/{}/{TERMINATOR}",
            self.access_key_id, self.date, self.region, self.service
        )
    }

    /// Parse an `Authorization` header value.
    pub fn parse(s: &str) -> Result<Self> {
        let rest = s
            .trim()
            .strip_prefix(ALGORITHM)
            .and_then(|v| v.strip_prefix(' '))
            .ok_or_else(|| {
                Error::invalid_input(format!("authorization is not signed with {ALGORITHM}"))
            })?;

        let (mut credential, mut signed_headers, mut signature) = (None, None, None);
        for field in rest.split(',') {
            let (key, value) = field.trim().split_once('=').ok_or_else(|| {
                Error::invalid_input(format!("malformed authorization field {field:?}"))
            })?;
            let slot = match key {
                "Credential" => &mut credential,
                "SignedHeaders" => &mut signed_headers,
                "Signature" => &mut signature,
                _ => {
                    return Err(Error::invalid_input(format!(
                        "unknown authorization field {key:?}"
                    )))
                }
            };
            if slot.replace(value).is_some() {
                return Err(Error::invalid_input(format!(
                    "duplicated authorization field {key:?}"
                )));
            }
        }

        let (Some(credential), Some(signed_headers), Some(signature)) =
            (credential, signed_headers, signature)
        else {
            return Err(Error::invalid_input("signature not found in header"));
        };

        let scope: Vec<&str> = credential.split('/').collect();
        let [access_key_id, date, region, service, terminator] = scope.as_slice() else {
            return Err(Error::invalid_input(format!(
                "credential scope {credential:?} must have five segments"
            )));
        };
        if *terminator != TERMINATOR || scope.iter().any(|v| v.is_empty()) {
            return Err(Error::invalid_input(format!(
                "credential scope {credential:?} is malformed"
            )));
        }
        if signature.is_empty() {
            return Err(Error::invalid_input("signature not found in header"));
        }

        let signed_headers: Vec<String> = signed_headers
            .split(';')
            .filter(|v| !v.is_empty())
            .map(|v| v.to_ascii_lowercase())
            .collect();
        if signed_headers.is_empty() {
            return Err(Error::invalid_input("authorization signs no headers"));
        }

        Ok(Self {
            access_key_id: access_key_id.to_string(),
            date: date.to_string(),
            region: region.to_string(),
            service: service.to_string(),
            signed_headers,
            signature: signature.to_string(),
        })
    }
}

impl Display for AuthorizationHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{ALGORITHM} Credential={},SignedHeaders={},Signature={}",
            self.credential_scope(),
            self.signed_headers.join(";"),
            self.signature
        )
    }
}

impl FromStr for AuthorizationHeader {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
