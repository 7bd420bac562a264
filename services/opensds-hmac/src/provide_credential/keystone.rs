use async_trait::async_trait;
use log::debug;
use mcsign_core::{Context, Error, ProvideCredential, Result};
use serde::Deserialize;

use crate::constants::KEYSTONE_PROVIDER_NAME;
use crate::{Config, Credential, IdentityClient};

/// KeystoneCredentialProvider looks up the secret of one access key in
/// Keystone's EC2 credential store.
///
/// Each call lists `/v3/credentials`, decodes every entry's `blob` and returns
/// the first whose `access` equals the configured access key. No entry
/// matching is reported as [`mcsign_core::ErrorKind::CredentialMissing`].
///
/// References:
/// - [Identity API v3: Credentials](https://docs.openstack.org/api-ref/identity/v3/#credentials)
#[derive(Debug, Clone)]
pub struct KeystoneCredentialProvider {
    client: IdentityClient,
    access_key_id: String,
}

impl KeystoneCredentialProvider {
    /// Create a provider that looks up `access_key_id` through `client`.
    pub fn new(client: IdentityClient, access_key_id: impl Into<String>) -> Self {
        Self {
            client,
            access_key_id: access_key_id.into(),
        }
    }

    /// Create a provider from config.
    ///
    /// Needs `access_key_id` plus whatever [`IdentityClient::from_config`] needs.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let access_key_id = cfg
            .access_key_id
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config_invalid("access_key_id to look up is not set"))?;

        Ok(Self::new(IdentityClient::from_config(cfg)?, access_key_id))
    }

    /// Access key this provider looks up.
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }
}

#[async_trait]
impl ProvideCredential for KeystoneCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let entries = self.client.list_credentials(ctx).await?;

        for entry in entries {
            let blob: Ec2Blob = serde_json::from_str(&entry.blob).map_err(|e| {
                Error::credential_fetch_failed(format!(
                    "failed to parse blob of keystone credential {}",
                    entry.id
                ))
                .with_source(e)
            })?;

            if blob.access == self.access_key_id {
                debug!(
                    "access key found in keystone credential {} of type {}",
                    entry.id, entry.kind
                );
                return Ok(Some(Credential::new(
                    blob.access,
                    blob.secret,
                    KEYSTONE_PROVIDER_NAME,
                )));
            }
        }

        Err(Error::credential_missing("credential is missing"))
    }

    fn name(&self) -> &'static str {
        KEYSTONE_PROVIDER_NAME
    }
}

#[derive(Deserialize)]
struct Ec2Blob {
    access: String,
    secret: String,
}
