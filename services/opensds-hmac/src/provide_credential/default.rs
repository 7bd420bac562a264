use async_trait::async_trait;
use mcsign_core::Result;
use mcsign_core::{Context, ProvideCredential, ProvideCredentialChain};

use crate::provide_credential::{EnvCredentialProvider, KeystoneCredentialProvider};
use crate::{Config, Credential};

/// DefaultCredentialProvider will try to load credential from different sources.
///
/// Resolution order:
///
/// 1. Environment variables
/// 2. Keystone, when the config names an identity service and an access key
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultCredentialProvider {
    /// Create a new DefaultCredentialProvider that only reads the environment.
    pub fn new() -> Self {
        let chain = ProvideCredentialChain::new().push(EnvCredentialProvider::new());

        Self { chain }
    }

    /// Create a DefaultCredentialProvider from config.
    ///
    /// Keystone joins the chain when `auth_url` is set, in which case the
    /// rest of its config must be valid.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let mut chain = ProvideCredentialChain::new().push(EnvCredentialProvider::new());
        if cfg.auth_url.is_some() {
            chain = chain.push(KeystoneCredentialProvider::from_config(cfg)?);
        }

        Ok(Self { chain })
    }

    /// Create with a custom credential chain.
    pub fn with_chain(chain: ProvideCredentialChain<Credential>) -> Self {
        Self { chain }
    }

    /// Add a credential provider to the front of the default chain.
    ///
    /// This allows adding a high-priority credential source that will be tried
    /// before all other providers in the default chain.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mcsign_opensds_hmac::{DefaultCredentialProvider, StaticCredentialProvider};
    ///
    /// let provider = DefaultCredentialProvider::new()
    ///     .push_front(StaticCredentialProvider::new("access_key_id", "secret_access_key"));
    /// ```
    pub fn push_front(
        mut self,
        provider: impl ProvideCredential<Credential = Credential> + 'static,
    ) -> Self {
        self.chain = self.chain.push_front(provider);
        self
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}
