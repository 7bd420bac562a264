use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use mcsign_core::{Context, Error, ProvideCredential, Result, SigningCredential};
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::Credential;

/// Credentials owns a credential provider and hands out its values.
///
/// Without a TTL every [`Credentials::get`] goes to the provider. With
/// [`Credentials::with_cache_ttl`] a successful value is reused until it is
/// older than the TTL; a failed retrieval clears the cache.
///
/// Cloning is cheap and clones share the same cache.
#[derive(Clone)]
pub struct Credentials {
    provider: Arc<dyn ProvideCredential<Credential = Credential>>,
    ttl: Option<Duration>,
    cache: Arc<RwLock<Option<(Credential, Instant)>>>,
}

impl Credentials {
    /// Create a new holder for the given provider.
    pub fn new(provider: impl ProvideCredential<Credential = Credential>) -> Self {
        Self {
            provider: Arc::new(provider),
            ttl: None,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Reuse a retrieved credential for `ttl`.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Label of the underlying provider.
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Drop the cached credential so the next `get` asks the provider again.
    pub async fn invalidate(&self) {
        self.cache.write().await.take();
    }

    /// Get a credential from the cache or the provider.
    ///
    /// - `Ok(None)` from the provider is reported as [`mcsign_core::ErrorKind::CredentialMissing`].
    /// - An empty `provider_name` is filled with the provider's label.
    /// - Provider errors are returned unchanged.
    pub async fn get(&self, ctx: &Context) -> Result<Credential> {
        let Some(ttl) = self.ttl else {
            return self.retrieve(ctx).await;
        };

        if let Some((cred, at)) = self.cache.read().await.as_ref() {
            if at.elapsed() < ttl {
                return Ok(cred.clone());
            }
        }

        let mut cache = self.cache.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some((cred, at)) = cache.as_ref() {
            if at.elapsed() < ttl {
                return Ok(cred.clone());
            }
        }

        match self.retrieve(ctx).await {
            Ok(cred) => {
                *cache = Some((cred.clone(), Instant::now()));
                Ok(cred)
            }
            Err(err) => {
                *cache = None;
                Err(err)
            }
        }
    }

    async fn retrieve(&self, ctx: &Context) -> Result<Credential> {
        let name = self.provider.name();
        let mut cred = self
            .provider
            .provide_credential(ctx)
            .await?
            .ok_or_else(|| Error::credential_missing("credential is missing"))?;

        if cred.provider_name.is_empty() {
            cred.provider_name = name.to_string();
        }
        if !cred.is_valid() {
            return Err(Error::credential_fetch_failed(format!(
                "provider {name} returned an empty access key or secret"
            )));
        }

        debug!("credential retrieved from {name}: {cred:?}");
        Ok(cred)
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("provider", &self.provider)
            .field("ttl", &self.ttl)
            .finish()
    }
}
