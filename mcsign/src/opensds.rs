//! OPENSDS-HMAC-SHA256 support with convenience APIs.

// Re-export all OPENSDS-HMAC-SHA256 signing types
pub use mcsign_opensds_hmac::*;

#[cfg(feature = "default-context")]
pub use default::*;

#[cfg(feature = "default-context")]
mod default {
    use std::time::Duration;

    use http::request::Parts;
    use mcsign_core::{time::now, Context, Result};
    use mcsign_opensds_hmac::{
        Config, Credentials, DefaultCredentialProvider, IdentityClient, RequestSigner, Verifier,
    };

    use crate::default_context;

    /// Credentials fetched by [`default_signer`] are reused this long.
    pub const DEFAULT_CREDENTIAL_TTL: Duration = Duration::from_secs(300);

    /// A [`RequestSigner`] bundled with the [`Context`] it runs in.
    #[derive(Debug, Clone)]
    pub struct DefaultSigner {
        ctx: Context,
        signer: RequestSigner,
    }

    impl DefaultSigner {
        /// Bundle a signer with a context.
        pub fn new(ctx: Context, signer: RequestSigner) -> Self {
            Self { ctx, signer }
        }

        /// Context used to fetch credentials.
        pub fn context(&self) -> &Context {
            &self.ctx
        }

        /// Stamp `X-Auth-Date` and `Authorization` on the request, signed now.
        pub async fn sign(
            &self,
            req: &mut Parts,
            body: &[u8],
            service: &str,
            region: &str,
        ) -> Result<()> {
            self.signer
                .sign_request(&self.ctx, req, body, service, region, now())
                .await
        }
    }

    /// Create a default signer with standard configuration
    ///
    /// This function creates a signer with:
    /// - Default context (reqwest HTTP client, OS environment)
    /// - Default credential provider (env vars, then Keystone when `OS_AUTH_URL` is set)
    /// - A credential cache of [`DEFAULT_CREDENTIAL_TTL`]
    pub fn default_signer() -> Result<DefaultSigner> {
        let ctx = default_context();
        let cfg = Config::new().from_env(&ctx);
        let credentials = Credentials::new(DefaultCredentialProvider::from_config(&cfg)?)
            .with_cache_ttl(DEFAULT_CREDENTIAL_TTL);

        Ok(DefaultSigner::new(ctx, RequestSigner::new(credentials)))
    }

    /// Create a verifier that looks access keys up in the Keystone named by the environment.
    pub fn default_verifier() -> Result<(Context, Verifier)> {
        let ctx = default_context();
        let cfg = Config::new().from_env(&ctx);
        let client = IdentityClient::from_config(&cfg)?;

        Ok((ctx, Verifier::keystone(client)))
    }
}
