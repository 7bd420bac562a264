use crate::{constants::*, Credential};
use async_trait::async_trait;
use mcsign_core::{Context, ProvideCredential, Result};

/// EnvCredentialProvider loads credentials from environment variables.
///
/// This provider looks for the following environment variables:
/// - `OPENSDS_ACCESS_KEY_ID`: The access key ID
/// - `OPENSDS_SECRET_ACCESS_KEY`: The secret access key
///
/// Returns `Ok(None)` unless both are set and non-empty.
#[derive(Debug, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let access_key_id = ctx.env_var(OPENSDS_ACCESS_KEY_ID).filter(|v| !v.is_empty());
        let secret_access_key = ctx
            .env_var(OPENSDS_SECRET_ACCESS_KEY)
            .filter(|v| !v.is_empty());

        match (access_key_id, secret_access_key) {
            (Some(ak), Some(sk)) => Ok(Some(Credential::new(ak, sk, ENV_PROVIDER_NAME))),
            _ => Ok(None),
        }
    }

    fn name(&self) -> &'static str {
        ENV_PROVIDER_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcsign_core::StaticEnv;
    use std::collections::HashMap;
    use test_case::test_case;

    fn context(envs: &[(&str, &str)]) -> Context {
        Context::new().with_env(StaticEnv {
            envs: envs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        })
    }

    #[tokio::test]
    async fn test_env_credential_provider() -> Result<()> {
        let ctx = context(&[
            (OPENSDS_ACCESS_KEY_ID, "test_access_key"),
            (OPENSDS_SECRET_ACCESS_KEY, "test_secret_key"),
        ]);

        let cred = EnvCredentialProvider::new()
            .provide_credential(&ctx)
            .await?
            .expect("credential must be provided");
        assert_eq!(cred.access_key_id, "test_access_key");
        assert_eq!(cred.secret_access_key, "test_secret_key");
        assert_eq!(cred.provider_name, "EnvProvider");

        Ok(())
    }

    #[test_case(&[]; "nothing set")]
    #[test_case(&[(OPENSDS_ACCESS_KEY_ID, "test_access_key")]; "secret missing")]
    #[test_case(&[(OPENSDS_ACCESS_KEY_ID, ""), (OPENSDS_SECRET_ACCESS_KEY, "sk")]; "empty access key")]
    #[tokio::test]
    async fn test_env_credential_provider_partial(envs: &[(&str, &str)]) {
        let cred = EnvCredentialProvider::new()
            .provide_credential(&context(envs))
            .await
            .expect("provider must not fail");
        assert!(cred.is_none());
    }
}
