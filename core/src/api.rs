use crate::{Context, Result};
use std::fmt::Debug;

/// SigningCredential is the trait used by signer as the signing credential.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Check if the credential is valid.
    fn is_valid(&self) -> bool;
}

impl<T: SigningCredential> SigningCredential for Option<T> {
    fn is_valid(&self) -> bool {
        let Some(cred) = self else {
            return false;
        };

        cred.is_valid()
    }
}

/// ProvideCredential is the trait used by signer to load the credential.
///
/// Implementations may reach out to the network (for example an identity
/// service), so callers must treat `provide_credential` as potentially slow.
/// Dropping the returned future cancels the lookup.
#[async_trait::async_trait]
pub trait ProvideCredential: Debug + Send + Sync + Unpin + 'static {
    /// Credential returned by this provider.
    type Credential: Send + Sync + Unpin + 'static;

    /// Load the credential from current context.
    ///
    /// - Returns `Ok(Some(cred))` if the credential is found.
    /// - Returns `Ok(None)` if this provider has nothing to offer, so a chain can move on.
    /// - Returns `Err(err)` if the lookup itself failed.
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>>;

    /// A stable label identifying the provider kind.
    ///
    /// Defaults to the implementing type's name without its module path.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or_default()
    }
}
