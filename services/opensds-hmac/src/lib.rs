//! OPENSDS-HMAC-SHA256 signing for the multi-cloud backup gateway.
//!
//! The scheme is an AWS SigV4 look-alike: a canonical request is hashed into
//! a string to sign, which is signed with a key derived from the secret, the
//! date, the region and the service.
//!
//! ## Example
//!
//! ```no_run
//! use mcsign_core::{time, Context, Result};
//! use mcsign_opensds_hmac::{Credentials, RequestSigner, StaticCredentialProvider};
//!
//! # async fn example() -> Result<()> {
//! let ctx = Context::new();
//! let signer = RequestSigner::new(Credentials::new(StaticCredentialProvider::new(
//!     "access_key",
//!     "secret_key",
//! )));
//!
//! let (mut parts, body) = http::Request::get("https://gateway/v1/backups")
//!     .body(Vec::<u8>::new())?
//!     .into_parts();
//! signer
//!     .sign_request(&ctx, &mut parts, &body, "backup", "default", time::now())
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod authorization;
pub use authorization::AuthorizationHeader;

mod config;
pub use config::Config;

mod constants;

mod credential;
pub use credential::Credential;

mod credentials;
pub use credentials::Credentials;

mod identity;
pub use identity::{IdentityClient, PasswordAuth};

mod provide_credential;
pub use provide_credential::*;

mod sign_request;
pub use sign_request::{RequestSigner, SigningParams};

mod verify;
pub use verify::Verifier;
