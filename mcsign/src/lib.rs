//! Sign and verify multi-cloud gateway requests with OPENSDS-HMAC-SHA256.
//!
//! This crate re-exports [`mcsign_core`] and the scheme crates behind
//! features, plus ready-made wiring for the common case.
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> mcsign::Result<()> {
//! let signer = mcsign::opensds::default_signer()?;
//!
//! let mut req = http::Request::get("https://gateway/v1/backups")
//!     .body(())?
//!     .into_parts()
//!     .0;
//! signer.sign(&mut req, b"", "backup", "default").await?;
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use mcsign_core::*;

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::default_context;

#[cfg(feature = "opensds")]
pub mod opensds;
