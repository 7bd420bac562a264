mod default;
pub use default::DefaultCredentialProvider;

mod env;
pub use env::EnvCredentialProvider;

mod keystone;
pub use keystone::KeystoneCredentialProvider;

mod r#static;
pub use r#static::StaticCredentialProvider;
