use std::fmt::{Debug, Formatter};

use crate::constants::*;
use mcsign_core::{utils::Redact, Context};

/// Config carries all the configuration for the OPENSDS-HMAC-SHA256 signer
/// and its Keystone identity service.
#[derive(Clone, Default)]
pub struct Config {
    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`OPENSDS_ACCESS_KEY_ID`]
    pub access_key_id: Option<String>,
    /// `secret_access_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`OPENSDS_SECRET_ACCESS_KEY`]
    pub secret_access_key: Option<String>,
    /// `auth_url` is the Keystone endpoint, for example `http://127.0.0.1/identity`.
    ///
    /// - this field if it's `is_some`
    /// - env value: [`OS_AUTH_URL`]
    pub auth_url: Option<String>,
    /// `auth_token` is a pre-issued Keystone token.
    ///
    /// - this field if it's `is_some`
    /// - env value: [`OS_AUTH_TOKEN`]
    pub auth_token: Option<String>,
    /// - env value: [`OS_USERNAME`]
    pub username: Option<String>,
    /// - env value: [`OS_PASSWORD`]
    pub password: Option<String>,
    /// - env value: [`OS_USER_DOMAIN_NAME`]
    pub user_domain_name: Option<String>,
    /// - env value: [`OS_PROJECT_NAME`]
    pub project_name: Option<String>,
    /// - env value: [`OS_PROJECT_DOMAIN_NAME`]
    pub project_domain_name: Option<String>,
}

impl Config {
    /// Create a new Config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set access_key_id
    pub fn with_access_key_id(mut self, access_key_id: impl Into<String>) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self
    }

    /// Set secret_access_key
    pub fn with_secret_access_key(mut self, secret_access_key: impl Into<String>) -> Self {
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Set auth_url
    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = Some(auth_url.into());
        self
    }

    /// Set auth_token
    pub fn with_auth_token(mut self, auth_token: impl Into<String>) -> Self {
        self.auth_token = Some(auth_token.into());
        self
    }

    /// Set username and password for Keystone password authentication.
    pub fn with_password_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set user_domain_name
    pub fn with_user_domain_name(mut self, v: impl Into<String>) -> Self {
        self.user_domain_name = Some(v.into());
        self
    }

    /// Set project_name
    pub fn with_project_name(mut self, v: impl Into<String>) -> Self {
        self.project_name = Some(v.into());
        self
    }

    /// Set project_domain_name
    pub fn with_project_domain_name(mut self, v: impl Into<String>) -> Self {
        self.project_domain_name = Some(v.into());
        self
    }

    /// Load config from env.
    ///
    /// Fields already set are kept.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let fields = [
            (&mut self.access_key_id, OPENSDS_ACCESS_KEY_ID),
            (&mut self.secret_access_key, OPENSDS_SECRET_ACCESS_KEY),
            (&mut self.auth_url, OS_AUTH_URL),
            (&mut self.auth_token, OS_AUTH_TOKEN),
            (&mut self.username, OS_USERNAME),
            (&mut self.password, OS_PASSWORD),
            (&mut self.user_domain_name, OS_USER_DOMAIN_NAME),
            (&mut self.project_name, OS_PROJECT_NAME),
            (&mut self.project_domain_name, OS_PROJECT_DOMAIN_NAME),
        ];

        for (field, key) in fields {
            if let Some(v) = ctx.env_var(key) {
                field.get_or_insert(v);
            }
        }

        self
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("access_key_id", &self.access_key_id.as_ref().map(Redact::from))
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(Redact::from),
            )
            .field("auth_url", &self.auth_url)
            .field("auth_token", &self.auth_token.as_ref().map(Redact::from))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(Redact::from))
            .field("user_domain_name", &self.user_domain_name)
            .field("project_name", &self.project_name)
            .field("project_domain_name", &self.project_domain_name)
            .finish()
    }
}
