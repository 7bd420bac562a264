use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, StatusCode};
use log::{debug, warn};
use mcsign_core::time::{now, parse_rfc3339, DateTime};
use mcsign_core::utils::Redact;
use mcsign_core::{Context, Error, Result};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

use crate::constants::{X_AUTH_TOKEN, X_SUBJECT_TOKEN};
use crate::Config;

/// Tokens are refreshed this many seconds before Keystone expires them.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

fn token_is_fresh(expires_at: &DateTime) -> bool {
    now() + chrono::TimeDelta::seconds(TOKEN_REFRESH_MARGIN_SECS) < *expires_at
}

/// Password credentials for Keystone v3 authentication.
#[derive(Clone, Default)]
pub struct PasswordAuth {
    /// User name.
    pub username: String,
    /// User password.
    pub password: String,
    /// Domain of the user, `Default` when empty.
    pub user_domain_name: String,
    /// Project to scope the token to.
    pub project_name: Option<String>,
    /// Domain of the project, the user domain when absent.
    pub project_domain_name: Option<String>,
}

impl PasswordAuth {
    /// Create password credentials for a user in the `Default` domain.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            user_domain_name: "Default".to_string(),
            project_name: None,
            project_domain_name: None,
        }
    }

    /// Scope the token to a project.
    pub fn with_project(mut self, project_name: impl Into<String>) -> Self {
        self.project_name = Some(project_name.into());
        self
    }

    fn request_body(&self) -> serde_json::Value {
        let user_domain = if self.user_domain_name.is_empty() {
            "Default"
        } else {
            &self.user_domain_name
        };

        let mut body = json!({
            "auth": {
                "identity": {
                    "methods": ["password"],
                    "password": {
                        "user": {
                            "name": self.username,
                            "domain": { "name": user_domain },
                            "password": self.password,
                        }
                    }
                }
            }
        });

        if let Some(project) = &self.project_name {
            let project_domain = self.project_domain_name.as_deref().unwrap_or(user_domain);
            body["auth"]["scope"] = json!({
                "project": {
                    "name": project,
                    "domain": { "name": project_domain },
                }
            });
        }

        body
    }
}

impl Debug for PasswordAuth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordAuth")
            .field("username", &self.username)
            .field("password", &Redact::from(&self.password))
            .field("user_domain_name", &self.user_domain_name)
            .field("project_name", &self.project_name)
            .field("project_domain_name", &self.project_domain_name)
            .finish()
    }
}

#[derive(Clone)]
enum IdentityAuth {
    Token(String),
    Password(PasswordAuth),
}

/// IdentityClient talks to a Keystone v3 identity service.
///
/// It authenticates either with a pre-issued token or with password
/// credentials. Password tokens are cached and reissued one minute before
/// they expire.
#[derive(Clone)]
pub struct IdentityClient {
    auth_url: String,
    auth: IdentityAuth,
    token: Arc<RwLock<Option<(String, DateTime)>>>,
}

impl IdentityClient {
    /// Create a client that sends the given token as is.
    pub fn with_token(auth_url: &str, token: impl Into<String>) -> Self {
        Self::new(auth_url, IdentityAuth::Token(token.into()))
    }

    /// Create a client that issues its own tokens with password credentials.
    pub fn with_password(auth_url: &str, auth: PasswordAuth) -> Self {
        Self::new(auth_url, IdentityAuth::Password(auth))
    }

    fn new(auth_url: &str, auth: IdentityAuth) -> Self {
        let auth_url = auth_url.trim_end_matches('/');
        let auth_url = auth_url.strip_suffix("/v3").unwrap_or(auth_url);

        Self {
            auth_url: auth_url.to_string(),
            auth,
            token: Arc::new(RwLock::new(None)),
        }
    }

    /// Build a client from config.
    ///
    /// `auth_url` is required, and so is either `auth_token` or a
    /// `username`/`password` pair. A token wins when both are set.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let auth_url = cfg
            .auth_url
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config_invalid("keystone auth_url is not set"))?;

        if let Some(token) = cfg.auth_token.as_deref().filter(|v| !v.is_empty()) {
            return Ok(Self::with_token(auth_url, token));
        }

        match (&cfg.username, &cfg.password) {
            (Some(username), Some(password)) if !username.is_empty() => {
                let mut auth = PasswordAuth::new(username, password);
                if let Some(v) = &cfg.user_domain_name {
                    auth.user_domain_name = v.clone();
                }
                auth.project_name = cfg.project_name.clone();
                auth.project_domain_name = cfg.project_domain_name.clone();
                Ok(Self::with_password(auth_url, auth))
            }
            _ => Err(Error::config_invalid(
                "keystone needs either auth_token or username and password",
            )),
        }
    }

    /// Identity service root, without a trailing `/v3`.
    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    /// Get a token to authenticate against the identity service.
    pub async fn token(&self, ctx: &Context) -> Result<String> {
        let auth = match &self.auth {
            IdentityAuth::Token(token) => return Ok(token.clone()),
            IdentityAuth::Password(auth) => auth,
        };

        if let Some((token, expires_at)) = self.token.read().await.as_ref() {
            if token_is_fresh(expires_at) {
                return Ok(token.clone());
            }
        }

        let mut cache = self.token.write().await;
        if let Some((token, expires_at)) = cache.as_ref() {
            if token_is_fresh(expires_at) {
                return Ok(token.clone());
            }
        }

        let (token, expires_at) = self.issue_token(ctx, auth).await?;
        *cache = Some((token.clone(), expires_at));
        Ok(token)
    }

    async fn issue_token(&self, ctx: &Context, auth: &PasswordAuth) -> Result<(String, DateTime)> {
        let url = format!("{}/v3/auth/tokens", self.auth_url);
        debug!("issuing keystone token from {url} for user {}", auth.username);

        let body = serde_json::to_vec(&auth.request_body())?;
        let req = http::Request::builder()
            .method(Method::POST)
            .uri(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(Bytes::from(body))
            .map_err(|e| {
                Error::credential_fetch_failed("failed to build keystone token request")
                    .with_source(e)
            })?;

        let resp = ctx.http_send_as_string(req).await.map_err(|e| {
            Error::credential_fetch_failed("failed to send keystone token request").with_source(e)
        })?;
        if !resp.status().is_success() {
            return Err(Error::credential_fetch_failed(format!(
                "keystone token request failed: status={}, body={}",
                resp.status(),
                resp.body()
            )));
        }

        let token = resp
            .headers()
            .get(X_SUBJECT_TOKEN)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::credential_fetch_failed("keystone response carries no X-Subject-Token")
            })?;

        let content: TokenResponse = serde_json::from_str(resp.body()).map_err(|e| {
            Error::credential_fetch_failed("failed to parse keystone token response")
                .with_source(e)
        })?;
        let expires_at = parse_rfc3339(&content.token.expires_at).map_err(|e| {
            Error::credential_fetch_failed("failed to parse keystone token expiry").with_source(e)
        })?;

        debug!("keystone token issued, expires at {expires_at}");
        Ok((token, expires_at))
    }

    /// List EC2 style credentials visible to the authenticated user.
    ///
    /// A `401` drops the cached token before failing, so the next call
    /// authenticates again. The request itself is never repeated.
    pub(crate) async fn list_credentials(&self, ctx: &Context) -> Result<Vec<KeystoneCredential>> {
        let url = format!("{}/v3/credentials", self.auth_url);

        let token = self.token(ctx).await?;
        let req = http::Request::builder()
            .method(Method::GET)
            .uri(&url)
            .header(X_AUTH_TOKEN, token)
            .body(Bytes::new())
            .map_err(|e| {
                Error::credential_fetch_failed("failed to build keystone credentials request")
                    .with_source(e)
            })?;

        let resp = ctx.http_send_as_string(req).await.map_err(|e| {
            Error::credential_fetch_failed("failed to send keystone credentials request")
                .with_source(e)
        })?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!("keystone token was rejected, dropping it");
            self.token.write().await.take();
        }
        if !status.is_success() {
            return Err(Error::credential_fetch_failed(format!(
                "keystone credentials request failed: status={}, body={}",
                status,
                resp.body()
            )));
        }

        let content: CredentialsResponse = serde_json::from_str(resp.body()).map_err(|e| {
            Error::credential_fetch_failed("failed to parse keystone credentials response")
                .with_source(e)
        })?;
        debug!("keystone listed {} credentials", content.credentials.len());
        Ok(content.credentials)
    }
}

impl Debug for IdentityClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("IdentityClient");
        s.field("auth_url", &self.auth_url);
        match &self.auth {
            IdentityAuth::Token(token) => s.field("token", &Redact::from(token)),
            IdentityAuth::Password(auth) => s.field("password_auth", auth),
        };
        s.finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: TokenBody,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    expires_at: String,
}

#[derive(Debug, Deserialize)]
struct CredentialsResponse {
    credentials: Vec<KeystoneCredential>,
}

/// One entry of the Keystone `/v3/credentials` listing.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct KeystoneCredential {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    /// JSON document holding `access` and `secret`.
    pub blob: String,
}
