use mcsign_core::{Context, OsEnv};
use mcsign_http_send_reqwest::ReqwestHttpSend;

/// Create a Context that sends requests with reqwest and reads the OS environment.
pub fn default_context() -> Context {
    Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv)
}
