//! Clients for the external collaborators: the target platform, the auth
//! provider behind the tool's own accounts, and the chat-completion assistant.
//!
//! Handlers only see the traits below; `main` wires in the HTTP-backed
//! implementations and tests substitute fakes.

pub mod assistant_api;
pub mod auth_api;
pub mod platform_api;

use crate::config::PlatformConfig;
use crate::error::GuardError;
use crate::types::account::{AuthSession, NewAccount, ProfileRow};
use crate::types::facts::{ProjectFact, TableSecurityFact, UserSecurityFact};
use crate::types::target::TargetConnection;
use async_trait::async_trait;
use backon::ExponentialBuilder;
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub use assistant_api::OpenAiAssistant;
pub use auth_api::GoTrueAccounts;
pub use platform_api::PlatformApi;

/// Read-only security facts of a target project, plus the one remediation the tool offers.
#[async_trait]
pub trait SecurityPlatform: Send + Sync {
    async fn table_facts(
        &self,
        target: &TargetConnection,
    ) -> Result<Vec<TableSecurityFact>, GuardError>;

    async fn user_facts(
        &self,
        target: &TargetConnection,
    ) -> Result<Vec<UserSecurityFact>, GuardError>;

    /// `None` when no management access token is configured.
    async fn project_facts(&self) -> Result<Option<Vec<ProjectFact>>, GuardError>;

    async fn enable_rls(&self, target: &TargetConnection, table: &str) -> Result<(), GuardError>;
}

#[async_trait]
pub trait AccountProvider: Send + Sync {
    /// Register the account and return the provider's user id.
    async fn sign_up(&self, account: &NewAccount) -> Result<String, GuardError>;

    async fn insert_profile(&self, profile: &ProfileRow) -> Result<(), GuardError>;

    /// Send a one-time password to an existing user.
    async fn send_otp(&self, email: &str) -> Result<(), GuardError>;

    async fn verify_otp(&self, email: &str, token: &str) -> Result<AuthSession, GuardError>;

    async fn current_user(&self, access_token: &str) -> Result<Value, GuardError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), GuardError>;
}

#[async_trait]
pub trait Assistant: Send + Sync {
    async fn suggest(&self, issue: &str) -> Result<String, GuardError>;
}

/// Shared HTTP client for all upstreams.
pub fn build_http_client(cfg: &PlatformConfig) -> Result<reqwest::Client, GuardError> {
    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("supaguard/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .timeout(Duration::from_secs(cfg.timeout_secs));
    if let Some(proxy_url) = cfg.proxy.as_ref() {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }
    Ok(builder.build()?)
}

pub(crate) fn retry_policy(max_times: usize) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_secs(1))
        .with_max_delay(Duration::from_secs(3))
        .with_max_times(max_times)
        .with_jitter()
}

/// Join `path` onto `base`, treating `base` as a directory even without a trailing slash.
pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url, GuardError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    Ok(base.join(path)?)
}

/// Map a non-success upstream status to an error, passing success through.
pub(crate) fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, GuardError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(GuardError::UpstreamStatus(status))
    }
}
