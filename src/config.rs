//! Layered configuration loaded with figment.
//!
//! Sources, highest priority first:
//! 1. Environment variables (`SUPAGUARD_*`, `__` separates sections)
//! 2. `supaguard.toml` in the working directory
//! 3. Built-in defaults
//!
//! `SUPAGUARD_ASSISTANT__API_KEY` maps to `assistant.api_key`,
//! `SUPAGUARD_BASIC__ADMIN_KEY` to `basic.admin_key`, and so on.

use crate::error::GuardError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

pub const CONFIG_FILE: &str = "supaguard.toml";
pub const ENV_PREFIX: &str = "SUPAGUARD_";

const MIN_COOKIE_SECRET_LEN: usize = 64;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub basic: BasicConfig,
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub loglevel: String,
    /// Operator key guarding target registration and audits. Must be set.
    pub admin_key: String,
    /// Master key for the private session cookie; random per process when unset.
    pub cookie_secret: Option<String>,
    pub insecure_cookie: bool,
    pub database_url: String,
    pub body_limit: usize,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            admin_key: String::new(),
            cookie_secret: None,
            insecure_cookie: false,
            database_url: "sqlite:supaguard.sqlite".to_string(),
            body_limit: 64 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub management_url: Url,
    /// Personal access token for the management API; PITR checks are skipped without it.
    pub access_token: Option<String>,
    pub proxy: Option<Url>,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    pub retry_max_times: usize,
    pub users_per_page: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            management_url: Url::parse("https://api.supabase.com")
                .expect("default management url is valid"),
            access_token: None,
            proxy: None,
            connect_timeout_secs: 5,
            timeout_secs: 15,
            retry_max_times: 3,
            users_per_page: 100,
        }
    }
}

/// Auth provider backing the tool's own user accounts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub url: Option<Url>,
    pub anon_key: String,
    pub profile_table: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: String::new(),
            profile_table: "user".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub base_url: Url,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub requests_per_minute: u32,
    pub system_prompt: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("https://api.openai.com/v1/")
                .expect("default assistant url is valid"),
            api_key: None,
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            top_p: 1.0,
            requests_per_minute: 20,
            system_prompt: "You are a helpful assistant specializing in Supabase security \
                            and related queries. Recommend concrete steps to resolve the \
                            issue described by the user."
                .to_string(),
        }
    }
}

impl Config {
    /// Build the provider chain without extracting.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load and validate configuration from all sources.
    pub fn load() -> Result<Self, GuardError> {
        let cfg: Config = Self::figment().extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), GuardError> {
        if self.basic.admin_key.trim().is_empty() {
            return Err(GuardError::InvalidConfig {
                field: "basic.admin_key",
                reason: "must not be empty".to_string(),
            });
        }
        if let Some(secret) = self.basic.cookie_secret.as_deref()
            && secret.len() < MIN_COOKIE_SECRET_LEN
        {
            return Err(GuardError::InvalidConfig {
                field: "basic.cookie_secret",
                reason: format!("must be at least {MIN_COOKIE_SECRET_LEN} bytes"),
            });
        }
        if self.assistant.requests_per_minute == 0 {
            return Err(GuardError::InvalidConfig {
                field: "assistant.requests_per_minute",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
