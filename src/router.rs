use crate::api::{AccountProvider, Assistant, SecurityPlatform};
use crate::db::TargetsStorage;
use crate::handlers::{account, assistant, audit, health, targets};
use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    routing::{delete, get, post},
};
use axum_extra::extract::cookie::Key;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared handler state. Every collaborator is injected, none is global.
#[derive(Clone)]
pub struct GuardState {
    pub platform: Arc<dyn SecurityPlatform>,
    pub accounts: Arc<dyn AccountProvider>,
    pub assistant: Arc<dyn Assistant>,
    pub targets: TargetsStorage,
    pub assistant_limiter: Arc<DefaultDirectRateLimiter>,
    pub admin_key: Arc<str>,
    pub cookie_key: Key,
    pub insecure_cookie: bool,
}

impl GuardState {
    pub fn new(
        platform: Arc<dyn SecurityPlatform>,
        accounts: Arc<dyn AccountProvider>,
        assistant: Arc<dyn Assistant>,
        targets: TargetsStorage,
        admin_key: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            platform,
            accounts,
            assistant,
            targets,
            assistant_limiter: assistant_limiter(20),
            admin_key: admin_key.into(),
            cookie_key: Key::generate(),
            insecure_cookie: false,
        }
    }

    /// Use a fixed cookie key so sessions survive restarts. `secret` must be at least 64 bytes.
    pub fn with_cookie_secret(mut self, secret: &str) -> Self {
        self.cookie_key = Key::from(secret.as_bytes());
        self
    }

    pub fn with_insecure_cookie(mut self, insecure: bool) -> Self {
        self.insecure_cookie = insecure;
        self
    }

    pub fn with_assistant_rate(mut self, per_minute: u32) -> Self {
        self.assistant_limiter = assistant_limiter(per_minute);
        self
    }
}

fn assistant_limiter(per_minute: u32) -> Arc<DefaultDirectRateLimiter> {
    let per_minute = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)))
}

impl FromRef<GuardState> for Key {
    fn from_ref(state: &GuardState) -> Self {
        state.cookie_key.clone()
    }
}

pub fn guard_router(state: GuardState, body_limit: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/targets",
            post(targets::register_target).get(targets::list_targets),
        )
        .route("/api/targets/{id}", delete(targets::delete_target))
        .route("/api/audit", post(audit::audit_handler))
        .route("/api/audit/rls", post(audit::enable_rls_handler))
        .route("/api/ai", post(assistant::suggestion_handler))
        .route("/api/auth/signup", post(account::signup_handler))
        .route("/api/auth/signin", post(account::signin_handler))
        .route("/api/auth/verify-otp", post(account::verify_otp_handler))
        .route("/api/auth/user", get(account::current_user_handler))
        .route("/api/auth/logout", post(account::logout_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
