#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode},
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use supaguard::api::{AccountProvider, Assistant, SecurityPlatform};
use supaguard::db::TargetsStorage;
use supaguard::types::account::{AuthSession, NewAccount, ProfileRow};
use supaguard::types::facts::{ProjectFact, TableSecurityFact, UserSecurityFact};
use supaguard::types::target::TargetConnection;
use supaguard::{GuardError, GuardState, guard_router};
use tower::ServiceExt;

pub const ADMIN_KEY: &str = "operator-key";
pub const BODY_LIMIT: usize = 64 * 1024;
pub const KNOWN_EMAIL: &str = "ops@example.com";
pub const VALID_OTP: &str = "123456";
pub const ACCESS_TOKEN: &str = "jwt-access-token";

#[derive(Default)]
pub struct FakePlatform {
    pub tables: Vec<TableSecurityFact>,
    pub users: Vec<UserSecurityFact>,
    pub projects: Option<Vec<ProjectFact>>,
    pub users_status: Option<StatusCode>,
    pub enabled: Mutex<Vec<String>>,
    pub seen_keys: Mutex<Vec<String>>,
}

#[async_trait]
impl SecurityPlatform for FakePlatform {
    async fn table_facts(
        &self,
        target: &TargetConnection,
    ) -> Result<Vec<TableSecurityFact>, GuardError> {
        self.seen_keys.lock().unwrap().push(target.service_key.clone());
        Ok(self.tables.clone())
    }

    async fn user_facts(
        &self,
        _target: &TargetConnection,
    ) -> Result<Vec<UserSecurityFact>, GuardError> {
        match self.users_status {
            Some(status) => Err(GuardError::UpstreamStatus(status)),
            None => Ok(self.users.clone()),
        }
    }

    async fn project_facts(&self) -> Result<Option<Vec<ProjectFact>>, GuardError> {
        Ok(self.projects.clone())
    }

    async fn enable_rls(&self, _target: &TargetConnection, table: &str) -> Result<(), GuardError> {
        self.enabled.lock().unwrap().push(table.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeAccounts {
    pub fail_profile: bool,
    pub profiles: Mutex<Vec<ProfileRow>>,
    pub signed_out: Mutex<Vec<String>>,
}

#[async_trait]
impl AccountProvider for FakeAccounts {
    async fn sign_up(&self, account: &NewAccount) -> Result<String, GuardError> {
        if account.password.len() < 6 {
            return Err(GuardError::AuthRejected {
                code: "weak_password".to_string(),
                message: "Password should be at least 6 characters.".to_string(),
            });
        }
        Ok(format!("user-{}", account.email))
    }

    async fn insert_profile(&self, profile: &ProfileRow) -> Result<(), GuardError> {
        if self.fail_profile {
            return Err(GuardError::ProfileInsert("duplicate key".to_string()));
        }
        self.profiles.lock().unwrap().push(profile.clone());
        Ok(())
    }

    async fn send_otp(&self, email: &str) -> Result<(), GuardError> {
        if email == KNOWN_EMAIL {
            Ok(())
        } else {
            Err(GuardError::UserNotFound)
        }
    }

    async fn verify_otp(&self, email: &str, token: &str) -> Result<AuthSession, GuardError> {
        if email == KNOWN_EMAIL && token == VALID_OTP {
            Ok(serde_json::from_value(json!({
                "access_token": ACCESS_TOKEN,
                "expires_in": 3600,
                "user": {"id": "u1", "email": KNOWN_EMAIL}
            }))
            .expect("session json"))
        } else {
            Err(GuardError::AuthRejected {
                code: "otp_expired".to_string(),
                message: "Token has expired or is invalid".to_string(),
            })
        }
    }

    async fn current_user(&self, access_token: &str) -> Result<Value, GuardError> {
        if access_token == ACCESS_TOKEN {
            Ok(json!({"id": "u1", "email": KNOWN_EMAIL}))
        } else {
            Err(GuardError::UpstreamStatus(StatusCode::UNAUTHORIZED))
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), GuardError> {
        self.signed_out.lock().unwrap().push(access_token.to_string());
        Ok(())
    }
}

pub struct FakeAssistant;

#[async_trait]
impl Assistant for FakeAssistant {
    async fn suggest(&self, issue: &str) -> Result<String, GuardError> {
        Ok(format!("Suggested fix for: {issue}"))
    }
}

pub struct TestApp {
    pub router: Router,
    pub platform: Arc<FakePlatform>,
    pub accounts: Arc<FakeAccounts>,
}

pub async fn memory_storage() -> TargetsStorage {
    TargetsStorage::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite opens")
}

pub async fn spawn_app_with(
    platform: FakePlatform,
    accounts: FakeAccounts,
    assistant_rate: u32,
) -> TestApp {
    let platform = Arc::new(platform);
    let accounts = Arc::new(accounts);
    let state = GuardState::new(
        platform.clone(),
        accounts.clone(),
        Arc::new(FakeAssistant),
        memory_storage().await,
        ADMIN_KEY,
    )
    .with_assistant_rate(assistant_rate);
    TestApp {
        router: guard_router(state, BODY_LIMIT),
        platform,
        accounts,
    }
}

pub async fn spawn_app(platform: FakePlatform) -> TestApp {
    spawn_app_with(platform, FakeAccounts::default(), 20).await
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub fn admin_json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    let mut req = json_request(method, uri, body);
    req.headers_mut()
        .insert("x-admin-key", ADMIN_KEY.parse().expect("header value"));
    req
}

pub async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.expect("request failed")
}

pub async fn body_json(resp: Response<Body>) -> Value {
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&body).expect("response body was not json")
}

/// Register a target and return its id.
pub async fn register_target(app: &Router, url: &str, key: &str) -> i64 {
    let resp = send(
        app,
        admin_json_request("POST", "/api/targets", json!({ "url": url, "key": key })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await["id"].as_i64().expect("id in response")
}
