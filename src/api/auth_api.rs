use super::{AccountProvider, check_status, endpoint};
use crate::config::AuthConfig;
use crate::error::GuardError;
use crate::types::account::{AuthErrorBody, AuthSession, NewAccount, ProfileRow};
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

const OTP_DISABLED: &str = "otp_disabled";

/// Account operations against the auth provider's REST API (GoTrue) and
/// the profile table behind PostgREST.
pub struct GoTrueAccounts {
    client: reqwest::Client,
    base_url: Option<Url>,
    anon_key: String,
    profile_table: String,
}

impl GoTrueAccounts {
    pub fn new(client: reqwest::Client, cfg: &AuthConfig) -> Self {
        Self {
            client,
            base_url: cfg.url.clone(),
            anon_key: cfg.anon_key.clone(),
            profile_table: cfg.profile_table.clone(),
        }
    }

    fn url(&self, path: &str) -> Result<Url, GuardError> {
        let base = self.base_url.as_ref().ok_or(GuardError::AuthUnavailable)?;
        endpoint(base, path)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", self.anon_key.as_str())
            .header("Accept", "application/json")
    }

    /// Turn a provider rejection into `AuthRejected`, keeping the provider's code and message.
    async fn rejected(resp: reqwest::Response) -> GuardError {
        let status = resp.status();
        let body: AuthErrorBody = resp.json().await.unwrap_or_default();
        debug!(%status, code = %body.code(), "auth provider rejected request");
        GuardError::AuthRejected {
            code: body.code(),
            message: body.message(),
        }
    }

    async fn send_checked(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, GuardError> {
        let resp = builder.send().await?;
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(Self::rejected(resp).await)
        }
    }
}

/// The signup endpoint answers with the bare user when confirmation is
/// pending and with `{ user, session }` otherwise.
fn signup_user_id(body: &Value) -> Option<String> {
    body.get("user")
        .and_then(|u| u.get("id"))
        .or_else(|| body.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl AccountProvider for GoTrueAccounts {
    async fn sign_up(&self, account: &NewAccount) -> Result<String, GuardError> {
        let url = self.url("auth/v1/signup")?;
        let body = json!({
            "email": account.email,
            "password": account.password,
            "data": {
                "first_name": account.name,
                "phoneNumber": account.phone_number,
            },
        });
        let resp = self
            .send_checked(self.request(reqwest::Method::POST, url).json(&body))
            .await?;
        let payload: Value = resp.json().await?;
        signup_user_id(&payload).ok_or_else(|| GuardError::AuthRejected {
            code: "missing_user".to_string(),
            message: "Signup response did not include a user".to_string(),
        })
    }

    async fn insert_profile(&self, profile: &ProfileRow) -> Result<(), GuardError> {
        let url = self.url(&format!("rest/v1/{}", self.profile_table))?;
        let resp = self
            .request(reqwest::Method::POST, url)
            .bearer_auth(&self.anon_key)
            .header("Prefer", "return=minimal")
            .json(&[profile])
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            warn!(%status, "profile insert rejected");
            return Err(GuardError::ProfileInsert(detail));
        }
        Ok(())
    }

    async fn send_otp(&self, email: &str) -> Result<(), GuardError> {
        let url = self.url("auth/v1/otp")?;
        let body = json!({ "email": email, "create_user": false });
        match self
            .send_checked(self.request(reqwest::Method::POST, url).json(&body))
            .await
        {
            Ok(_) => Ok(()),
            Err(GuardError::AuthRejected { code, .. }) if code == OTP_DISABLED => {
                Err(GuardError::UserNotFound)
            }
            Err(e) => Err(e),
        }
    }

    async fn verify_otp(&self, email: &str, token: &str) -> Result<AuthSession, GuardError> {
        let url = self.url("auth/v1/verify")?;
        let body = json!({ "type": "email", "email": email, "token": token });
        let resp = self
            .send_checked(self.request(reqwest::Method::POST, url).json(&body))
            .await?;
        Ok(resp.json().await?)
    }

    async fn current_user(&self, access_token: &str) -> Result<Value, GuardError> {
        let url = self.url("auth/v1/user")?;
        let resp = self
            .request(reqwest::Method::GET, url)
            .bearer_auth(access_token)
            .send()
            .await?;
        Ok(check_status(resp)?.json().await?)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), GuardError> {
        let url = self.url("auth/v1/logout")?;
        let resp = self
            .request(reqwest::Method::POST, url)
            .bearer_auth(access_token)
            .send()
            .await?;
        check_status(resp)?;
        Ok(())
    }
}
