use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: Option<String>,
    pub otp: Option<String>,
}

/// Validated sign-up input handed to the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub phone_number: Option<String>,
}

/// Profile row mirrored into the tool's own `user` table. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileRow {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub phone_number: Option<String>,
}

/// Session issued after a successful OTP verification.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

/// Error body returned by the auth provider. Older and newer releases
/// disagree on field names, so every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthErrorBody {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl AuthErrorBody {
    pub fn code(&self) -> String {
        self.error_code
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub fn message(&self) -> String {
        self.msg
            .clone()
            .or_else(|| self.message.clone())
            .or_else(|| self.error_description.clone())
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "Authentication request failed".to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentUserResponse {
    pub user: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_prefers_error_code_and_msg() {
        let body: AuthErrorBody = serde_json::from_str(
            r#"{"code":422,"error_code":"otp_disabled","msg":"Signups not allowed for otp"}"#,
        )
        .unwrap();
        assert_eq!(body.code(), "otp_disabled");
        assert_eq!(body.message(), "Signups not allowed for otp");
    }

    #[test]
    fn error_body_falls_back_to_legacy_fields() {
        let body: AuthErrorBody = serde_json::from_str(
            r#"{"error":"invalid_grant","error_description":"Token has expired or is invalid"}"#,
        )
        .unwrap();
        assert_eq!(body.code(), "invalid_grant");
        assert_eq!(body.message(), "Token has expired or is invalid");
    }

    #[test]
    fn session_defaults_expiry() {
        let session: AuthSession =
            serde_json::from_str(r#"{"access_token":"jwt","user":{"id":"u1"}}"#).unwrap();
        assert_eq!(session.expires_in, 3600);
        assert_eq!(session.access_token, "jwt");
    }
}
