//! Sign-up and OTP sign-in for the tool's own users.

use crate::middleware::session::{clear_session, session_token, store_session};
use crate::types::account::{
    CurrentUserResponse, MessageResponse, NewAccount, ProfileRow, SignInRequest, SignUpRequest,
    VerifyOtpRequest,
};
use crate::{GuardError, router::GuardState};
use axum::{Json, extract::State};
use axum_extra::extract::cookie::PrivateCookieJar;
use tracing::{debug, error, info, warn};

const LOGIN_LOG: &str = "supaguard::login";
const SIGNUP_LOG: &str = "supaguard::signup";

fn required(value: Option<String>, field: &'static str) -> Result<String, GuardError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(GuardError::MissingField(field))
}

/// POST /api/auth/signup
pub async fn signup_handler(
    State(state): State<GuardState>,
    Json(req): Json<SignUpRequest>,
) -> Result<Json<MessageResponse>, GuardError> {
    let account = NewAccount {
        email: required(req.email, "email")?,
        password: req
            .password
            .filter(|p| !p.is_empty())
            .ok_or(GuardError::MissingField("password"))?,
        name: req.name,
        phone_number: req.phone_number,
    };

    let user_id = state.accounts.sign_up(&account).await.inspect_err(|e| {
        error!(target: SIGNUP_LOG, email = %account.email, error = %e, "signup failed");
    })?;

    let profile = ProfileRow {
        id: user_id,
        email: account.email.clone(),
        name: account.name.clone(),
        phone_number: account.phone_number.clone(),
    };
    state
        .accounts
        .insert_profile(&profile)
        .await
        .inspect_err(|e| {
            error!(target: SIGNUP_LOG, email = %account.email, error = %e, "profile insert failed");
        })?;

    info!(target: SIGNUP_LOG, email = %account.email, "signup successful");
    Ok(Json(MessageResponse::ok("Signup successful!")))
}

/// POST /api/auth/signin -> email a one-time password to an existing user.
pub async fn signin_handler(
    State(state): State<GuardState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<MessageResponse>, GuardError> {
    let email = required(req.email, "email")?;
    match state.accounts.send_otp(&email).await {
        Ok(()) => {
            info!(target: LOGIN_LOG, %email, "otp sent");
            Ok(Json(MessageResponse::ok("OTP sent successfully!")))
        }
        Err(GuardError::UserNotFound) => {
            warn!(target: LOGIN_LOG, %email, "login attempt for unknown user");
            Err(GuardError::UserNotFound)
        }
        Err(e) => {
            error!(target: LOGIN_LOG, %email, error = %e, "login failed");
            Err(e)
        }
    }
}

/// POST /api/auth/verify-otp -> exchange the OTP for a session cookie.
pub async fn verify_otp_handler(
    State(state): State<GuardState>,
    jar: PrivateCookieJar,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<(PrivateCookieJar, Json<MessageResponse>), GuardError> {
    let email = required(req.email, "email")?;
    let otp = required(req.otp, "otp")?;

    let session = state
        .accounts
        .verify_otp(&email, &otp)
        .await
        .inspect_err(|e| {
            warn!(target: LOGIN_LOG, %email, error = %e, "otp verification failed");
        })?;

    let jar = store_session(
        jar,
        &session.access_token,
        session.expires_in,
        !state.insecure_cookie,
    );
    info!(target: LOGIN_LOG, %email, "otp verified; session issued");
    Ok((jar, Json(MessageResponse::ok("OTP verified successfully!"))))
}

/// GET /api/auth/user -> the signed-in user, or `null`.
pub async fn current_user_handler(
    State(state): State<GuardState>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Json<CurrentUserResponse>) {
    let Some(token) = session_token(&jar) else {
        return (jar, Json(CurrentUserResponse { user: None }));
    };

    match state.accounts.current_user(&token).await {
        Ok(user) => (jar, Json(CurrentUserResponse { user: Some(user) })),
        Err(e) => {
            debug!(error = %e, "session token rejected; clearing cookie");
            (clear_session(jar), Json(CurrentUserResponse { user: None }))
        }
    }
}

/// POST /api/auth/logout
pub async fn logout_handler(
    State(state): State<GuardState>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Json<MessageResponse>) {
    if let Some(token) = session_token(&jar)
        && let Err(e) = state.accounts.sign_out(&token).await
    {
        warn!(target: LOGIN_LOG, error = %e, "provider sign-out failed; clearing session anyway");
    }
    (
        clear_session(jar),
        Json(MessageResponse::ok("Logged out successfully")),
    )
}
