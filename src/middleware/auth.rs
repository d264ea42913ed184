use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, StatusCode, request::Parts};
use axum::response::{IntoResponse, Response};
use headers::authorization::Bearer;
use headers::{Authorization, HeaderMapExt};
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::router::GuardState;

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

fn key_matches(candidate: &str, expected: &str) -> bool {
    bool::from(candidate.as_bytes().ct_eq(expected.as_bytes()))
}

/// Ensure the inbound request carries the operator key.
/// Accepts either:
/// - Header: `x-admin-key: ...`
/// - Header: `Authorization: Bearer ...`
/// - Query string: `?key=...`
pub fn ensure_admin(
    headers: &HeaderMap,
    query: Option<&str>,
    expected: &str,
) -> Result<(), Response> {
    if let Some(hv) = headers.get(ADMIN_KEY_HEADER).and_then(|v| v.to_str().ok())
        && key_matches(hv, expected)
    {
        return Ok(());
    }

    if let Some(auth) = headers.typed_get::<Authorization<Bearer>>()
        && key_matches(auth.token(), expected)
    {
        return Ok(());
    }

    if let Some(qs) = query {
        for (k, v) in url::form_urlencoded::parse(qs.as_bytes()) {
            if k == "key" && key_matches(&v, expected) {
                return Ok(());
            }
        }
    }

    Err((
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "success": false,
            "error": {"code": "UNAUTHORIZED", "message": "invalid or missing admin key"}
        })),
    )
        .into_response())
}

/// Extractor guarding operator-only routes.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

impl FromRequestParts<GuardState> for RequireAdmin {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &GuardState,
    ) -> Result<Self, Self::Rejection> {
        ensure_admin(&parts.headers, parts.uri.query(), &state.admin_key)?;
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn accepts_each_transport() {
        let mut headers = HeaderMap::new();
        headers.insert(ADMIN_KEY_HEADER, HeaderValue::from_static("secret"));
        assert!(ensure_admin(&headers, None, "secret").is_ok());

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer secret"));
        assert!(ensure_admin(&headers, None, "secret").is_ok());

        assert!(ensure_admin(&HeaderMap::new(), Some("a=1&key=secret"), "secret").is_ok());
    }

    #[test]
    fn rejects_wrong_or_missing_key() {
        let mut headers = HeaderMap::new();
        headers.insert(ADMIN_KEY_HEADER, HeaderValue::from_static("nope"));
        let err = ensure_admin(&headers, Some("key=also-nope"), "secret").unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        assert!(ensure_admin(&HeaderMap::new(), None, "secret").is_err());
    }
}
