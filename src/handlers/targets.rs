use crate::middleware::auth::RequireAdmin;
use crate::types::target::{RegisterTargetRequest, TargetView};
use crate::{GuardError, router::GuardState};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;
use url::Url;

/// Parse and normalise a project url. Only http(s) with a host is accepted.
fn parse_target_url(raw: &str) -> Result<Url, GuardError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| GuardError::InvalidInput(format!("invalid target url: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(GuardError::InvalidInput(
            "target url must be an http(s) url with a host".to_string(),
        ));
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// POST /api/targets -> store a project's url and service key server-side.
pub async fn register_target(
    _admin: RequireAdmin,
    State(state): State<GuardState>,
    Json(req): Json<RegisterTargetRequest>,
) -> Result<(StatusCode, Json<TargetView>), GuardError> {
    let raw_url = req
        .url
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or(GuardError::MissingField("url"))?;
    let key = req
        .key
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(GuardError::MissingField("key"))?;
    let url = parse_target_url(raw_url)?;
    let label = req
        .label
        .filter(|l| !l.trim().is_empty())
        .or_else(|| url.host_str().map(str::to_string))
        .unwrap_or_default();

    let stored = state.targets.upsert(&label, &url, key).await?;
    info!(id = stored.id, label = %stored.label, url = %stored.url, "target registered");
    Ok((StatusCode::CREATED, Json(stored.into())))
}

/// GET /api/targets
pub async fn list_targets(
    _admin: RequireAdmin,
    State(state): State<GuardState>,
) -> Result<Json<Vec<TargetView>>, GuardError> {
    let targets = state.targets.list().await?;
    Ok(Json(targets.into_iter().map(Into::into).collect()))
}

/// DELETE /api/targets/{id}
pub async fn delete_target(
    _admin: RequireAdmin,
    State(state): State<GuardState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, GuardError> {
    state.targets.delete(id).await?;
    info!(id, "target removed");
    Ok(StatusCode::NO_CONTENT)
}
