use crate::types::assistant::{IssueRequest, SuggestionResponse};
use crate::{GuardError, router::GuardState};
use axum::{Json, extract::State};
use tracing::debug;

/// POST /api/ai -> forward a free-text security question to the assistant.
pub async fn suggestion_handler(
    State(state): State<GuardState>,
    Json(req): Json<IssueRequest>,
) -> Result<Json<SuggestionResponse>, GuardError> {
    let issue = req
        .issue
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(GuardError::MissingField("Issue"))?;

    state
        .assistant_limiter
        .check()
        .map_err(|_| GuardError::RateLimited)?;

    debug!(chars = issue.len(), "forwarding issue to assistant");
    let suggestion = state.assistant.suggest(issue).await?;
    Ok(Json(SuggestionResponse { suggestion }))
}
