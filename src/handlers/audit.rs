use crate::middleware::auth::RequireAdmin;
use crate::service::audit_ops::run_audit;
use crate::types::account::MessageResponse;
use crate::types::summary::AuditReport;
use crate::{GuardError, router::GuardState};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AuditRequest {
    pub target: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableRlsRequest {
    pub target: Option<i64>,
    pub table_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuditResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub report: AuditReport,
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 63
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

/// POST /api/audit -> run the posture audit against a registered target.
pub async fn audit_handler(
    _admin: RequireAdmin,
    State(state): State<GuardState>,
    Json(req): Json<AuditRequest>,
) -> Result<Json<AuditResponse>, GuardError> {
    let id = req.target.ok_or(GuardError::MissingField("target"))?;
    let target = state.targets.get_by_id(id).await?;
    let report = run_audit(state.platform.as_ref(), &target.connection()).await?;
    Ok(Json(AuditResponse {
        success: true,
        message: "Security audit completed successfully".to_string(),
        report,
    }))
}

/// POST /api/audit/rls -> enable row level security on one table of a target.
pub async fn enable_rls_handler(
    _admin: RequireAdmin,
    State(state): State<GuardState>,
    Json(req): Json<EnableRlsRequest>,
) -> Result<Json<MessageResponse>, GuardError> {
    let id = req.target.ok_or(GuardError::MissingField("target"))?;
    let table = req
        .table_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(GuardError::MissingField("tableName"))?;
    if !is_identifier(table) {
        return Err(GuardError::InvalidInput(format!(
            "'{table}' is not a valid table name"
        )));
    }

    let target = state.targets.get_by_id(id).await?;
    state
        .platform
        .enable_rls(&target.connection(), table)
        .await?;
    Ok(Json(MessageResponse::ok(format!(
        "Row level security enabled for {table}"
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_must_be_plain_identifiers() {
        assert!(is_identifier("orders"));
        assert!(is_identifier("audit_log_2024"));
        assert!(!is_identifier("2024_log"));
        assert!(!is_identifier("orders; drop table users"));
        assert!(!is_identifier("public.orders"));
        assert!(!is_identifier(""));
    }
}
