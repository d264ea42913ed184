use crate::api::SecurityPlatform;
use crate::error::GuardError;
use crate::service::aggregator::{aggregate, user_statuses};
use crate::types::summary::AuditReport;
use crate::types::target::TargetConnection;
use tracing::info;

/// Fetch the three fact lists concurrently and aggregate them.
///
/// Any fetch failure aborts the run; a failed list is never treated as empty.
/// The project list alone may be absent, when no management token is configured.
pub async fn run_audit(
    platform: &dyn SecurityPlatform,
    target: &TargetConnection,
) -> Result<AuditReport, GuardError> {
    let (tables, users, projects) = tokio::try_join!(
        platform.table_facts(target),
        platform.user_facts(target),
        platform.project_facts(),
    )?;

    let projects_checked = projects.is_some();
    let projects = projects.unwrap_or_default();
    let summary = aggregate(&tables, &users, &projects);

    info!(
        project_url = %target.url,
        tables = summary.total_tables,
        tables_with_rls = summary.tables_with_rls,
        users = summary.total_users,
        users_with_mfa = summary.users_with_mfa,
        projects = projects.len(),
        "security audit completed"
    );

    Ok(AuditReport {
        user_statuses: user_statuses(&users),
        summary,
        tables,
        users,
        projects,
        projects_checked,
    })
}
