use crate::types::facts::{ProjectFact, TableSecurityFact, UserSecurityFact};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    High,
    Low,
}

/// Outcome of a single boolean posture check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Pass,
    Fail,
}

impl From<bool> for CheckStatus {
    fn from(passed: bool) -> Self {
        if passed { Self::Pass } else { Self::Fail }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub table: String,
    pub recommendation: String,
    pub severity: Severity,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatus {
    pub project_id: String,
    pub project_name: String,
    pub status: CheckStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatus {
    pub user_id: String,
    pub email: String,
    pub mfa_enabled: bool,
    pub status: CheckStatus,
}

/// Derived posture summary for one audit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub total_tables: usize,
    pub tables_with_rls: usize,
    pub tables_without_rls: usize,
    /// Percentage in `[0, 100]`; `0.0` when there are no tables.
    pub rls_adoption_ratio: f64,
    pub total_users: usize,
    pub users_with_mfa: usize,
    pub recommendations: Vec<Recommendation>,
    pub project_statuses: Vec<ProjectStatus>,
}

/// Everything one audit run produced: the summary plus the raw facts it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub summary: AuditSummary,
    pub tables: Vec<TableSecurityFact>,
    pub users: Vec<UserSecurityFact>,
    pub projects: Vec<ProjectFact>,
    pub user_statuses: Vec<UserStatus>,
    /// False when no management token was configured and PITR was not checked.
    pub projects_checked: bool,
}
