//! Pure aggregation of fetched security facts into an [`AuditSummary`].

use crate::types::facts::{ProjectFact, TableSecurityFact, UserSecurityFact};
use crate::types::summary::{
    AuditSummary, CheckStatus, ProjectStatus, Recommendation, Severity, UserStatus,
};

/// Adoption ratio reported when the target has no tables at all.
pub const EMPTY_RLS_ADOPTION_RATIO: f64 = 0.0;

const RLS_ON_RECOMMENDATION: &str =
    "Great job! RLS is enabled for this table, ensuring proper access control.";
const RLS_OFF_RECOMMENDATION: &str =
    "Enable Row Level Security (RLS) for this table to ensure proper access control.";
const RLS_ON_DETAILS: &str = "RLS is correctly implemented to prevent unauthorized access.";
const RLS_OFF_DETAILS: &str =
    "RLS helps prevent unauthorized access to table rows based on the user making the request.";

/// Build the summary. Never fails; inputs are left untouched.
pub fn aggregate(
    tables: &[TableSecurityFact],
    users: &[UserSecurityFact],
    projects: &[ProjectFact],
) -> AuditSummary {
    let total_tables = tables.len();
    let mut tables_with_rls = 0;
    let mut recommendations = Vec::with_capacity(total_tables);
    for table in tables {
        if table.has_row_level_security {
            tables_with_rls += 1;
        }
        recommendations.push(recommend(table));
    }

    let rls_adoption_ratio = if total_tables == 0 {
        EMPTY_RLS_ADOPTION_RATIO
    } else {
        tables_with_rls as f64 / total_tables as f64 * 100.0
    };

    let users_with_mfa = users.iter().filter(|u| u.has_multi_factor).count();

    let project_statuses = projects
        .iter()
        .map(|p| ProjectStatus {
            project_id: p.id.clone(),
            project_name: p.name.clone(),
            status: p.point_in_time_recovery_enabled.into(),
        })
        .collect();

    AuditSummary {
        total_tables,
        tables_with_rls,
        tables_without_rls: total_tables - tables_with_rls,
        rls_adoption_ratio,
        total_users: users.len(),
        users_with_mfa,
        recommendations,
        project_statuses,
    }
}

/// Per-user MFA verdicts, in input order.
pub fn user_statuses(users: &[UserSecurityFact]) -> Vec<UserStatus> {
    users
        .iter()
        .map(|u| UserStatus {
            user_id: u.id.clone(),
            email: u.email.clone(),
            mfa_enabled: u.has_multi_factor,
            status: CheckStatus::from(u.has_multi_factor),
        })
        .collect()
}

fn recommend(table: &TableSecurityFact) -> Recommendation {
    if table.has_row_level_security {
        Recommendation {
            table: table.name.clone(),
            recommendation: RLS_ON_RECOMMENDATION.to_string(),
            severity: Severity::Low,
            details: RLS_ON_DETAILS.to_string(),
        }
    } else {
        Recommendation {
            table: table.name.clone(),
            recommendation: RLS_OFF_RECOMMENDATION.to_string(),
            severity: Severity::High,
            details: RLS_OFF_DETAILS.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(total: usize, with_rls: usize) -> Vec<TableSecurityFact> {
        (0..total)
            .map(|i| TableSecurityFact::new(format!("t{i}"), i < with_rls))
            .collect()
    }

    #[test]
    fn counts_hold_for_every_split() {
        for total in 0..12 {
            for with_rls in 0..=total {
                let summary = aggregate(&tables(total, with_rls), &[], &[]);
                assert_eq!(summary.total_tables, total);
                assert_eq!(summary.tables_with_rls, with_rls);
                assert_eq!(summary.tables_without_rls, total - with_rls);
                assert_eq!(summary.recommendations.len(), total);
                if total > 0 {
                    assert!((0.0..=100.0).contains(&summary.rls_adoption_ratio));
                }
            }
        }
    }

    #[test]
    fn empty_inputs_yield_empty_summary() {
        let summary = aggregate(&[], &[], &[]);
        assert_eq!(summary.total_tables, 0);
        assert_eq!(summary.tables_with_rls, 0);
        assert_eq!(summary.tables_without_rls, 0);
        assert_eq!(summary.total_users, 0);
        assert_eq!(summary.users_with_mfa, 0);
        assert!(summary.recommendations.is_empty());
        assert!(summary.project_statuses.is_empty());
        assert_eq!(summary.rls_adoption_ratio, EMPTY_RLS_ADOPTION_RATIO);
    }

    #[test]
    fn mixed_tables_keep_order_and_severity() {
        let input = vec![
            TableSecurityFact::new("orders", true),
            TableSecurityFact::new("logs", false),
        ];
        let summary = aggregate(&input, &[], &[]);

        assert_eq!(summary.total_tables, 2);
        assert_eq!(summary.tables_with_rls, 1);
        assert_eq!(summary.tables_without_rls, 1);
        assert_eq!(summary.rls_adoption_ratio, 50.0);

        let recs = &summary.recommendations;
        assert_eq!(recs[0].table, "orders");
        assert_eq!(recs[0].severity, Severity::Low);
        assert_eq!(recs[0].details, RLS_ON_DETAILS);
        assert_eq!(recs[0].recommendation, RLS_ON_RECOMMENDATION);
        assert_eq!(recs[1].table, "logs");
        assert_eq!(recs[1].severity, Severity::High);
        assert_eq!(recs[1].details, RLS_OFF_DETAILS);
    }

    #[test]
    fn texts_depend_only_on_rls_flag() {
        let input = vec![
            TableSecurityFact::new("orders", false),
            TableSecurityFact::new("logs", false),
            TableSecurityFact::new("users", true),
            TableSecurityFact::new("events", true),
        ];
        let recs = aggregate(&input, &[], &[]).recommendations;
        assert_eq!(recs[0].recommendation, recs[1].recommendation);
        assert_eq!(recs[0].details, recs[1].details);
        assert_eq!(recs[2].recommendation, recs[3].recommendation);
        assert_eq!(recs[2].details, recs[3].details);
        assert_ne!(recs[0].recommendation, recs[2].recommendation);
        assert_eq!(recs[0].recommendation, RLS_OFF_RECOMMENDATION);
        assert_eq!(recs[0].table, "orders");
        assert_eq!(recs[1].table, "logs");
    }

    #[test]
    fn severity_is_high_iff_rls_is_off() {
        let input = vec![
            TableSecurityFact::new("a", false),
            TableSecurityFact::new("b", true),
            TableSecurityFact::new("c", false),
        ];
        let summary = aggregate(&input, &[], &[]);
        for (fact, rec) in input.iter().zip(&summary.recommendations) {
            assert_eq!(rec.table, fact.name);
            assert_eq!(rec.severity == Severity::High, !fact.has_row_level_security);
        }
    }

    #[test]
    fn users_with_mfa_are_counted() {
        let users = vec![
            UserSecurityFact::new("1", "a@example.com", true),
            UserSecurityFact::new("2", "b@example.com", true),
            UserSecurityFact::new("3", "c@example.com", false),
        ];
        let summary = aggregate(&[], &users, &[]);
        assert_eq!(summary.total_users, 3);
        assert_eq!(summary.users_with_mfa, 2);

        let statuses = user_statuses(&users);
        assert_eq!(statuses[2].status, CheckStatus::Fail);
        assert_eq!(statuses[0].user_id, "1");
    }

    #[test]
    fn projects_map_to_pass_fail_in_order() {
        let projects = vec![
            ProjectFact::new("p1", "prod", true),
            ProjectFact::new("p2", "staging", false),
        ];
        let summary = aggregate(&[], &[], &projects);
        assert_eq!(summary.project_statuses.len(), 2);
        assert_eq!(summary.project_statuses[0].project_id, "p1");
        assert_eq!(summary.project_statuses[0].status, CheckStatus::Pass);
        assert_eq!(summary.project_statuses[1].project_name, "staging");
        assert_eq!(summary.project_statuses[1].status, CheckStatus::Fail);
    }

    #[test]
    fn summary_serializes_with_wire_names() {
        let summary = aggregate(
            &[TableSecurityFact::new("orders", false)],
            &[],
            &[ProjectFact::new("p1", "prod", true)],
        );
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["tablesWithoutRls"], 1);
        assert_eq!(json["recommendations"][0]["severity"], "High");
        assert_eq!(json["projectStatuses"][0]["status"], "PASS");
        assert_eq!(json["projectStatuses"][0]["projectName"], "prod");
    }
}
