use serde::{Deserialize, Serialize};

/// RLS state of one table in the target's public schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSecurityFact {
    pub name: String,
    pub has_row_level_security: bool,
}

/// MFA state of one user account in the target project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSecurityFact {
    pub id: String,
    pub email: String,
    pub has_multi_factor: bool,
}

/// PITR state of one project visible to the management API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFact {
    pub id: String,
    pub name: String,
    pub point_in_time_recovery_enabled: bool,
}

impl TableSecurityFact {
    pub fn new(name: impl Into<String>, has_row_level_security: bool) -> Self {
        Self {
            name: name.into(),
            has_row_level_security,
        }
    }
}

impl UserSecurityFact {
    pub fn new(id: impl Into<String>, email: impl Into<String>, has_multi_factor: bool) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            has_multi_factor,
        }
    }
}

impl ProjectFact {
    pub fn new(id: impl Into<String>, name: impl Into<String>, pitr: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            point_in_time_recovery_enabled: pitr,
        }
    }
}
