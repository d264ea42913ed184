use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Credentials needed to query one registered target project.
#[derive(Clone)]
pub struct TargetConnection {
    pub url: Url,
    pub service_key: String,
}

impl std::fmt::Debug for TargetConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetConnection")
            .field("url", &self.url.as_str())
            .field("service_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterTargetRequest {
    pub url: Option<String>,
    pub key: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

/// Public view of a registered target; the service key never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetView {
    pub id: i64,
    pub label: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}
