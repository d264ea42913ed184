use crate::types::target::{TargetConnection, TargetView};
use chrono::{DateTime, Utc};
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub struct DbTarget {
    pub id: i64,
    pub label: String,
    pub url: Url,
    pub service_key: String,
    pub created_at: DateTime<Utc>,
}

impl DbTarget {
    pub fn connection(&self) -> TargetConnection {
        TargetConnection {
            url: self.url.clone(),
            service_key: self.service_key.clone(),
        }
    }
}

impl From<DbTarget> for TargetView {
    fn from(d: DbTarget) -> Self {
        TargetView {
            id: d.id,
            label: d.label,
            url: d.url.into(),
            created_at: d.created_at,
        }
    }
}
