use super::{SecurityPlatform, check_status, endpoint, retry_policy};
use crate::config::PlatformConfig;
use crate::error::{GuardError, IsRetryable};
use crate::types::facts::{ProjectFact, TableSecurityFact, UserSecurityFact};
use crate::types::target::TargetConnection;
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const RLS_STATUS_RPC: &str = "rest/v1/rpc/get_tables_rls_status";
const ENABLE_RLS_RPC: &str = "rest/v1/rpc/enable_rls";
const ADMIN_USERS: &str = "auth/v1/admin/users";
const PROJECTS: &str = "v1/projects";
/// Upper bound on admin user pages; reaching it fails the fetch.
const MAX_USER_PAGES: u32 = 1000;

/// Row returned by the `get_tables_rls_status` RPC.
#[derive(Debug, Deserialize)]
struct RlsStatusRow {
    name: String,
    #[serde(default)]
    has_rls: bool,
}

#[derive(Debug, Deserialize)]
struct AdminUserPage {
    #[serde(default)]
    users: Vec<AdminUser>,
}

#[derive(Debug, Deserialize)]
struct AdminUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    factors: Option<Vec<AdminFactor>>,
    #[serde(default)]
    user_metadata: Value,
}

#[derive(Debug, Deserialize)]
struct AdminFactor {
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct ManagedProject {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    pitr_enabled: Option<bool>,
}

impl From<RlsStatusRow> for TableSecurityFact {
    fn from(row: RlsStatusRow) -> Self {
        TableSecurityFact::new(row.name, row.has_rls)
    }
}

impl From<AdminUser> for UserSecurityFact {
    fn from(user: AdminUser) -> Self {
        let verified_factor = user
            .factors
            .as_deref()
            .unwrap_or_default()
            .iter()
            .any(|f| f.status == "verified");
        let legacy_flag = user
            .user_metadata
            .get("mfa_enabled")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        UserSecurityFact::new(
            user.id,
            user.email.unwrap_or_default(),
            verified_factor || legacy_flag,
        )
    }
}

impl From<ManagedProject> for ProjectFact {
    fn from(p: ManagedProject) -> Self {
        ProjectFact::new(p.id, p.name, p.pitr_enabled.unwrap_or(false))
    }
}

/// Walk the admin user list until a short page arrives.
///
/// A page that starts with the same user as the previous one means the
/// upstream ignored `page`; that, or running past `max_pages`, is an error
/// rather than a partial or duplicated list.
async fn collect_user_pages<F, Fut>(
    per_page: u32,
    max_pages: u32,
    mut fetch: F,
) -> Result<Vec<AdminUser>, GuardError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<AdminUser>, GuardError>>,
{
    let mut users: Vec<AdminUser> = Vec::new();
    let mut previous_first: Option<String> = None;
    for page in 1..=max_pages {
        let batch = fetch(page).await?;
        let first = batch.first().map(|u| u.id.clone());
        if first.is_some() && first == previous_first {
            return Err(GuardError::Pagination(format!(
                "page {page} repeats the previous page of admin users"
            )));
        }
        let last = (batch.len() as u32) < per_page;
        users.extend(batch);
        if last {
            return Ok(users);
        }
        previous_first = first;
    }
    Err(GuardError::Pagination(format!(
        "admin user list exceeds {max_pages} pages of {per_page}"
    )))
}

/// Platform REST client: PostgREST RPCs and the auth admin API on the
/// target, plus the management API for project-level settings.
pub struct PlatformApi {
    client: reqwest::Client,
    management_url: Url,
    access_token: Option<String>,
    retry_max_times: usize,
    users_per_page: u32,
}

impl PlatformApi {
    pub fn new(client: reqwest::Client, cfg: &PlatformConfig) -> Self {
        Self {
            client,
            management_url: cfg.management_url.clone(),
            access_token: cfg.access_token.clone(),
            retry_max_times: cfg.retry_max_times,
            users_per_page: cfg.users_per_page.max(1),
        }
    }

    fn retry_policy(&self) -> ExponentialBuilder {
        retry_policy(self.retry_max_times)
    }

    /// Authorised request against the target with the service key.
    fn target_request(
        &self,
        method: reqwest::Method,
        url: Url,
        target: &TargetConnection,
    ) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", target.service_key.as_str())
            .bearer_auth(&target.service_key)
            .header("Accept", "application/json")
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        label: &'static str,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<T, GuardError> {
        (|| async {
            let resp = check_status(build().send().await?)?;
            Ok::<T, GuardError>(resp.json::<T>().await?)
        })
        .retry(self.retry_policy())
        .when(|e: &GuardError| e.is_retryable())
        .notify(|err, dur: Duration| {
            warn!("{label} retrying after error {}, sleeping {:?}", err, dur);
        })
        .await
    }

    async fn user_page(
        &self,
        target: &TargetConnection,
        page: u32,
    ) -> Result<Vec<AdminUser>, GuardError> {
        let mut url = endpoint(&target.url, ADMIN_USERS)?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &self.users_per_page.to_string());
        let page: AdminUserPage = self
            .fetch_json("listUsers", || {
                self.target_request(reqwest::Method::GET, url.clone(), target)
            })
            .await?;
        Ok(page.users)
    }
}

#[async_trait]
impl SecurityPlatform for PlatformApi {
    async fn table_facts(
        &self,
        target: &TargetConnection,
    ) -> Result<Vec<TableSecurityFact>, GuardError> {
        let url = endpoint(&target.url, RLS_STATUS_RPC)?;
        let rows: Vec<RlsStatusRow> = self
            .fetch_json("get_tables_rls_status", || {
                self.target_request(reqwest::Method::POST, url.clone(), target)
                    .json(&json!({}))
            })
            .await?;
        debug!(project_url = %target.url, tables = rows.len(), "fetched RLS status");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn user_facts(
        &self,
        target: &TargetConnection,
    ) -> Result<Vec<UserSecurityFact>, GuardError> {
        let users = collect_user_pages(self.users_per_page, MAX_USER_PAGES, |page| {
            self.user_page(target, page)
        })
        .await?;
        let facts: Vec<UserSecurityFact> = users.into_iter().map(Into::into).collect();
        debug!(project_url = %target.url, users = facts.len(), "fetched user list");
        Ok(facts)
    }

    async fn project_facts(&self) -> Result<Option<Vec<ProjectFact>>, GuardError> {
        let Some(token) = self.access_token.as_deref() else {
            info!("no management access token configured; skipping PITR checks");
            return Ok(None);
        };
        let url = endpoint(&self.management_url, PROJECTS)?;
        let projects: Vec<ManagedProject> = self
            .fetch_json("listProjects", || {
                self.client
                    .get(url.clone())
                    .bearer_auth(token)
                    .header("Accept", "application/json")
            })
            .await?;
        Ok(Some(projects.into_iter().map(Into::into).collect()))
    }

    async fn enable_rls(&self, target: &TargetConnection, table: &str) -> Result<(), GuardError> {
        let url = endpoint(&target.url, ENABLE_RLS_RPC)?;
        // Not idempotent from the caller's view, so no retry.
        self.target_request(reqwest::Method::POST, url, target)
            .json(&json!({ "table_name": table }))
            .send()
            .await
            .map_err(GuardError::from)
            .and_then(check_status)?;
        info!(project_url = %target.url, table, "row level security enabled");
        Ok(())
    }
}
