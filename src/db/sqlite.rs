use crate::db::models::DbTarget;
use crate::db::schema::SQLITE_INIT;
use crate::error::GuardError;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use url::Url;

pub type SqlitePool = Pool<Sqlite>;

#[derive(Clone)]
pub struct TargetsStorage {
    pool: SqlitePool,
}

impl TargetsStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database and initialize the schema.
    pub async fn connect(database_url: &str) -> Result<Self, GuardError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let mut pool_opts = SqlitePoolOptions::new();
        // Every connection to `:memory:` gets its own database.
        if database_url.contains(":memory:") {
            pool_opts = pool_opts.max_connections(1);
        }
        let pool = pool_opts.connect_with(connect_opts).await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), GuardError> {
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Upsert by unique url. Returns the stored row.
    pub async fn upsert(
        &self,
        label: &str,
        url: &Url,
        service_key: &str,
    ) -> Result<DbTarget, GuardError> {
        let created_at = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO targets (label, url, service_key, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(url) DO UPDATE SET
                label=excluded.label,
                service_key=excluded.service_key
            "#,
        )
        .bind(label)
        .bind(url.as_str())
        .bind(service_key)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(
            r#"SELECT id, label, url, service_key, created_at
               FROM targets WHERE url = ?"#,
        )
        .bind(url.as_str())
        .fetch_one(&self.pool)
        .await?;
        Self::row_to_model(row)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<DbTarget, GuardError> {
        let row = sqlx::query(
            r#"SELECT id, label, url, service_key, created_at
               FROM targets WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(GuardError::TargetNotFound(id))?;
        Self::row_to_model(row)
    }

    pub async fn list(&self) -> Result<Vec<DbTarget>, GuardError> {
        let rows = sqlx::query(
            r#"SELECT id, label, url, service_key, created_at
               FROM targets ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_model).collect()
    }

    pub async fn delete(&self, id: i64) -> Result<(), GuardError> {
        let res = sqlx::query("DELETE FROM targets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(GuardError::TargetNotFound(id));
        }
        Ok(())
    }

    fn row_to_model(row: SqliteRow) -> Result<DbTarget, GuardError> {
        let id: i64 = row.try_get("id")?;
        let label: String = row.try_get("label")?;
        let url_str: String = row.try_get("url")?;
        let service_key: String = row.try_get("service_key")?;
        let created_str: String = row.try_get("created_at")?;

        let url = Url::parse(&url_str).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
            .with_timezone(&Utc);

        Ok(DbTarget {
            id,
            label,
            url,
            service_key,
            created_at,
        })
    }
}
