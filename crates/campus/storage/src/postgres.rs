//! PostgreSQL adapter for the Campus account store.
//!
//! Email uniqueness is enforced by a unique index on `lower(email)`, so a lost
//! provisioning race surfaces as [`StorageError::Conflict`].

use crate::model::{AccountRecord, CanonicalId, RoleTag};
use crate::traits::{AccountStore, QueryWindow};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

/// PostgreSQL-backed account store.
#[derive(Clone)]
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    /// Connect to PostgreSQL and initialize required schema.
    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        Self::connect_with_options(database_url, 10, 5).await
    }

    /// Connect with explicit pool parameters.
    pub async fn connect_with_options(
        database_url: &str,
        max_connections: u32,
        connect_timeout_secs: u64,
    ) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(std::time::Duration::from_secs(connect_timeout_secs))
            .connect(database_url)
            .await
            .map_err(|e| StorageError::Backend(format!("failed to connect postgres: {e}")))?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Create adapter from an existing pool.
    pub async fn from_pool(pool: PgPool) -> StorageResult<Self> {
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn init_schema(&self) -> StorageResult<()> {
        let ddl = [
            r#"
            CREATE TABLE IF NOT EXISTS campus_accounts (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS campus_accounts_email_lower_idx
                ON campus_accounts (lower(email))
            "#,
        ];

        for stmt in ddl {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::Backend(format!("schema init failed: {e}")))?;
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    async fn find_account_by_email(&self, email: &str) -> StorageResult<Option<AccountRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, role, created_at
              FROM campus_accounts
             WHERE lower(email) = lower($1)
             LIMIT 1
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?;

        row.map(|r| row_to_account(&r)).transpose()
    }

    async fn insert_account(&self, email: &str, role: RoleTag) -> StorageResult<AccountRecord> {
        let email = email.trim();
        if email.is_empty() {
            return Err(StorageError::InvalidInput(
                "email must not be empty".to_string(),
            ));
        }

        let record = AccountRecord {
            id: CanonicalId::generate(),
            email: email.to_string(),
            role,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO campus_accounts (id, email, role, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.id.0.clone())
        .bind(record.email.clone())
        .bind(role.as_str())
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_conflict)?;

        Ok(record)
    }

    async fn get_account(&self, id: &CanonicalId) -> StorageResult<Option<AccountRecord>> {
        let row = sqlx::query(
            "SELECT id, email, role, created_at FROM campus_accounts WHERE id = $1",
        )
        .bind(id.0.clone())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?;

        row.map(|r| row_to_account(&r)).transpose()
    }

    async fn list_accounts(&self, window: QueryWindow) -> StorageResult<Vec<AccountRecord>> {
        let limit = if window.limit == 0 {
            i64::MAX
        } else {
            to_i64(window.limit)?
        };
        let rows = sqlx::query(
            r#"
            SELECT id, email, role, created_at
              FROM campus_accounts
             ORDER BY created_at DESC, id DESC
             LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(to_i64(window.offset)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?;

        rows.iter().map(row_to_account).collect()
    }
}

fn row_to_account(row: &PgRow) -> StorageResult<AccountRecord> {
    let id: String = row
        .try_get("id")
        .map_err(|e| StorageError::Backend(e.to_string()))?;
    let email: String = row
        .try_get("email")
        .map_err(|e| StorageError::Backend(e.to_string()))?;
    let role: String = row
        .try_get("role")
        .map_err(|e| StorageError::Backend(e.to_string()))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| StorageError::Backend(e.to_string()))?;

    Ok(AccountRecord {
        id: CanonicalId(id),
        email,
        role: role
            .parse()
            .map_err(|e: crate::UnknownRole| StorageError::Backend(e.to_string()))?,
        created_at,
    })
}

fn map_sqlx_conflict(err: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return StorageError::Conflict(db_err.message().to_string());
        }
    }
    StorageError::Backend(err.to_string())
}

fn to_i64(value: usize) -> StorageResult<i64> {
    i64::try_from(value)
        .map_err(|_| StorageError::InvalidInput("window value too large".to_string()))
}
