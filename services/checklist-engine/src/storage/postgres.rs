use super::ChecklistStore;
use crate::errors::{ChecklistEngineError, Result};
use async_trait::async_trait;
use checklist_core::{ChecklistItem, ItemStatus, UserId};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use std::time::Duration;
use tracing::{debug, info};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS checklists (
        id BIGSERIAL PRIMARY KEY,
        user_id VARCHAR(255) NOT NULL,
        standard VARCHAR(50) NOT NULL,
        control_id VARCHAR(50) NOT NULL,
        description TEXT NOT NULL,
        status VARCHAR(20) NOT NULL DEFAULT 'Pending',
        notes TEXT NOT NULL DEFAULT ''
    )
"#;

const CREATE_UNIQUE_INDEX: &str = r#"
    CREATE UNIQUE INDEX IF NOT EXISTS checklists_user_control_idx
    ON checklists (user_id, control_id)
"#;

/// Row as stored in the `checklists` table
#[derive(Debug, Clone, FromRow)]
struct ChecklistRow {
    user_id: String,
    standard: String,
    control_id: String,
    description: String,
    status: String,
    notes: String,
}

impl TryFrom<ChecklistRow> for ChecklistItem {
    type Error = ChecklistEngineError;

    fn try_from(row: ChecklistRow) -> Result<Self> {
        let status = row.status.parse::<ItemStatus>().map_err(|e| {
            ChecklistEngineError::Storage(format!(
                "row ({}, {}) has invalid status: {}",
                row.user_id, row.control_id, e
            ))
        })?;
        let user_id = UserId::parse(&row.user_id)
            .map_err(|e| ChecklistEngineError::Storage(format!("invalid stored user id: {}", e)))?;

        Ok(ChecklistItem {
            standard: row.standard,
            control_id: row.control_id,
            description: row.description,
            status,
            notes: row.notes,
            user_id,
        })
    }
}

pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str, max_connections: u32, acquire_timeout_secs: u64) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
            .connect(database_url)
            .await?;

        Ok(Database { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Database { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the checklists table and its (user_id, control_id) index if missing.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_UNIQUE_INDEX).execute(&self.pool).await?;
        info!("Checklist schema ready");
        Ok(())
    }
}

#[async_trait]
impl ChecklistStore for Database {
    async fn insert_checklist(&self, items: &[ChecklistItem]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for item in items {
            let result = sqlx::query(
                r#"
                INSERT INTO checklists (user_id, standard, control_id, description, status, notes)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (user_id, control_id) DO NOTHING
                "#,
            )
            .bind(item.user_id.as_str())
            .bind(&item.standard)
            .bind(&item.control_id)
            .bind(&item.description)
            .bind(item.status.as_str())
            .bind(&item.notes)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;
        debug!("Inserted {} of {} checklist rows", inserted, items.len());

        Ok(inserted)
    }

    async fn select_checklist(&self, user_id: &UserId) -> Result<Vec<ChecklistItem>> {
        let rows = sqlx::query_as::<_, ChecklistRow>(
            r#"
            SELECT user_id, standard, control_id, description, status, notes
            FROM checklists
            WHERE user_id = $1
            ORDER BY standard, control_id
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ChecklistItem::try_from).collect()
    }

    async fn update_item(
        &self,
        user_id: &UserId,
        control_id: &str,
        status: ItemStatus,
        notes: &str,
    ) -> Result<Option<ChecklistItem>> {
        let row = sqlx::query_as::<_, ChecklistRow>(
            r#"
            UPDATE checklists
            SET status = $1, notes = $2
            WHERE user_id = $3 AND control_id = $4
            RETURNING user_id, standard, control_id, description, status, notes
            "#,
        )
        .bind(status.as_str())
        .bind(notes)
        .bind(user_id.as_str())
        .bind(control_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ChecklistItem::try_from).transpose()
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
