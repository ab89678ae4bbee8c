use super::constraints::{classify, CONSTRAINT_RULES};
use super::schema::{
    check_constraints, CatalogConstraint, CONSTRAINT_CATALOG_QUERY, SCHEMA_LOCK_KEY,
    SCHEMA_LOCK_QUERY, SCHEMA_STATEMENTS,
};
use crate::domain::{SchemaError, SegmentName, StoreError, UserId};
use crate::ports::outbound::SegmentStore;
use async_trait::async_trait;
use sqlx::postgres::PgPool;
use tracing::{debug, info};

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) => {
                let code = db.code();
                classify(db.constraint(), code.as_deref(), &e.to_string())
            }
            _ => StoreError::storage(&e),
        }
    }
}

/// PostgreSQL-backed segment store.
///
/// The pool is created once by the runtime and shared; each call checks a
/// connection out and returns it when done. Batches run in a transaction
/// that is rolled back on drop if any statement fails.
#[derive(Clone)]
pub struct PgSegmentStore {
    pool: PgPool,
}

impl PgSegmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SegmentStore for PgSegmentStore {
    async fn create_segment(&self, name: &SegmentName) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO segment (name) VALUES ($1)")
            .bind(name.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_segment(&self, name: &SegmentName) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM segment WHERE name = $1")
            .bind(name.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::SegmentNotFound);
        }
        Ok(())
    }

    async fn add_user_to_segments(
        &self,
        user: UserId,
        segments: &[SegmentName],
    ) -> Result<(), StoreError> {
        if segments.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for segment in segments {
            sqlx::query("INSERT INTO users_in_segment (user_id, segment) VALUES ($1, $2)")
                .bind(user.get())
                .bind(segment.as_str())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        debug!(user_id = %user, count = segments.len(), "memberships added");
        Ok(())
    }

    async fn delete_user_from_segments(
        &self,
        user: UserId,
        segments: &[SegmentName],
    ) -> Result<(), StoreError> {
        if segments.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        let mut removed = 0u64;
        for segment in segments {
            removed += sqlx::query("DELETE FROM users_in_segment WHERE user_id = $1 AND segment = $2")
                .bind(user.get())
                .bind(segment.as_str())
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }

        if removed == 0 {
            return Err(StoreError::UserNotInSegment);
        }
        tx.commit().await?;

        debug!(user_id = %user, removed, "memberships removed");
        Ok(())
    }

    async fn get_user_segments(&self, user: UserId) -> Result<Vec<SegmentName>, StoreError> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT segment FROM users_in_segment WHERE user_id = $1 ORDER BY segment",
        )
        .bind(user.get())
        .fetch_all(&self.pool)
        .await?;

        names
            .into_iter()
            .map(|name| SegmentName::new(name).map_err(StoreError::storage))
            .collect()
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(SCHEMA_LOCK_QUERY)
            .bind(SCHEMA_LOCK_KEY)
            .execute(&mut *tx)
            .await?;
        for statement in SCHEMA_STATEMENTS {
            sqlx::query(*statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;

        info!("schema initialised");
        Ok(())
    }

    async fn verify_schema(&self) -> Result<(), SchemaError> {
        let names: Vec<&str> = CONSTRAINT_RULES.iter().map(|rule| rule.name).collect();
        let rows: Vec<(String, String, String)> = sqlx::query_as(CONSTRAINT_CATALOG_QUERY)
            .bind(names)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from)?;

        let found: Vec<CatalogConstraint> = rows
            .into_iter()
            .map(|(name, table, contype)| CatalogConstraint {
                name,
                table,
                contype,
            })
            .collect();

        check_constraints(&found)?;
        info!(constraints = found.len(), "schema constraints verified");
        Ok(())
    }
}
