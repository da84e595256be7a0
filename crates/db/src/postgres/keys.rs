//! Postgres virtual-key store.

use async_trait::async_trait;
use sqlx::PgPool;

use bifrost_domain::VirtualKey;

use crate::error::{translate_create, StoreError};
use crate::traits::{StoreResult, VirtualKeyStore};

#[derive(Clone)]
pub struct PgVirtualKeyStore {
    pool: PgPool,
}

impl PgVirtualKeyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VirtualKeyStore for PgVirtualKeyStore {
    async fn create(&self, key: VirtualKey) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO virtual_keys (id, scope, expires_at, target, rate_limit)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&key.id)
        .bind(key.scope)
        .bind(key.expires_at)
        .bind(&key.target)
        .bind(key.rate_limit)
        .execute(&self.pool)
        .await
        .map_err(translate_create)?;
        Ok(())
    }

    async fn get(&self, id: &str) -> StoreResult<VirtualKey> {
        sqlx::query_as::<_, VirtualKey>(
            r#"
            SELECT id, scope, expires_at, target, rate_limit
            FROM virtual_keys
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn update(&self, key: VirtualKey) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE virtual_keys
            SET scope = $2, expires_at = $3, target = $4, rate_limit = $5
            WHERE id = $1
            "#,
        )
        .bind(&key.id)
        .bind(key.scope)
        .bind(key.expires_at)
        .bind(&key.target)
        .bind(key.rate_limit)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM virtual_keys WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<VirtualKey>> {
        Ok(sqlx::query_as::<_, VirtualKey>(
            r#"
            SELECT id, scope, expires_at, target, rate_limit
            FROM virtual_keys
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }
}
