//! Postgres root-key store.

use async_trait::async_trait;
use sqlx::PgPool;

use bifrost_domain::RootKey;

use crate::error::{translate_create, StoreError};
use crate::traits::{RootKeyStore, StoreResult};

#[derive(Clone)]
pub struct PgRootKeyStore {
    pool: PgPool,
}

impl PgRootKeyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RootKeyStore for PgRootKeyStore {
    async fn create(&self, key: RootKey) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO root_keys (id, api_key)
            VALUES ($1, $2)
            "#,
        )
        .bind(&key.id)
        .bind(&key.api_key)
        .execute(&self.pool)
        .await
        .map_err(translate_create)?;
        Ok(())
    }

    async fn get(&self, id: &str) -> StoreResult<RootKey> {
        sqlx::query_as::<_, RootKey>(
            r#"
            SELECT id, api_key
            FROM root_keys
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn update(&self, key: RootKey) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE root_keys
            SET api_key = $2
            WHERE id = $1
            "#,
        )
        .bind(&key.id)
        .bind(&key.api_key)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM root_keys WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<RootKey>> {
        Ok(sqlx::query_as::<_, RootKey>(
            r#"
            SELECT id, api_key
            FROM root_keys
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }
}
