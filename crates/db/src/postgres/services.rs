//! Postgres service store.

use async_trait::async_trait;
use sqlx::PgPool;

use bifrost_domain::Service;

use crate::error::{translate_create, StoreError};
use crate::traits::{ServiceStore, StoreResult};

#[derive(Clone)]
pub struct PgServiceStore {
    pool: PgPool,
}

impl PgServiceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceStore for PgServiceStore {
    async fn create(&self, service: Service) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO services (id, endpoint, root_key_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&service.id)
        .bind(&service.endpoint)
        .bind(&service.root_key_id)
        .execute(&self.pool)
        .await
        .map_err(translate_create)?;
        Ok(())
    }

    async fn get(&self, id: &str) -> StoreResult<Service> {
        sqlx::query_as::<_, Service>(
            r#"
            SELECT id, endpoint, root_key_id
            FROM services
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn update(&self, service: Service) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE services
            SET endpoint = $2, root_key_id = $3
            WHERE id = $1
            "#,
        )
        .bind(&service.id)
        .bind(&service.endpoint)
        .bind(&service.root_key_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Service>> {
        Ok(sqlx::query_as::<_, Service>(
            r#"
            SELECT id, endpoint, root_key_id
            FROM services
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }
}
