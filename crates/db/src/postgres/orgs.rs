//! Postgres organization store.

use async_trait::async_trait;
use sqlx::PgPool;

use bifrost_domain::Organization;

use crate::error::{translate_create, StoreError};
use crate::traits::{OrganizationStore, StoreResult};

#[derive(Clone)]
pub struct PgOrganizationStore {
    pool: PgPool,
}

impl PgOrganizationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganizationStore for PgOrganizationStore {
    async fn create(&self, org: Organization) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, domain, email)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&org.id)
        .bind(&org.name)
        .bind(&org.domain)
        .bind(&org.email)
        .execute(&self.pool)
        .await
        .map_err(translate_create)?;
        Ok(())
    }

    async fn get(&self, id: &str) -> StoreResult<Organization> {
        sqlx::query_as::<_, Organization>(
            r#"
            SELECT id, name, domain, email
            FROM organizations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn get_by_name(&self, name: &str) -> StoreResult<Organization> {
        sqlx::query_as::<_, Organization>(
            r#"
            SELECT id, name, domain, email
            FROM organizations
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn update(&self, org: Organization) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE organizations
            SET name = $2, domain = $3, email = $4
            WHERE id = $1
            "#,
        )
        .bind(&org.id)
        .bind(&org.name)
        .bind(&org.domain)
        .bind(&org.email)
        .execute(&self.pool)
        .await
        .map_err(translate_create)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Organization>> {
        Ok(sqlx::query_as::<_, Organization>(
            r#"
            SELECT id, name, domain, email
            FROM organizations
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }
}
