//! Postgres membership store. Mirrors the in-memory behavior; the primary
//! key is the `(user_id, org_id)` pair.

use async_trait::async_trait;
use sqlx::PgPool;

use bifrost_domain::Membership;

use crate::error::{translate_create, StoreError};
use crate::traits::{MembershipStore, StoreResult};

#[derive(Clone)]
pub struct PgMembershipStore {
    pool: PgPool,
}

impl PgMembershipStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipStore for PgMembershipStore {
    async fn create(&self, membership: Membership) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO org_memberships (user_id, org_id, role)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&membership.user_id)
        .bind(&membership.org_id)
        .bind(membership.role)
        .execute(&self.pool)
        .await
        .map_err(translate_create)?;
        Ok(())
    }

    async fn get(&self, user_id: &str, org_id: &str) -> StoreResult<Membership> {
        sqlx::query_as::<_, Membership>(
            r#"
            SELECT user_id, org_id, role
            FROM org_memberships
            WHERE user_id = $1 AND org_id = $2
            "#,
        )
        .bind(user_id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn update(&self, membership: Membership) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE org_memberships
            SET role = $3
            WHERE user_id = $1 AND org_id = $2
            "#,
        )
        .bind(&membership.user_id)
        .bind(&membership.org_id)
        .bind(membership.role)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, user_id: &str, org_id: &str) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM org_memberships
            WHERE user_id = $1 AND org_id = $2
            "#,
        )
        .bind(user_id)
        .bind(org_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Membership>> {
        Ok(sqlx::query_as::<_, Membership>(
            r#"
            SELECT user_id, org_id, role
            FROM org_memberships
            ORDER BY user_id, org_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<Membership>> {
        Ok(sqlx::query_as::<_, Membership>(
            r#"
            SELECT user_id, org_id, role
            FROM org_memberships
            WHERE user_id = $1
            ORDER BY org_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
