//! Postgres store backend.
//!
//! Same contracts as the in-memory backend over `sqlx` runtime queries.
//! Uniqueness violations are translated to `AlreadyExists` and missing rows
//! to `NotFound` at this boundary, so callers never see driver errors for
//! ordinary contract failures.

mod keys;
mod memberships;
mod orgs;
mod rootkeys;
mod services;
mod users;

pub use keys::PgVirtualKeyStore;
pub use memberships::PgMembershipStore;
pub use orgs::PgOrganizationStore;
pub use rootkeys::PgRootKeyStore;
pub use services::PgServiceStore;
pub use users::PgUserStore;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Open a Postgres pool and verify the connection.
pub async fn connect(dsn: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new().max_connections(10).connect(dsn).await?;
    sqlx::query("SELECT 1").execute(&pool).await?;
    Ok(pool)
}
