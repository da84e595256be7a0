//! The `bifrost` command line interface.
//!
//! `serve` runs the gateway; `check`, `migrate`, and `init-admin` operate
//! on the configured datastores directly; the remaining subcommands drive
//! the HTTP API of a running gateway. All failures exit non-zero with the
//! error on standard error.

use anyhow::{bail, Context};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::warn;

use bifrost_auth::{AuthToken, SigningKey, TokenCodec};
use bifrost_common::{generate_api_key, generate_id, Config, DbBackend};
use bifrost_db::postgres::{PgMembershipStore, PgOrganizationStore, PgUserStore};
use bifrost_db::{
    MembershipStore, OrganizationStore, RedisCounter, StoreError, UserStore,
};
use bifrost_domain::{Membership, Organization, Role, User};

#[derive(Debug, Parser)]
#[command(name = "bifrost", about = "Bifrost API gateway", version)]
pub struct Cli {
    /// Bifrost API address used by client subcommands
    #[arg(long, global = true, default_value = "http://localhost:3333")]
    pub addr: String,

    /// Requester API key sent as X-API-Key by client subcommands
    #[arg(long, global = true, env = "BIFROST_API_KEY")]
    pub api_key: Option<String>,

    /// Bearer token sent as Authorization by client subcommands
    #[arg(long, global = true, env = "BIFROST_TOKEN")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the gateway server
    Serve {
        /// Enable the authentication bypass for local development.
        /// Requests matching BIFROST_STATIC_API_KEY (or any request when it
        /// is empty) skip the user-store lookup. Loudly logged.
        #[arg(long)]
        insecure_dev: bool,
    },

    /// Check datastore connections
    Check,

    /// Apply database migrations
    Migrate,

    /// Create the bootstrap admin user, organization, and membership
    InitAdmin,

    /// Issue a virtual key
    Issue {
        #[arg(long)]
        id: String,
        #[arg(long, default_value = "read")]
        scope: String,
        #[arg(long)]
        target: String,
        /// Key lifetime in seconds
        #[arg(long, default_value_t = 3600)]
        ttl: i64,
        /// Requests per minute
        #[arg(long, default_value_t = 60)]
        rate_limit: i64,
    },

    /// Revoke a virtual key
    Revoke { id: String },

    /// Register an upstream service
    ServiceAdd {
        #[arg(long)]
        id: String,
        #[arg(long)]
        endpoint: String,
        #[arg(long)]
        root_key: String,
    },

    /// Delete an upstream service
    ServiceDelete { id: String },

    /// Store a root key
    RootkeyAdd {
        #[arg(long)]
        id: String,
        /// Upstream credential the gateway presents on forwarded requests
        #[arg(long)]
        key: String,
    },

    /// Replace a stored root key
    RootkeyUpdate {
        #[arg(long)]
        id: String,
        /// Replacement upstream credential
        #[arg(long)]
        key: String,
    },

    /// Delete a root key
    RootkeyDelete { id: String },

    /// Create a user
    UserAdd {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        org_id: Option<String>,
        #[arg(long)]
        org_name: Option<String>,
        #[arg(long)]
        role: Option<String>,
    },
}

/// Dispatch a parsed invocation.
pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let client = ApiClient::new(&cli);

    match cli.command {
        Command::Serve { insecure_dev } => crate::serve(config, insecure_dev).await,
        Command::Check => check(&config).await,
        Command::Migrate => migrate(&config).await,
        Command::InitAdmin => init_admin(&config).await,
        Command::Issue {
            id,
            scope,
            target,
            ttl,
            rate_limit,
        } => {
            let body = json!({
                "id": id,
                "scope": scope,
                "target": target,
                "expires_at": Utc::now() + Duration::seconds(ttl),
                "rate_limit": rate_limit,
            });
            let created = client.post_json("/v1/keys", &body).await?;
            println!("{created}");
            Ok(())
        }
        Command::Revoke { id } => {
            client.delete(&format!("/v1/keys/{id}")).await?;
            println!("revoked");
            Ok(())
        }
        Command::ServiceAdd {
            id,
            endpoint,
            root_key,
        } => {
            let body = json!({ "id": id, "endpoint": endpoint, "root_key_id": root_key });
            let created = client.post_json("/v1/services", &body).await?;
            println!("{created}");
            Ok(())
        }
        Command::ServiceDelete { id } => {
            client.delete(&format!("/v1/services/{id}")).await?;
            println!("deleted");
            Ok(())
        }
        Command::RootkeyAdd { id, key } => {
            let body = json!({ "id": id, "api_key": key });
            let created = client.post_json("/v1/rootkeys", &body).await?;
            println!("{created}");
            Ok(())
        }
        Command::RootkeyUpdate { id, key } => {
            let body = json!({ "id": id, "api_key": key });
            let updated = client.put_json(&format!("/v1/rootkeys/{id}"), &body).await?;
            println!("{updated}");
            Ok(())
        }
        Command::RootkeyDelete { id } => {
            client.delete(&format!("/v1/rootkeys/{id}")).await?;
            println!("deleted");
            Ok(())
        }
        Command::UserAdd {
            name,
            email,
            org_id,
            org_name,
            role,
        } => {
            let body = json!({
                "name": name,
                "email": email,
                "org_id": org_id.unwrap_or_default(),
                "org_name": org_name.unwrap_or_default(),
                "role": role.unwrap_or_default(),
            });
            let created = client.post_json("/v1/users", &body).await?;
            println!("{created}");
            Ok(())
        }
    }
}

/// Ping the configured datastores.
async fn check(config: &Config) -> anyhow::Result<()> {
    if !config.database_dsn.is_empty() {
        bifrost_db::postgres::connect(&config.database_dsn)
            .await
            .context("postgres check failed")?;
    }

    let counter = RedisCounter::open(&config.redis.url())?;
    counter.ping().await.context("redis check failed")?;

    println!("connections ok");
    Ok(())
}

/// Apply embedded migrations, or skip with a log line for the in-memory
/// backend.
async fn migrate(config: &Config) -> anyhow::Result<()> {
    if config.db != DbBackend::Postgres {
        tracing::info!("skipping migrations for in-memory backend");
        println!("skipping migrations for in-memory backend");
        return Ok(());
    }
    anyhow::ensure!(
        !config.database_dsn.is_empty(),
        "DATABASE_DSN is required for BIFROST_DB=postgres"
    );

    let pool = bifrost_db::postgres::connect(&config.database_dsn).await?;
    crate::run_migrations(&pool).await?;
    println!("migrations applied");
    Ok(())
}

/// Create the bootstrap admin user, organization, and membership.
/// Idempotent: existing records (matched by email and org name) are warned
/// about and reused; a fresh 24-hour token is printed either way.
async fn init_admin(config: &Config) -> anyhow::Result<()> {
    anyhow::ensure!(
        !config.database_dsn.is_empty(),
        "DATABASE_DSN is required for init-admin"
    );
    let pool = bifrost_db::postgres::connect(&config.database_dsn).await?;

    let users = PgUserStore::new(pool.clone());
    let orgs = PgOrganizationStore::new(pool.clone());
    let memberships = PgMembershipStore::new(pool);

    let admin = &config.admin;

    let user = match users.get_by_email(&admin.email).await {
        Ok(existing) => {
            warn!(user_id = %existing.id, "admin user already exists, reusing it");
            existing
        }
        Err(StoreError::NotFound) => {
            let api_key = if admin.api_key.is_empty() {
                generate_api_key()
            } else {
                admin.api_key.clone()
            };
            let user = User::new(generate_id(), admin.name.clone(), admin.email.clone(), api_key)
                .map_err(|e| anyhow::anyhow!("invalid admin config: {e}"))?;
            users
                .create(user.clone())
                .await
                .context("failed to create admin user")?;
            user
        }
        Err(err) => return Err(err).context("admin user lookup failed"),
    };

    let org = match orgs.get_by_name(&admin.org_name).await {
        Ok(existing) => {
            warn!(org_id = %existing.id, "admin organization already exists, reusing it");
            existing
        }
        Err(StoreError::NotFound) => {
            let org = Organization {
                id: generate_id(),
                name: admin.org_name.clone(),
                domain: admin.org_domain.clone(),
                email: admin.org_email.clone(),
            };
            orgs.create(org.clone())
                .await
                .context("failed to create admin organization")?;
            org
        }
        Err(err) => return Err(err).context("admin organization lookup failed"),
    };

    let role = Role::parse(&admin.role)
        .ok_or_else(|| anyhow::anyhow!("invalid BIFROST_ADMIN_ROLE {:?}", admin.role))?;
    match memberships.get(&user.id, &org.id).await {
        Ok(_) => warn!("admin membership already exists, reusing it"),
        Err(StoreError::NotFound) => {
            memberships
                .create(Membership {
                    user_id: user.id.clone(),
                    org_id: org.id.clone(),
                    role,
                })
                .await
                .context("failed to create admin membership")?;
        }
        Err(err) => return Err(err).context("admin membership lookup failed"),
    }

    let codec = TokenCodec::new(SigningKey::load(config.signing_key.as_deref()));
    let token = codec
        .sign(&AuthToken {
            user_id: user.id.clone(),
            org_id: org.id.clone(),
            expires_at: Utc::now() + Duration::hours(24),
        })
        .map_err(|e| anyhow::anyhow!("failed to sign admin token: {e}"))?;

    println!("api_key: {}", user.api_key);
    println!("token: {token}");
    Ok(())
}

/// Thin HTTP client for the API-driving subcommands.
struct ApiClient {
    base: String,
    api_key: Option<String>,
    token: Option<String>,
    http: reqwest::Client,
}

impl ApiClient {
    fn new(cli: &Cli) -> Self {
        Self {
            base: cli.addr.trim_end_matches('/').to_string(),
            api_key: cli.api_key.clone(),
            token: cli.token.clone(),
            http: reqwest::Client::new(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{}", self.base, path));
        if let Some(key) = &self.api_key {
            builder = builder.header("X-API-Key", key);
        }
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn post_json(&self, path: &str, body: &serde_json::Value) -> anyhow::Result<String> {
        let response = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await?;
        Self::expect_success(response).await
    }

    async fn put_json(&self, path: &str, body: &serde_json::Value) -> anyhow::Result<String> {
        let response = self
            .request(reqwest::Method::PUT, path)
            .json(body)
            .send()
            .await?;
        Self::expect_success(response).await
    }

    async fn delete(&self, path: &str) -> anyhow::Result<()> {
        let response = self.request(reqwest::Method::DELETE, path).send().await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    async fn expect_success(response: reqwest::Response) -> anyhow::Result<String> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            bail!("server error ({status}): {}", body.trim());
        }
        Ok(body)
    }
}
