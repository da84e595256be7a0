//! Bifrost application composition root.
//!
//! Builds the gateway aggregate from configuration, wires the router, and
//! runs the HTTP server. The admin CLI lives in [`cli`].

pub mod cli;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bifrost_api::{Gateway, Metrics};
use bifrost_auth::{SigningKey, TokenCodec};
use bifrost_common::{Config, DbBackend};
use bifrost_db::postgres::{
    self, PgMembershipStore, PgOrganizationStore, PgRootKeyStore, PgServiceStore, PgUserStore,
    PgVirtualKeyStore,
};
use bifrost_db::RedisCounter;

/// Initialize the global tracing subscriber from configuration.
///
/// `RUST_LOG` overrides `BIFROST_LOG_LEVEL` when set, so operators can
/// still scope filters per module.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    if config.log_format == "console" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .pretty()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    }
}

/// Assemble a gateway from configuration.
///
/// Returns the Postgres pool alongside when that backend is selected so
/// callers (the migrate path, init-admin) can reuse it.
pub async fn build_gateway(
    config: &Config,
    insecure_dev: bool,
) -> anyhow::Result<(Gateway, Option<PgPool>)> {
    let tokens = TokenCodec::new(SigningKey::load(config.signing_key.as_deref()));
    let mut builder = Gateway::builder(tokens);

    if config.redis.protocol != 3 {
        warn!(
            protocol = config.redis.protocol,
            "non-default REDIS_PROTOCOL configured; the client negotiates the protocol on connect"
        );
    }
    let counter =
        RedisCounter::open(&config.redis.url()).context("invalid redis configuration")?;
    builder = builder.shared_counter(Arc::new(counter));

    let pool = match config.db {
        DbBackend::Postgres => {
            let dsn = &config.database_dsn;
            anyhow::ensure!(!dsn.is_empty(), "DATABASE_DSN is required for BIFROST_DB=postgres");
            let pool = postgres::connect(dsn)
                .await
                .context("failed to connect to postgres")?;
            info!("connected to postgres entity stores");
            builder = builder
                .users(Arc::new(PgUserStore::new(pool.clone())))
                .orgs(Arc::new(PgOrganizationStore::new(pool.clone())))
                .memberships(Arc::new(PgMembershipStore::new(pool.clone())))
                .keys(Arc::new(PgVirtualKeyStore::new(pool.clone())))
                .services(Arc::new(PgServiceStore::new(pool.clone())))
                .root_keys(Arc::new(PgRootKeyStore::new(pool.clone())));
            Some(pool)
        }
        DbBackend::Sqlite => {
            warn!("sqlite backend is served by the in-memory store set; data will not persist");
            None
        }
        DbBackend::Memory => {
            info!("using in-memory entity stores");
            None
        }
    };

    if config.enable_metrics {
        builder = builder.metrics(Arc::new(Metrics::new()));
    }

    if insecure_dev {
        warn!(
            "INSECURE-DEV MODE: requester authentication bypass is enabled; \
             never run this in production"
        );
        builder = builder.bypass_key(config.static_api_key.clone());
    }

    Ok((builder.build(), pool))
}

/// Apply embedded SQL migrations. Applied migrations are tracked, so
/// re-running is a no-op.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .context("failed to apply migrations")?;
    Ok(())
}

/// Run the gateway server until SIGINT/SIGTERM.
pub async fn serve(config: Config, insecure_dev: bool) -> anyhow::Result<()> {
    if !config.mode.is_empty() {
        info!(mode = %config.mode, "bifrost mode");
    }

    let (gateway, _pool) = build_gateway(&config, insecure_dev).await?;

    let app = bifrost_api::router(gateway).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .into_inner(),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, "bifrost listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("received terminate signal, starting graceful shutdown");
        },
    }
}
