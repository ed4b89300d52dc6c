//! HTTP server command
//!
//! Serves the fyyur, trivia and coffee routes from PostgreSQL, or from a
//! throwaway in-memory store with `--in-memory`.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use fsnd_server::db::{connect, migrations, PoolConfig};
use fsnd_server::{run_server, AppState, AuthConfig, Authorizer, MemoryStore, PgStore, ServerConfig};

use super::require_database_url;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "FSND_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pooled database connections
    #[arg(long, env = "FSND_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Keep everything in process memory instead of PostgreSQL (ignores --database-url)
    #[arg(long)]
    pub in_memory: bool,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let auth = AuthConfig::from_env().context("Invalid Auth0 settings")?;
    let authorizer = auth.as_ref().map(|config| {
        tracing::info!(domain = %config.domain, audience = %config.audience, "Auth0 authorization enabled");
        Authorizer::from_config(config)
    });

    let state = if args.in_memory {
        tracing::warn!("Using in-memory store; data is lost on shutdown");
        AppState::new(MemoryStore::new(), authorizer)
    } else {
        let database_url = require_database_url(args.database_url)?;
        let pool_config = PoolConfig {
            max_connections: args.max_connections,
            ..PoolConfig::default()
        };
        let pool = connect(&database_url, pool_config)
            .await
            .context("Failed to create database pool")?;
        migrations::run(&pool)
            .await
            .context("Failed to run migrations")?;
        AppState::new(PgStore::new(pool), authorizer)
    };

    let config = ServerConfig {
        bind_addr: args.bind,
        cors_permissive: args.cors_permissive,
        request_timeout: Duration::from_secs(args.timeout),
    };

    tracing::info!("Starting fsnd server on {}", config.bind_addr);
    run_server(state, config).await.context("Server error")?;

    Ok(())
}
