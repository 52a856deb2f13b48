//! Domainkeeper API server binary.
//!
//! Connects to PostgreSQL, runs migrations, starts the two daily expiry
//! triggers and serves the HTTP API until a shutdown signal arrives.

use std::sync::Arc;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing::info;

use domainkeeper_core::clock::SystemClock;
use domainkeeper_core::notify::scheduler::NotificationScheduler;

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "domainkeeper_server", about = "Domainkeeper API server")]
struct Args {
    /// Address to bind (overrides BIND_ADDR).
    #[arg(long)]
    bind_addr: Option<String>,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/domainkeeper"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,domainkeeper_api=debug,domainkeeper_core=debug"
                    .parse()
                    .unwrap()
            }),
        )
        .init();

    let args = Args::parse();

    let mut config = domainkeeper_api::config::ApiConfig::from_env();
    config.database_url = args.database_url;
    if let Some(bind_addr) = args.bind_addr {
        config.bind_addr = bind_addr;
    }

    info!(database_url = %config.database_url, bind_addr = %config.bind_addr,
          "starting domainkeeper_server");

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&config.database_url)
        .await?;

    info!("running database migrations");
    domainkeeper_api::migrate(&pool).await?;

    let mailer = config.mailer();
    let scheduler = NotificationScheduler::new(
        pool.clone(),
        mailer.clone(),
        Arc::new(SystemClock),
        config.scheduler_config(),
    );

    let ct = CancellationToken::new();
    scheduler.start(ct.clone());

    let state = domainkeeper_api::AppState {
        pool,
        config: config.clone(),
        mailer,
        scheduler,
    };

    let app = domainkeeper_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "REST API listening");

    let shutdown_ct = ct.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
            shutdown_ct.cancel();
        })
        .await?;

    // Make sure the scheduler tasks stop even if serve returned on its own.
    ct.cancel();

    Ok(())
}
