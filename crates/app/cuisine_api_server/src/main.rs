//! Cuisine Quest API server binary.

use std::sync::Arc;

use clap::Parser;
use cuisine_api::config::ApiConfig;
use cuisine_core::mail::{LogMailer, Mailer, SmtpMailer};
use cuisine_core::meals::{DEFAULT_MEALDB_BASE_URL, MealClient};
use cuisine_core::store::{MemoryUserStore, PgUserStore, UserStore};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

const DEFAULT_LOG_FILTER: &str = "info,cuisine_api=debug,cuisine_core=debug";

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "cuisine_api_server", about = "Cuisine Quest API server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:3100")]
    bind_addr: String,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/cuisine"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Keep users and favorites in memory instead of PostgreSQL. Everything
    /// is lost on exit.
    #[arg(long, default_value_t = false)]
    memory_store: bool,

    /// Public URL of the web client, used in password-reset links.
    #[arg(long, env = "APP_URL", default_value = "http://localhost:3000")]
    app_url: String,

    /// TheMealDB API root.
    #[arg(long, env = "MEALDB_BASE_URL", default_value = DEFAULT_MEALDB_BASE_URL)]
    mealdb_base_url: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let args = Args::parse();

    // Secret and SMTP settings come from the environment only.
    let config = ApiConfig {
        bind_addr: args.bind_addr,
        pg_connection_url: args.database_url,
        app_url: args.app_url,
        mealdb_base_url: args.mealdb_base_url,
        ..ApiConfig::from_env()?
    };

    info!(
        bind_addr = %config.bind_addr,
        memory_store = args.memory_store,
        "starting cuisine_api_server"
    );

    let store: Arc<dyn UserStore> = if args.memory_store {
        warn!("using in-memory store, data will not persist");
        Arc::new(MemoryUserStore::new())
    } else {
        info!(
            max_connections = args.max_connections,
            "configuring connection pool"
        );
        let pool = PgPoolOptions::new()
            .max_connections(args.max_connections)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect(&config.pg_connection_url)
            .await?;

        info!("running database migrations");
        cuisine_api::migrate(&pool).await?;
        Arc::new(PgUserStore::new(pool))
    };

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => {
            info!(host = %smtp.host, port = smtp.port, "SMTP mail delivery enabled");
            Arc::new(SmtpMailer::new(smtp)?)
        }
        None => {
            warn!("SMTP_HOST not set, reset emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let state = cuisine_api::AppState {
        store,
        mailer,
        meals: MealClient::new(reqwest::Client::new(), config.mealdb_base_url.clone()),
        config: config.clone(),
    };

    let app = cuisine_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
