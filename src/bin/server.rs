use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use askboard::config::{CliArgs, get_config};
use askboard::{create_app, db, repo};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads them
    dotenv::dotenv().ok();

    let args = CliArgs::parse();

    // Initialize logging; RUST_LOG overrides the default level
    let default_level = if args.debug { "debug" } else { "info" };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.parse()?)
        .from_env_lossy();
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    if args.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(writer)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(writer)
            .init();
    }

    let config = get_config(&args);

    // Initialize the database pool
    let pool = Arc::new(db::init_pool(&config.database_url).context("Failed to open database")?);
    {
        let mut conn = pool.get().context("Failed to get a database connection")?;
        db::run_migrations(&mut conn)?;
    }
    info!("Database ready at {}", config.database_url);

    let _rank_refresh = repo::spawn_rank_refresh(pool.clone(), config.rank_refresh_interval());

    let app = create_app(pool);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
