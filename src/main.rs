use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use glossary_api::auth::issue_session_token;
use glossary_api::config;
use glossary_api::database::models::UserIdentity;
use glossary_api::database::{DatabaseManager, GlossaryStore, MemoryStore, PgStore};
use glossary_api::storage::{HttpStorage, MemoryStorage, ObjectStorage};
use glossary_api::AppState;

#[derive(Parser)]
#[command(name = "glossary-api")]
#[command(about = "Glossary API server")]
#[command(version)]
struct ServerCli {
    #[command(subcommand)]
    command: Option<ServerCommand>,
}

#[derive(Subcommand)]
enum ServerCommand {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Keep data and images in memory instead of PostgreSQL and object storage")]
        memory: bool,
    },

    #[command(about = "Mint a session token for a user identity")]
    IssueToken {
        #[arg(long, help = "OAuth open id of the user")]
        open_id: String,
        #[arg(long, help = "Display name")]
        name: Option<String>,
        #[arg(long, help = "Email address")]
        email: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("glossary_api=info,tower_http=info")),
        )
        .init();

    let cli = ServerCli::parse();

    match cli.command.unwrap_or(ServerCommand::Serve { memory: false }) {
        ServerCommand::Serve { memory } => serve(memory).await,
        ServerCommand::IssueToken { open_id, name, email } => {
            let config = config::config();
            let identity = UserIdentity {
                open_id,
                name,
                email,
                login_method: Some("cli".to_string()),
            };
            let token = issue_session_token(&config.security, identity)?;
            println!("{}", token);
            Ok(())
        }
    }
}

async fn serve(memory: bool) -> anyhow::Result<()> {
    let config = config::config().clone();
    tracing::info!("Starting Glossary API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set in {:?} mode", config.environment);
    }

    let (store, storage): (Arc<dyn GlossaryStore>, Arc<dyn ObjectStorage>) = if memory {
        if glossary_api::is_development!() {
            tracing::info!("Using in-memory store and storage; data is lost on exit");
        } else {
            tracing::warn!("Using in-memory store and storage outside development; data is lost on exit");
        }
        (Arc::new(MemoryStore::new()), Arc::new(MemoryStorage::default()))
    } else {
        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to PostgreSQL")?;
        let storage = HttpStorage::from_config(&config.storage);
        if !storage.is_configured() {
            tracing::warn!("STORAGE_ENDPOINT is not set; image uploads will fail");
        }
        (Arc::new(PgStore::new(pool)), Arc::new(storage))
    };


    let bind_addr = format!("{}:{}", config.api.host, config.api.port);
    let app = glossary_api::app(AppState::new(config, store, storage));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Glossary API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Glossary API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
