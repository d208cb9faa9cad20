use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blueprint::{ai, api, db, mcp};

#[derive(Parser)]
#[command(name = "bpt")]
#[command(about = "Startup planning server: roadmap boards and AI-drafted planning documents")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Blueprint server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Start MCP server via stdio (for agent integration)
    Mcp,
    /// Check server status
    Status {
        /// Port the server was started on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "blueprint=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { port }) => serve(port).await?,
        Some(Commands::Mcp) => {
            let db = db::Database::open_default()?;
            db.migrate()?;

            mcp::run_stdio_server(db).await?;
        }
        Some(Commands::Status { port }) => {
            let url = format!("http://127.0.0.1:{}/health", port);
            match reqwest::get(&url).await {
                Ok(response) if response.status().is_success() => {
                    println!("Blueprint server is running on port {}", port);
                }
                Ok(response) => {
                    println!("Blueprint server responded with {}", response.status());
                }
                Err(_) => {
                    println!("Blueprint server is not running on port {}", port);
                }
            }
        }
        None => serve(3000).await?,
    }

    Ok(())
}

async fn serve(port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting Blueprint server on port {}", port);

    let db = db::Database::open_default()?;
    db.migrate()?;

    let state = api::AppState::new(db, ai::provider_from_env());
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Blueprint server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}
