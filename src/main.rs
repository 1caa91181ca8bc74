use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::RngCore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use drover::audit::TracingAuditSink;
use drover::auth::{Identity, TokenAuthenticator};
use drover::authz::Subject;
use drover::config::ServerConfig;
use drover::events::TracingEventSink;
use drover::install::{InstallStore, Sweeper};
use drover::server::{AppState, create_router};
use drover::store::MemoryStore;

#[derive(Parser)]
#[command(name = "drover")]
#[command(about = "Fleet-management control plane", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Public base URL for external access (e.g., "https://fleet.example.com").
        /// Used for install-script download URLs. If not set, URLs are derived
        /// from request headers.
        #[arg(long)]
        public_base_url: Option<String>,

        /// Disable administrator-facing tenancy routes (agent registration
        /// stays reachable)
        #[arg(long)]
        disable_tenancy: bool,

        /// Use a fixed admin API token instead of generating one
        #[arg(long, env = "DROVER_ADMIN_TOKEN")]
        admin_token: Option<String>,

        /// Load settings from a TOML config file (CLI flags take precedence
        /// for host/port)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn generate_admin_token() -> String {
    let mut buf = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("drover=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            public_base_url,
            disable_tenancy,
            admin_token,
            config,
        } => {
            let mut config = match config {
                Some(path) => ServerConfig::load(&path)
                    .with_context(|| format!("load config {}", path.display()))?,
                None => ServerConfig::default(),
            };
            config.host = host;
            config.port = port;
            if public_base_url.is_some() {
                config.public_base_url = public_base_url;
            }
            if disable_tenancy {
                config.tenancy_enabled = false;
            }

            let admin_token = admin_token.unwrap_or_else(generate_admin_token);
            let authenticator = TokenAuthenticator::new();
            authenticator.register(
                admin_token.clone(),
                Identity {
                    name: "admin".to_string(),
                    subject: Subject::admin(),
                },
            );

            let installs = Arc::new(InstallStore::new());
            let state = Arc::new(AppState {
                store: Arc::new(MemoryStore::new()),
                installs: Arc::clone(&installs),
                authenticator: Arc::new(authenticator),
                audit: Arc::new(TracingAuditSink),
                events: Arc::new(TracingEventSink),
                tenancy_enabled: config.tenancy_enabled,
                public_base_url: config.public_base_url.clone(),
            });

            let sweeper = Sweeper::start(installs, config.install_sweep_interval());

            let app = create_router(state);
            let addr = config.socket_addr()?;

            println!();
            println!("========================================");
            println!("Admin API token (save this, it won't be shown again):");
            println!();
            println!("  {admin_token}");
            println!();
            println!("========================================");
            println!();

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await?;

            sweeper.shutdown().await;
        }
    }

    Ok(())
}
