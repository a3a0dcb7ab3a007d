//! law-cli: `serve` / `health` / `reindex` (§6 "CLI"). Exit codes: 0 success, 1 config
//! error, 2 artifact-missing, 3 bind error.
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use law_embed::LocalHashEmbedder;
use law_llm::LlmClient;
use law_orchestrator::AppContext;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const EXIT_CONFIG_ERROR: i32 = 1;
const EXIT_ARTIFACT_MISSING: i32 = 2;
const EXIT_BIND_ERROR: i32 = 3;

#[derive(Parser, Debug)]
#[command(name = "law-cli", version, about = "Chinese criminal-law retrieval service")]
struct Cli {
    /// Path to a TOML config file; defaults to `./law-cli.toml` if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load artifacts, wire up the orchestrator, and keep the process running.
    Serve,
    /// Load artifacts and report readiness, then exit.
    Health,
    /// Stub: reindexing is offline tooling, out of scope here (§9 Non-goals).
    Reindex {
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let service_config = match config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {e}");
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    };

    init_tracing(&service_config.log_level);

    match cli.command {
        Command::Serve => run_serve(service_config).await,
        Command::Health => run_health(service_config).await,
        Command::Reindex { data_dir } => run_reindex(data_dir),
    }
}

async fn bootstrap(service_config: &config::ServiceConfig) -> Result<AppContext, i32> {
    let embedder: Arc<dyn law_embed::EmbeddingProvider> = Arc::new(LocalHashEmbedder::default());

    let primary = Arc::new(law_llm::RemoteLlmProvider::new(
        service_config.llm_provider.clone(),
        "https://api.openai.com/v1",
        service_config.llm_api_key.clone(),
        "gpt-4o-mini",
    ));
    let fallback: Option<Arc<dyn law_llm::LlmProvider>> = service_config.llm_fallback_provider.as_ref().map(|name| {
        Arc::new(law_llm::RemoteLlmProvider::new(
            name.clone(),
            "https://api.openai.com/v1",
            service_config.llm_fallback_api_key.clone().unwrap_or_default(),
            "gpt-4o-mini",
        )) as Arc<dyn law_llm::LlmProvider>
    });
    let llm = Arc::new(LlmClient::new(primary, fallback, service_config.llm_daily_budget));

    AppContext::bootstrap(&service_config.data_dir(), embedder, llm, service_config.orchestrator_config())
        .await
        .map_err(|e| {
            error!(error = %e, "failed to load artifacts");
            EXIT_ARTIFACT_MISSING
        })
}

async fn run_serve(service_config: config::ServiceConfig) {
    // HTTP/WebSocket transport is out of scope (§9 Non-goals); `serve` brings the
    // orchestrator up to a ready state and blocks, the way a real listener would once
    // a transport is wired in.
    let listen_addr: std::net::SocketAddr = match service_config.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(addr = %service_config.listen_addr, error = %e, "invalid listen address");
            std::process::exit(EXIT_BIND_ERROR);
        }
    };

    let ctx = match bootstrap(&service_config).await {
        Ok(ctx) => ctx,
        Err(code) => std::process::exit(code),
    };

    info!(%listen_addr, "law-cli ready");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");
    let _ = ctx.state().await;
}

async fn run_health(service_config: config::ServiceConfig) {
    match bootstrap(&service_config).await {
        Ok(ctx) => {
            let state = ctx.state().await;
            println!("{}", serde_json::to_string_pretty(&state).unwrap_or_default());
            if !state.is_ready() {
                std::process::exit(EXIT_ARTIFACT_MISSING);
            }
        }
        Err(code) => std::process::exit(code),
    }
}

fn run_reindex(data_dir: Option<PathBuf>) {
    info!(
        data_dir = ?data_dir,
        "reindex is offline tooling and out of scope for this binary; regenerate the on-disk artifacts under DATA_DIR and restart `serve`"
    );
}
