use clap::Parser;
use nim_proxy::{build_router, models, server, AppState, ProxyConfig, SharedLogger};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "nim-proxy",
    about = "OpenAI-compatible chat completions proxy for the NVIDIA NIM API",
    long_about = "OpenAI-compatible chat completions proxy for the NVIDIA NIM API.\n\n\
                  Configured through the environment: NIM_API_KEY (required for chat \
                  requests), NIM_API_BASE, PORT, NIM_TIMEOUT_SECS.",
    version
)]
struct Cli {
    /// Request log file path (JSONL)
    #[arg(long, default_value = "nim-proxy.log")]
    log_file: PathBuf,

    /// Print the model mapping table and exit
    #[arg(long)]
    show_models: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nim_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if cli.show_models {
        println!("Model mapping:");
        for alias in models::model_mapping() {
            let thinking = if models::supports_thinking(alias.nim_model) {
                "  [thinking]"
            } else {
                ""
            };
            println!("  {:<18} → {}{}", alias.name, alias.nim_model, thinking);
        }
        println!("Unmapped names are probed upstream, then matched by pattern.");
        return Ok(());
    }

    let config = ProxyConfig::from_env()?;
    let logger = SharedLogger::new(&cli.log_file)?;

    info!("═══════════════════════════════════════════════════════");
    info!("  OpenAI → NVIDIA NIM Proxy v{}", server::SERVICE_VERSION);
    info!("═══════════════════════════════════════════════════════");
    info!("  Base URL:  {}", config.base_url);
    info!("  Port:      {}", config.port);
    info!("  Timeout:   {}s", config.timeout.as_secs());
    info!("  Models:    {} mapped", models::model_mapping().len());
    info!("  Reasoning display: disabled");
    info!("  Thinking mode:     disabled");
    info!("  Log file:  {}", cli.log_file.display());
    if config.has_api_key() {
        info!("  API key:   configured");
    } else {
        warn!("  API key:   missing (set NIM_API_KEY); chat requests will fail");
    }

    logger.info(
        "startup",
        format!(
            "Starting nim-proxy base_url={} port={} api_key_configured={}",
            config.base_url,
            config.port,
            config.has_api_key()
        ),
    );

    let client = reqwest::Client::builder().timeout(config.timeout).build()?;

    let state = Arc::new(AppState {
        config: config.clone(),
        client,
        logger,
    });

    let app = build_router(state);
    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Listening on http://{}", bind_addr);
    info!("  Health check: http://localhost:{}/health", config.port);
    info!("  Models list:  http://localhost:{}/v1/models", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
