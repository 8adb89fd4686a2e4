use clap::Parser;
use scholar::agents::llm::{GeminiProvider, LlmProvider};
use scholar::cli::Cli;
use scholar::config::Settings;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration (file, then env/CLI overrides)
    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;
    let host = settings.server.host.clone();
    let port = settings.server.port;

    info!("Starting Scholar on {}:{}", host, port);
    info!(
        model = %settings.agent.model,
        store = ?settings.store.backend,
        "Agent defaults loaded"
    );

    let llm: Arc<dyn LlmProvider> = Arc::new(GeminiProvider::new(&settings.llm)?);

    // Create application using the library functions
    let (state, health_handler) = scholar::build_state(&settings, llm)?;
    let app = scholar::create_app(state, health_handler, &settings.server.cors_origins);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
