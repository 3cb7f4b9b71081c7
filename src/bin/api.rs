use fintech_advisor::{
    api::start_server, config::AdvisorConfig, conversation::ConversationController,
    state::InMemorySessionStore,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AdvisorConfig::from_env()?;

    if config.gemini_api_key.is_empty() {
        warn!("GEMINI_API_KEY not set, every model call will fall back to an apology");
    }
    if config.news_api_key.is_none() {
        warn!("NEWSAPI_KEY not set, suggestions will not include news");
    }

    info!("Fintech Advisor - API Server");
    info!(port = config.api_port, model = %config.gemini_model, "Configuration loaded");

    let controller = Arc::new(ConversationController::from_config(&config)?);
    let sessions = Arc::new(InMemorySessionStore::new());

    info!("Controller initialized, starting API server");

    start_server(controller, sessions, config.api_port).await?;

    Ok(())
}
