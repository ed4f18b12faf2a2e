mod handlers;
mod models;
mod server;
mod services;

use anyhow::Result;
use dotenv::dotenv;
use std::env;
use std::sync::Arc;

use handlers::invoker::DEFAULT_MODEL_SEQUENCE;
use handlers::AnalysisHandler;
use services::{AnonymousIdentity, AuthApiClient, GeminiClient, IdentityService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Load environment variables
    dotenv().ok();

    log::info!("🚀 Starting Food Analysis API...");

    let gemini_api_key = env::var("GEMINI_API_KEY")
        .expect("GEMINI_API_KEY must be set in .env file");

    // Ordered model sequence: primary first, cheapest fallbacks last
    let models: Vec<String> = [
        ("GEMINI_MODEL_PRIMARY", DEFAULT_MODEL_SEQUENCE[0]),
        ("GEMINI_MODEL_FALLBACK", DEFAULT_MODEL_SEQUENCE[1]),
        ("GEMINI_MODEL_FALLBACK_PRO", DEFAULT_MODEL_SEQUENCE[2]),
    ]
    .iter()
    .map(|(key, default)| env::var(key).unwrap_or_else(|_| default.to_string()))
    .collect();

    let gemini = Arc::new(GeminiClient::new(gemini_api_key));
    log::info!("✅ Gemini client initialized (models: {})", models.join(", "));

    // Identity lookup is optional: without an auth backend every caller
    // is treated as anonymous, which never blocks analysis.
    let identity: Arc<dyn IdentityService> =
        match (env::var("AUTH_API_URL"), env::var("AUTH_API_KEY")) {
            (Ok(url), Ok(key)) => {
                log::info!("✅ Identity lookup enabled: {}", url);
                Arc::new(AuthApiClient::new(url, key))
            }
            _ => {
                log::warn!("⚠️ AUTH_API_URL/AUTH_API_KEY not set, treating all requests as anonymous");
                Arc::new(AnonymousIdentity)
            }
        };

    let handler = Arc::new(AnalysisHandler::new(gemini, models));
    log::info!("✅ Analysis handler initialized");

    let addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let app = server::create_router(handler, identity);

    log::info!("🌐 Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
