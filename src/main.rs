use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mediassist::config::AppConfig;
use mediassist::database;
use mediassist::services::classifier_service::HttpClassifier;
use mediassist::services::gemini_service::GeminiClient;
use mediassist::state::AppState;
use mediassist::web::router::build_router;

#[tokio::main]
async fn main() {
    dotenv().ok();

    // 1. Logging (RUST_LOG, default info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 2. Config + database
    let config = AppConfig::from_env().expect("Invalid configuration");
    info!("Connecting to database: {}", config.database_url);
    let pool = database::connect(&config.database_url)
        .await
        .expect("Cannot connect to database");

    // 3. Upstream clients
    let http = reqwest::Client::builder()
        .timeout(config.upstream_timeout)
        .build()
        .expect("Cannot build HTTP client");
    if config.gemini_api_key.is_none() {
        warn!("GOOGLE_AI_API_KEY is not set; disease content will use fallbacks");
    }
    let classifier = Arc::new(HttpClassifier::new(http.clone(), &config.classifier_url));
    let text_model = Arc::new(GeminiClient::new(
        http.clone(),
        &config.gemini_base_url,
        &config.gemini_model,
        config.gemini_api_key.clone(),
    ));

    let host = config.host.clone();
    let port = config.port;
    let fallback_port = config.fallback_port();
    let app = build_router(AppState::new(pool, config, http, classifier, text_model));

    // 4. Serve (with fallback port)
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Cannot parse host/port");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            let fallback_port = fallback_port.expect("Cannot bind port and no fallback port above it");
            warn!(
                "⚠️  Could not bind {}: {}. Trying fallback {}:{}",
                addr, e, host, fallback_port
            );
            let fallback: SocketAddr = format!("{}:{}", host, fallback_port)
                .parse()
                .expect("Cannot parse fallback address");
            tokio::net::TcpListener::bind(fallback)
                .await
                .expect("Cannot bind fallback port")
        }
    };

    let bound_addr = listener.local_addr().expect("Listener has no local address");
    info!("🚀 MediAssist listening on http://{}", bound_addr);

    axum::serve(listener, app).await.expect("Server error");
}
