use dotenvy::dotenv;
use std::env;

use mediassist::config::AppConfig;
use mediassist::database;
use mediassist::services::content_backfill_service;
use mediassist::services::gemini_service::GeminiClient;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().expect("Invalid configuration");
    let pool = database::connect(&config.database_url)
        .await
        .expect("Cannot connect to database");

    let limit: i64 = env::var("BACKFILL_LIMIT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(200);

    let http = reqwest::Client::builder()
        .timeout(config.upstream_timeout)
        .build()
        .expect("Cannot build HTTP client");
    let model = GeminiClient::new(
        http,
        &config.gemini_base_url,
        &config.gemini_model,
        config.gemini_api_key.clone(),
    );

    match content_backfill_service::backfill_prediction_content(&pool, &model, limit).await {
        Ok(report) => {
            println!(
                "content backfill: candidates={}, updated={}, skipped={}, failed={}",
                report.candidates, report.updated, report.skipped, report.failed
            );
        }
        Err(e) => {
            eprintln!("content backfill failed: {}", e);
            std::process::exit(1);
        }
    }
}
