use axum::extract::FromRef;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::classifier_service::ClassifierGateway;
use crate::services::doctor_search_service::DoctorSearchClient;
use crate::services::gemini_service::TextModel;
use crate::services::recipe_service::RecipeClient;
use crate::web::middleware::session_cache::SessionCache;

/// Everything a handler may need, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<AppConfig>,
    pub http: reqwest::Client,
    pub classifier: Arc<dyn ClassifierGateway>,
    pub text_model: Arc<dyn TextModel>,
    pub recipes: RecipeClient,
    pub doctors: DoctorSearchClient,
    pub sessions: SessionCache,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        config: AppConfig,
        http: reqwest::Client,
        classifier: Arc<dyn ClassifierGateway>,
        text_model: Arc<dyn TextModel>,
    ) -> Self {
        let recipes = RecipeClient::new(
            http.clone(),
            &config.spoonacular_base_url,
            config.spoonacular_api_key.clone(),
        );
        let doctors = DoctorSearchClient::new(
            http.clone(),
            &config.tomtom_base_url,
            config.tomtom_api_key.clone(),
        );
        let sessions = SessionCache::new(config.session_cache_ttl);

        Self {
            pool,
            config: Arc::new(config),
            http,
            classifier,
            text_model,
            recipes,
            doctors,
            sessions,
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}
