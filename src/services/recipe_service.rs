use serde_json::Value;
use tracing::warn;

pub const RESULTS_PER_SEARCH: u32 = 12;
const HEALTH_SCORE_RANGE: &str = "50-100";

#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    #[error("SPOONACULAR_API_KEY is not configured")]
    MissingApiKey,
    #[error("recipe upstream unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
    #[error("recipe upstream responded with status {0}")]
    Status(u16),
    #[error("recipe upstream sent invalid JSON: {0}")]
    Parse(String),
}

/// Upstream bodies are passed on as-is, but they must at least be JSON.
pub fn parse_recipe_body(body: &str) -> Result<Value, RecipeError> {
    serde_json::from_str::<Value>(body).map_err(|e| RecipeError::Parse(e.to_string()))
}

/// Thin Spoonacular client; responses are passed through untouched.
#[derive(Debug, Clone)]
pub struct RecipeClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl RecipeClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn search_url(&self) -> String {
        format!("{}/recipes/complexSearch", self.base_url)
    }

    pub fn information_url(&self, recipe_id: u64) -> String {
        format!("{}/recipes/{}/information", self.base_url, recipe_id)
    }

    fn api_key(&self) -> Result<&str, RecipeError> {
        self.api_key.as_deref().ok_or(RecipeError::MissingApiKey)
    }

    pub async fn search(&self, query: &str) -> Result<Value, RecipeError> {
        let number = RESULTS_PER_SEARCH.to_string();
        let params = [
            ("apiKey", self.api_key()?),
            ("query", query),
            ("number", number.as_str()),
            ("instructionsRequired", "true"),
            ("addRecipeInformation", "true"),
            ("fillIngredients", "true"),
            ("healthScore", HEALTH_SCORE_RANGE),
        ];
        self.fetch(&self.search_url(), &params).await
    }

    pub async fn information(&self, recipe_id: u64) -> Result<Value, RecipeError> {
        let params = [("apiKey", self.api_key()?)];
        self.fetch(&self.information_url(recipe_id), &params).await
    }

    async fn fetch(&self, url: &str, params: &[(&str, &str)]) -> Result<Value, RecipeError> {
        let resp = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                warn!("🥗 Recipe upstream unreachable: {}", e);
                RecipeError::Unreachable(e)
            })?;

        if !resp.status().is_success() {
            warn!("🥗 Recipe upstream non-OK: {}", resp.status());
            return Err(RecipeError::Status(resp.status().as_u16()));
        }

        let body = resp.text().await?;
        parse_recipe_body(&body).map_err(|e| {
            warn!("🥗 Recipe upstream JSON parse failed: {}", e);
            e
        })
    }
}
