use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use crate::models::prediction_api_models::ClassifierResponse;

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
    #[error("classifier responded with status {0}")]
    Status(u16),
    #[error("classifier response could not be parsed: {0}")]
    Parse(String),
}

/// Remote ensemble (Decision Tree, Naive Bayes, Random Forest) that turns a
/// symptom list into per-model and combined probability maps.
#[async_trait]
pub trait ClassifierGateway: Send + Sync {
    async fn predict(&self, symptoms: &[String]) -> Result<ClassifierResponse, ClassifierError>;
}

#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: reqwest::Client,
    url: String,
}

impl HttpClassifier {
    pub fn new(client: reqwest::Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl ClassifierGateway for HttpClassifier {
    async fn predict(&self, symptoms: &[String]) -> Result<ClassifierResponse, ClassifierError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&json!({ "symptoms": symptoms }))
            .send()
            .await
            .map_err(|e| {
                warn!("🩺 Classifier upstream unreachable: {}", e);
                ClassifierError::Unreachable(e)
            })?;

        if !resp.status().is_success() {
            warn!("🩺 Classifier upstream non-OK: {}", resp.status());
            return Err(ClassifierError::Status(resp.status().as_u16()));
        }

        let body = resp.text().await?;
        serde_json::from_str::<ClassifierResponse>(&body).map_err(|e| {
            warn!("🩺 Classifier upstream JSON parse failed: {}", e);
            ClassifierError::Parse(e.to_string())
        })
    }
}
