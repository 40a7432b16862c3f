use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub mfa_required: bool,
}

#[derive(Debug, Deserialize)]
struct AuthServiceResponse {
    #[serde(rename = "success", default)]
    _success: bool,
    data: AuthTokens,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("auth service unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
    #[error("auth service rejected the credentials ({0})")]
    Rejected(u16),
    #[error("auth service response could not be parsed: {0}")]
    Parse(String),
}

/// Accepts both `{ success, data: { .. } }` and a bare token object.
pub fn parse_auth_response(body: &str) -> Result<AuthTokens, AuthError> {
    if let Ok(wrapper) = serde_json::from_str::<AuthServiceResponse>(body) {
        return Ok(wrapper.data);
    }
    serde_json::from_str::<AuthTokens>(body).map_err(|e| AuthError::Parse(e.to_string()))
}

pub async fn login_upstream(
    client: &reqwest::Client,
    auth_api_url: &str,
    email: &str,
    password: &str,
) -> Result<AuthTokens, AuthError> {
    let url = format!("{}/api/v1/auth/login", auth_api_url.trim_end_matches('/'));
    let resp = client
        .post(&url)
        .json(&json!({
            "email": email,
            "password": password,
        }))
        .send()
        .await
        .map_err(|e| {
            warn!("🔐 Auth service unreachable: {}", e);
            AuthError::Unreachable(e)
        })?;

    let status = resp.status();
    if !status.is_success() {
        warn!("🔐 Auth service returned {} for {}", status, email);
        return Err(AuthError::Rejected(status.as_u16()));
    }

    let body = resp.text().await?;
    let tokens = parse_auth_response(&body).map_err(|e| {
        warn!("🔐 Auth response parse failed: {}", e);
        e
    })?;
    info!("🔐 Login succeeded for {}", email);
    Ok(tokens)
}
