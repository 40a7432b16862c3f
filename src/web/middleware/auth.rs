use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use cookie::Cookie;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use crate::database::{current_user_repo, user_repo};
use crate::error::ApiError;
use crate::state::AppState;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is not a JWT")]
    Malformed,
    #[error("token payload is unreadable")]
    Payload,
    #[error("token has expired")]
    Expired,
}

/// Access token from the `access_token` cookie, else `Authorization: Bearer`.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|hv| hv.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == ACCESS_TOKEN_COOKIE && !c.value().is_empty())
        .map(|c| c.value().to_string());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|hv| hv.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    })
}

/// Reads the payload segment only; signatures are the auth service's job.
pub fn decode_claims(token: &str, now: i64) -> Result<JwtClaims, TokenError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(TokenError::Malformed);
    }
    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|_| TokenError::Payload)?;
    let claims: JwtClaims = serde_json::from_slice(&payload).map_err(|_| TokenError::Payload)?;

    if claims.sub.trim().is_empty() {
        return Err(TokenError::Payload);
    }
    if claims.exp.is_some_and(|exp| exp <= now) {
        return Err(TokenError::Expired);
    }
    Ok(claims)
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token(request.headers()) {
        let user_id = match state.sessions.get(&token) {
            Some(user_id) => user_id,
            None => {
                let now = Utc::now().timestamp();
                match decode_claims(&token, now) {
                    Ok(claims) => {
                        let remaining = claims
                            .exp
                            .map(|exp| Duration::from_secs(exp.saturating_sub(now).max(0) as u64));
                        // First sighting of this token: mirror the user locally.
                        if let Err(e) = user_repo::ensure_user(
                            &state.pool,
                            &claims.sub,
                            claims.name.as_deref(),
                            claims.email.as_deref(),
                        )
                        .await
                        {
                            warn!("🔐 Could not record user {}: {}", claims.sub, e);
                        }
                        state.sessions.insert(&token, &claims.sub, remaining);
                        claims.sub
                    }
                    Err(e) => {
                        warn!("🔐 Rejected access token: {}", e);
                        return ApiError::Unauthorized.into_response();
                    }
                }
            }
        };

        request
            .extensions_mut()
            .insert(AuthenticatedUser { id: user_id });
        return next.run(request).await;
    }

    // Local/offline fallback: the single-row current_user table.
    match current_user_repo::load_current_user_id(&state.pool).await {
        Ok(Some(user_id)) => {
            request
                .extensions_mut()
                .insert(AuthenticatedUser { id: user_id });
            next.run(request).await
        }
        Ok(None) => ApiError::Unauthorized.into_response(),
        Err(e) => {
            warn!("🔐 current_user lookup failed: {}", e);
            ApiError::Unauthorized.into_response()
        }
    }
}
