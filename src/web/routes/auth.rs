use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::services::auth_service::{self, AuthError};
use crate::state::AppState;
use crate::web::middleware::auth::{extract_token, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

fn session_cookie(name: &str, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(name.to_string(), value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

fn expired_cookie(name: &str) -> Cookie<'static> {
    let mut cookie = session_cookie(name, String::new());
    cookie.set_max_age(CookieDuration::ZERO);
    cookie
}

fn with_cookies(mut response: Response, cookies: [Cookie<'static>; 2]) -> Response {
    for cookie in cookies {
        if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

pub async fn login_handler(
    State(state): State<AppState>,
    Json(form): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let email = form.email.trim();
    if email.is_empty() || form.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let tokens =
        match auth_service::login_upstream(&state.http, &state.config.auth_api_url, email, &form.password)
            .await
        {
            Ok(tokens) => tokens,
            Err(AuthError::Rejected(_)) => return Err(ApiError::Unauthorized),
            Err(e) => {
                warn!("🔐 Login for {} failed: {}", email, e);
                return Err(ApiError::internal("Login failed"));
            }
        };

    let body = Json(json!({
        "success": true,
        "mfaRequired": tokens.mfa_required,
    }));
    Ok(with_cookies(
        body.into_response(),
        [
            session_cookie(ACCESS_TOKEN_COOKIE, tokens.access_token),
            session_cookie(REFRESH_TOKEN_COOKIE, tokens.refresh_token),
        ],
    ))
}

pub async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = extract_token(&headers) {
        state.sessions.evict(&token);
    }
    info!("🔐 Logged out");

    with_cookies(
        Json(json!({ "success": true })).into_response(),
        [
            expired_cookie(ACCESS_TOKEN_COOKIE),
            expired_cookie(REFRESH_TOKEN_COOKIE),
        ],
    )
}
