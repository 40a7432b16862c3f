use std::env;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set (see .env)")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime settings, read once at startup from the process environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub classifier_url: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub gemini_api_key: Option<String>,
    pub spoonacular_base_url: String,
    pub spoonacular_api_key: Option<String>,
    pub tomtom_base_url: String,
    pub tomtom_api_key: Option<String>,
    pub auth_api_url: String,
    pub session_cache_ttl: Duration,
    pub upstream_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 3000)?,
            classifier_url: env::var("CLASSIFIER_API_URL").unwrap_or_else(|_| {
                "https://software-enginnering-mediassist-ml.onrender.com/predict".to_string()
            }),
            gemini_base_url: env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            gemini_model: env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            gemini_api_key: optional_var("GOOGLE_AI_API_KEY"),
            spoonacular_base_url: env::var("SPOONACULAR_API_URL")
                .unwrap_or_else(|_| "https://api.spoonacular.com".to_string()),
            spoonacular_api_key: optional_var("SPOONACULAR_API_KEY"),
            tomtom_base_url: env::var("TOMTOM_API_URL")
                .unwrap_or_else(|_| "https://api.tomtom.com".to_string()),
            tomtom_api_key: optional_var("TOMTOM_API_KEY"),
            auth_api_url: env::var("AUTH_API_URL")
                .unwrap_or_else(|_| "http://auth.localhost:8080".to_string()),
            session_cache_ttl: Duration::from_secs(parse_var("SESSION_CACHE_TTL_SECS", 300)?),
            upstream_timeout: Duration::from_secs(parse_var("UPSTREAM_TIMEOUT_SECS", 30)?),
        })
    }

    /// Settings for tests and tools that never reach real upstreams.
    pub fn for_database(database_url: &str) -> Self {
        Self {
            database_url: database_url.to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            classifier_url: "http://127.0.0.1:9/predict".to_string(),
            gemini_base_url: "http://127.0.0.1:9".to_string(),
            gemini_model: "gemini-2.0-flash".to_string(),
            gemini_api_key: None,
            spoonacular_base_url: "http://127.0.0.1:9".to_string(),
            spoonacular_api_key: None,
            tomtom_base_url: "http://127.0.0.1:9".to_string(),
            tomtom_api_key: None,
            auth_api_url: "http://127.0.0.1:9".to_string(),
            session_cache_ttl: Duration::from_secs(300),
            upstream_timeout: Duration::from_secs(5),
        }
    }

    /// Port tried when `port` is taken; none when `port` is already the last one.
    pub fn fallback_port(&self) -> Option<u16> {
        self.port.checked_add(1)
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}
