use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::config::Environment;
use crate::middleware::auth::clear_session_cookie;
use crate::middleware::ApiResponse;
use crate::state::AppState;

/// GET / - service banner
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Glossary API",
            "version": version,
            "description": "Personal glossaries of terms with Markdown definitions",
            "endpoints": {
                "health": "/health (public)",
                "auth": "/api/auth/me (protected), /api/auth/logout (public)",
                "glossaries": "/api/glossaries[/:id] (protected)",
                "entries": "/api/glossaries/:id/entries[/search], /api/entries/:id (protected)",
                "view": "/api/glossaries/:id/view?search=&letter= (protected)",
                "images": "/api/entries/images (protected)",
            }
        }
    }))
}

/// GET /health - store connectivity
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.service.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}

/// POST /api/auth/logout - expire the session cookie
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let security = &state.config.security;
    let secure = security.require_https || state.config.environment == Environment::Production;
    let cookie = clear_session_cookie(&security.session_cookie_name, secure);

    (
        [(header::SET_COOKIE, cookie)],
        ApiResponse::success(json!({ "success": true })),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::AppConfig;
    use crate::database::MemoryStore;
    use crate::storage::MemoryStorage;

    async fn logout_cookie(config: AppConfig) -> String {
        let state = AppState::new(config, Arc::new(MemoryStore::new()), Arc::new(MemoryStorage::default()));
        let response = logout(State(state)).await.into_response();
        response.headers()[header::SET_COOKIE].to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn production_cookie_is_secure_without_require_https() {
        let mut config = AppConfig::development();
        config.environment = Environment::Production;
        config.security.require_https = false;

        assert!(logout_cookie(config).await.ends_with("; Secure"));
    }

    #[tokio::test]
    async fn development_cookie_is_not_secure() {
        assert!(!logout_cookie(AppConfig::development()).await.contains("Secure"));
    }
}
