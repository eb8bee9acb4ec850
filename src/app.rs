use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{protected, public};
use crate::middleware::session_middleware;
use crate::state::AppState;

/// Full HTTP surface: public routes, session-protected API, global layers
pub fn app(state: AppState) -> Router {
    let protected_routes = Router::new()
        .merge(auth_routes())
        .merge(glossary_routes())
        .merge(entry_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), session_middleware));

    let router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/api/auth/logout", post(public::logout))
        // Protected
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .layer(cors_layer(&state.config));

    let router = if state.config.api.enable_request_logging {
        router.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
    } else {
        router
    };

    router.with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use protected::auth;

    Router::new().route("/api/auth/me", get(auth::me))
}

fn glossary_routes() -> Router<AppState> {
    use protected::{entries, glossaries};

    Router::new()
        .route("/api/glossaries", get(glossaries::list).post(glossaries::create))
        .route("/api/glossaries/:id", get(glossaries::get))
        .route("/api/glossaries/:id/view", get(glossaries::view))
        // Entries scoped to a glossary
        .route("/api/glossaries/:id/entries", get(entries::list).post(entries::create))
        .route("/api/glossaries/:id/entries/search", get(entries::search))
}

fn entry_routes() -> Router<AppState> {
    use protected::entries;

    Router::new()
        .route("/api/entries/images", post(entries::upload_image))
        .route(
            "/api/entries/:id",
            get(entries::get).patch(entries::update).delete(entries::delete),
        )
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    // A wildcard origin cannot be combined with credentials
    if config.security.cors_origins.iter().any(|origin| origin.trim() == "*") {
        tracing::warn!("CORS allows any origin; cookies are not sent cross-origin");
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.trim().parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins)).allow_credentials(true)
}
