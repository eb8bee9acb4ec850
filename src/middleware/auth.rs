use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};

use crate::auth::validate_jwt;
use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller, resolved from the session token and the users table.
///
/// Handlers receive it through `Extension<AuthUser>` and hand it to every
/// service call explicitly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: i64,
    pub open_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: String,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            open_id: user.open_id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Session middleware: validates the session token and injects `AuthUser`.
///
/// The token comes from `Authorization: Bearer` or, failing that, the session
/// cookie. Requests without a valid session never reach the handler.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let security = &state.config.security;

    let token = extract_token(request.headers(), &security.session_cookie_name).ok_or_else(|| {
        tracing::warn!("Rejected request to {}: no session", request.uri().path());
        ApiError::unauthorized("Please login (10001)")
    })?;

    let claims = validate_jwt(&security.jwt_secret, &token).map_err(|e| {
        tracing::warn!("Rejected request to {}: {}", request.uri().path(), e);
        ApiError::from(e)
    })?;

    let user = state.service.sign_in(&claims.identity()).await?;
    tracing::debug!("Authenticated user {} ({})", user.id, user.open_id);

    request.extensions_mut().insert(AuthUser::from(user));

    Ok(next.run(request).await)
}

/// Bearer header first, then the named cookie
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value that drops the session cookie
pub fn clear_session_cookie(cookie_name: &str, secure: bool) -> String {
    let mut cookie = format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", cookie_name);
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
