use axum::Extension;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/auth/me - the authenticated caller
pub async fn me(Extension(caller): Extension<AuthUser>) -> ApiResult<AuthUser> {
    Ok(ApiResponse::success(caller))
}
