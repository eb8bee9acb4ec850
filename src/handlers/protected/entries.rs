use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::Entry;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::services::{CreateEntryInput, UpdateEntryInput, UploadImageInput, UploadedImage};
use crate::state::AppState;

/// GET /api/glossaries/:id/entries
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(glossary_id): Path<i64>,
) -> ApiResult<Vec<Entry>> {
    let entries = state.service.list_entries(&caller, glossary_id).await?;
    Ok(ApiResponse::success(entries))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(alias = "searchTerm")]
    pub q: Option<String>,
}

/// GET /api/glossaries/:id/entries/search?q=term
pub async fn search(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(glossary_id): Path<i64>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<Entry>> {
    let term = query.q.unwrap_or_default();
    let entries = state.service.search_entries(&caller, glossary_id, &term).await?;
    Ok(ApiResponse::success(entries))
}

/// POST /api/glossaries/:id/entries
///
/// Body: `{ "term": "Coroutine", "definition": "**Markdown**", "imageUrl": "optional" }`
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(glossary_id): Path<i64>,
    ApiJson(input): ApiJson<CreateEntryInput>,
) -> ApiResult<Entry> {
    let entry = state.service.create_entry(&caller, glossary_id, input).await?;
    Ok(ApiResponse::created(entry))
}

/// GET /api/entries/:id - `data` is null when the entry does not exist
pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(entry_id): Path<i64>,
) -> ApiResult<Option<Entry>> {
    let entry = state.service.get_entry(&caller, entry_id).await?;
    Ok(ApiResponse::success(entry))
}

/// PATCH /api/entries/:id - every field optional
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(entry_id): Path<i64>,
    ApiJson(input): ApiJson<UpdateEntryInput>,
) -> ApiResult<Entry> {
    let entry = state.service.update_entry(&caller, entry_id, input).await?;
    Ok(ApiResponse::success(entry))
}

/// DELETE /api/entries/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(entry_id): Path<i64>,
) -> ApiResult<Value> {
    state.service.delete_entry(&caller, entry_id).await?;
    Ok(ApiResponse::success(json!({ "id": entry_id, "deleted": true })))
}

/// POST /api/entries/images
///
/// Body: `{ "fileName": "photo.png", "fileData": "<base64>" }`; answers `{ "url", "key" }`
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiJson(input): ApiJson<UploadImageInput>,
) -> ApiResult<UploadedImage> {
    let image = state.service.upload_image(&caller, input).await?;
    Ok(ApiResponse::created(image))
}
