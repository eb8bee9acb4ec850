use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde::Deserialize;

use crate::database::models::Glossary;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::organizer::{OrganizedEntries, ViewState};
use crate::services::CreateGlossaryInput;
use crate::state::AppState;

/// GET /api/glossaries - glossaries owned by the caller
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<Vec<Glossary>> {
    let glossaries = state.service.list_glossaries(&caller).await?;
    Ok(ApiResponse::success(glossaries))
}

/// POST /api/glossaries - create a glossary
///
/// Body: `{ "title": "Kotlin", "description": "optional" }`
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiJson(input): ApiJson<CreateGlossaryInput>,
) -> ApiResult<Glossary> {
    let glossary = state.service.create_glossary(&caller, input).await?;
    Ok(ApiResponse::created(glossary))
}

/// GET /api/glossaries/:id - `data` is null when the glossary does not exist
pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(glossary_id): Path<i64>,
) -> ApiResult<Option<Glossary>> {
    let glossary = state.service.get_glossary(&caller, glossary_id).await?;
    Ok(ApiResponse::success(glossary))
}

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub search: Option<String>,
    pub letter: Option<String>,
}

impl ViewQuery {
    /// Builds the view state; a search term overrides the letter
    pub fn into_view_state(self) -> Result<ViewState, ApiError> {
        let mut view = ViewState::default();

        if let Some(letter) = self.letter.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            if letter.chars().count() != 1 {
                return Err(ApiError::invalid_field("letter", "must be a single character"));
            }
            view.select_letter(letter);
        }

        if let Some(search) = self.search.filter(|s| !s.trim().is_empty()) {
            view.set_search(search);
        }

        Ok(view)
    }
}

/// GET /api/glossaries/:id/view?search=&letter= - sorted, filtered and grouped entries
pub async fn view(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(glossary_id): Path<i64>,
    Query(query): Query<ViewQuery>,
) -> ApiResult<OrganizedEntries> {
    let view = query.into_view_state()?;
    let organized = state.service.organize_entries(&caller, glossary_id, &view).await?;
    Ok(ApiResponse::success(organized))
}
