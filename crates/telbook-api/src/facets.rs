//! Handlers for filter-option discovery: `/tags` and `/languages`.

use axum::{Json, extract::State};
use serde::Serialize;
use telbook_core::{asset::AssetStore, store::ContactStore};

use crate::{ApiState, error::ApiError};

#[derive(Serialize)]
pub struct TagsResponse {
  pub tags: Vec<String>,
}

/// `GET /tags` — sorted distinct union of every contact's tags.
pub async fn tags<S, A>(
  State(state): State<ApiState<S, A>>,
) -> Result<Json<TagsResponse>, ApiError>
where
  S: ContactStore,
  A: AssetStore,
{
  let tags = state
    .store
    .distinct_tags()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(TagsResponse { tags }))
}

#[derive(Serialize)]
pub struct LanguagesResponse {
  pub languages: Vec<String>,
}

/// `GET /languages` — sorted distinct union of every contact's languages;
/// English never appears.
pub async fn languages<S, A>(
  State(state): State<ApiState<S, A>>,
) -> Result<Json<LanguagesResponse>, ApiError>
where
  S: ContactStore,
  A: AssetStore,
{
  let languages = state
    .store
    .distinct_languages()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(LanguagesResponse { languages }))
}
