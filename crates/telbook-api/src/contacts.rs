//! Handlers for `/contacts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/contacts` | Filter/sort/pagination query params |
//! | `POST`   | `/contacts` | Body: a new contact; 201 on success |
//! | `GET`    | `/contacts/:id` | 404 if not found |
//! | `PUT`    | `/contacts/:id` | Partial patch; absent keys untouched |
//! | `DELETE` | `/contacts/:id` | Hard removal, 204 |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use telbook_core::{
  asset::AssetStore,
  contact::{Contact, NewContact},
  patch::{ContactPatch, Field},
  query::{
    ContactQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, SortKey,
  },
  store::ContactStore,
};

use crate::{ApiState, error::ApiError, pictures};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub search:              Option<String>,
  pub tag:                 Option<String>,
  pub language:            Option<String>,
  pub is_ert:              Option<bool>,
  pub is_ifa:              Option<bool>,
  pub is_third_party:      Option<bool>,
  pub exclude_third_party: Option<bool>,
  pub sort_by:             Option<String>,
  pub page:                Option<u32>,
  pub limit:               Option<u32>,
}

impl ListParams {
  fn into_query(self) -> ContactQuery {
    ContactQuery {
      search:              self.search,
      tag:                 self.tag,
      language:            self.language,
      is_ert:              self.is_ert,
      is_ifa:              self.is_ifa,
      is_third_party:      self.is_third_party,
      exclude_third_party: self.exclude_third_party.unwrap_or(false),
      sort_by:             self
        .sort_by
        .as_deref()
        .map(SortKey::parse)
        .unwrap_or_default(),
      page:                self.page.unwrap_or(1).max(1),
      page_size:           self
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE),
    }
  }
}

#[derive(Serialize)]
struct Pagination {
  page:        u32,
  limit:       u32,
  total:       u64,
  total_pages: u64,
}

#[derive(Serialize)]
struct ListResponse {
  contacts:   Vec<Contact>,
  pagination: Pagination,
}

/// `GET /contacts[?search=...&tag=...&sort_by=...&page=...&limit=...]`
pub async fn list<S, A>(
  State(state): State<ApiState<S, A>>,
  Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContactStore,
  A: AssetStore,
{
  let query = params.into_query();
  let page = state
    .store
    .list(&query)
    .await
    .map_err(ApiError::from_store)?;

  let total_pages = page.total_pages(query.page_size);
  Ok(Json(ListResponse {
    contacts:   page.contacts,
    pagination: Pagination {
      page: query.page,
      limit: query.page_size,
      total: page.total,
      total_pages,
    },
  }))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /contacts/:id`
pub async fn get_one<S, A>(
  State(state): State<ApiState<S, A>>,
  Path(id): Path<String>,
) -> Result<Json<Contact>, ApiError>
where
  S: ContactStore,
  A: AssetStore,
{
  let contact = state
    .store
    .get(&id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("contact {id} not found")))?;
  Ok(Json(contact))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /contacts` — body: a [`NewContact`].
pub async fn create<S, A>(
  State(state): State<ApiState<S, A>>,
  Json(body): Json<NewContact>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContactStore,
  A: AssetStore,
{
  let mut body = body.normalized();
  body.validate()?;

  // A raw image payload can only be filed once the id is known; hold it
  // back, create the record, then attach the stored URL.
  let raw_picture = body
    .profile_picture
    .take_if(|v| pictures::is_data_uri(v));

  let mut contact = state
    .store
    .create(body)
    .await
    .map_err(ApiError::from_store)?;

  if let Some(data_uri) = raw_picture
    && let Some(url) =
      pictures::store_data_uri(state.assets.as_ref(), &contact.id, &data_uri)
        .await
  {
    let patch = ContactPatch {
      profile_picture: Field::Set(Some(url)),
      ..ContactPatch::default()
    };
    if let Some(updated) = state
      .store
      .update(&contact.id, patch)
      .await
      .map_err(ApiError::from_store)?
    {
      contact = updated;
    }
  }

  Ok((StatusCode::CREATED, Json(contact)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /contacts/:id` — body: a [`ContactPatch`]; only the keys present
/// in the payload are touched.
pub async fn update<S, A>(
  State(state): State<ApiState<S, A>>,
  Path(id): Path<String>,
  Json(patch): Json<ContactPatch>,
) -> Result<Json<Contact>, ApiError>
where
  S: ContactStore,
  A: AssetStore,
{
  let mut patch = patch.normalized();
  patch.validate()?;

  if let Field::Set(Some(value)) = &patch.profile_picture
    && pictures::is_data_uri(value)
  {
    let previous = state
      .store
      .get(&id)
      .await
      .map_err(ApiError::from_store)?
      .and_then(|c| c.profile_picture);

    // On asset failure the field is left unset; the update itself
    // still goes through.
    let url =
      pictures::store_data_uri(state.assets.as_ref(), &id, value).await;
    if url.is_some()
      && let Some(old) = previous
    {
      state.assets.delete(&old).await;
    }
    patch.profile_picture = Field::Set(url);
  }

  let contact = state
    .store
    .update(&id, patch)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("contact {id} not found")))?;
  Ok(Json(contact))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /contacts/:id`
pub async fn delete_one<S, A>(
  State(state): State<ApiState<S, A>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: ContactStore,
  A: AssetStore,
{
  let existing = state
    .store
    .get(&id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("contact {id} not found")))?;

  if !state.store.delete(&id).await.map_err(ApiError::from_store)? {
    return Err(ApiError::NotFound(format!("contact {id} not found")));
  }

  if let Some(url) = existing.profile_picture {
    state.assets.delete(&url).await;
  }

  Ok(StatusCode::NO_CONTENT)
}
