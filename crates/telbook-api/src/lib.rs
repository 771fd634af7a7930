//! JSON REST API for Telbook.
//!
//! Exposes an axum [`Router`] backed by any
//! [`telbook_core::store::ContactStore`] and
//! [`telbook_core::asset::AssetStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility — parameters arriving here are treated
//! as already validated by the routing layer.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", telbook_api::api_router(store.clone(), assets.clone()))
//! ```

pub mod assets;
pub mod contacts;
pub mod error;
pub mod facets;
mod pictures;

use std::sync::Arc;

use axum::{Router, routing::get};
use telbook_core::{asset::AssetStore, store::ContactStore};

pub use assets::FsAssetStore;
pub use error::ApiError;

/// Shared handler state: the contact store plus the asset capability.
pub struct ApiState<S, A> {
  pub store:  Arc<S>,
  pub assets: Arc<A>,
}

// Hand-written so `S`/`A` don't need to be `Clone` themselves.
impl<S, A> Clone for ApiState<S, A> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      assets: Arc::clone(&self.assets),
    }
  }
}

/// Build a fully-materialised API router for `store` and `assets`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S, A>(store: Arc<S>, assets: Arc<A>) -> Router<()>
where
  S: ContactStore + 'static,
  A: AssetStore + 'static,
{
  Router::new()
    .route(
      "/contacts",
      get(contacts::list::<S, A>).post(contacts::create::<S, A>),
    )
    .route(
      "/contacts/{id}",
      get(contacts::get_one::<S, A>)
        .put(contacts::update::<S, A>)
        .delete(contacts::delete_one::<S, A>),
    )
    .route("/tags", get(facets::tags::<S, A>))
    .route("/languages", get(facets::languages::<S, A>))
    .with_state(ApiState { store, assets })
}
