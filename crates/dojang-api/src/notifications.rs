//! Handlers for `/notifications` endpoints.
//!
//! Open to any authenticated principal; ownership is enforced per row by
//! the domain layer. Listings are newest-created-first, capped at ten.

use axum::{
  Json,
  extract::{Path, State},
};
use serde_json::json;
use uuid::Uuid;

use dojang_core::{notification::NotificationFeed, store::ClubStore};

use crate::{AppState, auth::Principal, error::ApiError};

const FEED_LIMIT: usize = 10;

/// `GET /notifications`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Principal(me): Principal,
) -> Result<Json<NotificationFeed>, ApiError>
where
  S: ClubStore + 'static,
{
  let feed = state
    .store
    .list_notifications(me.identity_id, FEED_LIMIT)
    .await?;
  Ok(Json(feed))
}

/// `POST /notifications/{id}/read` — returns the new badge count.
pub async fn mark_read<S>(
  State(state): State<AppState<S>>,
  Principal(me): Principal,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: ClubStore + 'static,
{
  let unread = state.store.mark_read(id, me.identity_id).await?;
  Ok(Json(json!({ "unread_count": unread })))
}

/// `POST /notifications/read-all`
pub async fn mark_all_read<S>(
  State(state): State<AppState<S>>,
  Principal(me): Principal,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: ClubStore + 'static,
{
  let unread = state.store.mark_all_read(me.identity_id).await?;
  Ok(Json(json!({ "unread_count": unread })))
}
