//! Handlers for `/dashboard/statistics`.
//!
//! Cache population is an explicit operation (`POST`), not a side effect
//! of every view. The read path serves whatever row was last written and
//! recomputes only when no cache exists at all — staleness is acceptable
//! by contract, since the row is always derivable from the source tables.

use axum::{
  Json,
  extract::State,
  response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;

use dojang_core::store::ClubStore;

use crate::{
  AppState, auth::AdminPrincipal, error::ApiError, hx::Fragment,
};

/// `GET /dashboard/statistics` — cached when available.
pub async fn statistics<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
  Fragment(partial): Fragment,
) -> Result<Response, ApiError>
where
  S: ClubStore + 'static,
{
  let (stats, computed_at) = match state.store.cached_dashboard().await? {
    Some(cached) => (cached.value, cached.updated_at),
    None => {
      let now = Utc::now();
      (state.store.recompute_dashboard(now).await?, now)
    }
  };

  // The fragment render carries the same stats, minus the envelope.
  if partial {
    Ok(Json(stats).into_response())
  } else {
    Ok(
      Json(json!({ "stats": stats, "computed_at": computed_at }))
        .into_response(),
    )
  }
}

/// `POST /dashboard/statistics` — force a full recomputation.
pub async fn recompute<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
) -> Result<Response, ApiError>
where
  S: ClubStore + 'static,
{
  let now = Utc::now();
  let stats = state.store.recompute_dashboard(now).await?;
  tracing::info!("dashboard statistics recomputed");
  Ok(Json(json!({ "stats": stats, "computed_at": now })).into_response())
}
