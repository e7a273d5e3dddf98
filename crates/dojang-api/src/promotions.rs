//! Handlers for `/promotions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/promotions` | Eligibility roster for every active trainee |
//! | `GET`  | `/promotions/history` | Newest first |
//! | `GET`  | `/promotions/{trainee_id}` | Candidate belts, strictly higher |
//! | `POST` | `/promotions/{trainee_id}` | Body: `{"belt_id":…}` |
//!
//! All routes are admin-gated. The roster surfaces the time and performance
//! flags independently; overall eligibility follows the tenure rule alone.

use axum::{
  Json,
  extract::{Path, State},
  response::Response,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use dojang_core::{
  belt::Belt,
  promotion::{Promotion, PromotionCandidate},
  store::ClubStore,
};

use crate::{
  AppState, auth::AdminPrincipal, error::ApiError, hx::trigger,
};

/// `GET /promotions`
pub async fn roster<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
) -> Result<Json<Vec<PromotionCandidate>>, ApiError>
where
  S: ClubStore + 'static,
{
  let today = Utc::now().date_naive();
  Ok(Json(state.store.promotion_roster(today).await?))
}

/// `GET /promotions/{trainee_id}` — the pre-filtered candidate list. The
/// promotion operation re-validates regardless.
pub async fn candidates<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
  Path(trainee_id): Path<Uuid>,
) -> Result<Json<Vec<Belt>>, ApiError>
where
  S: ClubStore + 'static,
{
  Ok(Json(state.store.promotion_candidates(trainee_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct PromoteBody {
  pub belt_id: Uuid,
}

/// `POST /promotions/{trainee_id}`
pub async fn promote<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
  Path(trainee_id): Path<Uuid>,
  Json(body): Json<PromoteBody>,
) -> Result<Response, ApiError>
where
  S: ClubStore + 'static,
{
  let promotion = state.store.promote(trainee_id, body.belt_id).await?;
  tracing::info!(
    trainee = %trainee_id,
    belt = %body.belt_id,
    "trainee promoted"
  );
  Ok(trigger("promotionCompleted", Json(promotion)))
}

/// `GET /promotions/history`
pub async fn history<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
) -> Result<Json<Vec<Promotion>>, ApiError>
where
  S: ClubStore + 'static,
{
  Ok(Json(state.store.promotion_history().await?))
}
