//! Handlers for `/matches` endpoints — the judge's scoring console.
//!
//! | Method | Path | Role | Notes |
//! |--------|------|------|-------|
//! | `POST` | `/matches` | Admin | Schedule a bout |
//! | `GET`  | `/matches/upcoming` | Judge | Countdown list, own matches |
//! | `GET`  | `/matches/recent` | Judge | Last ten past matches |
//! | `GET`  | `/matches/{id}` | Judge | Scoring view, own matches only |
//! | `POST` | `/matches/{id}/score` | Judge | `{"side":…,"action":…}` |
//! | `POST` | `/matches/{id}/complete` | Judge | `{"winner_id":…}` |
//!
//! Score and completion authorization is judge-scoped in the domain layer;
//! holding the judge role is necessary but not sufficient.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::Response,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use dojang_core::{
  matches::{JudgedMatch, Match, MatchSide, NewMatch, ScoreAction},
  store::ClubStore,
};

use crate::{
  AppState,
  auth::{AdminPrincipal, JudgePrincipal},
  error::ApiError,
  hx::trigger,
};

/// `POST /matches`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
  Json(body): Json<NewMatch>,
) -> Result<Response, ApiError>
where
  S: ClubStore + 'static,
{
  let m = state.store.schedule_match(body).await?;
  Ok(trigger("matchScheduled", (StatusCode::CREATED, Json(m))))
}

/// `GET /matches/upcoming` — soonest first, with imminence flags.
pub async fn upcoming<S>(
  State(state): State<AppState<S>>,
  JudgePrincipal(judge): JudgePrincipal,
) -> Result<Json<Vec<JudgedMatch>>, ApiError>
where
  S: ClubStore + 'static,
{
  let matches = state
    .store
    .judge_upcoming(judge.identity_id, Utc::now())
    .await?;
  Ok(Json(matches))
}

/// `GET /matches/recent`
pub async fn recent<S>(
  State(state): State<AppState<S>>,
  JudgePrincipal(judge): JudgePrincipal,
) -> Result<Json<Vec<Match>>, ApiError>
where
  S: ClubStore + 'static,
{
  let matches = state
    .store
    .judge_recent(judge.identity_id, Utc::now())
    .await?;
  Ok(Json(matches))
}

/// `GET /matches/{id}` — the scoring view. A match assigned to a different
/// judge is reported as absent rather than forbidden.
pub async fn scoring<S>(
  State(state): State<AppState<S>>,
  JudgePrincipal(judge): JudgePrincipal,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: ClubStore + 'static,
{
  let m = state
    .store
    .get_match(id)
    .await?
    .filter(|m| m.judge_id == Some(judge.identity_id))
    .ok_or_else(|| ApiError::NotFound(format!("match {id} not found")))?;

  let phase = m.phase(Utc::now());
  Ok(Json(json!({ "match": m, "phase": phase })))
}

#[derive(Debug, Deserialize)]
pub struct ScoreBody {
  pub side:   MatchSide,
  pub action: ScoreAction,
}

/// `POST /matches/{id}/score` — one point up or down; never below zero.
pub async fn score<S>(
  State(state): State<AppState<S>>,
  JudgePrincipal(judge): JudgePrincipal,
  Path(id): Path<Uuid>,
  Json(body): Json<ScoreBody>,
) -> Result<Json<Match>, ApiError>
where
  S: ClubStore + 'static,
{
  let m = state
    .store
    .update_score(id, judge.identity_id, body.side, body.action)
    .await?;
  Ok(Json(m))
}

#[derive(Debug, Deserialize)]
pub struct CompleteBody {
  pub winner_id: Uuid,
}

/// `POST /matches/{id}/complete` — terminal; also notifies both sides.
pub async fn complete<S>(
  State(state): State<AppState<S>>,
  JudgePrincipal(judge): JudgePrincipal,
  Path(id): Path<Uuid>,
  Json(body): Json<CompleteBody>,
) -> Result<Response, ApiError>
where
  S: ClubStore + 'static,
{
  let m = state
    .store
    .complete_match(id, judge.identity_id, body.winner_id)
    .await?;
  tracing::info!(match_id = %id, winner = %body.winner_id, "match completed");
  Ok(trigger("matchCompleted", Json(m)))
}
