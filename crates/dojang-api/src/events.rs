//! Handlers for `/events` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/events` | All events; `?year=&month=` narrows to a month |
//! | `POST`   | `/events` | Body: [`dojang_core::event::NewEvent`] |
//! | `GET`    | `/events/{id}` | Event + matches + distinct participants |
//! | `PUT`    | `/events/{id}` | Full replacement |
//! | `DELETE` | `/events/{id}` | Hard delete; matches cascade |
//!
//! All routes are admin-gated.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::Response,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use dojang_core::{
  event::{Event, EventDetail, NewEvent},
  store::ClubStore,
};

use crate::{
  AppState, auth::AdminPrincipal, error::ApiError, hx::trigger,
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub year:  Option<i32>,
  pub month: Option<u32>,
}

/// `GET /events[?year=&month=]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Event>>, ApiError>
where
  S: ClubStore + 'static,
{
  let events = match (params.year, params.month) {
    (Some(year), Some(month)) => {
      state.store.events_in_month(year, month).await?
    }
    _ => state.store.list_events().await?,
  };
  Ok(Json(events))
}

/// `POST /events`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
  Json(body): Json<NewEvent>,
) -> Result<Response, ApiError>
where
  S: ClubStore + 'static,
{
  let event = state.store.add_event(body).await?;
  tracing::info!(event = %event.event_id, name = %event.name, "event created");
  Ok(trigger("eventCreated", (StatusCode::CREATED, Json(event))))
}

/// `GET /events/{id}` — detail plus a derived upcoming flag.
pub async fn detail<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: ClubStore + 'static,
{
  let EventDetail { event, matches, participants } = state
    .store
    .event_detail(id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("event {id} not found")))?;

  let is_upcoming = event.is_upcoming(Utc::now());
  Ok(Json(json!({
    "event": event,
    "is_upcoming": is_upcoming,
    "matches": matches,
    "participants": participants,
  })))
}

/// `PUT /events/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
  Path(id): Path<Uuid>,
  Json(body): Json<NewEvent>,
) -> Result<Response, ApiError>
where
  S: ClubStore + 'static,
{
  let event = state.store.update_event(id, body).await?;
  Ok(trigger("eventUpdated", Json(event)))
}

/// `DELETE /events/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
  Path(id): Path<Uuid>,
) -> Result<Response, ApiError>
where
  S: ClubStore + 'static,
{
  state.store.delete_event(id).await?;
  tracing::info!(event = %id, "event deleted");
  Ok(trigger("eventDeleted", StatusCode::NO_CONTENT))
}
