//! Handlers for trainee administration and the member's own views.
//!
//! | Method | Path | Role | Notes |
//! |--------|------|------|-------|
//! | `GET`    | `/trainees` | Admin | Optional `?search=`; fragment-aware |
//! | `POST`   | `/trainees` | Admin | Creates an already-approved member |
//! | `GET`    | `/trainees/pending` | Admin | Awaiting approval |
//! | `PUT`    | `/trainees/{id}` | Admin | Profile + identity edit |
//! | `DELETE` | `/trainees/{id}` | Admin | Soft delete |
//! | `POST`   | `/trainees/{id}/approve` | Admin | |
//! | `GET`    | `/me/profile` `/me/dashboard` `/me/matches` `/me/payments` | Trainee | |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use dojang_core::{
  store::ClubStore,
  trainee::{NewRegistration, TraineeProfile, TraineeUpdate},
};

use crate::{
  AppState,
  auth::{AdminPrincipal, TraineePrincipal, hash_password},
  error::ApiError,
  hx::{Fragment, trigger},
};

// ─── Roster ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub search: Option<String>,
}

/// `GET /trainees[?search=<text>]` — active roster, newest join first.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
  Fragment(partial): Fragment,
  Query(params): Query<ListParams>,
) -> Result<Response, ApiError>
where
  S: ClubStore + 'static,
{
  let trainees = state.store.list_trainees(params.search.as_deref()).await?;

  // Same rows either way; the full render echoes the query back for the
  // search box.
  if partial {
    Ok(Json(trainees).into_response())
  } else {
    Ok(
      Json(json!({
        "trainees": trainees,
        "search_query": params.search.unwrap_or_default(),
      }))
      .into_response(),
    )
  }
}

/// `GET /trainees/pending`
pub async fn pending<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
) -> Result<Json<Vec<TraineeProfile>>, ApiError>
where
  S: ClubStore + 'static,
{
  Ok(Json(state.store.pending_trainees().await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub username:       String,
  pub email:          String,
  pub password:       String,
  pub first_name:     String,
  pub last_name:      String,
  pub date_of_birth:  NaiveDate,
  pub contact_number: String,
  pub address:        String,
}

/// `POST /trainees` — an admin-created member skips the approval queue.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
  Json(body): Json<CreateBody>,
) -> Result<Response, ApiError>
where
  S: ClubStore + 'static,
{
  let password_hash = hash_password(&body.password)?;
  let profile = state
    .store
    .register_trainee(NewRegistration {
      username:       body.username,
      email:          body.email,
      password_hash,
      first_name:     body.first_name,
      last_name:      body.last_name,
      date_of_birth:  body.date_of_birth,
      contact_number: body.contact_number,
      address:        body.address,
    })
    .await?;
  let profile = state
    .store
    .approve_trainee(profile.trainee.trainee_id)
    .await?;

  Ok(trigger(
    "traineeCreated",
    (StatusCode::CREATED, Json(profile)),
  ))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub username:          String,
  pub email:             String,
  pub first_name:        String,
  pub last_name:         String,
  /// Omit to keep the current password.
  pub password:          Option<String>,
  pub date_of_birth:     NaiveDate,
  pub belt_id:           Option<Uuid>,
  pub contact_number:    String,
  pub address:           String,
  pub emergency_contact: Option<String>,
  pub emergency_phone:   Option<String>,
  pub is_active:         bool,
}

/// `PUT /trainees/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Response, ApiError>
where
  S: ClubStore + 'static,
{
  let password_hash = match body.password.as_deref() {
    Some(p) if !p.is_empty() => Some(hash_password(p)?),
    _ => None,
  };

  let profile = state
    .store
    .update_trainee(id, TraineeUpdate {
      username:          body.username,
      email:             body.email,
      first_name:        body.first_name,
      last_name:         body.last_name,
      password_hash,
      date_of_birth:     body.date_of_birth,
      belt_id:           body.belt_id,
      contact_number:    body.contact_number,
      address:           body.address,
      emergency_contact: body.emergency_contact,
      emergency_phone:   body.emergency_phone,
      is_active:         body.is_active,
    })
    .await?;

  Ok(trigger("traineeUpdated", Json(profile)))
}

// ─── Approve / deactivate ─────────────────────────────────────────────────────

/// `POST /trainees/{id}/approve`
pub async fn approve<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
  Path(id): Path<Uuid>,
) -> Result<Json<TraineeProfile>, ApiError>
where
  S: ClubStore + 'static,
{
  let profile = state.store.approve_trainee(id).await?;
  tracing::info!(trainee = %id, "trainee approved");
  Ok(Json(profile))
}

/// `DELETE /trainees/{id}` — deactivation, never row removal.
pub async fn deactivate<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
  Path(id): Path<Uuid>,
) -> Result<Response, ApiError>
where
  S: ClubStore + 'static,
{
  let profile = state.store.deactivate_trainee(id).await?;
  Ok(trigger("traineeDeleted", Json(profile)))
}

// ─── Member self-service ──────────────────────────────────────────────────────

async fn own_profile<S>(
  state: &AppState<S>,
  identity_id: Uuid,
) -> Result<TraineeProfile, ApiError>
where
  S: ClubStore,
{
  state
    .store
    .trainee_by_identity(identity_id)
    .await?
    .ok_or_else(|| ApiError::NotFound("no trainee profile".into()))
}

/// `GET /me/profile`
pub async fn my_profile<S>(
  State(state): State<AppState<S>>,
  TraineePrincipal(me): TraineePrincipal,
) -> Result<Json<TraineeProfile>, ApiError>
where
  S: ClubStore + 'static,
{
  Ok(Json(own_profile(&state, me.identity_id).await?))
}

/// `GET /me/dashboard` — the aggregate read-model, computed at `now`.
pub async fn my_dashboard<S>(
  State(state): State<AppState<S>>,
  TraineePrincipal(me): TraineePrincipal,
) -> Result<Response, ApiError>
where
  S: ClubStore + 'static,
{
  let profile = own_profile(&state, me.identity_id).await?;
  let dashboard = state
    .store
    .trainee_dashboard(profile.trainee.trainee_id, Utc::now())
    .await?
    .ok_or_else(|| ApiError::NotFound("no trainee profile".into()))?;
  Ok(Json(dashboard).into_response())
}

/// `GET /me/matches` — newest first.
pub async fn my_matches<S>(
  State(state): State<AppState<S>>,
  TraineePrincipal(me): TraineePrincipal,
) -> Result<Response, ApiError>
where
  S: ClubStore + 'static,
{
  let profile = own_profile(&state, me.identity_id).await?;
  let matches = state
    .store
    .matches_for_trainee(profile.trainee.trainee_id)
    .await?;
  Ok(Json(matches).into_response())
}

/// `GET /me/payments` — newest due date first.
pub async fn my_payments<S>(
  State(state): State<AppState<S>>,
  TraineePrincipal(me): TraineePrincipal,
) -> Result<Response, ApiError>
where
  S: ClubStore + 'static,
{
  let profile = own_profile(&state, me.identity_id).await?;
  let payments = state
    .store
    .payments_for_trainee(profile.trainee.trainee_id)
    .await?;
  Ok(Json(payments).into_response())
}
