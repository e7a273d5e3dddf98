//! HTTP Basic-auth extractors, the role gate, and the login/register
//! endpoints.
//!
//! Credentials are verified per request against the argon2 hash stored on
//! the identity. The closed [`Role`] enumeration is resolved once per
//! request here; handlers state their requirement by taking
//! [`AdminPrincipal`], [`JudgePrincipal`], or [`TraineePrincipal`] instead
//! of re-checking roles inline. Judge-versus-match ownership is deliberately
//! left to the domain layer — an admin is not implicitly a judge.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  Json,
  extract::{FromRequestParts, State},
  http::{HeaderMap, StatusCode, request::Parts},
  response::IntoResponse,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use chrono::NaiveDate;
use rand_core::OsRng;
use serde::Deserialize;
use serde_json::json;

use dojang_core::{
  Error as DomainError,
  role::{Identity, Role},
  store::ClubStore,
  trainee::NewRegistration,
};

use crate::{AppState, error::ApiError};

// ─── Password hashing ────────────────────────────────────────────────────────

/// Produce an argon2 PHC string for storage.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Domain(DomainError::Storage(format!("argon2: {e}"))))
}

fn verify_password(hash: &str, password: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

// ─── Credential check ────────────────────────────────────────────────────────

/// Resolve a username/password pair to an identity.
///
/// An unapproved trainee is rejected with the distinct pending-approval
/// failure, never the generic bad-credentials one — the disambiguation is
/// part of the contract.
pub async fn check_credentials<S>(
  store: &S,
  username: &str,
  password: &str,
) -> Result<Identity, ApiError>
where
  S: ClubStore,
{
  let identity = store
    .identity_by_username(username)
    .await?
    .ok_or(ApiError::Unauthorized)?;

  if !verify_password(&identity.password_hash, password) {
    return Err(ApiError::Unauthorized);
  }

  if identity.role == Role::Trainee {
    let profile = store.trainee_by_identity(identity.identity_id).await?;
    if let Some(profile) = profile
      && !profile.trainee.is_approved
    {
      return Err(ApiError::PendingApproval);
    }
  }

  Ok(identity)
}

/// Verify the `Authorization: Basic` header against the identity table.
pub async fn verify_auth<S>(
  headers: &HeaderMap,
  store: &S,
) -> Result<Identity, ApiError>
where
  S: ClubStore,
{
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds =
    std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) =
    creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  check_credentials(store, username, password).await
}

// ─── Principals ──────────────────────────────────────────────────────────────

/// Any authenticated identity, role unchecked.
#[derive(Debug)]
pub struct Principal(pub Identity);

/// Present in a handler signature means the request carries admin
/// credentials.
#[derive(Debug)]
pub struct AdminPrincipal(pub Identity);

/// The request carries judge credentials. Whether this judge owns a given
/// match is a separate, domain-level check.
#[derive(Debug)]
pub struct JudgePrincipal(pub Identity);

/// The request carries approved-trainee credentials.
#[derive(Debug)]
pub struct TraineePrincipal(pub Identity);

impl<S> FromRequestParts<AppState<S>> for Principal
where
  S: ClubStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let identity = verify_auth(&parts.headers, state.store.as_ref()).await?;
    Ok(Principal(identity))
  }
}

/// One role gate; the wrappers below only differ in the role they demand.
async fn require_role<S>(
  parts: &mut Parts,
  state: &AppState<S>,
  role: Role,
) -> Result<Identity, ApiError>
where
  S: ClubStore + 'static,
{
  let identity = verify_auth(&parts.headers, state.store.as_ref()).await?;
  if identity.role != role {
    return Err(ApiError::Forbidden(format!(
      "this operation requires the {role:?} role"
    )));
  }
  Ok(identity)
}

impl<S> FromRequestParts<AppState<S>> for AdminPrincipal
where
  S: ClubStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    require_role(parts, state, Role::Admin).await.map(Self)
  }
}

impl<S> FromRequestParts<AppState<S>> for JudgePrincipal
where
  S: ClubStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    require_role(parts, state, Role::Judge).await.map(Self)
  }
}

impl<S> FromRequestParts<AppState<S>> for TraineePrincipal
where
  S: ClubStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    require_role(parts, state, Role::Trainee).await.map(Self)
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

/// `POST /auth/login` — verifies credentials and reports the role so the
/// boundary can redirect per role.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: ClubStore + 'static,
{
  let identity =
    check_credentials(state.store.as_ref(), &body.username, &body.password)
      .await?;

  tracing::info!(username = %identity.username, role = ?identity.role, "login");

  Ok(Json(json!({
    "username": identity.username,
    "display_name": identity.display_name(),
    "role": identity.role,
  })))
}

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub username:         String,
  pub email:            String,
  pub password:         String,
  pub password_confirm: String,
  pub first_name:       String,
  pub last_name:        String,
  pub date_of_birth:    NaiveDate,
  pub contact_number:   String,
  pub address:          String,
}

/// `POST /auth/register` — public self-registration; the profile waits for
/// admin approval before it can log in.
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ClubStore + 'static,
{
  if body.password != body.password_confirm {
    return Err(ApiError::BadRequest("Passwords do not match.".into()));
  }

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

  tracing::info!(username = %profile.identity.username, "trainee registered");
  Ok((StatusCode::CREATED, Json(profile)))
}
