//! JSON/fragment HTTP API for Dojang.
//!
//! Exposes an axum [`Router`] backed by any [`dojang_core::store::ClubStore`].
//! Every route is gated by the Basic-auth role extractors in [`auth`];
//! transport and TLS concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = dojang_api::router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod hx;
pub mod matches;
pub mod notifications;
pub mod payments;
pub mod promotions;
pub mod reports;
pub mod trainees;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post, put},
};
use dojang_core::store::ClubStore;
use serde::Deserialize;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// Bootstrap administrator created at startup when missing.
  pub admin_username:      String,
  pub admin_email:         String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub admin_password_hash: String,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S: ClubStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// Cloning must not require `S: Clone` — only the `Arc`s are duplicated.
impl<S: ClubStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      config: Arc::clone(&self.config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ClubStore + 'static,
{
  Router::new()
    // Auth
    .route("/auth/register", post(auth::register::<S>))
    .route("/auth/login", post(auth::login::<S>))
    // Trainees (admin) and the member's own views
    .route(
      "/trainees",
      get(trainees::list::<S>).post(trainees::create::<S>),
    )
    .route("/trainees/pending", get(trainees::pending::<S>))
    .route(
      "/trainees/{id}",
      put(trainees::update::<S>).delete(trainees::deactivate::<S>),
    )
    .route("/trainees/{id}/approve", post(trainees::approve::<S>))
    .route("/me/profile", get(trainees::my_profile::<S>))
    .route("/me/dashboard", get(trainees::my_dashboard::<S>))
    .route("/me/matches", get(trainees::my_matches::<S>))
    .route("/me/payments", get(trainees::my_payments::<S>))
    // Events
    .route("/events", get(events::list::<S>).post(events::create::<S>))
    .route(
      "/events/{id}",
      get(events::detail::<S>)
        .put(events::update::<S>)
        .delete(events::delete_one::<S>),
    )
    // Matches
    .route("/matches", post(matches::create::<S>))
    .route("/matches/upcoming", get(matches::upcoming::<S>))
    .route("/matches/recent", get(matches::recent::<S>))
    .route("/matches/{id}", get(matches::scoring::<S>))
    .route("/matches/{id}/score", post(matches::score::<S>))
    .route("/matches/{id}/complete", post(matches::complete::<S>))
    // Promotions
    .route("/promotions", get(promotions::roster::<S>))
    .route("/promotions/history", get(promotions::history::<S>))
    .route(
      "/promotions/{trainee_id}",
      get(promotions::candidates::<S>).post(promotions::promote::<S>),
    )
    // Payments
    .route(
      "/payments",
      get(payments::list::<S>).post(payments::create::<S>),
    )
    .route("/payments/report", get(payments::report::<S>))
    .route("/payments/{id}/paid", post(payments::mark_paid::<S>))
    // Notifications
    .route("/notifications", get(notifications::list::<S>))
    .route(
      "/notifications/read-all",
      post(notifications::mark_all_read::<S>),
    )
    .route(
      "/notifications/{id}/read",
      post(notifications::mark_read::<S>),
    )
    // Dashboard + reports
    .route(
      "/dashboard/statistics",
      get(dashboard::statistics::<S>)
        .post(dashboard::recompute::<S>),
    )
    .route("/reports/chart", get(reports::chart::<S>))
    .with_state(state)
}
