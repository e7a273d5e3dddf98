//! Handlers for `/payments` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/payments` | `?status=all|pending|paid|overdue`, with totals |
//! | `POST` | `/payments` | Body: [`dojang_core::payment::NewPayment`] |
//! | `POST` | `/payments/{id}/paid` | Settle; notifies on every call |
//! | `GET`  | `/payments/report` | Collected / pending / overdue totals |
//!
//! All routes are admin-gated. Overdue flags are derived at request time
//! from the due date — nothing here persists them.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::Response,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use dojang_core::{
  payment::{NewPayment, PaymentLedger, PaymentStatusFilter, PaymentTotals},
  store::ClubStore,
};

use crate::{
  AppState, auth::AdminPrincipal, error::ApiError, hx::trigger,
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub status: PaymentStatusFilter,
}

/// `GET /payments[?status=<filter>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
  Query(params): Query<ListParams>,
) -> Result<Json<PaymentLedger>, ApiError>
where
  S: ClubStore + 'static,
{
  let today = Utc::now().date_naive();
  Ok(Json(state.store.list_payments(params.status, today).await?))
}

/// `POST /payments` — always starts unpaid; notifies the trainee.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
  Json(body): Json<NewPayment>,
) -> Result<Response, ApiError>
where
  S: ClubStore + 'static,
{
  let payment = state.store.create_payment(body).await?;
  tracing::info!(payment = %payment.payment_id, "payment recorded");
  Ok(trigger("paymentCreated", (StatusCode::CREATED, Json(payment))))
}

/// `POST /payments/{id}/paid`
pub async fn mark_paid<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
  Path(id): Path<Uuid>,
) -> Result<Response, ApiError>
where
  S: ClubStore + 'static,
{
  let payment = state.store.mark_paid(id).await?;
  Ok(trigger("paymentUpdated", Json(payment)))
}

/// `GET /payments/report`
pub async fn report<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
) -> Result<Json<PaymentTotals>, ApiError>
where
  S: ClubStore + 'static,
{
  let today = Utc::now().date_naive();
  Ok(Json(state.store.payment_report(today).await?))
}
