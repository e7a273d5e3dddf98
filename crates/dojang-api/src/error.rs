//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Domain failures arrive as [`dojang_core::Error`] values and are
//! classified here: validation and invalid input map to 400, terminal-state
//! rejections to 409, ownership failures to 403, absences to 404, and
//! infrastructure faults to 500. Failures never abort the request pipeline.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use dojang_core::Error as DomainError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  /// An authenticated trainee whose registration has not been approved.
  /// Kept distinct from bad credentials on purpose.
  #[error("account pending approval")]
  PendingApproval,

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Domain(#[from] DomainError),
}

fn domain_status(e: &DomainError) -> StatusCode {
  match e {
    // Validation and structurally invalid input.
    DomainError::UsernameTaken(_)
    | DomainError::EmailTaken(_)
    | DomainError::InvalidPhoneNumber(_)
    | DomainError::EventDatesInverted
    | DomainError::DeadlineAfterStart
    | DomainError::BeltOrderTaken(_)
    | DomainError::NonPositiveAmount(_)
    | DomainError::SelfMatch
    | DomainError::JudgeRoleRequired(_)
    | DomainError::WinnerNotParticipant(_)
    | DomainError::BeltNotHigher { .. } => StatusCode::BAD_REQUEST,

    // Terminal-state rejections.
    DomainError::MatchAlreadyCompleted(_) => StatusCode::CONFLICT,

    // Ownership failures are surfaced distinctly from absence.
    DomainError::NotAssignedJudge { .. }
    | DomainError::NotificationNotOwned(_) => StatusCode::FORBIDDEN,

    DomainError::IdentityNotFound(_)
    | DomainError::TraineeNotFound(_)
    | DomainError::BeltNotFound(_)
    | DomainError::EventNotFound(_)
    | DomainError::MatchNotFound(_)
    | DomainError::PaymentNotFound(_)
    | DomainError::NotificationNotFound(_) => StatusCode::NOT_FOUND,

    DomainError::Serialization(_)
    | DomainError::Decode(_)
    | DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized => {
        (StatusCode::UNAUTHORIZED, "Invalid username or password.".to_owned())
      }
      ApiError::PendingApproval => (
        StatusCode::UNAUTHORIZED,
        "Your account is pending approval. Please wait for administrator \
         confirmation."
          .to_owned(),
      ),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Domain(e) => (domain_status(e), e.to_string()),
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
      tracing::error!(error = %message, "request failed");
    }

    let mut res =
      (status, Json(json!({ "error": message }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"dojang\""),
      );
    }
    res
  }
}
