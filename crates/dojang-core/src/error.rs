//! Error types for `dojang-core`.
//!
//! Variants are named for the specific failed rule rather than a generic
//! taxonomy; the HTTP layer classifies them into response statuses. Every
//! failure is raised before the first persistence write of its operation.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  // ── Validation ────────────────────────────────────────────────────────
  #[error("username {0:?} is already taken")]
  UsernameTaken(String),

  #[error("email {0:?} is already registered")]
  EmailTaken(String),

  #[error("{0:?} is not a valid phone number")]
  InvalidPhoneNumber(String),

  #[error("event end must be after its start")]
  EventDatesInverted,

  #[error("registration deadline must be before the event start")]
  DeadlineAfterStart,

  #[error("belt order {0} is already taken")]
  BeltOrderTaken(u32),

  #[error("payment amount must be positive, got {0}")]
  NonPositiveAmount(Decimal),

  // ── Invalid input ─────────────────────────────────────────────────────
  #[error("a trainee cannot be matched against themselves")]
  SelfMatch,

  #[error("identity {0} does not hold the judge role")]
  JudgeRoleRequired(Uuid),

  #[error("trainee {0} is not a participant in this match")]
  WinnerNotParticipant(Uuid),

  #[error("target belt order {target} is not above the current order {current}")]
  BeltNotHigher { target: u32, current: u32 },

  // ── Invalid state ─────────────────────────────────────────────────────
  #[error("match {0} is already completed")]
  MatchAlreadyCompleted(Uuid),

  // ── Ownership ─────────────────────────────────────────────────────────
  #[error("identity {judge} is not the judge assigned to match {match_id}")]
  NotAssignedJudge { match_id: Uuid, judge: Uuid },

  #[error("notification {0} belongs to another recipient")]
  NotificationNotOwned(Uuid),

  // ── Absence ───────────────────────────────────────────────────────────
  #[error("identity not found: {0}")]
  IdentityNotFound(Uuid),

  #[error("trainee not found: {0}")]
  TraineeNotFound(Uuid),

  #[error("belt not found: {0}")]
  BeltNotFound(Uuid),

  #[error("event not found: {0}")]
  EventNotFound(Uuid),

  #[error("match not found: {0}")]
  MatchNotFound(Uuid),

  #[error("payment not found: {0}")]
  PaymentNotFound(Uuid),

  #[error("notification not found: {0}")]
  NotificationNotFound(Uuid),

  // ── Infrastructure ────────────────────────────────────────────────────
  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// A stored value could not be decoded back into its domain type.
  #[error("stored data could not be decoded: {0}")]
  Decode(String),

  #[error("storage error: {0}")]
  Storage(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
