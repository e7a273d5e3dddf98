//! The `ClubStore` trait — one method per domain operation.
//!
//! The trait is implemented by storage backends (e.g. `dojang-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.
//!
//! Every operation validates before it writes; a returned error means no
//! mutation happened. Operations with multiple effects (registration,
//! match completion, promotion) are atomic from the caller's point of
//! view: all effects land or none do.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
  Result,
  belt::{Belt, NewBelt},
  event::{Event, EventDetail, NewEvent},
  matches::{JudgedMatch, Match, MatchSide, NewMatch, ScoreAction},
  notification::{NewNotification, Notification, NotificationFeed},
  payment::{NewPayment, Payment, PaymentLedger, PaymentStatusFilter, PaymentTotals},
  promotion::{Eligibility, Promotion, PromotionCandidate},
  role::{Identity, NewIdentity},
  stats::{BeltCount, CachedDashboard, DashboardSnapshot, GrowthPoint, PaymentStatusCounts},
  trainee::{NewRegistration, TraineeDashboard, TraineeProfile, TraineeUpdate},
};

/// Abstraction over a Dojang club store backend.
pub trait ClubStore: Send + Sync {
  // ── Identities ────────────────────────────────────────────────────────

  /// Create an identity. Rejects duplicate usernames and emails.
  fn add_identity(
    &self,
    input: NewIdentity,
  ) -> impl Future<Output = Result<Identity>> + Send + '_;

  /// Look an identity up by username — the entry point of the auth gate.
  fn identity_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Identity>>> + Send + 'a;

  fn get_identity(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Identity>>> + Send + '_;

  // ── Belt ladder ───────────────────────────────────────────────────────

  /// Add a rung to the ladder. Rejects a duplicate order index.
  fn add_belt(
    &self,
    input: NewBelt,
  ) -> impl Future<Output = Result<Belt>> + Send + '_;

  /// All belts, ascending by order.
  fn list_belts(&self) -> impl Future<Output = Result<Vec<Belt>>> + Send + '_;

  /// The lowest-order belt strictly above `current_order`, or the lowest
  /// belt overall when `None`. Returns `None` at the top of the ladder.
  fn next_belt_after(
    &self,
    current_order: Option<u32>,
  ) -> impl Future<Output = Result<Option<Belt>>> + Send + '_;

  /// Belts a trainee can be promoted to: strictly above the current order,
  /// ascending. Never lateral or downward.
  fn promotion_candidates(
    &self,
    trainee_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Belt>>> + Send + '_;

  // ── Trainee lifecycle ─────────────────────────────────────────────────

  /// Create an identity (role Trainee) plus its profile in one unit.
  /// The profile starts unapproved and inactive, on the lowest belt.
  fn register_trainee(
    &self,
    input: NewRegistration,
  ) -> impl Future<Output = Result<TraineeProfile>> + Send + '_;

  /// Admin approval: sets approved and active, and notifies the trainee.
  fn approve_trainee(
    &self,
    trainee_id: Uuid,
  ) -> impl Future<Output = Result<TraineeProfile>> + Send + '_;

  /// Soft delete. History (matches, payments, promotions) is retained.
  fn deactivate_trainee(
    &self,
    trainee_id: Uuid,
  ) -> impl Future<Output = Result<TraineeProfile>> + Send + '_;

  /// Admin edit of a profile and its identity fields.
  fn update_trainee(
    &self,
    trainee_id: Uuid,
    update: TraineeUpdate,
  ) -> impl Future<Output = Result<TraineeProfile>> + Send + '_;

  fn get_trainee(
    &self,
    trainee_id: Uuid,
  ) -> impl Future<Output = Result<Option<TraineeProfile>>> + Send + '_;

  fn trainee_by_identity(
    &self,
    identity_id: Uuid,
  ) -> impl Future<Output = Result<Option<TraineeProfile>>> + Send + '_;

  /// Active roster, newest join first, with an optional case-insensitive
  /// substring search over names, username, email, belt name, and contact
  /// number.
  fn list_trainees<'a>(
    &'a self,
    search: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<TraineeProfile>>> + Send + 'a;

  /// Profiles awaiting approval, newest join first.
  fn pending_trainees(
    &self,
  ) -> impl Future<Output = Result<Vec<TraineeProfile>>> + Send + '_;

  /// The per-trainee dashboard read-model at `now`.
  fn trainee_dashboard(
    &self,
    trainee_id: Uuid,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<TraineeDashboard>>> + Send + '_;

  // ── Events ────────────────────────────────────────────────────────────

  fn add_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event>> + Send + '_;

  fn update_event(
    &self,
    event_id: Uuid,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event>> + Send + '_;

  /// Hard delete; the event's matches go with it.
  fn delete_event(
    &self,
    event_id: Uuid,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// All events, ascending by start.
  fn list_events(&self) -> impl Future<Output = Result<Vec<Event>>> + Send + '_;

  /// Events starting within the given calendar month, ascending.
  fn events_in_month(
    &self,
    year: i32,
    month: u32,
  ) -> impl Future<Output = Result<Vec<Event>>> + Send + '_;

  /// Event plus matches plus distinct participants.
  fn event_detail(
    &self,
    event_id: Uuid,
  ) -> impl Future<Output = Result<Option<EventDetail>>> + Send + '_;

  // ── Match state machine ───────────────────────────────────────────────

  /// Schedule a bout. The two sides must differ, and an assigned judge
  /// must hold the judge role.
  fn schedule_match(
    &self,
    input: NewMatch,
  ) -> impl Future<Output = Result<Match>> + Send + '_;

  fn get_match(
    &self,
    match_id: Uuid,
  ) -> impl Future<Output = Result<Option<Match>>> + Send + '_;

  /// Move one side's score by one point. Only the assigned judge may call
  /// this; a completed match rejects it; a decrement at zero is a silent
  /// no-op.
  fn update_score(
    &self,
    match_id: Uuid,
    judge_id: Uuid,
    side: MatchSide,
    action: ScoreAction,
  ) -> impl Future<Output = Result<Match>> + Send + '_;

  /// Declare the winner and notify both participants in one atomic unit.
  /// Only the assigned judge may call this; the winner must be one of the
  /// two participants; completion is terminal.
  fn complete_match(
    &self,
    match_id: Uuid,
    judge_id: Uuid,
    winner_id: Uuid,
  ) -> impl Future<Output = Result<Match>> + Send + '_;

  /// The judge's future matches, soonest first, with countdown fields.
  fn judge_upcoming(
    &self,
    judge_id: Uuid,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<JudgedMatch>>> + Send + '_;

  /// The judge's last ten past matches, newest first.
  fn judge_recent(
    &self,
    judge_id: Uuid,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<Match>>> + Send + '_;

  /// All matches involving the trainee on either side, newest first.
  fn matches_for_trainee(
    &self,
    trainee_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Match>>> + Send + '_;

  // ── Promotion engine ──────────────────────────────────────────────────

  /// The eligibility report for one trainee at `today`.
  fn eligibility(
    &self,
    trainee_id: Uuid,
    today: NaiveDate,
  ) -> impl Future<Output = Result<Eligibility>> + Send + '_;

  /// Eligibility reports for every active trainee.
  fn promotion_roster(
    &self,
    today: NaiveDate,
  ) -> impl Future<Output = Result<Vec<PromotionCandidate>>> + Send + '_;

  /// Promote a trainee. Re-validates that the target belt outranks the
  /// current one regardless of what the caller pre-filtered. Promotion
  /// row, belt update, and notification land atomically.
  fn promote(
    &self,
    trainee_id: Uuid,
    new_belt_id: Uuid,
  ) -> impl Future<Output = Result<Promotion>> + Send + '_;

  /// All promotions, newest first.
  fn promotion_history(
    &self,
  ) -> impl Future<Output = Result<Vec<Promotion>>> + Send + '_;

  // ── Payment ledger ────────────────────────────────────────────────────

  /// Record a due payment (always unpaid at creation) and notify the
  /// trainee. Rejects non-positive amounts before writing.
  fn create_payment(
    &self,
    input: NewPayment,
  ) -> impl Future<Output = Result<Payment>> + Send + '_;

  /// Settle a payment and notify the trainee. Calling it again re-emits
  /// the notification — emission is at-least-once by design.
  fn mark_paid(
    &self,
    payment_id: Uuid,
  ) -> impl Future<Output = Result<Payment>> + Send + '_;

  /// The admin ledger: filtered rows with derived overdue flags, plus
  /// collected/pending/overdue totals over all payments.
  fn list_payments(
    &self,
    filter: PaymentStatusFilter,
    today: NaiveDate,
  ) -> impl Future<Output = Result<PaymentLedger>> + Send + '_;

  /// Collected/pending/overdue totals. Zero rows sum to zero.
  fn payment_report(
    &self,
    today: NaiveDate,
  ) -> impl Future<Output = Result<PaymentTotals>> + Send + '_;

  /// A trainee's payments, newest due date first.
  fn payments_for_trainee(
    &self,
    trainee_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Payment>>> + Send + '_;

  /// Sum of the trainee's unpaid amounts.
  fn outstanding_balance(
    &self,
    trainee_id: Uuid,
  ) -> impl Future<Output = Result<Decimal>> + Send + '_;

  // ── Notification outbox ───────────────────────────────────────────────

  /// Pure append. Fails only if the underlying write fails.
  fn emit_notification(
    &self,
    input: NewNotification,
  ) -> impl Future<Output = Result<Notification>> + Send + '_;

  /// The recipient's newest notifications (up to `limit`) and unread
  /// count.
  fn list_notifications(
    &self,
    recipient_id: Uuid,
    limit: usize,
  ) -> impl Future<Output = Result<NotificationFeed>> + Send + '_;

  /// Mark one notification read; idempotent. Rejects a notification owned
  /// by someone else without touching it. Returns the new unread count.
  fn mark_read(
    &self,
    notification_id: Uuid,
    recipient_id: Uuid,
  ) -> impl Future<Output = Result<u32>> + Send + '_;

  /// Mark everything read. Returns the new unread count (always 0).
  fn mark_all_read(
    &self,
    recipient_id: Uuid,
  ) -> impl Future<Output = Result<u32>> + Send + '_;

  // ── Dashboard aggregator ──────────────────────────────────────────────

  /// Recompute every dashboard aggregate from the source tables and
  /// overwrite the single cached row. Returns the fresh snapshot.
  fn recompute_dashboard(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<DashboardSnapshot>> + Send + '_;

  /// The cached row as last written, or `None` if never computed. Readers
  /// tolerate staleness; the cache carries no correctness obligation.
  fn cached_dashboard(
    &self,
  ) -> impl Future<Output = Result<Option<CachedDashboard>>> + Send + '_;

  // ── Reports ───────────────────────────────────────────────────────────

  /// Cumulative membership at six trailing 30-day ticks, oldest first.
  fn trainee_growth(
    &self,
    today: NaiveDate,
  ) -> impl Future<Output = Result<Vec<GrowthPoint>>> + Send + '_;

  /// Trainee count per belt, ascending by order.
  fn belt_distribution(
    &self,
  ) -> impl Future<Output = Result<Vec<BeltCount>>> + Send + '_;

  /// Paid-versus-pending payment counts.
  fn payment_status_counts(
    &self,
  ) -> impl Future<Output = Result<PaymentStatusCounts>> + Send + '_;
}
