//! The notification outbox.
//!
//! Notifications are fire-and-forget per-recipient records appended as side
//! effects of domain operations. Once created, only the read flag ever
//! changes. Listings are always newest-created-first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The originating subsystem of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
  Match,
  Payment,
  Promotion,
  Event,
}

impl NotificationKind {
  /// The discriminant string stored in the `kind` column.
  pub fn discriminant(self) -> &'static str {
    match self {
      Self::Match => "match",
      Self::Payment => "payment",
      Self::Promotion => "promotion",
      Self::Event => "event",
    }
  }
}

/// A message in a recipient's outbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
  pub notification_id: Uuid,
  pub recipient_id:    Uuid,
  pub title:           String,
  pub message:         String,
  pub kind:            NotificationKind,
  pub is_read:         bool,
  pub created_at:      DateTime<Utc>,
  /// Optional deep link into the presentation layer.
  pub link:            Option<String>,
}

/// Input to [`crate::store::ClubStore::emit_notification`]. No validation
/// beyond the required fields; the append either succeeds or fails the
/// caller's transaction.
#[derive(Debug, Clone)]
pub struct NewNotification {
  pub recipient_id: Uuid,
  pub title:        String,
  pub message:      String,
  pub kind:         NotificationKind,
  pub link:         Option<String>,
}

/// A recipient's notification listing with the unread badge count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationFeed {
  /// Newest first.
  pub items:  Vec<Notification>,
  pub unread: u32,
}
