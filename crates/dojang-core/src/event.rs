//! Events — tournaments, training sessions, seminars, and gradings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, matches::Match, trainee::TraineeProfile};

/// The kind of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
  Tournament,
  Training,
  Seminar,
  Grading,
}

impl EventKind {
  /// The discriminant string stored in the `kind` column.
  /// Must match the `rename_all = "lowercase"` serde tags above.
  pub fn discriminant(self) -> &'static str {
    match self {
      Self::Tournament => "tournament",
      Self::Training => "training",
      Self::Seminar => "seminar",
      Self::Grading => "grading",
    }
  }
}

/// A scheduled club event. Matches belong to an event and are removed with
/// it; everything else survives event deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
  pub event_id:              Uuid,
  pub name:                  String,
  pub description:           String,
  pub start_at:              DateTime<Utc>,
  pub end_at:                DateTime<Utc>,
  pub location:              String,
  pub kind:                  EventKind,
  pub max_participants:      Option<u32>,
  pub registration_deadline: Option<DateTime<Utc>>,
  pub is_published:          bool,
}

impl Event {
  /// Whether the event has not started yet — derived, never stored.
  pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
    self.start_at > now
  }
}

/// Input to [`crate::store::ClubStore::add_event`] and
/// [`crate::store::ClubStore::update_event`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
  pub name:                  String,
  pub description:           String,
  pub start_at:              DateTime<Utc>,
  pub end_at:                DateTime<Utc>,
  pub location:              String,
  pub kind:                  EventKind,
  pub max_participants:      Option<u32>,
  pub registration_deadline: Option<DateTime<Utc>>,
  #[serde(default)]
  pub is_published:          bool,
}

impl NewEvent {
  /// Date-ordering invariants: the end must follow the start, and a
  /// registration deadline, when set, must fall before the start.
  pub fn validate(&self) -> Result<()> {
    if self.end_at <= self.start_at {
      return Err(Error::EventDatesInverted);
    }
    if let Some(deadline) = self.registration_deadline
      && deadline >= self.start_at
    {
      return Err(Error::DeadlineAfterStart);
    }
    Ok(())
  }
}

/// An event with its matches and the distinct participants — assembled on
/// read for the detail view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDetail {
  pub event:        Event,
  pub matches:      Vec<Match>,
  pub participants: Vec<TraineeProfile>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0).unwrap()
  }

  fn event(start: u32, end: u32, deadline: Option<u32>) -> NewEvent {
    NewEvent {
      name:                  "Spring Open".into(),
      description:           String::new(),
      start_at:              at(start),
      end_at:                at(end),
      location:              "Main hall".into(),
      kind:                  EventKind::Tournament,
      max_participants:      None,
      registration_deadline: deadline.map(at),
      is_published:          true,
    }
  }

  #[test]
  fn accepts_ordered_dates() {
    assert!(event(10, 18, Some(8)).validate().is_ok());
  }

  #[test]
  fn rejects_end_before_start() {
    assert!(matches!(
      event(18, 10, None).validate(),
      Err(Error::EventDatesInverted)
    ));
  }

  #[test]
  fn rejects_end_equal_to_start() {
    assert!(event(10, 10, None).validate().is_err());
  }

  #[test]
  fn rejects_deadline_at_or_after_start() {
    assert!(matches!(
      event(10, 18, Some(10)).validate(),
      Err(Error::DeadlineAfterStart)
    ));
    assert!(event(10, 18, Some(12)).validate().is_err());
  }
}
