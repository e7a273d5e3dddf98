//! Matches and their state machine.
//!
//! A match moves through three phases: `Scheduled` (winner unset, time in
//! the future), `InProgress` (winner unset, time reached — derived, no
//! stored flag), and `Completed` (winner set). Completion is terminal:
//! scores and winner are immutable afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Seconds before its scheduled time at which a match counts as imminent.
pub const IMMINENT_WINDOW_SECS: i64 = 900;

/// A bout between two trainees at an event, scored by one assigned judge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
  pub match_id:    Uuid,
  pub event_id:    Uuid,
  pub trainee1_id: Uuid,
  pub trainee2_id: Uuid,
  /// Set exactly once; a set winner makes the match terminal.
  pub winner_id:   Option<Uuid>,
  pub score1:      u32,
  pub score2:      u32,
  /// The only identity allowed to score or complete this match.
  pub judge_id:    Option<Uuid>,
  pub match_time:  DateTime<Utc>,
}

/// The derived lifecycle phase of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
  Scheduled,
  InProgress,
  Completed,
}

impl Match {
  pub fn phase(&self, now: DateTime<Utc>) -> MatchPhase {
    if self.winner_id.is_some() {
      MatchPhase::Completed
    } else if self.match_time <= now {
      MatchPhase::InProgress
    } else {
      MatchPhase::Scheduled
    }
  }

  pub fn is_completed(&self) -> bool {
    self.winner_id.is_some()
  }

  pub fn is_participant(&self, trainee_id: Uuid) -> bool {
    trainee_id == self.trainee1_id || trainee_id == self.trainee2_id
  }
}

/// Which side of the match a score operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSide {
  Trainee1,
  Trainee2,
}

/// Direction of a score change. Scores move by one point at a time and
/// never drop below zero — a decrement at zero is a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreAction {
  Increment,
  Decrement,
}

/// Input to [`crate::store::ClubStore::schedule_match`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewMatch {
  pub event_id:    Uuid,
  pub trainee1_id: Uuid,
  pub trainee2_id: Uuid,
  pub judge_id:    Option<Uuid>,
  pub match_time:  DateTime<Utc>,
}

/// A match on a judge's upcoming list, with countdown fields computed at
/// query time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgedMatch {
  #[serde(flatten)]
  pub match_row:       Match,
  /// Seconds until the scheduled time.
  pub time_until_secs: i64,
  /// Within [`IMMINENT_WINDOW_SECS`] of starting.
  pub is_imminent:     bool,
}

impl JudgedMatch {
  pub fn at(match_row: Match, now: DateTime<Utc>) -> Self {
    let time_until_secs = (match_row.match_time - now).num_seconds();
    Self {
      match_row,
      time_until_secs,
      is_imminent: time_until_secs <= IMMINENT_WINDOW_SECS,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn sample(winner: Option<Uuid>, hour: u32) -> Match {
    Match {
      match_id:    Uuid::new_v4(),
      event_id:    Uuid::new_v4(),
      trainee1_id: Uuid::new_v4(),
      trainee2_id: Uuid::new_v4(),
      winner_id:   winner,
      score1:      0,
      score2:      0,
      judge_id:    None,
      match_time:  Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0).unwrap(),
    }
  }

  #[test]
  fn phase_follows_time_and_winner() {
    let now = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
    assert_eq!(sample(None, 15).phase(now), MatchPhase::Scheduled);
    assert_eq!(sample(None, 9).phase(now), MatchPhase::InProgress);
    let done = sample(Some(Uuid::new_v4()), 9);
    assert_eq!(done.phase(now), MatchPhase::Completed);
  }

  #[test]
  fn imminent_within_fifteen_minutes() {
    let now = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
    let soon = JudgedMatch::at(
      Match {
        match_time: now + chrono::Duration::minutes(10),
        ..sample(None, 12)
      },
      now,
    );
    assert!(soon.is_imminent);

    let later = JudgedMatch::at(
      Match {
        match_time: now + chrono::Duration::minutes(45),
        ..sample(None, 12)
      },
      now,
    );
    assert!(!later.is_imminent);
  }
}
