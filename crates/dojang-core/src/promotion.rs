//! Belt promotions and the eligibility rules.
//!
//! Eligibility is computed from query aggregates and never stored. The two
//! criteria stay independent: tenure alone decides `is_eligible`, while the
//! performance flag is surfaced as advisory information next to it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{belt::Belt, trainee::TraineeProfile};

/// A recorded belt promotion. Belt references are nulled out if the belt
/// itself is later deleted; the record survives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
  pub promotion_id: Uuid,
  pub trainee_id:   Uuid,
  pub belt_from:    Option<Uuid>,
  pub belt_to:      Option<Uuid>,
  pub awarded_on:   NaiveDate,
}

/// Minimum days since the last promotion (or joining) before the next one.
pub const MIN_DAYS_BETWEEN_PROMOTIONS: i64 = 180;
/// Decided matches required before performance counts.
pub const MIN_DECIDED_MATCHES: u32 = 5;
/// Win-rate floor, in percent, for the performance criterion.
pub const MIN_WIN_RATE: f64 = 40.0;

/// Promotion-eligibility report for one trainee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Eligibility {
  /// Days since the last promotion, or since joining if never promoted.
  pub days_since_last:      i64,
  pub time_eligible:        bool,
  /// Matches involving the trainee that have a winner.
  pub decided_matches:      u32,
  pub wins:                 u32,
  /// Percentage over decided matches; 0 when none are decided.
  pub win_rate:             f64,
  pub performance_eligible: bool,
  /// Currently the tenure criterion alone; performance stays advisory.
  pub is_eligible:          bool,
  /// The next rung of the ladder, if the trainee is not already at the top.
  pub next_belt:            Option<Belt>,
}

impl Eligibility {
  /// Pure computation over aggregates the store has already gathered.
  ///
  /// Zero decided matches yield a win rate of 0, never a division fault.
  pub fn compute(
    join_date:      NaiveDate,
    last_promotion: Option<NaiveDate>,
    decided:        u32,
    wins:           u32,
    today:          NaiveDate,
    next_belt:      Option<Belt>,
  ) -> Self {
    let since = last_promotion.unwrap_or(join_date);
    let days_since_last = (today - since).num_days();
    let time_eligible = days_since_last >= MIN_DAYS_BETWEEN_PROMOTIONS;

    let win_rate = if decided == 0 {
      0.0
    } else {
      f64::from(wins) / f64::from(decided) * 100.0
    };
    let performance_eligible =
      decided >= MIN_DECIDED_MATCHES && win_rate >= MIN_WIN_RATE;

    Self {
      days_since_last,
      time_eligible,
      decided_matches: decided,
      wins,
      win_rate,
      performance_eligible,
      is_eligible: time_eligible,
      next_belt,
    }
  }
}

/// A roster entry on the admin promotion list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionCandidate {
  pub profile:     TraineeProfile,
  pub eligibility: Eligibility,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn zero_decided_matches_never_performance_eligible() {
    let e =
      Eligibility::compute(day(2025, 1, 1), None, 0, 0, day(2026, 1, 1), None);
    assert_eq!(e.win_rate, 0.0);
    assert!(!e.performance_eligible);
  }

  #[test]
  fn five_decided_two_wins_is_performance_eligible() {
    // Exactly at both floors: 5 decided, 40%.
    let e =
      Eligibility::compute(day(2025, 1, 1), None, 5, 2, day(2025, 2, 1), None);
    assert!(e.performance_eligible);
    assert!((e.win_rate - 40.0).abs() < 1e-9);
  }

  #[test]
  fn four_decided_matches_is_not_enough() {
    let e =
      Eligibility::compute(day(2025, 1, 1), None, 4, 4, day(2026, 1, 1), None);
    assert!(!e.performance_eligible);
  }

  #[test]
  fn tenure_counts_from_join_date_without_promotions() {
    let e = Eligibility::compute(
      day(2025, 1, 1),
      None,
      0,
      0,
      day(2025, 7, 20),
      None,
    );
    assert_eq!(e.days_since_last, 200);
    assert!(e.time_eligible);
  }

  #[test]
  fn tenure_resets_at_the_last_promotion() {
    let e = Eligibility::compute(
      day(2024, 1, 1),
      Some(day(2025, 6, 1)),
      0,
      0,
      day(2025, 7, 20),
      None,
    );
    assert_eq!(e.days_since_last, 49);
    assert!(!e.time_eligible);
  }

  #[test]
  fn overall_eligibility_ignores_performance() {
    // 200 days tenure, winless record: still eligible.
    let e = Eligibility::compute(
      day(2025, 1, 1),
      None,
      10,
      0,
      day(2025, 7, 20),
      None,
    );
    assert!(e.is_eligible);
    assert!(!e.performance_eligible);
  }
}
