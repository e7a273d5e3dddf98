//! Trainee profiles and their lifecycle.
//!
//! A trainee is a club-member profile linked one-to-one to an identity.
//! Deactivation is a soft delete: the `is_active` flag is cleared and all
//! history (matches, payments, promotions, notifications) is retained.
//! A freshly registered trainee is neither approved nor active; an admin
//! approval flips both flags.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result, belt::Belt, matches::Match, payment::Payment, role::Identity,
};

/// A club-member profile. Exactly one per identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trainee {
  pub trainee_id:        Uuid,
  pub identity_id:       Uuid,
  pub date_of_birth:     NaiveDate,
  pub belt_id:           Option<Uuid>,
  pub contact_number:    String,
  pub address:           String,
  pub emergency_contact: Option<String>,
  pub emergency_phone:   Option<String>,
  /// Server-assigned on registration; never changes afterwards.
  pub join_date:         NaiveDate,
  pub is_active:         bool,
  pub is_approved:       bool,
}

/// A trainee joined with its identity and current belt — the assembled
/// read view used by roster listings. Never stored, always derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraineeProfile {
  pub trainee:  Trainee,
  pub identity: Identity,
  pub belt:     Option<Belt>,
}

/// Input to [`crate::store::ClubStore::register_trainee`].
///
/// The password is hashed before it reaches the store; the plain text never
/// crosses this boundary. Join date and flags are set by the store.
#[derive(Debug, Clone)]
pub struct NewRegistration {
  pub username:       String,
  pub email:          String,
  pub password_hash:  String,
  pub first_name:     String,
  pub last_name:      String,
  pub date_of_birth:  NaiveDate,
  pub contact_number: String,
  pub address:        String,
}

impl NewRegistration {
  /// Field-level checks that need no store access. Uniqueness of
  /// username/email is re-checked inside the registration transaction.
  pub fn validate(&self) -> Result<()> {
    validate_phone(&self.contact_number)?;
    Ok(())
  }
}

/// Input to [`crate::store::ClubStore::update_trainee`] — the admin edit
/// of a profile together with its identity fields.
#[derive(Debug, Clone)]
pub struct TraineeUpdate {
  pub username:          String,
  pub email:             String,
  pub first_name:        String,
  pub last_name:         String,
  /// `None` keeps the current password.
  pub password_hash:     Option<String>,
  pub date_of_birth:     NaiveDate,
  pub belt_id:           Option<Uuid>,
  pub contact_number:    String,
  pub address:           String,
  pub emergency_contact: Option<String>,
  pub emergency_phone:   Option<String>,
  pub is_active:         bool,
}

impl TraineeUpdate {
  pub fn validate(&self) -> Result<()> {
    validate_phone(&self.contact_number)?;
    if let Some(phone) = &self.emergency_phone {
      validate_phone(phone)?;
    }
    Ok(())
  }
}

/// A phone number may contain digits plus `+`, `-`, and spaces.
pub fn validate_phone(number: &str) -> Result<()> {
  let stripped: String = number
    .chars()
    .filter(|c| !matches!(c, '+' | '-' | ' '))
    .collect();
  if stripped.is_empty() || !stripped.chars().all(|c| c.is_ascii_digit()) {
    return Err(Error::InvalidPhoneNumber(number.to_owned()));
  }
  Ok(())
}

// ─── Dashboard read-model ────────────────────────────────────────────────────

/// Per-trainee dashboard aggregates — computed from queries, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraineeDashboard {
  pub profile:                TraineeProfile,
  /// Matches whose time has passed.
  pub completed_matches:      u32,
  pub wins:                   u32,
  pub losses:                 u32,
  /// Percentage rounded to one decimal place.
  pub win_rate:               f64,
  /// Next 5 future matches, soonest first.
  pub upcoming_matches:       Vec<Match>,
  /// Last 5 past matches, newest first.
  pub recent_matches:         Vec<Match>,
  /// Last 5 payments, newest due date first.
  pub recent_payments:        Vec<Payment>,
  pub pending_payments_count: u32,
  /// Sum of unpaid amounts; 0 when there are none.
  pub outstanding_balance:    Decimal,
}

/// Win percentage over completed matches; 0 when none were played.
pub fn win_rate(wins: u32, completed: u32) -> f64 {
  if completed == 0 {
    return 0.0;
  }
  let raw = f64::from(wins) / f64::from(completed) * 100.0;
  (raw * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn phone_accepts_digits_and_separators() {
    assert!(validate_phone("+49 170-555 0134").is_ok());
  }

  #[test]
  fn phone_rejects_letters() {
    assert!(matches!(
      validate_phone("call me"),
      Err(Error::InvalidPhoneNumber(_))
    ));
  }

  #[test]
  fn phone_rejects_separators_only() {
    assert!(validate_phone("+- ").is_err());
  }

  #[test]
  fn win_rate_of_zero_matches_is_zero() {
    assert_eq!(win_rate(0, 0), 0.0);
  }

  #[test]
  fn win_rate_rounds_to_one_decimal() {
    assert_eq!(win_rate(1, 3), 33.3);
    assert_eq!(win_rate(2, 3), 66.7);
  }
}
