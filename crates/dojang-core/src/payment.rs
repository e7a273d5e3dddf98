//! The payment ledger.
//!
//! "Overdue" is always derived from the paid flag and the due date; it is
//! never persisted. Aggregate sums over zero rows yield zero.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A due or settled payment owed by a trainee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
  pub payment_id:  Uuid,
  pub trainee_id:  Uuid,
  /// Always strictly positive.
  pub amount:      Decimal,
  pub due_date:    NaiveDate,
  pub description: String,
  pub paid:        bool,
}

impl Payment {
  /// Unpaid and past its due date. Derived, never stored.
  pub fn is_overdue(&self, today: NaiveDate) -> bool {
    !self.paid && self.due_date < today
  }
}

/// Input to [`crate::store::ClubStore::create_payment`]. New payments
/// always start unpaid.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPayment {
  pub trainee_id:  Uuid,
  pub amount:      Decimal,
  pub due_date:    NaiveDate,
  pub description: String,
}

/// Status filter for the admin ledger listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatusFilter {
  #[default]
  All,
  Pending,
  Paid,
  Overdue,
}

/// A ledger row with its derived overdue flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRow {
  #[serde(flatten)]
  pub payment:    Payment,
  pub is_overdue: bool,
}

/// Ledger aggregates. `collected + pending` always equals the sum of all
/// payment amounts; `overdue` is the unpaid-and-past-due subset of
/// `pending`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentTotals {
  pub collected: Decimal,
  pub pending:   Decimal,
  pub overdue:   Decimal,
}

/// The admin ledger listing: filtered rows plus the running totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentLedger {
  pub rows:   Vec<PaymentRow>,
  pub totals: PaymentTotals,
}
