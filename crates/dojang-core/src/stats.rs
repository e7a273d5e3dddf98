//! Dashboard statistics and report read-models.
//!
//! The dashboard snapshot is cached in a single last-write-wins row purely
//! as a read optimisation; it carries no correctness obligation beyond
//! matching a fresh recomputation, and readers must tolerate it being
//! stale or absent.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Result;

/// The cache key for the admin dashboard row.
pub const ADMIN_DASHBOARD_STAT: &str = "admin_dashboard";

/// Aggregates shown on the admin dashboard. Fully recomputed from the
/// source tables on every [`crate::store::ClubStore::recompute_dashboard`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
  pub total_trainees:          u32,
  /// Published events that have not ended yet.
  pub upcoming_events:         u32,
  pub pending_payments:        u32,
  pub pending_payments_amount: Decimal,
  /// Promotions awarded in the trailing 30 days.
  pub recent_promotions:       u32,
}

impl DashboardSnapshot {
  /// Serialise for the `value_json` column of the cache row.
  pub fn to_json(&self) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(self)?)
  }

  /// Deserialise from the stored JSON blob.
  pub fn from_json(value: serde_json::Value) -> Result<Self> {
    Ok(serde_json::from_value(value)?)
  }
}

/// The cached dashboard row, as last written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedDashboard {
  pub stat_type:  String,
  pub value:      DashboardSnapshot,
  pub updated_at: DateTime<Utc>,
}

// ─── Chart read-models ───────────────────────────────────────────────────────

/// One tick on the trainee-growth chart: the cumulative membership on a
/// given sample date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthPoint {
  /// Month name of the sample date, e.g. `"March"`.
  pub label: String,
  pub count: u32,
}

/// Trainee count for one belt on the distribution chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeltCount {
  pub belt_name: String,
  pub order:     u32,
  pub count:     u32,
}

/// Paid-versus-pending payment counts for the status chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusCounts {
  pub paid:    u32,
  pub pending: u32,
}
