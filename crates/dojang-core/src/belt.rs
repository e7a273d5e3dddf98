//! The belt ladder — ranked membership tiers.
//!
//! `order` is the sole ranking key: a higher order means a higher rank.
//! Promotions only ever move strictly upward along it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A ranked membership tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Belt {
  pub belt_id: Uuid,
  pub name:    String,
  /// Display colour as a hex string, e.g. `#ffffff`.
  pub color:   String,
  /// Unique rank index; strictly orders the ladder.
  pub order:   u32,
}

/// Input to [`crate::store::ClubStore::add_belt`].
#[derive(Debug, Clone)]
pub struct NewBelt {
  pub name:  String,
  pub color: String,
  pub order: u32,
}
