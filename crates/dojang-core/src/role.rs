//! Identities and the closed role model.
//!
//! Every authenticated principal maps to exactly one [`Role`]. Operations
//! declare their required role as part of their contract; the HTTP layer
//! enforces it with a single extractor-based gate rather than scattered
//! predicate checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three roles a principal can hold. One per identity, never more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Judge,
  Trainee,
}

/// An account that can authenticate against the service.
///
/// The trainee profile (belt, contact details, approval state) lives in a
/// separate [`Trainee`](crate::trainee::Trainee) row owned by the identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
  pub identity_id: Uuid,
  pub username:    String,
  pub email:       String,
  /// PHC string produced by argon2; never serialised out of the store layer
  /// in API payloads.
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  pub first_name:  String,
  pub last_name:   String,
  pub role:        Role,
  pub created_at:  DateTime<Utc>,
}

impl Identity {
  /// Full name when both parts are present, otherwise the username.
  pub fn display_name(&self) -> String {
    let full = format!("{} {}", self.first_name, self.last_name);
    let full = full.trim();
    if full.is_empty() {
      self.username.clone()
    } else {
      full.to_owned()
    }
  }
}

/// Input to [`crate::store::ClubStore::add_identity`].
/// `created_at` is always set by the store; it is not accepted from callers.
#[derive(Debug, Clone)]
pub struct NewIdentity {
  pub username:      String,
  pub email:         String,
  pub password_hash: String,
  pub first_name:    String,
  pub last_name:     String,
  pub role:          Role,
}
