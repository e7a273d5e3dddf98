//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and calendar dates as
//! `YYYY-MM-DD`, so string comparison in SQL matches chronological order.
//! Enums are stored as their lowercase discriminants. UUIDs are stored as
//! hyphenated lowercase strings, and decimal amounts in their natural
//! string form.

use std::str::FromStr as _;

use chrono::{DateTime, NaiveDate, Utc};
use dojang_core::{
  Error, Result,
  belt::Belt,
  event::{Event, EventKind},
  matches::Match,
  notification::{Notification, NotificationKind},
  payment::Payment,
  promotion::Promotion,
  role::{Identity, Role},
  trainee::{Trainee, TraineeProfile},
};
use rust_decimal::Decimal;
use uuid::Uuid;

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Uuid::parse_str(s).map_err(|e| Error::Decode(format!("uuid {s:?}: {e}")))
}

fn decode_opt_uuid(s: Option<&str>) -> Result<Option<Uuid>> {
  s.map(decode_uuid).transpose()
}

// ─── Timestamps and dates ────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::Admin => "admin",
    Role::Judge => "judge",
    Role::Trainee => "trainee",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "admin" => Ok(Role::Admin),
    "judge" => Ok(Role::Judge),
    "trainee" => Ok(Role::Trainee),
    other => Err(Error::Decode(format!("unknown role: {other:?}"))),
  }
}

// ─── Event kind ──────────────────────────────────────────────────────────────

pub fn decode_event_kind(s: &str) -> Result<EventKind> {
  match s {
    "tournament" => Ok(EventKind::Tournament),
    "training" => Ok(EventKind::Training),
    "seminar" => Ok(EventKind::Seminar),
    "grading" => Ok(EventKind::Grading),
    other => Err(Error::Decode(format!("unknown event kind: {other:?}"))),
  }
}

// ─── Notification kind ───────────────────────────────────────────────────────

pub fn decode_notification_kind(s: &str) -> Result<NotificationKind> {
  match s {
    "match" => Ok(NotificationKind::Match),
    "payment" => Ok(NotificationKind::Payment),
    "promotion" => Ok(NotificationKind::Promotion),
    "event" => Ok(NotificationKind::Event),
    other => {
      Err(Error::Decode(format!("unknown notification kind: {other:?}")))
    }
  }
}

// ─── Decimal amounts ─────────────────────────────────────────────────────────

pub fn encode_amount(d: Decimal) -> String { d.to_string() }

pub fn decode_amount(s: &str) -> Result<Decimal> {
  Decimal::from_str(s).map_err(|e| Error::Decode(format!("amount {s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `identities` row.
pub struct RawIdentity {
  pub identity_id:   String,
  pub username:      String,
  pub email:         String,
  pub password_hash: String,
  pub first_name:    String,
  pub last_name:     String,
  pub role:          String,
  pub created_at:    String,
}

impl RawIdentity {
  pub fn into_identity(self) -> Result<Identity> {
    Ok(Identity {
      identity_id:   decode_uuid(&self.identity_id)?,
      username:      self.username,
      email:         self.email,
      password_hash: self.password_hash,
      first_name:    self.first_name,
      last_name:     self.last_name,
      role:          decode_role(&self.role)?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `belts` row.
pub struct RawBelt {
  pub belt_id: String,
  pub name:    String,
  pub color:   String,
  pub rank:    u32,
}

impl RawBelt {
  pub fn into_belt(self) -> Result<Belt> {
    Ok(Belt {
      belt_id: decode_uuid(&self.belt_id)?,
      name:    self.name,
      color:   self.color,
      order:   self.rank,
    })
  }
}

/// A `trainees` row joined with its identity and (optionally) its belt —
/// the column set behind every profile listing.
pub struct RawProfile {
  // trainees columns
  pub trainee_id:        String,
  pub identity_id:       String,
  pub date_of_birth:     String,
  pub belt_id:           Option<String>,
  pub contact_number:    String,
  pub address:           String,
  pub emergency_contact: Option<String>,
  pub emergency_phone:   Option<String>,
  pub join_date:         String,
  pub is_active:         bool,
  pub is_approved:       bool,
  // identities join
  pub username:          String,
  pub email:             String,
  pub password_hash:     String,
  pub first_name:        String,
  pub last_name:         String,
  pub role:              String,
  pub created_at:        String,
  // belts join (absent when the trainee holds no belt)
  pub belt_name:         Option<String>,
  pub belt_color:        Option<String>,
  pub belt_rank:         Option<u32>,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<TraineeProfile> {
    let identity_id = decode_uuid(&self.identity_id)?;
    let belt_id = decode_opt_uuid(self.belt_id.as_deref())?;

    let belt = match (belt_id, self.belt_name, self.belt_color, self.belt_rank)
    {
      (Some(belt_id), Some(name), Some(color), Some(rank)) => Some(Belt {
        belt_id,
        name,
        color,
        order: rank,
      }),
      _ => None,
    };

    let identity = RawIdentity {
      identity_id:   self.identity_id,
      username:      self.username,
      email:         self.email,
      password_hash: self.password_hash,
      first_name:    self.first_name,
      last_name:     self.last_name,
      role:          self.role,
      created_at:    self.created_at,
    }
    .into_identity()?;

    Ok(TraineeProfile {
      trainee: Trainee {
        trainee_id: decode_uuid(&self.trainee_id)?,
        identity_id,
        date_of_birth: decode_date(&self.date_of_birth)?,
        belt_id,
        contact_number: self.contact_number,
        address: self.address,
        emergency_contact: self.emergency_contact,
        emergency_phone: self.emergency_phone,
        join_date: decode_date(&self.join_date)?,
        is_active: self.is_active,
        is_approved: self.is_approved,
      },
      identity,
      belt,
    })
  }
}

/// Raw strings read directly from an `events` row.
pub struct RawEvent {
  pub event_id:              String,
  pub name:                  String,
  pub description:           String,
  pub start_at:              String,
  pub end_at:                String,
  pub location:              String,
  pub kind:                  String,
  pub max_participants:      Option<u32>,
  pub registration_deadline: Option<String>,
  pub is_published:          bool,
}

impl RawEvent {
  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      event_id:              decode_uuid(&self.event_id)?,
      name:                  self.name,
      description:           self.description,
      start_at:              decode_dt(&self.start_at)?,
      end_at:                decode_dt(&self.end_at)?,
      location:              self.location,
      kind:                  decode_event_kind(&self.kind)?,
      max_participants:      self.max_participants,
      registration_deadline: self
        .registration_deadline
        .as_deref()
        .map(decode_dt)
        .transpose()?,
      is_published:          self.is_published,
    })
  }
}

/// Raw strings read directly from a `matches` row.
pub struct RawMatch {
  pub match_id:    String,
  pub event_id:    String,
  pub trainee1_id: String,
  pub trainee2_id: String,
  pub winner_id:   Option<String>,
  pub score1:      u32,
  pub score2:      u32,
  pub judge_id:    Option<String>,
  pub match_time:  String,
}

impl RawMatch {
  pub fn into_match(self) -> Result<Match> {
    Ok(Match {
      match_id:    decode_uuid(&self.match_id)?,
      event_id:    decode_uuid(&self.event_id)?,
      trainee1_id: decode_uuid(&self.trainee1_id)?,
      trainee2_id: decode_uuid(&self.trainee2_id)?,
      winner_id:   decode_opt_uuid(self.winner_id.as_deref())?,
      score1:      self.score1,
      score2:      self.score2,
      judge_id:    decode_opt_uuid(self.judge_id.as_deref())?,
      match_time:  decode_dt(&self.match_time)?,
    })
  }
}

/// Raw strings read directly from a `payments` row.
pub struct RawPayment {
  pub payment_id:  String,
  pub trainee_id:  String,
  pub amount:      String,
  pub due_date:    String,
  pub description: String,
  pub paid:        bool,
}

impl RawPayment {
  pub fn into_payment(self) -> Result<Payment> {
    Ok(Payment {
      payment_id:  decode_uuid(&self.payment_id)?,
      trainee_id:  decode_uuid(&self.trainee_id)?,
      amount:      decode_amount(&self.amount)?,
      due_date:    decode_date(&self.due_date)?,
      description: self.description,
      paid:        self.paid,
    })
  }
}

/// Raw strings read directly from a `promotions` row.
pub struct RawPromotion {
  pub promotion_id: String,
  pub trainee_id:   String,
  pub belt_from:    Option<String>,
  pub belt_to:      Option<String>,
  pub awarded_on:   String,
}

impl RawPromotion {
  pub fn into_promotion(self) -> Result<Promotion> {
    Ok(Promotion {
      promotion_id: decode_uuid(&self.promotion_id)?,
      trainee_id:   decode_uuid(&self.trainee_id)?,
      belt_from:    decode_opt_uuid(self.belt_from.as_deref())?,
      belt_to:      decode_opt_uuid(self.belt_to.as_deref())?,
      awarded_on:   decode_date(&self.awarded_on)?,
    })
  }
}

/// Raw strings read directly from a `notifications` row.
pub struct RawNotification {
  pub notification_id: String,
  pub recipient_id:    String,
  pub title:           String,
  pub message:         String,
  pub kind:            String,
  pub is_read:         bool,
  pub created_at:      String,
  pub link:            Option<String>,
}

impl RawNotification {
  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      notification_id: decode_uuid(&self.notification_id)?,
      recipient_id:    decode_uuid(&self.recipient_id)?,
      title:           self.title,
      message:         self.message,
      kind:            decode_notification_kind(&self.kind)?,
      is_read:         self.is_read,
      created_at:      decode_dt(&self.created_at)?,
      link:            self.link,
    })
  }
}
