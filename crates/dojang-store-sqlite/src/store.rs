//! [`SqliteStore`] — the SQLite implementation of [`ClubStore`].
//!
//! Every operation validates before its first write. Operations with more
//! than one effect (registration, match completion, promotion, payment
//! creation) run their writes inside a single transaction so they land
//! atomically or not at all.

use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{OptionalExtension as _, params_from_iter, types::Value};
use rust_decimal::Decimal;
use uuid::Uuid;

use dojang_core::{
  Error, Result,
  belt::{Belt, NewBelt},
  event::{Event, EventDetail, NewEvent},
  matches::{JudgedMatch, Match, MatchSide, NewMatch, ScoreAction},
  notification::{
    NewNotification, Notification, NotificationFeed, NotificationKind,
  },
  payment::{
    NewPayment, Payment, PaymentLedger, PaymentRow, PaymentStatusFilter,
    PaymentTotals,
  },
  promotion::{Eligibility, Promotion, PromotionCandidate},
  role::{Identity, NewIdentity, Role},
  stats::{
    ADMIN_DASHBOARD_STAT, BeltCount, CachedDashboard, DashboardSnapshot,
    GrowthPoint, PaymentStatusCounts,
  },
  store::ClubStore,
  trainee::{
    NewRegistration, TraineeDashboard, TraineeProfile, TraineeUpdate, win_rate,
  },
};

use crate::{
  encode::{
    RawBelt, RawEvent, RawIdentity, RawMatch, RawNotification, RawPayment,
    RawProfile, RawPromotion, decode_amount, decode_date, decode_dt,
    encode_amount, encode_date, encode_dt, encode_role, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── SQL fragments ───────────────────────────────────────────────────────────

/// Column list behind every profile read; order matches `profile_from_row`.
const PROFILE_COLS: &str = "t.trainee_id, t.identity_id, t.date_of_birth, \
   t.belt_id, t.contact_number, t.address, t.emergency_contact, \
   t.emergency_phone, t.join_date, t.is_active, t.is_approved, \
   i.username, i.email, i.password_hash, i.first_name, i.last_name, \
   i.role, i.created_at, b.name, b.color, b.rank";

const PROFILE_FROM: &str = "FROM trainees t \
   JOIN identities i ON i.identity_id = t.identity_id \
   LEFT JOIN belts b ON b.belt_id = t.belt_id";

const IDENTITY_COLS: &str = "identity_id, username, email, password_hash, \
   first_name, last_name, role, created_at";

const MATCH_COLS: &str = "match_id, event_id, trainee1_id, trainee2_id, \
   winner_id, score1, score2, judge_id, match_time";

const EVENT_COLS: &str = "event_id, name, description, start_at, end_at, \
   location, kind, max_participants, registration_deadline, is_published";

const PAYMENT_COLS: &str =
  "payment_id, trainee_id, amount, due_date, description, paid";

const NOTIFICATION_COLS: &str = "notification_id, recipient_id, title, \
   message, kind, is_read, created_at, link";

const PROMOTION_COLS: &str =
  "promotion_id, trainee_id, belt_from, belt_to, awarded_on";

// ─── Row mappers ─────────────────────────────────────────────────────────────

fn profile_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawProfile> {
  Ok(RawProfile {
    trainee_id:        row.get(0)?,
    identity_id:       row.get(1)?,
    date_of_birth:     row.get(2)?,
    belt_id:           row.get(3)?,
    contact_number:    row.get(4)?,
    address:           row.get(5)?,
    emergency_contact: row.get(6)?,
    emergency_phone:   row.get(7)?,
    join_date:         row.get(8)?,
    is_active:         row.get(9)?,
    is_approved:       row.get(10)?,
    username:          row.get(11)?,
    email:             row.get(12)?,
    password_hash:     row.get(13)?,
    first_name:        row.get(14)?,
    last_name:         row.get(15)?,
    role:              row.get(16)?,
    created_at:        row.get(17)?,
    belt_name:         row.get(18)?,
    belt_color:        row.get(19)?,
    belt_rank:         row.get(20)?,
  })
}

fn identity_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawIdentity> {
  Ok(RawIdentity {
    identity_id:   row.get(0)?,
    username:      row.get(1)?,
    email:         row.get(2)?,
    password_hash: row.get(3)?,
    first_name:    row.get(4)?,
    last_name:     row.get(5)?,
    role:          row.get(6)?,
    created_at:    row.get(7)?,
  })
}

fn match_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawMatch> {
  Ok(RawMatch {
    match_id:    row.get(0)?,
    event_id:    row.get(1)?,
    trainee1_id: row.get(2)?,
    trainee2_id: row.get(3)?,
    winner_id:   row.get(4)?,
    score1:      row.get(5)?,
    score2:      row.get(6)?,
    judge_id:    row.get(7)?,
    match_time:  row.get(8)?,
  })
}

fn event_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEvent> {
  Ok(RawEvent {
    event_id:              row.get(0)?,
    name:                  row.get(1)?,
    description:           row.get(2)?,
    start_at:              row.get(3)?,
    end_at:                row.get(4)?,
    location:              row.get(5)?,
    kind:                  row.get(6)?,
    max_participants:      row.get(7)?,
    registration_deadline: row.get(8)?,
    is_published:          row.get(9)?,
  })
}

fn payment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPayment> {
  Ok(RawPayment {
    payment_id:  row.get(0)?,
    trainee_id:  row.get(1)?,
    amount:      row.get(2)?,
    due_date:    row.get(3)?,
    description: row.get(4)?,
    paid:        row.get(5)?,
  })
}

fn notification_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawNotification> {
  Ok(RawNotification {
    notification_id: row.get(0)?,
    recipient_id:    row.get(1)?,
    title:           row.get(2)?,
    message:         row.get(3)?,
    kind:            row.get(4)?,
    is_read:         row.get(5)?,
    created_at:      row.get(6)?,
    link:            row.get(7)?,
  })
}

fn promotion_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawPromotion> {
  Ok(RawPromotion {
    promotion_id: row.get(0)?,
    trainee_id:   row.get(1)?,
    belt_from:    row.get(2)?,
    belt_to:      row.get(3)?,
    awarded_on:   row.get(4)?,
  })
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

type Binds = Vec<Value>;

fn db_err(e: tokio_rusqlite::Error) -> Error {
  Error::Storage(e.to_string())
}

fn text(s: impl Into<String>) -> Value {
  Value::Text(s.into())
}

fn opt_text(s: Option<String>) -> Value {
  s.map_or(Value::Null, Value::Text)
}

/// Build the row for a notification emitted as a side effect; the insert
/// itself happens inside the caller's transaction.
fn build_notification(
  recipient_id: Uuid,
  title: &str,
  message: String,
  kind: NotificationKind,
  link: Option<&str>,
) -> Notification {
  Notification {
    notification_id: Uuid::new_v4(),
    recipient_id,
    title: title.to_owned(),
    message,
    kind,
    is_read: false,
    created_at: Utc::now(),
    link: link.map(str::to_owned),
  }
}

fn insert_notification_row(
  conn: &rusqlite::Connection,
  n: &Notification,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO notifications (
       notification_id, recipient_id, title, message, kind,
       is_read, created_at, link
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    rusqlite::params![
      encode_uuid(n.notification_id),
      encode_uuid(n.recipient_id),
      n.title,
      n.message,
      n.kind.discriminant(),
      n.is_read,
      encode_dt(n.created_at),
      n.link,
    ],
  )?;
  Ok(())
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Dojang club store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(db_err)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(db_err)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(db_err)
  }

  // ── Generic query plumbing ────────────────────────────────────────────

  pub(crate) async fn execute(&self, sql: String, binds: Binds) -> Result<usize> {
    self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, params_from_iter(binds))?))
      .await
      .map_err(db_err)
  }

  async fn count(&self, sql: String, binds: Binds) -> Result<u32> {
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, params_from_iter(binds), |r| r.get(0))?)
      })
      .await
      .map_err(db_err)?;
    Ok(n as u32)
  }

  async fn optional_string(
    &self,
    sql: String,
    binds: Binds,
  ) -> Result<Option<String>> {
    self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, params_from_iter(binds), |r| r.get(0))
            .optional()?,
        )
      })
      .await
      .map_err(db_err)
  }

  /// Sum a single decimal-text column; zero rows sum to zero.
  async fn sum_amounts(&self, sql: String, binds: Binds) -> Result<Decimal> {
    let raw: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(binds), |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;

    let mut total = Decimal::ZERO;
    for s in &raw {
      total += decode_amount(s)?;
    }
    Ok(total)
  }

  async fn profiles_query(
    &self,
    sql: String,
    binds: Binds,
  ) -> Result<Vec<TraineeProfile>> {
    let raws: Vec<RawProfile> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(binds), profile_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;
    raws.into_iter().map(RawProfile::into_profile).collect()
  }

  async fn profile_query_one(
    &self,
    where_clause: &str,
    binds: Binds,
  ) -> Result<Option<TraineeProfile>> {
    let sql = format!(
      "SELECT {PROFILE_COLS} {PROFILE_FROM} WHERE {where_clause} LIMIT 1"
    );
    Ok(self.profiles_query(sql, binds).await?.into_iter().next())
  }

  async fn identity_query_one(
    &self,
    where_clause: &str,
    binds: Binds,
  ) -> Result<Option<Identity>> {
    let sql = format!(
      "SELECT {IDENTITY_COLS} FROM identities WHERE {where_clause} LIMIT 1"
    );
    let raw: Option<RawIdentity> = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, params_from_iter(binds), identity_from_row)
          .optional()?)
      })
      .await
      .map_err(db_err)?;
    raw.map(RawIdentity::into_identity).transpose()
  }

  async fn matches_query(
    &self,
    sql: String,
    binds: Binds,
  ) -> Result<Vec<Match>> {
    let raws: Vec<RawMatch> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(binds), match_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;
    raws.into_iter().map(RawMatch::into_match).collect()
  }

  async fn events_query(
    &self,
    sql: String,
    binds: Binds,
  ) -> Result<Vec<Event>> {
    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(binds), event_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;
    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn payments_query(
    &self,
    sql: String,
    binds: Binds,
  ) -> Result<Vec<Payment>> {
    let raws: Vec<RawPayment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(binds), payment_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;
    raws.into_iter().map(RawPayment::into_payment).collect()
  }

  async fn get_event(&self, event_id: Uuid) -> Result<Option<Event>> {
    let sql =
      format!("SELECT {EVENT_COLS} FROM events WHERE event_id = ?1 LIMIT 1");
    Ok(
      self
        .events_query(sql, vec![text(encode_uuid(event_id))])
        .await?
        .into_iter()
        .next(),
    )
  }

  async fn username_taken(
    &self,
    username: &str,
    exclude: Option<Uuid>,
  ) -> Result<bool> {
    let n = self
      .count(
        "SELECT COUNT(*) FROM identities \
         WHERE username = ?1 AND identity_id <> ?2"
          .into(),
        vec![
          text(username),
          text(exclude.map(encode_uuid).unwrap_or_default()),
        ],
      )
      .await?;
    Ok(n > 0)
  }

  async fn email_taken(
    &self,
    email: &str,
    exclude: Option<Uuid>,
  ) -> Result<bool> {
    let n = self
      .count(
        "SELECT COUNT(*) FROM identities \
         WHERE email = ?1 AND identity_id <> ?2"
          .into(),
        vec![
          text(email),
          text(exclude.map(encode_uuid).unwrap_or_default()),
        ],
      )
      .await?;
    Ok(n > 0)
  }

  async fn unread_count(&self, recipient_id: Uuid) -> Result<u32> {
    self
      .count(
        "SELECT COUNT(*) FROM notifications \
         WHERE recipient_id = ?1 AND is_read = 0"
          .into(),
        vec![text(encode_uuid(recipient_id))],
      )
      .await
  }
}

// ─── ClubStore impl ──────────────────────────────────────────────────────────

impl ClubStore for SqliteStore {
  // ── Identities ────────────────────────────────────────────────────────

  async fn add_identity(&self, input: NewIdentity) -> Result<Identity> {
    if self.username_taken(&input.username, None).await? {
      return Err(Error::UsernameTaken(input.username));
    }
    if self.email_taken(&input.email, None).await? {
      return Err(Error::EmailTaken(input.email));
    }

    let identity = Identity {
      identity_id:   Uuid::new_v4(),
      username:      input.username,
      email:         input.email,
      password_hash: input.password_hash,
      first_name:    input.first_name,
      last_name:     input.last_name,
      role:          input.role,
      created_at:    Utc::now(),
    };

    self
      .execute(
        format!(
          "INSERT INTO identities ({IDENTITY_COLS}) \
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
        ),
        vec![
          text(encode_uuid(identity.identity_id)),
          text(identity.username.clone()),
          text(identity.email.clone()),
          text(identity.password_hash.clone()),
          text(identity.first_name.clone()),
          text(identity.last_name.clone()),
          text(encode_role(identity.role)),
          text(encode_dt(identity.created_at)),
        ],
      )
      .await?;

    Ok(identity)
  }

  async fn identity_by_username(
    &self,
    username: &str,
  ) -> Result<Option<Identity>> {
    self
      .identity_query_one("username = ?1", vec![text(username)])
      .await
  }

  async fn get_identity(&self, id: Uuid) -> Result<Option<Identity>> {
    self
      .identity_query_one("identity_id = ?1", vec![text(encode_uuid(id))])
      .await
  }

  // ── Belt ladder ───────────────────────────────────────────────────────

  async fn add_belt(&self, input: NewBelt) -> Result<Belt> {
    let taken = self
      .count(
        "SELECT COUNT(*) FROM belts WHERE rank = ?1".into(),
        vec![Value::from(i64::from(input.order))],
      )
      .await?;
    if taken > 0 {
      return Err(Error::BeltOrderTaken(input.order));
    }

    let belt = Belt {
      belt_id: Uuid::new_v4(),
      name:    input.name,
      color:   input.color,
      order:   input.order,
    };

    self
      .execute(
        "INSERT INTO belts (belt_id, name, color, rank) \
         VALUES (?1, ?2, ?3, ?4)"
          .into(),
        vec![
          text(encode_uuid(belt.belt_id)),
          text(belt.name.clone()),
          text(belt.color.clone()),
          Value::from(i64::from(belt.order)),
        ],
      )
      .await?;

    Ok(belt)
  }

  async fn list_belts(&self) -> Result<Vec<Belt>> {
    let raws: Vec<RawBelt> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT belt_id, name, color, rank FROM belts ORDER BY rank ASC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawBelt {
              belt_id: row.get(0)?,
              name:    row.get(1)?,
              color:   row.get(2)?,
              rank:    row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;
    raws.into_iter().map(RawBelt::into_belt).collect()
  }

  async fn next_belt_after(
    &self,
    current_order: Option<u32>,
  ) -> Result<Option<Belt>> {
    let belts = self.list_belts().await?;
    Ok(match current_order {
      Some(order) => belts.into_iter().find(|b| b.order > order),
      None => belts.into_iter().next(),
    })
  }

  async fn promotion_candidates(&self, trainee_id: Uuid) -> Result<Vec<Belt>> {
    let profile = self
      .get_trainee(trainee_id)
      .await?
      .ok_or(Error::TraineeNotFound(trainee_id))?;
    let current = profile.belt.map(|b| b.order);
    let belts = self.list_belts().await?;
    Ok(
      belts
        .into_iter()
        .filter(|b| current.is_none_or(|order| b.order > order))
        .collect(),
    )
  }

  // ── Trainee lifecycle ─────────────────────────────────────────────────

  async fn register_trainee(
    &self,
    input: NewRegistration,
  ) -> Result<TraineeProfile> {
    input.validate()?;
    if self.username_taken(&input.username, None).await? {
      return Err(Error::UsernameTaken(input.username));
    }
    if self.email_taken(&input.email, None).await? {
      return Err(Error::EmailTaken(input.email));
    }

    // New members start on the bottom rung of the ladder.
    let starting_belt = self.next_belt_after(None).await?;

    let identity_id = Uuid::new_v4();
    let trainee_id = Uuid::new_v4();
    let now = Utc::now();

    let identity_id_str = encode_uuid(identity_id);
    let trainee_id_str = encode_uuid(trainee_id);
    let created_at_str = encode_dt(now);
    let join_date_str = encode_date(now.date_naive());
    let dob_str = encode_date(input.date_of_birth);
    let belt_id_str = starting_belt.map(|b| encode_uuid(b.belt_id));

    let username = input.username;
    let email = input.email;
    let password_hash = input.password_hash;
    let first_name = input.first_name;
    let last_name = input.last_name;
    let contact_number = input.contact_number;
    let address = input.address;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO identities (
             identity_id, username, email, password_hash,
             first_name, last_name, role, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'trainee', ?7)",
          rusqlite::params![
            identity_id_str,
            username,
            email,
            password_hash,
            first_name,
            last_name,
            created_at_str,
          ],
        )?;
        tx.execute(
          "INSERT INTO trainees (
             trainee_id, identity_id, date_of_birth, belt_id,
             contact_number, address, join_date, is_active, is_approved
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, 0)",
          rusqlite::params![
            trainee_id_str,
            identity_id_str,
            dob_str,
            belt_id_str,
            contact_number,
            address,
            join_date_str,
          ],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(db_err)?;

    self
      .get_trainee(trainee_id)
      .await?
      .ok_or(Error::TraineeNotFound(trainee_id))
  }

  async fn approve_trainee(&self, trainee_id: Uuid) -> Result<TraineeProfile> {
    let profile = self
      .get_trainee(trainee_id)
      .await?
      .ok_or(Error::TraineeNotFound(trainee_id))?;

    let note = build_notification(
      profile.identity.identity_id,
      "Account Approved",
      "Your account has been approved. You can now access the trainee \
       dashboard."
        .to_owned(),
      NotificationKind::Event,
      None,
    );

    let id_str = encode_uuid(trainee_id);
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "UPDATE trainees SET is_approved = 1, is_active = 1 \
           WHERE trainee_id = ?1",
          rusqlite::params![id_str],
        )?;
        insert_notification_row(&tx, &note)?;
        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(db_err)?;

    self
      .get_trainee(trainee_id)
      .await?
      .ok_or(Error::TraineeNotFound(trainee_id))
  }

  async fn deactivate_trainee(
    &self,
    trainee_id: Uuid,
  ) -> Result<TraineeProfile> {
    let affected = self
      .execute(
        "UPDATE trainees SET is_active = 0 WHERE trainee_id = ?1".into(),
        vec![text(encode_uuid(trainee_id))],
      )
      .await?;
    if affected == 0 {
      return Err(Error::TraineeNotFound(trainee_id));
    }
    self
      .get_trainee(trainee_id)
      .await?
      .ok_or(Error::TraineeNotFound(trainee_id))
  }

  async fn update_trainee(
    &self,
    trainee_id: Uuid,
    update: TraineeUpdate,
  ) -> Result<TraineeProfile> {
    update.validate()?;
    let profile = self
      .get_trainee(trainee_id)
      .await?
      .ok_or(Error::TraineeNotFound(trainee_id))?;
    let own_id = profile.identity.identity_id;

    if self.username_taken(&update.username, Some(own_id)).await? {
      return Err(Error::UsernameTaken(update.username));
    }
    if self.email_taken(&update.email, Some(own_id)).await? {
      return Err(Error::EmailTaken(update.email));
    }
    if let Some(belt_id) = update.belt_id {
      let known = self.list_belts().await?;
      if !known.iter().any(|b| b.belt_id == belt_id) {
        return Err(Error::BeltNotFound(belt_id));
      }
    }

    let identity_id_str = encode_uuid(own_id);
    let trainee_id_str = encode_uuid(trainee_id);
    let dob_str = encode_date(update.date_of_birth);
    let belt_id_str = update.belt_id.map(encode_uuid);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "UPDATE identities SET username = ?1, email = ?2, \
           first_name = ?3, last_name = ?4 WHERE identity_id = ?5",
          rusqlite::params![
            update.username,
            update.email,
            update.first_name,
            update.last_name,
            identity_id_str,
          ],
        )?;
        if let Some(hash) = update.password_hash {
          tx.execute(
            "UPDATE identities SET password_hash = ?1 WHERE identity_id = ?2",
            rusqlite::params![hash, identity_id_str],
          )?;
        }
        tx.execute(
          "UPDATE trainees SET date_of_birth = ?1, belt_id = ?2, \
           contact_number = ?3, address = ?4, emergency_contact = ?5, \
           emergency_phone = ?6, is_active = ?7 WHERE trainee_id = ?8",
          rusqlite::params![
            dob_str,
            belt_id_str,
            update.contact_number,
            update.address,
            update.emergency_contact,
            update.emergency_phone,
            update.is_active,
            trainee_id_str,
          ],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(db_err)?;

    self
      .get_trainee(trainee_id)
      .await?
      .ok_or(Error::TraineeNotFound(trainee_id))
  }

  async fn get_trainee(
    &self,
    trainee_id: Uuid,
  ) -> Result<Option<TraineeProfile>> {
    self
      .profile_query_one(
        "t.trainee_id = ?1",
        vec![text(encode_uuid(trainee_id))],
      )
      .await
  }

  async fn trainee_by_identity(
    &self,
    identity_id: Uuid,
  ) -> Result<Option<TraineeProfile>> {
    self
      .profile_query_one(
        "t.identity_id = ?1",
        vec![text(encode_uuid(identity_id))],
      )
      .await
  }

  async fn list_trainees(
    &self,
    search: Option<&str>,
  ) -> Result<Vec<TraineeProfile>> {
    match search.map(str::trim).filter(|s| !s.is_empty()) {
      None => {
        let sql = format!(
          "SELECT {PROFILE_COLS} {PROFILE_FROM} \
           WHERE t.is_active = 1 ORDER BY t.join_date DESC"
        );
        self.profiles_query(sql, vec![]).await
      }
      Some(q) => {
        let sql = format!(
          "SELECT {PROFILE_COLS} {PROFILE_FROM} \
           WHERE t.is_active = 1 AND (
             i.first_name LIKE ?1 OR i.last_name LIKE ?1 OR
             i.username LIKE ?1 OR i.email LIKE ?1 OR
             b.name LIKE ?1 OR t.contact_number LIKE ?1
           ) ORDER BY t.join_date DESC"
        );
        self.profiles_query(sql, vec![text(format!("%{q}%"))]).await
      }
    }
  }

  async fn pending_trainees(&self) -> Result<Vec<TraineeProfile>> {
    let sql = format!(
      "SELECT {PROFILE_COLS} {PROFILE_FROM} \
       WHERE t.is_approved = 0 ORDER BY t.join_date DESC"
    );
    self.profiles_query(sql, vec![]).await
  }

  async fn trainee_dashboard(
    &self,
    trainee_id: Uuid,
    now: DateTime<Utc>,
  ) -> Result<Option<TraineeDashboard>> {
    let Some(profile) = self.get_trainee(trainee_id).await? else {
      return Ok(None);
    };

    let all_matches = self.matches_for_trainee(trainee_id).await?;
    let (past, future): (Vec<Match>, Vec<Match>) = all_matches
      .into_iter()
      .partition(|m| m.match_time < now);

    let completed = past.len() as u32;
    let wins = past
      .iter()
      .filter(|m| m.winner_id == Some(trainee_id))
      .count() as u32;

    // `past` arrives newest-first; `future` needs soonest-first.
    let mut upcoming: Vec<Match> = future;
    upcoming.sort_by_key(|m| m.match_time);
    upcoming.truncate(5);
    let recent: Vec<Match> = past.into_iter().take(5).collect();

    let payments = self.payments_for_trainee(trainee_id).await?;
    let pending_payments_count =
      payments.iter().filter(|p| !p.paid).count() as u32;
    let outstanding_balance = self.outstanding_balance(trainee_id).await?;
    let recent_payments: Vec<Payment> =
      payments.into_iter().take(5).collect();

    Ok(Some(TraineeDashboard {
      profile,
      completed_matches: completed,
      wins,
      losses: completed - wins,
      win_rate: win_rate(wins, completed),
      upcoming_matches: upcoming,
      recent_matches: recent,
      recent_payments,
      pending_payments_count,
      outstanding_balance,
    }))
  }

  // ── Events ────────────────────────────────────────────────────────────

  async fn add_event(&self, input: NewEvent) -> Result<Event> {
    input.validate()?;

    let event = Event {
      event_id:              Uuid::new_v4(),
      name:                  input.name,
      description:           input.description,
      start_at:              input.start_at,
      end_at:                input.end_at,
      location:              input.location,
      kind:                  input.kind,
      max_participants:      input.max_participants,
      registration_deadline: input.registration_deadline,
      is_published:          input.is_published,
    };

    self
      .execute(
        format!(
          "INSERT INTO events ({EVENT_COLS}) \
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        ),
        vec![
          text(encode_uuid(event.event_id)),
          text(event.name.clone()),
          text(event.description.clone()),
          text(encode_dt(event.start_at)),
          text(encode_dt(event.end_at)),
          text(event.location.clone()),
          text(event.kind.discriminant()),
          event
            .max_participants
            .map_or(Value::Null, |n| Value::from(i64::from(n))),
          opt_text(event.registration_deadline.map(encode_dt)),
          Value::from(event.is_published),
        ],
      )
      .await?;

    Ok(event)
  }

  async fn update_event(
    &self,
    event_id: Uuid,
    input: NewEvent,
  ) -> Result<Event> {
    input.validate()?;
    if self.get_event(event_id).await?.is_none() {
      return Err(Error::EventNotFound(event_id));
    }

    self
      .execute(
        "UPDATE events SET name = ?1, description = ?2, start_at = ?3, \
         end_at = ?4, location = ?5, kind = ?6, max_participants = ?7, \
         registration_deadline = ?8, is_published = ?9 \
         WHERE event_id = ?10"
          .into(),
        vec![
          text(input.name.clone()),
          text(input.description.clone()),
          text(encode_dt(input.start_at)),
          text(encode_dt(input.end_at)),
          text(input.location.clone()),
          text(input.kind.discriminant()),
          input
            .max_participants
            .map_or(Value::Null, |n| Value::from(i64::from(n))),
          opt_text(input.registration_deadline.map(encode_dt)),
          Value::from(input.is_published),
          text(encode_uuid(event_id)),
        ],
      )
      .await?;

    self
      .get_event(event_id)
      .await?
      .ok_or(Error::EventNotFound(event_id))
  }

  async fn delete_event(&self, event_id: Uuid) -> Result<()> {
    let affected = self
      .execute(
        "DELETE FROM events WHERE event_id = ?1".into(),
        vec![text(encode_uuid(event_id))],
      )
      .await?;
    if affected == 0 {
      return Err(Error::EventNotFound(event_id));
    }
    Ok(())
  }

  async fn list_events(&self) -> Result<Vec<Event>> {
    self
      .events_query(
        format!("SELECT {EVENT_COLS} FROM events ORDER BY start_at ASC"),
        vec![],
      )
      .await
  }

  async fn events_in_month(&self, year: i32, month: u32) -> Result<Vec<Event>> {
    let prefix = format!("{year:04}-{month:02}%");
    self
      .events_query(
        format!(
          "SELECT {EVENT_COLS} FROM events \
           WHERE start_at LIKE ?1 ORDER BY start_at ASC"
        ),
        vec![text(prefix)],
      )
      .await
  }

  async fn event_detail(&self, event_id: Uuid) -> Result<Option<EventDetail>> {
    let Some(event) = self.get_event(event_id).await? else {
      return Ok(None);
    };

    let matches = self
      .matches_query(
        format!(
          "SELECT {MATCH_COLS} FROM matches \
           WHERE event_id = ?1 ORDER BY match_time ASC"
        ),
        vec![text(encode_uuid(event_id))],
      )
      .await?;

    let mut participant_ids: Vec<Uuid> = matches
      .iter()
      .flat_map(|m| [m.trainee1_id, m.trainee2_id])
      .collect();
    participant_ids.sort_unstable();
    participant_ids.dedup();

    let mut participants = Vec::with_capacity(participant_ids.len());
    for id in participant_ids {
      if let Some(profile) = self.get_trainee(id).await? {
        participants.push(profile);
      }
    }

    Ok(Some(EventDetail { event, matches, participants }))
  }

  // ── Match state machine ───────────────────────────────────────────────

  async fn schedule_match(&self, input: NewMatch) -> Result<Match> {
    if input.trainee1_id == input.trainee2_id {
      return Err(Error::SelfMatch);
    }
    if self.get_event(input.event_id).await?.is_none() {
      return Err(Error::EventNotFound(input.event_id));
    }
    for trainee_id in [input.trainee1_id, input.trainee2_id] {
      if self.get_trainee(trainee_id).await?.is_none() {
        return Err(Error::TraineeNotFound(trainee_id));
      }
    }
    if let Some(judge_id) = input.judge_id {
      let judge = self
        .get_identity(judge_id)
        .await?
        .ok_or(Error::IdentityNotFound(judge_id))?;
      if judge.role != Role::Judge {
        return Err(Error::JudgeRoleRequired(judge_id));
      }
    }

    let m = Match {
      match_id:    Uuid::new_v4(),
      event_id:    input.event_id,
      trainee1_id: input.trainee1_id,
      trainee2_id: input.trainee2_id,
      winner_id:   None,
      score1:      0,
      score2:      0,
      judge_id:    input.judge_id,
      match_time:  input.match_time,
    };

    self
      .execute(
        format!(
          "INSERT INTO matches ({MATCH_COLS}) \
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        ),
        vec![
          text(encode_uuid(m.match_id)),
          text(encode_uuid(m.event_id)),
          text(encode_uuid(m.trainee1_id)),
          text(encode_uuid(m.trainee2_id)),
          Value::Null,
          Value::from(0_i64),
          Value::from(0_i64),
          opt_text(m.judge_id.map(encode_uuid)),
          text(encode_dt(m.match_time)),
        ],
      )
      .await?;

    Ok(m)
  }

  async fn get_match(&self, match_id: Uuid) -> Result<Option<Match>> {
    Ok(
      self
        .matches_query(
          format!(
            "SELECT {MATCH_COLS} FROM matches WHERE match_id = ?1 LIMIT 1"
          ),
          vec![text(encode_uuid(match_id))],
        )
        .await?
        .into_iter()
        .next(),
    )
  }

  async fn update_score(
    &self,
    match_id: Uuid,
    judge_id: Uuid,
    side: MatchSide,
    action: ScoreAction,
  ) -> Result<Match> {
    let m = self
      .get_match(match_id)
      .await?
      .ok_or(Error::MatchNotFound(match_id))?;
    if m.is_completed() {
      return Err(Error::MatchAlreadyCompleted(match_id));
    }
    if m.judge_id != Some(judge_id) {
      return Err(Error::NotAssignedJudge { match_id, judge: judge_id });
    }

    let (score1, score2) = match (side, action) {
      (MatchSide::Trainee1, ScoreAction::Increment) => {
        (m.score1 + 1, m.score2)
      }
      (MatchSide::Trainee1, ScoreAction::Decrement) => {
        (m.score1.saturating_sub(1), m.score2)
      }
      (MatchSide::Trainee2, ScoreAction::Increment) => {
        (m.score1, m.score2 + 1)
      }
      (MatchSide::Trainee2, ScoreAction::Decrement) => {
        (m.score1, m.score2.saturating_sub(1))
      }
    };

    // A decrement at zero changes nothing; skip the write entirely.
    if (score1, score2) == (m.score1, m.score2) {
      return Ok(m);
    }

    self
      .execute(
        "UPDATE matches SET score1 = ?1, score2 = ?2 WHERE match_id = ?3"
          .into(),
        vec![
          Value::from(i64::from(score1)),
          Value::from(i64::from(score2)),
          text(encode_uuid(match_id)),
        ],
      )
      .await?;

    Ok(Match { score1, score2, ..m })
  }

  async fn complete_match(
    &self,
    match_id: Uuid,
    judge_id: Uuid,
    winner_id: Uuid,
  ) -> Result<Match> {
    let m = self
      .get_match(match_id)
      .await?
      .ok_or(Error::MatchNotFound(match_id))?;
    if m.is_completed() {
      return Err(Error::MatchAlreadyCompleted(match_id));
    }
    if m.judge_id != Some(judge_id) {
      return Err(Error::NotAssignedJudge { match_id, judge: judge_id });
    }
    if !m.is_participant(winner_id) {
      return Err(Error::WinnerNotParticipant(winner_id));
    }

    let loser_id = if winner_id == m.trainee1_id {
      m.trainee2_id
    } else {
      m.trainee1_id
    };
    let winner = self
      .get_trainee(winner_id)
      .await?
      .ok_or(Error::TraineeNotFound(winner_id))?;
    let loser = self
      .get_trainee(loser_id)
      .await?
      .ok_or(Error::TraineeNotFound(loser_id))?;
    let event = self
      .get_event(m.event_id)
      .await?
      .ok_or(Error::EventNotFound(m.event_id))?;

    let winner_note = build_notification(
      winner.identity.identity_id,
      "Match Victory!",
      format!(
        "Congratulations! You won your match against {} at {}.",
        loser.identity.display_name(),
        event.name
      ),
      NotificationKind::Match,
      Some("/trainee/matches/"),
    );
    let loser_note = build_notification(
      loser.identity.identity_id,
      "Match Result",
      format!(
        "Your match against {} at {} has been completed.",
        winner.identity.display_name(),
        event.name
      ),
      NotificationKind::Match,
      Some("/trainee/matches/"),
    );

    let match_id_str = encode_uuid(match_id);
    let winner_id_str = encode_uuid(winner_id);
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "UPDATE matches SET winner_id = ?1 WHERE match_id = ?2",
          rusqlite::params![winner_id_str, match_id_str],
        )?;
        insert_notification_row(&tx, &winner_note)?;
        insert_notification_row(&tx, &loser_note)?;
        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(db_err)?;

    Ok(Match { winner_id: Some(winner_id), ..m })
  }

  async fn judge_upcoming(
    &self,
    judge_id: Uuid,
    now: DateTime<Utc>,
  ) -> Result<Vec<JudgedMatch>> {
    let matches = self
      .matches_query(
        format!(
          "SELECT {MATCH_COLS} FROM matches \
           WHERE judge_id = ?1 AND match_time >= ?2 \
           ORDER BY match_time ASC"
        ),
        vec![text(encode_uuid(judge_id)), text(encode_dt(now))],
      )
      .await?;
    Ok(matches.into_iter().map(|m| JudgedMatch::at(m, now)).collect())
  }

  async fn judge_recent(
    &self,
    judge_id: Uuid,
    now: DateTime<Utc>,
  ) -> Result<Vec<Match>> {
    self
      .matches_query(
        format!(
          "SELECT {MATCH_COLS} FROM matches \
           WHERE judge_id = ?1 AND match_time < ?2 \
           ORDER BY match_time DESC LIMIT 10"
        ),
        vec![text(encode_uuid(judge_id)), text(encode_dt(now))],
      )
      .await
  }

  async fn matches_for_trainee(&self, trainee_id: Uuid) -> Result<Vec<Match>> {
    self
      .matches_query(
        format!(
          "SELECT {MATCH_COLS} FROM matches \
           WHERE trainee1_id = ?1 OR trainee2_id = ?1 \
           ORDER BY match_time DESC"
        ),
        vec![text(encode_uuid(trainee_id))],
      )
      .await
  }

  // ── Promotion engine ──────────────────────────────────────────────────

  async fn eligibility(
    &self,
    trainee_id: Uuid,
    today: NaiveDate,
  ) -> Result<Eligibility> {
    let profile = self
      .get_trainee(trainee_id)
      .await?
      .ok_or(Error::TraineeNotFound(trainee_id))?;

    let id_str = encode_uuid(trainee_id);
    let last_promotion = self
      .optional_string(
        "SELECT awarded_on FROM promotions WHERE trainee_id = ?1 \
         ORDER BY awarded_on DESC LIMIT 1"
          .into(),
        vec![text(id_str.clone())],
      )
      .await?
      .as_deref()
      .map(decode_date)
      .transpose()?;

    let decided = self
      .count(
        "SELECT COUNT(*) FROM matches \
         WHERE (trainee1_id = ?1 OR trainee2_id = ?1) \
           AND winner_id IS NOT NULL"
          .into(),
        vec![text(id_str.clone())],
      )
      .await?;
    let wins = self
      .count(
        "SELECT COUNT(*) FROM matches WHERE winner_id = ?1".into(),
        vec![text(id_str)],
      )
      .await?;

    let next_belt = self
      .next_belt_after(profile.belt.as_ref().map(|b| b.order))
      .await?;

    Ok(Eligibility::compute(
      profile.trainee.join_date,
      last_promotion,
      decided,
      wins,
      today,
      next_belt,
    ))
  }

  async fn promotion_roster(
    &self,
    today: NaiveDate,
  ) -> Result<Vec<PromotionCandidate>> {
    let profiles = self.list_trainees(None).await?;
    let mut roster = Vec::with_capacity(profiles.len());
    for profile in profiles {
      let eligibility =
        self.eligibility(profile.trainee.trainee_id, today).await?;
      roster.push(PromotionCandidate { profile, eligibility });
    }
    Ok(roster)
  }

  async fn promote(
    &self,
    trainee_id: Uuid,
    new_belt_id: Uuid,
  ) -> Result<Promotion> {
    let profile = self
      .get_trainee(trainee_id)
      .await?
      .ok_or(Error::TraineeNotFound(trainee_id))?;

    let belts = self.list_belts().await?;
    let target = belts
      .iter()
      .find(|b| b.belt_id == new_belt_id)
      .ok_or(Error::BeltNotFound(new_belt_id))?;

    // Never trust the caller's pre-filtered candidate list.
    if let Some(current) = &profile.belt
      && target.order <= current.order
    {
      return Err(Error::BeltNotHigher {
        target:  target.order,
        current: current.order,
      });
    }

    let promotion = Promotion {
      promotion_id: Uuid::new_v4(),
      trainee_id,
      belt_from: profile.trainee.belt_id,
      belt_to: Some(new_belt_id),
      awarded_on: Utc::now().date_naive(),
    };

    let note = build_notification(
      profile.identity.identity_id,
      "Belt Promotion!",
      format!("Congratulations! You have been promoted to {}.", target.name),
      NotificationKind::Promotion,
      Some("/trainee/profile/"),
    );

    let promotion_id_str = encode_uuid(promotion.promotion_id);
    let trainee_id_str = encode_uuid(trainee_id);
    let belt_from_str = promotion.belt_from.map(encode_uuid);
    let belt_to_str = encode_uuid(new_belt_id);
    let awarded_on_str = encode_date(promotion.awarded_on);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO promotions (
             promotion_id, trainee_id, belt_from, belt_to, awarded_on
           ) VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            promotion_id_str,
            trainee_id_str,
            belt_from_str,
            belt_to_str,
            awarded_on_str,
          ],
        )?;
        tx.execute(
          "UPDATE trainees SET belt_id = ?1 WHERE trainee_id = ?2",
          rusqlite::params![belt_to_str, trainee_id_str],
        )?;
        insert_notification_row(&tx, &note)?;
        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(db_err)?;

    Ok(promotion)
  }

  async fn promotion_history(&self) -> Result<Vec<Promotion>> {
    let sql = format!(
      "SELECT {PROMOTION_COLS} FROM promotions ORDER BY awarded_on DESC"
    );
    let raws: Vec<RawPromotion> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], promotion_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;
    raws.into_iter().map(RawPromotion::into_promotion).collect()
  }

  // ── Payment ledger ────────────────────────────────────────────────────

  async fn create_payment(&self, input: NewPayment) -> Result<Payment> {
    if input.amount <= Decimal::ZERO {
      return Err(Error::NonPositiveAmount(input.amount));
    }
    let profile = self
      .get_trainee(input.trainee_id)
      .await?
      .ok_or(Error::TraineeNotFound(input.trainee_id))?;

    let payment = Payment {
      payment_id:  Uuid::new_v4(),
      trainee_id:  input.trainee_id,
      amount:      input.amount,
      due_date:    input.due_date,
      description: input.description,
      paid:        false,
    };

    let note = build_notification(
      profile.identity.identity_id,
      "New Payment Due",
      format!(
        "A new payment of ${} for {} is due on {}.",
        payment.amount, payment.description, payment.due_date
      ),
      NotificationKind::Payment,
      Some("/trainee/payments/"),
    );

    let payment_id_str = encode_uuid(payment.payment_id);
    let trainee_id_str = encode_uuid(payment.trainee_id);
    let amount_str = encode_amount(payment.amount);
    let due_date_str = encode_date(payment.due_date);
    let description = payment.description.clone();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO payments (
             payment_id, trainee_id, amount, due_date, description, paid
           ) VALUES (?1, ?2, ?3, ?4, ?5, 0)",
          rusqlite::params![
            payment_id_str,
            trainee_id_str,
            amount_str,
            due_date_str,
            description,
          ],
        )?;
        insert_notification_row(&tx, &note)?;
        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(db_err)?;

    Ok(payment)
  }

  async fn mark_paid(&self, payment_id: Uuid) -> Result<Payment> {
    let payment = self
      .payments_query(
        format!(
          "SELECT {PAYMENT_COLS} FROM payments WHERE payment_id = ?1 LIMIT 1"
        ),
        vec![text(encode_uuid(payment_id))],
      )
      .await?
      .into_iter()
      .next()
      .ok_or(Error::PaymentNotFound(payment_id))?;

    let profile = self
      .get_trainee(payment.trainee_id)
      .await?
      .ok_or(Error::TraineeNotFound(payment.trainee_id))?;

    // Emission is deliberately unguarded: calling mark_paid on an already
    // settled payment re-notifies the trainee (at-least-once semantics).
    let note = build_notification(
      profile.identity.identity_id,
      "Payment Received",
      format!(
        "Your payment of ${} for {} has been received.",
        payment.amount, payment.description
      ),
      NotificationKind::Payment,
      Some("/trainee/payments/"),
    );

    let payment_id_str = encode_uuid(payment_id);
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "UPDATE payments SET paid = 1 WHERE payment_id = ?1",
          rusqlite::params![payment_id_str],
        )?;
        insert_notification_row(&tx, &note)?;
        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(db_err)?;

    Ok(Payment { paid: true, ..payment })
  }

  async fn list_payments(
    &self,
    filter: PaymentStatusFilter,
    today: NaiveDate,
  ) -> Result<PaymentLedger> {
    let (clause, binds): (&str, Binds) = match filter {
      PaymentStatusFilter::All => ("", vec![]),
      PaymentStatusFilter::Pending => ("WHERE paid = 0", vec![]),
      PaymentStatusFilter::Paid => ("WHERE paid = 1", vec![]),
      PaymentStatusFilter::Overdue => (
        "WHERE paid = 0 AND due_date < ?1",
        vec![text(encode_date(today))],
      ),
    };
    let sql = format!(
      "SELECT {PAYMENT_COLS} FROM payments {clause} ORDER BY due_date DESC"
    );

    let payments = self.payments_query(sql, binds).await?;
    let rows = payments
      .into_iter()
      .map(|payment| PaymentRow {
        is_overdue: payment.is_overdue(today),
        payment,
      })
      .collect();

    let totals = self.payment_report(today).await?;
    Ok(PaymentLedger { rows, totals })
  }

  async fn payment_report(&self, today: NaiveDate) -> Result<PaymentTotals> {
    let collected = self
      .sum_amounts("SELECT amount FROM payments WHERE paid = 1".into(), vec![])
      .await?;
    let pending = self
      .sum_amounts("SELECT amount FROM payments WHERE paid = 0".into(), vec![])
      .await?;
    let overdue = self
      .sum_amounts(
        "SELECT amount FROM payments WHERE paid = 0 AND due_date < ?1".into(),
        vec![text(encode_date(today))],
      )
      .await?;
    Ok(PaymentTotals { collected, pending, overdue })
  }

  async fn payments_for_trainee(
    &self,
    trainee_id: Uuid,
  ) -> Result<Vec<Payment>> {
    self
      .payments_query(
        format!(
          "SELECT {PAYMENT_COLS} FROM payments \
           WHERE trainee_id = ?1 ORDER BY due_date DESC"
        ),
        vec![text(encode_uuid(trainee_id))],
      )
      .await
  }

  async fn outstanding_balance(&self, trainee_id: Uuid) -> Result<Decimal> {
    self
      .sum_amounts(
        "SELECT amount FROM payments WHERE trainee_id = ?1 AND paid = 0"
          .into(),
        vec![text(encode_uuid(trainee_id))],
      )
      .await
  }

  // ── Notification outbox ───────────────────────────────────────────────

  async fn emit_notification(
    &self,
    input: NewNotification,
  ) -> Result<Notification> {
    let note = build_notification(
      input.recipient_id,
      &input.title,
      input.message,
      input.kind,
      input.link.as_deref(),
    );
    let stored = note.clone();
    self
      .conn
      .call(move |conn| {
        insert_notification_row(conn, &stored)?;
        Ok(())
      })
      .await
      .map_err(db_err)?;
    Ok(note)
  }

  async fn list_notifications(
    &self,
    recipient_id: Uuid,
    limit: usize,
  ) -> Result<NotificationFeed> {
    let sql = format!(
      "SELECT {NOTIFICATION_COLS} FROM notifications \
       WHERE recipient_id = ?1 ORDER BY created_at DESC LIMIT ?2"
    );
    let binds =
      vec![text(encode_uuid(recipient_id)), Value::from(limit as i64)];

    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(binds), notification_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;

    let items = raws
      .into_iter()
      .map(RawNotification::into_notification)
      .collect::<Result<Vec<_>>>()?;
    let unread = self.unread_count(recipient_id).await?;

    Ok(NotificationFeed { items, unread })
  }

  async fn mark_read(
    &self,
    notification_id: Uuid,
    recipient_id: Uuid,
  ) -> Result<u32> {
    let owner = self
      .optional_string(
        "SELECT recipient_id FROM notifications WHERE notification_id = ?1"
          .into(),
        vec![text(encode_uuid(notification_id))],
      )
      .await?
      .ok_or(Error::NotificationNotFound(notification_id))?;

    if owner != encode_uuid(recipient_id) {
      return Err(Error::NotificationNotOwned(notification_id));
    }

    self
      .execute(
        "UPDATE notifications SET is_read = 1 WHERE notification_id = ?1"
          .into(),
        vec![text(encode_uuid(notification_id))],
      )
      .await?;

    self.unread_count(recipient_id).await
  }

  async fn mark_all_read(&self, recipient_id: Uuid) -> Result<u32> {
    self
      .execute(
        "UPDATE notifications SET is_read = 1 \
         WHERE recipient_id = ?1 AND is_read = 0"
          .into(),
        vec![text(encode_uuid(recipient_id))],
      )
      .await?;
    self.unread_count(recipient_id).await
  }

  // ── Dashboard aggregator ──────────────────────────────────────────────

  async fn recompute_dashboard(
    &self,
    now: DateTime<Utc>,
  ) -> Result<DashboardSnapshot> {
    let total_trainees = self
      .count(
        "SELECT COUNT(*) FROM trainees WHERE is_active = 1".into(),
        vec![],
      )
      .await?;

    let upcoming_events = self
      .count(
        "SELECT COUNT(*) FROM events \
         WHERE is_published = 1 AND end_at >= ?1"
          .into(),
        vec![text(encode_dt(now))],
      )
      .await?;

    let pending_payments = self
      .count("SELECT COUNT(*) FROM payments WHERE paid = 0".into(), vec![])
      .await?;
    let pending_payments_amount = self
      .sum_amounts("SELECT amount FROM payments WHERE paid = 0".into(), vec![])
      .await?;

    let cutoff = (now - Duration::days(30)).date_naive();
    let recent_promotions = self
      .count(
        "SELECT COUNT(*) FROM promotions WHERE awarded_on >= ?1".into(),
        vec![text(encode_date(cutoff))],
      )
      .await?;

    let snapshot = DashboardSnapshot {
      total_trainees,
      upcoming_events,
      pending_payments,
      pending_payments_amount,
      recent_promotions,
    };

    let value_json = snapshot.to_json()?.to_string();
    self
      .execute(
        "INSERT INTO dashboard_stats (stat_type, value_json, updated_at) \
         VALUES (?1, ?2, ?3) \
         ON CONFLICT(stat_type) DO UPDATE SET \
           value_json = excluded.value_json, \
           updated_at = excluded.updated_at"
          .into(),
        vec![
          text(ADMIN_DASHBOARD_STAT),
          text(value_json),
          text(encode_dt(now)),
        ],
      )
      .await?;

    Ok(snapshot)
  }

  async fn cached_dashboard(&self) -> Result<Option<CachedDashboard>> {
    let row: Option<(String, String)> = self
      .conn
      .call(|conn| {
        Ok(
          conn
            .query_row(
              "SELECT value_json, updated_at FROM dashboard_stats \
               WHERE stat_type = ?1",
              rusqlite::params![ADMIN_DASHBOARD_STAT],
              |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?,
        )
      })
      .await
      .map_err(db_err)?;

    let Some((value_json, updated_at)) = row else {
      return Ok(None);
    };

    let value: serde_json::Value = serde_json::from_str(&value_json)?;
    Ok(Some(CachedDashboard {
      stat_type:  ADMIN_DASHBOARD_STAT.to_owned(),
      value:      DashboardSnapshot::from_json(value)?,
      updated_at: decode_dt(&updated_at)?,
    }))
  }

  // ── Reports ───────────────────────────────────────────────────────────

  async fn trainee_growth(&self, today: NaiveDate) -> Result<Vec<GrowthPoint>> {
    let mut points = Vec::with_capacity(6);
    for tick in (0..6_i64).rev() {
      let sample = today - Duration::days(tick * 30);
      let count = self
        .count(
          "SELECT COUNT(*) FROM trainees WHERE join_date <= ?1".into(),
          vec![text(encode_date(sample))],
        )
        .await?;
      points.push(GrowthPoint {
        label: sample.format("%B").to_string(),
        count,
      });
    }
    Ok(points)
  }

  async fn belt_distribution(&self) -> Result<Vec<BeltCount>> {
    let rows: Vec<(String, u32, i64)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT b.name, b.rank, COUNT(t.trainee_id) \
           FROM belts b \
           LEFT JOIN trainees t ON t.belt_id = b.belt_id \
           GROUP BY b.belt_id ORDER BY b.rank ASC",
        )?;
        let rows = stmt
          .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;

    Ok(
      rows
        .into_iter()
        .map(|(belt_name, order, count)| BeltCount {
          belt_name,
          order,
          count: count as u32,
        })
        .collect(),
    )
  }

  async fn payment_status_counts(&self) -> Result<PaymentStatusCounts> {
    let paid = self
      .count("SELECT COUNT(*) FROM payments WHERE paid = 1".into(), vec![])
      .await?;
    let pending = self
      .count("SELECT COUNT(*) FROM payments WHERE paid = 0".into(), vec![])
      .await?;
    Ok(PaymentStatusCounts { paid, pending })
  }
}
