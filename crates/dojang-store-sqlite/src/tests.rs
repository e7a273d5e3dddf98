//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use dojang_core::{
  Error,
  belt::{Belt, NewBelt},
  event::{Event, EventKind, NewEvent},
  matches::{Match, MatchSide, NewMatch, ScoreAction},
  notification::{NewNotification, NotificationKind},
  payment::{NewPayment, PaymentStatusFilter},
  role::{Identity, NewIdentity, Role},
  store::ClubStore,
  trainee::{NewRegistration, TraineeProfile},
};
use rusqlite::types::Value;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn amount(cents: i64) -> Decimal {
  Decimal::new(cents, 2)
}

async fn seed_ladder(s: &SqliteStore) -> (Belt, Belt, Belt) {
  let white = s
    .add_belt(NewBelt { name: "White".into(), color: "#ffffff".into(), order: 1 })
    .await
    .unwrap();
  let yellow = s
    .add_belt(NewBelt { name: "Yellow".into(), color: "#facc15".into(), order: 2 })
    .await
    .unwrap();
  let green = s
    .add_belt(NewBelt { name: "Green".into(), color: "#22c55e".into(), order: 3 })
    .await
    .unwrap();
  (white, yellow, green)
}

fn registration(username: &str) -> NewRegistration {
  NewRegistration {
    username:       username.into(),
    email:          format!("{username}@example.com"),
    password_hash:  "$argon2id$v=19$test".into(),
    first_name:     "Jin".into(),
    last_name:      username.to_uppercase(),
    date_of_birth:  "2000-05-17".parse().unwrap(),
    contact_number: "+1 555 0134".into(),
    address:        "12 Dojang Way".into(),
  }
}

/// Register and approve in one go — most tests want an active member.
async fn active_trainee(s: &SqliteStore, username: &str) -> TraineeProfile {
  let profile = s.register_trainee(registration(username)).await.unwrap();
  s.approve_trainee(profile.trainee.trainee_id).await.unwrap()
}

async fn add_judge(s: &SqliteStore, username: &str) -> Identity {
  s.add_identity(NewIdentity {
    username:      username.into(),
    email:         format!("{username}@example.com"),
    password_hash: "$argon2id$v=19$test".into(),
    first_name:    "Ha".into(),
    last_name:     "Yun".into(),
    role:          Role::Judge,
  })
  .await
  .unwrap()
}

async fn add_tournament(s: &SqliteStore) -> Event {
  let now = Utc::now();
  s.add_event(NewEvent {
    name:                  "Spring Open".into(),
    description:           "Annual sparring tournament".into(),
    start_at:              now + Duration::days(1),
    end_at:                now + Duration::days(2),
    location:              "Main hall".into(),
    kind:                  EventKind::Tournament,
    max_participants:      Some(32),
    registration_deadline: None,
    is_published:          true,
  })
  .await
  .unwrap()
}

async fn schedule(
  s: &SqliteStore,
  event: &Event,
  t1: &TraineeProfile,
  t2: &TraineeProfile,
  judge: &Identity,
) -> Match {
  s.schedule_match(NewMatch {
    event_id:    event.event_id,
    trainee1_id: t1.trainee.trainee_id,
    trainee2_id: t2.trainee.trainee_id,
    judge_id:    Some(judge.identity_id),
    match_time:  Utc::now() - Duration::hours(1),
  })
  .await
  .unwrap()
}

/// Rewrite a trainee's server-assigned join date for tenure scenarios.
async fn backdate_join(s: &SqliteStore, trainee_id: Uuid, days: i64) {
  let date = (Utc::now().date_naive() - Duration::days(days))
    .format("%Y-%m-%d")
    .to_string();
  s.execute(
    "UPDATE trainees SET join_date = ?1 WHERE trainee_id = ?2".into(),
    vec![
      Value::Text(date),
      Value::Text(trainee_id.hyphenated().to_string()),
    ],
  )
  .await
  .unwrap();
}

// ─── Registration and approval ───────────────────────────────────────────────

#[tokio::test]
async fn register_starts_unapproved_on_the_lowest_belt() {
  let s = store().await;
  let (white, _, _) = seed_ladder(&s).await;

  let profile = s.register_trainee(registration("jlee")).await.unwrap();
  assert!(!profile.trainee.is_approved);
  assert!(!profile.trainee.is_active);
  assert_eq!(profile.trainee.belt_id, Some(white.belt_id));
  assert_eq!(profile.identity.role, Role::Trainee);
}

#[tokio::test]
async fn register_without_belts_leaves_belt_unset() {
  let s = store().await;
  let profile = s.register_trainee(registration("jlee")).await.unwrap();
  assert_eq!(profile.trainee.belt_id, None);
}

#[tokio::test]
async fn register_rejects_duplicate_username() {
  let s = store().await;
  s.register_trainee(registration("jlee")).await.unwrap();

  let mut dup = registration("jlee");
  dup.email = "other@example.com".into();
  let err = s.register_trainee(dup).await.unwrap_err();
  assert!(matches!(err, Error::UsernameTaken(_)));
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
  let s = store().await;
  s.register_trainee(registration("jlee")).await.unwrap();

  let mut dup = registration("minko");
  dup.email = "jlee@example.com".into();
  let err = s.register_trainee(dup).await.unwrap_err();
  assert!(matches!(err, Error::EmailTaken(_)));
}

#[tokio::test]
async fn register_rejects_bad_phone_before_writing() {
  let s = store().await;
  let mut bad = registration("jlee");
  bad.contact_number = "call me maybe".into();
  assert!(matches!(
    s.register_trainee(bad).await.unwrap_err(),
    Error::InvalidPhoneNumber(_)
  ));
  // No identity was created.
  assert!(s.identity_by_username("jlee").await.unwrap().is_none());
}

#[tokio::test]
async fn approve_activates_and_notifies() {
  let s = store().await;
  let profile = s.register_trainee(registration("jlee")).await.unwrap();

  let approved = s.approve_trainee(profile.trainee.trainee_id).await.unwrap();
  assert!(approved.trainee.is_approved);
  assert!(approved.trainee.is_active);

  let feed = s
    .list_notifications(profile.identity.identity_id, 10)
    .await
    .unwrap();
  assert_eq!(feed.items.len(), 1);
  assert_eq!(feed.items[0].kind, NotificationKind::Event);
  assert_eq!(feed.items[0].title, "Account Approved");
}

#[tokio::test]
async fn approve_missing_trainee_is_not_found() {
  let s = store().await;
  assert!(matches!(
    s.approve_trainee(Uuid::new_v4()).await.unwrap_err(),
    Error::TraineeNotFound(_)
  ));
}

#[tokio::test]
async fn pending_list_only_shows_unapproved() {
  let s = store().await;
  let waiting = s.register_trainee(registration("jlee")).await.unwrap();
  active_trainee(&s, "minko").await;

  let pending = s.pending_trainees().await.unwrap();
  assert_eq!(pending.len(), 1);
  assert_eq!(pending[0].trainee.trainee_id, waiting.trainee.trainee_id);
}

// ─── Deactivation and roster ─────────────────────────────────────────────────

#[tokio::test]
async fn deactivate_is_a_soft_delete() {
  let s = store().await;
  let profile = active_trainee(&s, "jlee").await;
  let id = profile.trainee.trainee_id;

  s.create_payment(NewPayment {
    trainee_id:  id,
    amount:      amount(10_000),
    due_date:    Utc::now().date_naive(),
    description: "Monthly fee".into(),
  })
  .await
  .unwrap();

  let gone = s.deactivate_trainee(id).await.unwrap();
  assert!(!gone.trainee.is_active);

  // Off the active roster, but the row and its history survive.
  assert!(s.list_trainees(None).await.unwrap().is_empty());
  assert!(s.get_trainee(id).await.unwrap().is_some());
  assert_eq!(s.payments_for_trainee(id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn roster_search_matches_name_and_belt() {
  let s = store().await;
  seed_ladder(&s).await;
  active_trainee(&s, "jlee").await;
  active_trainee(&s, "minko").await;

  let hits = s.list_trainees(Some("MINKO")).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].identity.username, "minko");

  // Both members are on the white belt.
  assert_eq!(s.list_trainees(Some("white")).await.unwrap().len(), 2);
  assert!(s.list_trainees(Some("no such")).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_trainee_rejects_taken_username() {
  let s = store().await;
  let a = active_trainee(&s, "jlee").await;
  active_trainee(&s, "minko").await;

  let update = dojang_core::trainee::TraineeUpdate {
    username:          "minko".into(),
    email:             a.identity.email.clone(),
    first_name:        a.identity.first_name.clone(),
    last_name:         a.identity.last_name.clone(),
    password_hash:     None,
    date_of_birth:     a.trainee.date_of_birth,
    belt_id:           a.trainee.belt_id,
    contact_number:    a.trainee.contact_number.clone(),
    address:           a.trainee.address.clone(),
    emergency_contact: None,
    emergency_phone:   None,
    is_active:         true,
  };
  assert!(matches!(
    s.update_trainee(a.trainee.trainee_id, update).await.unwrap_err(),
    Error::UsernameTaken(_)
  ));
}

// ─── Belt ladder ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn ladder_is_ordered_and_orders_are_unique() {
  let s = store().await;
  let (white, yellow, green) = seed_ladder(&s).await;

  let belts = s.list_belts().await.unwrap();
  assert_eq!(
    belts.iter().map(|b| b.order).collect::<Vec<_>>(),
    vec![1, 2, 3]
  );

  let err = s
    .add_belt(NewBelt { name: "Copy".into(), color: "#000".into(), order: 2 })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::BeltOrderTaken(2)));

  assert_eq!(
    s.next_belt_after(None).await.unwrap().unwrap().belt_id,
    white.belt_id
  );
  assert_eq!(
    s.next_belt_after(Some(1)).await.unwrap().unwrap().belt_id,
    yellow.belt_id
  );
  // Top of the ladder.
  assert!(s.next_belt_after(Some(green.order)).await.unwrap().is_none());
}

#[tokio::test]
async fn promotion_candidates_are_strictly_higher() {
  let s = store().await;
  let (_, yellow, green) = seed_ladder(&s).await;
  let profile = active_trainee(&s, "jlee").await;

  let candidates =
    s.promotion_candidates(profile.trainee.trainee_id).await.unwrap();
  assert_eq!(
    candidates.iter().map(|b| b.belt_id).collect::<Vec<_>>(),
    vec![yellow.belt_id, green.belt_id]
  );
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn event_rejects_inverted_dates() {
  let s = store().await;
  let now = Utc::now();
  let err = s
    .add_event(NewEvent {
      name:                  "Backwards".into(),
      description:           String::new(),
      start_at:              now + Duration::days(2),
      end_at:                now + Duration::days(1),
      location:              "Hall".into(),
      kind:                  EventKind::Training,
      max_participants:      None,
      registration_deadline: None,
      is_published:          false,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::EventDatesInverted));
}

#[tokio::test]
async fn event_rejects_late_registration_deadline() {
  let s = store().await;
  let now = Utc::now();
  let err = s
    .add_event(NewEvent {
      name:                  "Late deadline".into(),
      description:           String::new(),
      start_at:              now + Duration::days(1),
      end_at:                now + Duration::days(2),
      location:              "Hall".into(),
      kind:                  EventKind::Seminar,
      max_participants:      None,
      registration_deadline: Some(now + Duration::days(1)),
      is_published:          false,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DeadlineAfterStart));
}

#[tokio::test]
async fn deleting_an_event_takes_its_matches_with_it() {
  let s = store().await;
  seed_ladder(&s).await;
  let event = add_tournament(&s).await;
  let judge = add_judge(&s, "judge1").await;
  let a = active_trainee(&s, "jlee").await;
  let b = active_trainee(&s, "minko").await;
  let m = schedule(&s, &event, &a, &b, &judge).await;

  s.delete_event(event.event_id).await.unwrap();
  assert!(s.get_match(m.match_id).await.unwrap().is_none());
  assert!(matches!(
    s.delete_event(event.event_id).await.unwrap_err(),
    Error::EventNotFound(_)
  ));
}

#[tokio::test]
async fn event_detail_lists_distinct_participants() {
  let s = store().await;
  seed_ladder(&s).await;
  let event = add_tournament(&s).await;
  let judge = add_judge(&s, "judge1").await;
  let a = active_trainee(&s, "jlee").await;
  let b = active_trainee(&s, "minko").await;
  let c = active_trainee(&s, "sora").await;

  schedule(&s, &event, &a, &b, &judge).await;
  schedule(&s, &event, &a, &c, &judge).await;

  let detail = s.event_detail(event.event_id).await.unwrap().unwrap();
  assert_eq!(detail.matches.len(), 2);
  // `a` appears in both matches but only once in the participant list.
  assert_eq!(detail.participants.len(), 3);
}

// ─── Match state machine ─────────────────────────────────────────────────────

#[tokio::test]
async fn schedule_rejects_self_match_and_non_judges() {
  let s = store().await;
  seed_ladder(&s).await;
  let event = add_tournament(&s).await;
  let a = active_trainee(&s, "jlee").await;
  let b = active_trainee(&s, "minko").await;

  let err = s
    .schedule_match(NewMatch {
      event_id:    event.event_id,
      trainee1_id: a.trainee.trainee_id,
      trainee2_id: a.trainee.trainee_id,
      judge_id:    None,
      match_time:  Utc::now(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SelfMatch));

  // A trainee identity cannot be assigned as the judge.
  let err = s
    .schedule_match(NewMatch {
      event_id:    event.event_id,
      trainee1_id: a.trainee.trainee_id,
      trainee2_id: b.trainee.trainee_id,
      judge_id:    Some(a.identity.identity_id),
      match_time:  Utc::now(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::JudgeRoleRequired(_)));
}

#[tokio::test]
async fn only_the_assigned_judge_may_score() {
  let s = store().await;
  seed_ladder(&s).await;
  let event = add_tournament(&s).await;
  let judge = add_judge(&s, "judge1").await;
  let other = add_judge(&s, "judge2").await;
  let a = active_trainee(&s, "jlee").await;
  let b = active_trainee(&s, "minko").await;
  let m = schedule(&s, &event, &a, &b, &judge).await;

  let err = s
    .update_score(
      m.match_id,
      other.identity_id,
      MatchSide::Trainee1,
      ScoreAction::Increment,
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotAssignedJudge { .. }));

  let err = s
    .complete_match(m.match_id, other.identity_id, a.trainee.trainee_id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotAssignedJudge { .. }));
}

#[tokio::test]
async fn scores_never_drop_below_zero() {
  let s = store().await;
  seed_ladder(&s).await;
  let event = add_tournament(&s).await;
  let judge = add_judge(&s, "judge1").await;
  let a = active_trainee(&s, "jlee").await;
  let b = active_trainee(&s, "minko").await;
  let m = schedule(&s, &event, &a, &b, &judge).await;

  let m = s
    .update_score(
      m.match_id,
      judge.identity_id,
      MatchSide::Trainee1,
      ScoreAction::Increment,
    )
    .await
    .unwrap();
  assert_eq!((m.score1, m.score2), (1, 0));

  // Decrement at zero is a silent no-op, not an error.
  let m = s
    .update_score(
      m.match_id,
      judge.identity_id,
      MatchSide::Trainee2,
      ScoreAction::Decrement,
    )
    .await
    .unwrap();
  assert_eq!((m.score1, m.score2), (1, 0));
}

#[tokio::test]
async fn completion_floors_scores_sets_winner_and_notifies_both() {
  let s = store().await;
  seed_ladder(&s).await;
  let event = add_tournament(&s).await;
  let judge = add_judge(&s, "judge1").await;
  let a = active_trainee(&s, "jlee").await;
  let b = active_trainee(&s, "minko").await;
  let m = schedule(&s, &event, &a, &b, &judge).await;

  // Build up score1=3, score2=2.
  for _ in 0..3 {
    s.update_score(
      m.match_id,
      judge.identity_id,
      MatchSide::Trainee1,
      ScoreAction::Increment,
    )
    .await
    .unwrap();
  }
  for _ in 0..2 {
    s.update_score(
      m.match_id,
      judge.identity_id,
      MatchSide::Trainee2,
      ScoreAction::Increment,
    )
    .await
    .unwrap();
  }

  // Three decrements on side two: floors at zero after the second, the
  // third is a no-op.
  let mut latest = None;
  for _ in 0..3 {
    latest = Some(
      s.update_score(
        m.match_id,
        judge.identity_id,
        MatchSide::Trainee2,
        ScoreAction::Decrement,
      )
      .await
      .unwrap(),
    );
  }
  assert_eq!(latest.unwrap().score2, 0);

  let done = s
    .complete_match(m.match_id, judge.identity_id, a.trainee.trainee_id)
    .await
    .unwrap();
  assert_eq!(done.winner_id, Some(a.trainee.trainee_id));

  // Exactly one notification per participant, naming event and opponent.
  let to_winner = s
    .list_notifications(a.identity.identity_id, 50)
    .await
    .unwrap();
  let win_notes: Vec<_> = to_winner
    .items
    .iter()
    .filter(|n| n.kind == NotificationKind::Match)
    .collect();
  assert_eq!(win_notes.len(), 1);
  assert_eq!(win_notes[0].title, "Match Victory!");
  assert!(win_notes[0].message.contains("Spring Open"));
  assert!(win_notes[0].message.contains(&b.identity.display_name()));

  let to_loser = s
    .list_notifications(b.identity.identity_id, 50)
    .await
    .unwrap();
  let loss_notes: Vec<_> = to_loser
    .items
    .iter()
    .filter(|n| n.kind == NotificationKind::Match)
    .collect();
  assert_eq!(loss_notes.len(), 1);
  assert_eq!(loss_notes[0].title, "Match Result");
}

#[tokio::test]
async fn completion_is_terminal() {
  let s = store().await;
  seed_ladder(&s).await;
  let event = add_tournament(&s).await;
  let judge = add_judge(&s, "judge1").await;
  let a = active_trainee(&s, "jlee").await;
  let b = active_trainee(&s, "minko").await;
  let m = schedule(&s, &event, &a, &b, &judge).await;

  s.update_score(
    m.match_id,
    judge.identity_id,
    MatchSide::Trainee1,
    ScoreAction::Increment,
  )
  .await
  .unwrap();
  s.complete_match(m.match_id, judge.identity_id, a.trainee.trainee_id)
    .await
    .unwrap();

  assert!(matches!(
    s.update_score(
      m.match_id,
      judge.identity_id,
      MatchSide::Trainee1,
      ScoreAction::Increment,
    )
    .await
    .unwrap_err(),
    Error::MatchAlreadyCompleted(_)
  ));
  assert!(matches!(
    s.complete_match(m.match_id, judge.identity_id, b.trainee.trainee_id)
      .await
      .unwrap_err(),
    Error::MatchAlreadyCompleted(_)
  ));

  // Scores and winner are exactly as set.
  let frozen = s.get_match(m.match_id).await.unwrap().unwrap();
  assert_eq!(frozen.score1, 1);
  assert_eq!(frozen.score2, 0);
  assert_eq!(frozen.winner_id, Some(a.trainee.trainee_id));
}

#[tokio::test]
async fn winner_must_be_a_participant() {
  let s = store().await;
  seed_ladder(&s).await;
  let event = add_tournament(&s).await;
  let judge = add_judge(&s, "judge1").await;
  let a = active_trainee(&s, "jlee").await;
  let b = active_trainee(&s, "minko").await;
  let outsider = active_trainee(&s, "sora").await;
  let m = schedule(&s, &event, &a, &b, &judge).await;

  let err = s
    .complete_match(
      m.match_id,
      judge.identity_id,
      outsider.trainee.trainee_id,
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::WinnerNotParticipant(_)));
  assert!(s.get_match(m.match_id).await.unwrap().unwrap().winner_id.is_none());
}

#[tokio::test]
async fn judge_lists_split_on_match_time() {
  let s = store().await;
  seed_ladder(&s).await;
  let event = add_tournament(&s).await;
  let judge = add_judge(&s, "judge1").await;
  let a = active_trainee(&s, "jlee").await;
  let b = active_trainee(&s, "minko").await;
  let now = Utc::now();

  let past = s
    .schedule_match(NewMatch {
      event_id:    event.event_id,
      trainee1_id: a.trainee.trainee_id,
      trainee2_id: b.trainee.trainee_id,
      judge_id:    Some(judge.identity_id),
      match_time:  now - Duration::hours(2),
    })
    .await
    .unwrap();
  let soon = s
    .schedule_match(NewMatch {
      event_id:    event.event_id,
      trainee1_id: a.trainee.trainee_id,
      trainee2_id: b.trainee.trainee_id,
      judge_id:    Some(judge.identity_id),
      match_time:  now + Duration::minutes(10),
    })
    .await
    .unwrap();
  let later = s
    .schedule_match(NewMatch {
      event_id:    event.event_id,
      trainee1_id: a.trainee.trainee_id,
      trainee2_id: b.trainee.trainee_id,
      judge_id:    Some(judge.identity_id),
      match_time:  now + Duration::hours(3),
    })
    .await
    .unwrap();

  let upcoming = s.judge_upcoming(judge.identity_id, now).await.unwrap();
  assert_eq!(
    upcoming.iter().map(|j| j.match_row.match_id).collect::<Vec<_>>(),
    vec![soon.match_id, later.match_id]
  );
  assert!(upcoming[0].is_imminent);
  assert!(!upcoming[1].is_imminent);

  let recent = s.judge_recent(judge.identity_id, now).await.unwrap();
  assert_eq!(recent.len(), 1);
  assert_eq!(recent[0].match_id, past.match_id);
}

// ─── Promotion engine ────────────────────────────────────────────────────────

#[tokio::test]
async fn promote_rejects_lateral_and_downward_moves() {
  let s = store().await;
  let (white, yellow, _) = seed_ladder(&s).await;
  let profile = active_trainee(&s, "jlee").await;
  let id = profile.trainee.trainee_id;

  s.promote(id, yellow.belt_id).await.unwrap();

  // Lateral: already on yellow.
  assert!(matches!(
    s.promote(id, yellow.belt_id).await.unwrap_err(),
    Error::BeltNotHigher { .. }
  ));
  // Downward.
  assert!(matches!(
    s.promote(id, white.belt_id).await.unwrap_err(),
    Error::BeltNotHigher { .. }
  ));

  // The belt is unchanged after the failed attempts.
  let after = s.get_trainee(id).await.unwrap().unwrap();
  assert_eq!(after.trainee.belt_id, Some(yellow.belt_id));
  assert_eq!(s.promotion_history().await.unwrap().len(), 1);
}

#[tokio::test]
async fn promotion_updates_belt_records_row_and_notifies() {
  let s = store().await;
  let (white, yellow, _) = seed_ladder(&s).await;
  let profile = active_trainee(&s, "jlee").await;
  let id = profile.trainee.trainee_id;

  let promotion = s.promote(id, yellow.belt_id).await.unwrap();
  assert_eq!(promotion.belt_from, Some(white.belt_id));
  assert_eq!(promotion.belt_to, Some(yellow.belt_id));

  let after = s.get_trainee(id).await.unwrap().unwrap();
  assert_eq!(after.belt.as_ref().map(|b| b.order), Some(yellow.order));

  let feed = s
    .list_notifications(profile.identity.identity_id, 50)
    .await
    .unwrap();
  let promo_notes: Vec<_> = feed
    .items
    .iter()
    .filter(|n| n.kind == NotificationKind::Promotion)
    .collect();
  assert_eq!(promo_notes.len(), 1);
  assert!(promo_notes[0].message.contains("Yellow"));
}

#[tokio::test]
async fn eligibility_uses_time_alone_with_performance_advisory() {
  let s = store().await;
  let (_, yellow, _) = seed_ladder(&s).await;
  let event = add_tournament(&s).await;
  let judge = add_judge(&s, "judge1").await;
  let j = active_trainee(&s, "jlee").await;
  let opponent = active_trainee(&s, "minko").await;
  let id = j.trainee.trainee_id;

  backdate_join(&s, id, 200).await;

  // Six decided matches, three wins: 50% over 6 ≥ 5.
  for round in 0..6 {
    let m = schedule(&s, &event, &j, &opponent, &judge).await;
    let winner = if round < 3 {
      id
    } else {
      opponent.trainee.trainee_id
    };
    s.complete_match(m.match_id, judge.identity_id, winner)
      .await
      .unwrap();
  }

  let today = Utc::now().date_naive();
  let report = s.eligibility(id, today).await.unwrap();
  assert_eq!(report.days_since_last, 200);
  assert!(report.time_eligible);
  assert_eq!(report.decided_matches, 6);
  assert_eq!(report.wins, 3);
  assert!(report.performance_eligible);
  assert!(report.is_eligible);
  assert_eq!(report.next_belt.as_ref().map(|b| b.belt_id), Some(yellow.belt_id));

  // End-to-end: the promotion itself.
  let promotion = s.promote(id, yellow.belt_id).await.unwrap();
  assert_eq!(promotion.belt_to, Some(yellow.belt_id));
  let after = s.get_trainee(id).await.unwrap().unwrap();
  assert_eq!(after.trainee.belt_id, Some(yellow.belt_id));

  // A promotion today resets the tenure clock.
  let report = s.eligibility(id, today).await.unwrap();
  assert_eq!(report.days_since_last, 0);
  assert!(!report.time_eligible);
  assert!(!report.is_eligible);
  // Performance stays advisory and unchanged.
  assert!(report.performance_eligible);
}

#[tokio::test]
async fn roster_reports_every_active_trainee() {
  let s = store().await;
  seed_ladder(&s).await;
  active_trainee(&s, "jlee").await;
  let inactive = active_trainee(&s, "minko").await;
  s.deactivate_trainee(inactive.trainee.trainee_id).await.unwrap();

  let roster = s.promotion_roster(Utc::now().date_naive()).await.unwrap();
  assert_eq!(roster.len(), 1);
  assert_eq!(roster[0].profile.identity.username, "jlee");
  assert!(!roster[0].eligibility.time_eligible);
}

// ─── Payment ledger ──────────────────────────────────────────────────────────

#[tokio::test]
async fn payment_rejects_non_positive_amounts() {
  let s = store().await;
  let profile = active_trainee(&s, "jlee").await;
  for cents in [0, -500] {
    let err = s
      .create_payment(NewPayment {
        trainee_id:  profile.trainee.trainee_id,
        amount:      amount(cents),
        due_date:    Utc::now().date_naive(),
        description: "Bad".into(),
      })
      .await
      .unwrap_err();
    assert!(matches!(err, Error::NonPositiveAmount(_)));
  }
  assert!(
    s.payments_for_trainee(profile.trainee.trainee_id)
      .await
      .unwrap()
      .is_empty()
  );
}

#[tokio::test]
async fn totals_partition_the_ledger() {
  let s = store().await;
  let profile = active_trainee(&s, "jlee").await;
  let id = profile.trainee.trainee_id;
  let today = Utc::now().date_naive();

  let overdue = s
    .create_payment(NewPayment {
      trainee_id:  id,
      amount:      amount(5_000),
      due_date:    today - Duration::days(10),
      description: "Old fee".into(),
    })
    .await
    .unwrap();
  let upcoming = s
    .create_payment(NewPayment {
      trainee_id:  id,
      amount:      amount(7_500),
      due_date:    today + Duration::days(10),
      description: "Next fee".into(),
    })
    .await
    .unwrap();
  let settled = s
    .create_payment(NewPayment {
      trainee_id:  id,
      amount:      amount(10_000),
      due_date:    today,
      description: "Gear".into(),
    })
    .await
    .unwrap();
  s.mark_paid(settled.payment_id).await.unwrap();

  let totals = s.payment_report(today).await.unwrap();
  assert_eq!(totals.collected, amount(10_000));
  assert_eq!(totals.pending, amount(12_500));
  assert_eq!(totals.overdue, amount(5_000));
  // collected + pending covers every payment.
  assert_eq!(totals.collected + totals.pending, amount(22_500));

  let ledger = s
    .list_payments(PaymentStatusFilter::Overdue, today)
    .await
    .unwrap();
  assert_eq!(ledger.rows.len(), 1);
  assert_eq!(ledger.rows[0].payment.payment_id, overdue.payment_id);
  assert!(ledger.rows[0].is_overdue);

  let pending_rows = s
    .list_payments(PaymentStatusFilter::Pending, today)
    .await
    .unwrap();
  assert_eq!(pending_rows.rows.len(), 2);
  let upcoming_row = pending_rows
    .rows
    .iter()
    .find(|r| r.payment.payment_id == upcoming.payment_id)
    .unwrap();
  assert!(!upcoming_row.is_overdue);

  assert_eq!(s.outstanding_balance(id).await.unwrap(), amount(12_500));
}

#[tokio::test]
async fn totals_over_an_empty_ledger_are_zero() {
  let s = store().await;
  let totals = s.payment_report(Utc::now().date_naive()).await.unwrap();
  assert_eq!(totals.collected, Decimal::ZERO);
  assert_eq!(totals.pending, Decimal::ZERO);
  assert_eq!(totals.overdue, Decimal::ZERO);
}

#[tokio::test]
async fn mark_paid_reemits_the_receipt_every_time() {
  let s = store().await;
  let profile = active_trainee(&s, "jlee").await;
  let payment = s
    .create_payment(NewPayment {
      trainee_id:  profile.trainee.trainee_id,
      amount:      amount(5_000),
      due_date:    Utc::now().date_naive(),
      description: "Monthly fee".into(),
    })
    .await
    .unwrap();

  let first = s.mark_paid(payment.payment_id).await.unwrap();
  assert!(first.paid);
  // Settling an already-settled payment keeps paid=true and, matching the
  // reference behavior, notifies again (at-least-once emission).
  let second = s.mark_paid(payment.payment_id).await.unwrap();
  assert!(second.paid);

  let feed = s
    .list_notifications(profile.identity.identity_id, 50)
    .await
    .unwrap();
  let receipts: Vec<_> = feed
    .items
    .iter()
    .filter(|n| n.title == "Payment Received")
    .collect();
  assert_eq!(receipts.len(), 2);
}

// ─── Notification outbox ─────────────────────────────────────────────────────

#[tokio::test]
async fn feed_is_newest_first_with_unread_count() {
  let s = store().await;
  let recipient = add_judge(&s, "judge1").await;

  for n in 1..=3 {
    s.emit_notification(NewNotification {
      recipient_id: recipient.identity_id,
      title:        format!("Update {n}"),
      message:      "hello".into(),
      kind:         NotificationKind::Event,
      link:         None,
    })
    .await
    .unwrap();
  }

  let feed = s.list_notifications(recipient.identity_id, 2).await.unwrap();
  assert_eq!(feed.items.len(), 2);
  assert_eq!(feed.items[0].title, "Update 3");
  assert_eq!(feed.items[1].title, "Update 2");
  assert_eq!(feed.unread, 3);
}

#[tokio::test]
async fn mark_read_enforces_ownership() {
  let s = store().await;
  let owner = add_judge(&s, "judge1").await;
  let intruder = add_judge(&s, "judge2").await;

  let note = s
    .emit_notification(NewNotification {
      recipient_id: owner.identity_id,
      title:        "Private".into(),
      message:      "for the owner".into(),
      kind:         NotificationKind::Event,
      link:         None,
    })
    .await
    .unwrap();

  let err = s
    .mark_read(note.notification_id, intruder.identity_id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotificationNotOwned(_)));

  // The read flag is untouched.
  let feed = s.list_notifications(owner.identity_id, 10).await.unwrap();
  assert!(!feed.items[0].is_read);
  assert_eq!(feed.unread, 1);

  assert!(matches!(
    s.mark_read(Uuid::new_v4(), owner.identity_id).await.unwrap_err(),
    Error::NotificationNotFound(_)
  ));

  // Owner marks it read; doing so twice is idempotent.
  assert_eq!(s.mark_read(note.notification_id, owner.identity_id).await.unwrap(), 0);
  assert_eq!(s.mark_read(note.notification_id, owner.identity_id).await.unwrap(), 0);
}

#[tokio::test]
async fn mark_all_read_clears_the_badge() {
  let s = store().await;
  let recipient = add_judge(&s, "judge1").await;
  for _ in 0..4 {
    s.emit_notification(NewNotification {
      recipient_id: recipient.identity_id,
      title:        "Ping".into(),
      message:      String::new(),
      kind:         NotificationKind::Event,
      link:         None,
    })
    .await
    .unwrap();
  }

  assert_eq!(s.mark_all_read(recipient.identity_id).await.unwrap(), 0);
  let feed = s.list_notifications(recipient.identity_id, 10).await.unwrap();
  assert!(feed.items.iter().all(|n| n.is_read));
}

// ─── Dashboard aggregator ────────────────────────────────────────────────────

#[tokio::test]
async fn recompute_overwrites_the_single_cache_row() {
  let s = store().await;
  let (_, yellow, _) = seed_ladder(&s).await;

  assert!(s.cached_dashboard().await.unwrap().is_none());

  let a = active_trainee(&s, "jlee").await;
  active_trainee(&s, "minko").await;
  add_tournament(&s).await;
  s.create_payment(NewPayment {
    trainee_id:  a.trainee.trainee_id,
    amount:      amount(10_000),
    due_date:    Utc::now().date_naive(),
    description: "Monthly fee".into(),
  })
  .await
  .unwrap();
  s.promote(a.trainee.trainee_id, yellow.belt_id).await.unwrap();

  let now = Utc::now();
  let snapshot = s.recompute_dashboard(now).await.unwrap();
  assert_eq!(snapshot.total_trainees, 2);
  assert_eq!(snapshot.upcoming_events, 1);
  assert_eq!(snapshot.pending_payments, 1);
  assert_eq!(snapshot.pending_payments_amount, amount(10_000));
  assert_eq!(snapshot.recent_promotions, 1);

  let cached = s.cached_dashboard().await.unwrap().unwrap();
  assert_eq!(cached.value, snapshot);

  // A second recompute after a change overwrites rather than appends.
  s.deactivate_trainee(a.trainee.trainee_id).await.unwrap();
  let refreshed = s.recompute_dashboard(Utc::now()).await.unwrap();
  assert_eq!(refreshed.total_trainees, 1);
  let cached = s.cached_dashboard().await.unwrap().unwrap();
  assert_eq!(cached.value, refreshed);
}

// ─── Reports ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn chart_queries_cover_growth_belts_and_payments() {
  let s = store().await;
  seed_ladder(&s).await;
  let a = active_trainee(&s, "jlee").await;
  active_trainee(&s, "minko").await;

  let growth = s.trainee_growth(Utc::now().date_naive()).await.unwrap();
  assert_eq!(growth.len(), 6);
  // Both members joined today, so only the final tick counts them.
  assert_eq!(growth[5].count, 2);
  assert_eq!(growth[0].count, 0);

  let distribution = s.belt_distribution().await.unwrap();
  assert_eq!(distribution.len(), 3);
  assert_eq!(distribution[0].belt_name, "White");
  assert_eq!(distribution[0].count, 2);
  assert_eq!(distribution[1].count, 0);

  s.create_payment(NewPayment {
    trainee_id:  a.trainee.trainee_id,
    amount:      amount(5_000),
    due_date:    Utc::now().date_naive(),
    description: "Fee".into(),
  })
  .await
  .unwrap();
  let counts = s.payment_status_counts().await.unwrap();
  assert_eq!(counts.paid, 0);
  assert_eq!(counts.pending, 1);
}
