//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, TimeZone, Utc};
use quickcheck_core::{
  LedgerConfig, VisitLedger,
  model::{
    Appointment, AppointmentStatus, ApprovalStatus, Channel, CheckIn, CustomField,
    CustomFieldType, CustomValues, Guest, NewGuest, NewReview, NotificationSettings,
    ReviewRequest, Role, User, Visit, VisitUpdate,
  },
  store::{LedgerStore, ReviewClaim},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn guest(id_number: &str) -> Guest {
  Guest {
    id:         Uuid::new_v4(),
    name:       "Jane Roe".into(),
    id_number:  id_number.into(),
    phone:      "81234567".into(),
    email:      "jane@example.com".into(),
    consent:    true,
    created_at: Utc.with_ymd_and_hms(2024, 5, 15, 9, 0, 0).unwrap(),
  }
}

fn visit(guest_id: Uuid) -> Visit {
  let mut custom_fields = CustomValues::new();
  custom_fields.insert("company".into(), serde_json::json!("Acme"));
  Visit {
    id: Uuid::new_v4(),
    guest_id,
    check_in_ts: Utc.with_ymd_and_hms(2024, 5, 15, 9, 30, 0).unwrap(),
    check_out_ts: None,
    host: "Alice".into(),
    reason: "Meeting".into(),
    device_info: "Laptop".into(),
    custom_fields,
    checked_in_by: Uuid::new_v4(),
    approval_status: ApprovalStatus::Pending,
    review_request_sent: false,
  }
}

fn request(visit_id: Uuid) -> ReviewRequest {
  ReviewRequest {
    id: Uuid::new_v4(),
    visit_id,
    guest_name: "Jane Roe".into(),
    channel: Channel::Email,
    sent_at: Utc::now(),
  }
}

// ─── Users and guests ────────────────────────────────────────────────────────

#[tokio::test]
async fn users_list_in_insertion_order() {
  let s = store().await;
  for (name, role) in [("Admin User", Role::Admin), ("Guard User", Role::Guard)] {
    s.insert_user(User { id: Uuid::new_v4(), name: name.into(), role })
      .await
      .unwrap();
  }

  let users = s.list_users().await.unwrap();
  let names: Vec<_> = users.iter().map(|u| u.name.as_str()).collect();
  assert_eq!(names, ["Admin User", "Guard User"]);
  assert_eq!(users[1].role, Role::Guard);
}

#[tokio::test]
async fn guest_lookup_ignores_case() {
  let s = store().await;
  let g = guest("G1234567X");
  s.insert_guest(g.clone()).await.unwrap();

  let found = s.find_guest_by_id_number("g1234567x").await.unwrap();
  assert_eq!(found, Some(g.clone()));
  assert_eq!(s.get_guest(g.id).await.unwrap(), Some(g));
  assert!(s.find_guest_by_id_number("S0000000Z").await.unwrap().is_none());
}

// ─── Visits ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn visit_fields_survive_storage() {
  let s = store().await;
  let v = visit(Uuid::new_v4());
  s.insert_visit(v.clone()).await.unwrap();

  assert_eq!(s.get_visit(v.id).await.unwrap(), Some(v.clone()));
  assert_eq!(s.list_visits().await.unwrap(), vec![v]);
}

#[tokio::test]
async fn update_visit_checks_out_and_approves() {
  let s = store().await;
  let v = visit(Uuid::new_v4());
  s.insert_visit(v.clone()).await.unwrap();

  let at = Utc.with_ymd_and_hms(2024, 5, 15, 11, 0, 0).unwrap();
  let out = s.update_visit(v.id, VisitUpdate::CheckOut(at)).await.unwrap().unwrap();
  assert_eq!(out.check_out_ts, Some(at));
  assert_eq!(out.approval_status, ApprovalStatus::Pending);

  let approved = s.update_visit(v.id, VisitUpdate::Approve).await.unwrap().unwrap();
  assert_eq!(approved.approval_status, ApprovalStatus::Approved);
  assert_eq!(approved.check_out_ts, Some(at));
}

#[tokio::test]
async fn update_missing_visit_returns_none() {
  let s = store().await;
  let result = s.update_visit(Uuid::new_v4(), VisitUpdate::Approve).await.unwrap();
  assert!(result.is_none());
}

// ─── Review requests ─────────────────────────────────────────────────────────

#[tokio::test]
async fn claim_flags_visit_once() {
  let s = store().await;
  let v = visit(Uuid::new_v4());
  s.insert_visit(v.clone()).await.unwrap();

  let first = s.claim_review_request(request(v.id)).await.unwrap();
  let ReviewClaim::Claimed(flagged) = first else {
    panic!("expected claim, got {first:?}");
  };
  assert!(flagged.review_request_sent);

  let second = s.claim_review_request(request(v.id)).await.unwrap();
  assert_eq!(second, ReviewClaim::AlreadySent);
  assert_eq!(s.list_review_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn claim_for_missing_visit_writes_nothing() {
  let s = store().await;
  let claim = s.claim_review_request(request(Uuid::new_v4())).await.unwrap();
  assert_eq!(claim, ReviewClaim::VisitMissing);
  assert!(s.list_review_requests().await.unwrap().is_empty());
}

// ─── Appointments, fields, settings, reviews ─────────────────────────────────

#[tokio::test]
async fn appointments_and_custom_fields_round_trip() {
  let s = store().await;
  let appointment = Appointment {
    id:              Uuid::new_v4(),
    guest_name:      "Sam Tan".into(),
    guest_id_number: "S1234567A".into(),
    host_id:         Uuid::new_v4(),
    created_at:      Utc::now(),
    status:          AppointmentStatus::Scheduled,
  };
  s.insert_appointment(appointment.clone()).await.unwrap();
  assert_eq!(s.list_appointments().await.unwrap(), vec![appointment]);

  let field = CustomField {
    id:    Uuid::new_v4(),
    name:  "has_appointment".into(),
    label: "Has Appointment".into(),
    kind:  CustomFieldType::Checkbox,
  };
  s.insert_custom_field(field.clone()).await.unwrap();
  assert_eq!(s.list_custom_fields().await.unwrap(), vec![field]);
}

#[tokio::test]
async fn settings_start_at_defaults_and_are_replaced() {
  let s = store().await;
  assert_eq!(s.notification_settings().await.unwrap(), NotificationSettings::default());

  let updated = NotificationSettings {
    auto_send_on_checkout: true,
    email_template:        "Hello {{GUEST_NAME}}".into(),
    sms_template:          "{{REVIEW_LINK}}".into(),
  };
  s.replace_notification_settings(updated.clone()).await.unwrap();
  assert_eq!(s.notification_settings().await.unwrap(), updated);
}

#[tokio::test]
async fn reviews_reference_existing_visits() {
  let s = store().await;
  let v = visit(Uuid::new_v4());
  s.insert_visit(v.clone()).await.unwrap();

  let review = quickcheck_core::model::Review {
    visit_id:     v.id,
    rating:       4,
    comment:      "Smooth check-in".into(),
    submitted_at: Utc::now(),
  };
  s.insert_review(review.clone()).await.unwrap();
  assert_eq!(s.list_reviews().await.unwrap(), vec![review]);
}

// ─── Ledger over SQLite ──────────────────────────────────────────────────────

#[tokio::test]
async fn ledger_check_in_and_review_flow() {
  let s = store().await;
  let guard = User { id: Uuid::new_v4(), name: "Guard User".into(), role: Role::Guard };
  s.insert_user(guard.clone()).await.unwrap();
  let ledger = VisitLedger::new(s, LedgerConfig::default());

  let visit = ledger
    .check_in(CheckIn {
      guest:         NewGuest {
        name:      "Jane Roe".into(),
        id_number: "G7654321Z".into(),
        email:     "jane@example.com".into(),
        consent:   true,
        ..Default::default()
      },
      host:          String::new(),
      reason:        "Delivery".into(),
      device_info:   String::new(),
      custom_fields: CustomValues::new(),
      checked_in_by: guard.id,
    })
    .await
    .unwrap();
  assert_eq!(visit.host, "Reception");

  let active = ledger.active_visits().await.unwrap();
  assert_eq!(active.len(), 1);
  assert_eq!(active[0].checked_in_by_user.as_ref(), Some(&guard));

  ledger.checkout_visit(visit.id).await.unwrap();
  ledger.approve_visit(visit.id).await.unwrap();
  let recent = ledger.recently_checked_out(None).await.unwrap();
  assert_eq!(recent.len(), 1);

  let sent = ledger.send_review_request(visit.id).await.unwrap();
  assert!(sent.review_request_sent);
  assert!(ledger.send_review_request(visit.id).await.is_err());

  let review = ledger
    .submit_review(NewReview { visit_id: visit.id, rating: 5, comment: String::new() })
    .await
    .unwrap();
  assert_eq!(review.rating, 5);

  // Later lookups resolve to the guest created at check-in.
  let returning = ledger.search_guest_by_id("g7654321z").await.unwrap();
  assert_eq!(returning.map(|g| g.id), Some(visit.guest_id));
  assert!(Utc::now() - visit.check_in_ts < Duration::minutes(1));
}
