//! Router tests driven through `tower::ServiceExt::oneshot` over the seeded
//! in-memory store.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use quickcheck_core::{LedgerConfig, MemoryStore, VisitLedger};
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::api_router;

fn make_ledger() -> Arc<VisitLedger<MemoryStore>> {
  Arc::new(VisitLedger::new(MemoryStore::seeded(), LedgerConfig::default()))
}

async fn oneshot_raw(
  ledger: &Arc<VisitLedger<MemoryStore>>,
  method: &str,
  uri:    &str,
  body:   Option<Value>,
) -> axum::response::Response {
  let builder = Request::builder().method(method).uri(uri);
  let req = match body {
    Some(json) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(json.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  api_router(Arc::clone(ledger)).oneshot(req).await.unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(resp: axum::response::Response) -> String {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  String::from_utf8(bytes.to_vec()).unwrap()
}

async fn current_user_id(ledger: &Arc<VisitLedger<MemoryStore>>) -> String {
  let resp = oneshot_raw(ledger, "GET", "/session", None).await;
  body_json(resp).await["id"].as_str().unwrap().to_owned()
}

// ── Guests and check-in ─────────────────────────────────────────────────────

#[tokio::test]
async fn guest_search_ignores_case_and_404s_when_absent() {
  let ledger = make_ledger();

  let resp = oneshot_raw(&ledger, "GET", "/guests?id_number=g1234567x", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await["name"], "John Doe");

  let resp = oneshot_raw(&ledger, "GET", "/guests?id_number=Z0000000Z", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  assert!(body_json(resp).await["error"].is_string());

  let resp = oneshot_raw(&ledger, "GET", "/guests?id_number=", None).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  // Surrounding spaces are part of the number, not padding.
  let resp = oneshot_raw(&ledger, "GET", "/guests?id_number=%20G1234567X", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn check_in_reuses_known_guest() {
  let ledger = make_ledger();
  let guard_id = current_user_id(&ledger).await;

  let resp = oneshot_raw(&ledger, "GET", "/guests?id_number=G1234567X", None).await;
  let john = body_json(resp).await;

  let resp = oneshot_raw(
    &ledger,
    "POST",
    "/check-ins",
    Some(json!({
      "guest": { "name": "Someone Else", "id_number": "G1234567X" },
      "host": "Alice",
      "reason": "Meeting",
      "checked_in_by": guard_id,
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let visit = body_json(resp).await;
  assert_eq!(visit["guest_id"], john["id"]);
  assert_eq!(visit["check_out_ts"], Value::Null);
  assert_eq!(visit["approval_status"], "pending");

  // The stored guest keeps its original name.
  let resp = oneshot_raw(&ledger, "GET", "/guests?id_number=G1234567X", None).await;
  assert_eq!(body_json(resp).await["name"], "John Doe");

  let resp = oneshot_raw(&ledger, "GET", "/visits", None).await;
  let log = body_json(resp).await;
  assert_eq!(log.as_array().unwrap().len(), 4);
  assert_eq!(log[0]["id"], visit["id"]);
  assert_eq!(log[0]["guest"]["name"], "John Doe");
}

#[tokio::test]
async fn blank_host_defaults_to_reception() {
  let ledger = make_ledger();
  let guard_id = current_user_id(&ledger).await;

  let resp = oneshot_raw(
    &ledger,
    "POST",
    "/check-ins",
    Some(json!({
      "guest": { "name": "Jane Roe", "id_number": "S7654321B", "consent": true },
      "host": "   ",
      "checked_in_by": guard_id,
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  assert_eq!(body_json(resp).await["host"], "Reception");
}

// ── Visits ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn checkout_removes_visit_from_active_listing() {
  let ledger = make_ledger();

  let resp = oneshot_raw(&ledger, "GET", "/visits/active", None).await;
  let active = body_json(resp).await;
  assert_eq!(active.as_array().unwrap().len(), 1);
  let id = active[0]["id"].as_str().unwrap().to_owned();

  let resp = oneshot_raw(&ledger, "POST", &format!("/visits/{id}/checkout"), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert!(body_json(resp).await["check_out_ts"].is_string());

  let resp = oneshot_raw(&ledger, "GET", "/visits/active", None).await;
  assert!(body_json(resp).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_or_malformed_visit_ids_are_rejected() {
  let ledger = make_ledger();

  let uri = format!("/visits/{}/approve", Uuid::new_v4());
  let resp = oneshot_raw(&ledger, "POST", &uri, None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let resp = oneshot_raw(&ledger, "POST", "/visits/not-a-uuid/checkout", None).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn second_review_request_conflicts() {
  let ledger = make_ledger();

  let resp = oneshot_raw(&ledger, "GET", "/hosts/visits?name=Host%20User", None).await;
  let host_visits = body_json(resp).await;
  assert_eq!(host_visits.as_array().unwrap().len(), 1);
  let id = host_visits[0]["id"].as_str().unwrap().to_owned();
  let uri = format!("/visits/{id}/review-request");

  let resp = oneshot_raw(&ledger, "POST", &uri, None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await["review_request_sent"], true);

  let resp = oneshot_raw(&ledger, "POST", &uri, None).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);

  let resp = oneshot_raw(&ledger, "GET", "/review-requests", None).await;
  let log = body_json(resp).await;
  assert_eq!(log.as_array().unwrap().len(), 2);
  assert_eq!(log[0]["visit_id"].as_str(), Some(id.as_str()));
  assert_eq!(log[0]["channel"], "email");
}

#[tokio::test]
async fn recent_listing_only_shows_approved_visits() {
  let ledger = make_ledger();

  let resp = oneshot_raw(&ledger, "GET", "/visits/recent", None).await;
  let recent = body_json(resp).await;
  assert_eq!(recent.as_array().unwrap().len(), 1);
  assert_eq!(recent[0]["reason"], "Meeting");

  // Two days on, the seeded checkout has aged out of the window.
  let later = (chrono::Utc::now() + chrono::Duration::days(2)).to_rfc3339();
  let uri = format!("/visits/recent?as_of={}", later.replace('+', "%2B"));
  let resp = oneshot_raw(&ledger, "GET", &uri, None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert!(body_json(resp).await.as_array().unwrap().is_empty());
}

// ── Session and appointments ────────────────────────────────────────────────

#[tokio::test]
async fn login_switches_session_and_default_appointment_host() {
  let ledger = make_ledger();

  let resp = oneshot_raw(&ledger, "POST", "/session", Some(json!({ "role": "host" }))).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await["name"], "Host User");

  let resp = oneshot_raw(&ledger, "GET", "/appointments", None).await;
  let appointments = body_json(resp).await;
  assert_eq!(appointments.as_array().unwrap().len(), 1);
  assert_eq!(appointments[0]["status"], "scheduled");

  let resp = oneshot_raw(&ledger, "GET", "/appointments/lookup?id_number=s1234567a", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await["guest_name"], "Scheduled Guest");

  let resp = oneshot_raw(&ledger, "GET", "/appointments/lookup?id_number=X1", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let resp = oneshot_raw(&ledger, "GET", "/appointments/lookup?id_number=%20%20", None).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_with_unknown_role_value_is_rejected() {
  let ledger = make_ledger();
  let resp = oneshot_raw(&ledger, "POST", "/session", Some(json!({ "role": "janitor" }))).await;
  assert!(resp.status().is_client_error());
}

// ── Administration and feedback ─────────────────────────────────────────────

#[tokio::test]
async fn custom_field_name_is_derived_from_label() {
  let ledger = make_ledger();

  let resp = oneshot_raw(
    &ledger,
    "POST",
    "/custom-fields",
    Some(json!({ "label": "Vehicle Plate", "type": "text" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  assert_eq!(body_json(resp).await["name"], "vehicle_plate");

  let resp = oneshot_raw(&ledger, "GET", "/custom-fields", None).await;
  assert_eq!(body_json(resp).await.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn settings_are_replaced_wholesale() {
  let ledger = make_ledger();
  let settings = json!({
    "auto_send_on_checkout": true,
    "email_template": "Hi {{GUEST_NAME}}: {{REVIEW_LINK}}",
    "sms_template": "{{REVIEW_LINK}}",
  });

  let resp = oneshot_raw(&ledger, "PUT", "/settings/notifications", Some(settings.clone())).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let resp = oneshot_raw(&ledger, "GET", "/settings/notifications", None).await;
  assert_eq!(body_json(resp).await, settings);
}

#[tokio::test]
async fn out_of_range_rating_is_unprocessable() {
  let ledger = make_ledger();
  let resp = oneshot_raw(&ledger, "GET", "/visits", None).await;
  let visit_id = body_json(resp).await[0]["id"].clone();

  let resp = oneshot_raw(
    &ledger,
    "POST",
    "/reviews",
    Some(json!({ "visit_id": visit_id, "rating": 9 })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

  let resp = oneshot_raw(
    &ledger,
    "POST",
    "/reviews",
    Some(json!({ "visit_id": visit_id, "rating": 4, "comment": "Quick" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let resp = oneshot_raw(&ledger, "GET", "/reviews", None).await;
  assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);
}

// ── Reporting ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn dashboard_reports_a_week_of_buckets() {
  let ledger = make_ledger();
  let resp = oneshot_raw(&ledger, "GET", "/dashboard", None).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let summary = body_json(resp).await;
  assert_eq!(summary["weekly"].as_array().unwrap().len(), 7);
  assert_eq!(summary["returning"], 1);
}

#[tokio::test]
async fn csv_export_has_header_and_one_row_per_visit() {
  let ledger = make_ledger();
  let resp = oneshot_raw(&ledger, "GET", "/reports/visits.csv", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap();
  assert!(content_type.to_str().unwrap().starts_with("text/csv"));

  let csv = body_text(resp).await;
  let lines: Vec<_> = csv.lines().collect();
  assert_eq!(lines.len(), 4);
  assert!(lines[0].starts_with("\"Visitor Name\""));
  assert!(lines.iter().any(|l| l.contains("\"Active\"")));
}
