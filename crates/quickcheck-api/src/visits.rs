//! Handlers for `/visits` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/visits` | Full log, most recent check-in first |
//! | `POST` | `/visits` | Body: [`NewVisit`]; returns 201 |
//! | `GET`  | `/visits/active` | Visits not yet checked out |
//! | `GET`  | `/visits/recent` | Optional `?as_of=<rfc3339>` |
//! | `POST` | `/visits/:id/checkout` | May also send the review request |
//! | `POST` | `/visits/:id/approve` | |
//! | `POST` | `/visits/:id/review-request` | 409 if already sent |
//! | `GET`  | `/hosts/visits?name=` | Completed visits for one host |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use quickcheck_core::{
  model::{NewVisit, Visit},
  notify::Notifier,
  store::LedgerStore,
  view::VisitView,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{LedgerState, error::ApiError};

// ─── Listings ────────────────────────────────────────────────────────────────

/// `GET /visits`
pub async fn log<S, N>(State(ledger): LedgerState<S, N>) -> Result<Json<Vec<VisitView>>, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  Ok(Json(ledger.visit_log().await?))
}

/// `GET /visits/active`
pub async fn active<S, N>(
  State(ledger): LedgerState<S, N>,
) -> Result<Json<Vec<VisitView>>, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  Ok(Json(ledger.active_visits().await?))
}

#[derive(Debug, Deserialize)]
pub struct RecentParams {
  /// Reference time for the 24-hour window. Defaults to now.
  pub as_of: Option<DateTime<Utc>>,
}

/// `GET /visits/recent[?as_of=<rfc3339>]`
pub async fn recent<S, N>(
  State(ledger): LedgerState<S, N>,
  Query(params): Query<RecentParams>,
) -> Result<Json<Vec<VisitView>>, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  Ok(Json(ledger.recently_checked_out(params.as_of).await?))
}

#[derive(Debug, Deserialize)]
pub struct HostParams {
  pub name: String,
}

/// `GET /hosts/visits?name=<host name>`
pub async fn for_host<S, N>(
  State(ledger): LedgerState<S, N>,
  Query(params): Query<HostParams>,
) -> Result<Json<Vec<VisitView>>, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  if params.name.trim().is_empty() {
    return Err(ApiError::BadRequest("name must not be empty".into()));
  }
  Ok(Json(ledger.visits_for_host(&params.name).await?))
}

// ─── Mutations ───────────────────────────────────────────────────────────────

/// `POST /visits`
pub async fn create<S, N>(
  State(ledger): LedgerState<S, N>,
  Json(body): Json<NewVisit>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  let visit = ledger.create_visit(body).await?;
  Ok((StatusCode::CREATED, Json(visit)))
}

/// `POST /visits/:id/checkout`
pub async fn checkout<S, N>(
  State(ledger): LedgerState<S, N>,
  Path(id): Path<Uuid>,
) -> Result<Json<Visit>, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  Ok(Json(ledger.checkout_visit(id).await?))
}

/// `POST /visits/:id/approve`
pub async fn approve<S, N>(
  State(ledger): LedgerState<S, N>,
  Path(id): Path<Uuid>,
) -> Result<Json<Visit>, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  Ok(Json(ledger.approve_visit(id).await?))
}

/// `POST /visits/:id/review-request`
pub async fn review_request<S, N>(
  State(ledger): LedgerState<S, N>,
  Path(id): Path<Uuid>,
) -> Result<Json<Visit>, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  Ok(Json(ledger.send_review_request(id).await?))
}
