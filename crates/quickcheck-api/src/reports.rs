//! Handlers for the dashboard and CSV export.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/dashboard` | Figures computed in the server's local timezone |
//! | `GET`  | `/reports/visits.csv` | Full visit log as an attachment |

use axum::{
  Json,
  extract::State,
  http::header,
  response::IntoResponse,
};
use chrono::Local;
use quickcheck_core::{
  dashboard::{DashboardSummary, summarize},
  notify::Notifier,
  report::visit_log_csv,
  store::LedgerStore,
};

use crate::{LedgerState, error::ApiError};

/// `GET /dashboard`
pub async fn dashboard<S, N>(
  State(ledger): LedgerState<S, N>,
) -> Result<Json<DashboardSummary>, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  let log = ledger.visit_log().await?;
  Ok(Json(summarize(&log, Local::now())))
}

/// `GET /reports/visits.csv`
pub async fn visits_csv<S, N>(State(ledger): LedgerState<S, N>) -> Result<impl IntoResponse, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  let log = ledger.visit_log().await?;
  let body = visit_log_csv(&log)?;
  Ok((
    [
      (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
      (header::CONTENT_DISPOSITION, "attachment; filename=\"visitor_log.csv\""),
    ],
    body,
  ))
}
