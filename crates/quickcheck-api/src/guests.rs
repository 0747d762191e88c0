//! Handlers for the check-in desk: guest lookup and registration.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/guests?id_number=` | Case-insensitive; 404 if unknown |
//! | `POST` | `/guests` | Body: [`NewGuest`]; returns 201 |
//! | `POST` | `/check-ins` | Body: [`CheckIn`]; finds or registers the guest, returns 201 + visit |

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use quickcheck_core::{
  model::{CheckIn, Guest, NewGuest},
  notify::Notifier,
  store::LedgerStore,
};
use serde::Deserialize;

use crate::{LedgerState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub id_number: String,
}

/// `GET /guests?id_number=<number>`
pub async fn search<S, N>(
  State(ledger): LedgerState<S, N>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Guest>, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  let id_number = params.id_number;
  if id_number.trim().is_empty() {
    return Err(ApiError::BadRequest("id_number must not be empty".into()));
  }
  let guest = ledger
    .search_guest_by_id(&id_number)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("no guest with id number {id_number}")))?;
  Ok(Json(guest))
}

/// `POST /guests`
pub async fn create<S, N>(
  State(ledger): LedgerState<S, N>,
  Json(body): Json<NewGuest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  let guest = ledger.create_guest(body).await?;
  Ok((StatusCode::CREATED, Json(guest)))
}

/// `POST /check-ins`
pub async fn check_in<S, N>(
  State(ledger): LedgerState<S, N>,
  Json(body): Json<CheckIn>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  let visit = ledger.check_in(body).await?;
  Ok((StatusCode::CREATED, Json(visit)))
}
