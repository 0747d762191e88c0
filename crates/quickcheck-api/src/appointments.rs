//! Handlers for `/appointments` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/appointments` | Optional `?host_id=`; defaults to the signed-in user |
//! | `POST` | `/appointments` | Body: [`NewAppointment`]; returns 201 |
//! | `GET`  | `/appointments/lookup?id_number=` | 400 if blank, 404 if none matches |

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use quickcheck_core::{
  model::{Appointment, NewAppointment},
  notify::Notifier,
  store::LedgerStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{LedgerState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub host_id: Option<Uuid>,
}

/// `GET /appointments[?host_id=<id>]`
pub async fn list<S, N>(
  State(ledger): LedgerState<S, N>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Appointment>>, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  let host_id = match params.host_id {
    Some(id) => id,
    None => ledger.current_user().await?.id,
  };
  Ok(Json(ledger.appointments_for_host(host_id).await?))
}

/// `POST /appointments`
pub async fn create<S, N>(
  State(ledger): LedgerState<S, N>,
  Json(body): Json<NewAppointment>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  let appointment = ledger.create_appointment(body).await?;
  Ok((StatusCode::CREATED, Json(appointment)))
}

#[derive(Debug, Deserialize)]
pub struct LookupParams {
  pub id_number: String,
}

/// `GET /appointments/lookup?id_number=<number>`
pub async fn lookup<S, N>(
  State(ledger): LedgerState<S, N>,
  Query(params): Query<LookupParams>,
) -> Result<Json<Appointment>, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  let id_number = params.id_number;
  if id_number.trim().is_empty() {
    return Err(ApiError::BadRequest("id_number must not be empty".into()));
  }
  let appointment = ledger
    .appointment_by_id_number(&id_number)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("no appointment for id number {id_number}")))?;
  Ok(Json(appointment))
}
