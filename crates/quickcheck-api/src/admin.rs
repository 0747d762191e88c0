//! Handlers for administration: staff, hosts, custom fields and
//! notification settings.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`/`POST` | `/users` | Body: [`NewUser`] |
//! | `GET`/`POST` | `/hosts` | Body: [`NewHost`] |
//! | `GET`/`POST` | `/custom-fields` | Body: [`NewCustomField`]; `name` derived from `label` when empty |
//! | `GET`/`PUT`  | `/settings/notifications` | `PUT` replaces the whole record |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use quickcheck_core::{
  model::{
    CustomField, Host, NewCustomField, NewHost, NewUser, NotificationSettings, User,
  },
  notify::Notifier,
  store::LedgerStore,
};

use crate::{LedgerState, error::ApiError};

// ─── Users ───────────────────────────────────────────────────────────────────

/// `GET /users`
pub async fn list_users<S, N>(State(ledger): LedgerState<S, N>) -> Result<Json<Vec<User>>, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  Ok(Json(ledger.users().await?))
}

/// `POST /users`
pub async fn create_user<S, N>(
  State(ledger): LedgerState<S, N>,
  Json(body): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  let user = ledger.add_user(body).await?;
  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Hosts ───────────────────────────────────────────────────────────────────

/// `GET /hosts`
pub async fn list_hosts<S, N>(State(ledger): LedgerState<S, N>) -> Result<Json<Vec<Host>>, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  Ok(Json(ledger.hosts().await?))
}

/// `POST /hosts`
pub async fn create_host<S, N>(
  State(ledger): LedgerState<S, N>,
  Json(body): Json<NewHost>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  let host = ledger.add_host(body).await?;
  Ok((StatusCode::CREATED, Json(host)))
}

// ─── Custom fields ───────────────────────────────────────────────────────────

/// `GET /custom-fields`
pub async fn list_custom_fields<S, N>(
  State(ledger): LedgerState<S, N>,
) -> Result<Json<Vec<CustomField>>, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  Ok(Json(ledger.custom_fields().await?))
}

/// `POST /custom-fields`
pub async fn create_custom_field<S, N>(
  State(ledger): LedgerState<S, N>,
  Json(body): Json<NewCustomField>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  let field = ledger.add_custom_field(body).await?;
  Ok((StatusCode::CREATED, Json(field)))
}

// ─── Notification settings ───────────────────────────────────────────────────

/// `GET /settings/notifications`
pub async fn get_settings<S, N>(
  State(ledger): LedgerState<S, N>,
) -> Result<Json<NotificationSettings>, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  Ok(Json(ledger.notification_settings().await?))
}

/// `PUT /settings/notifications`
pub async fn put_settings<S, N>(
  State(ledger): LedgerState<S, N>,
  Json(body): Json<NotificationSettings>,
) -> Result<Json<NotificationSettings>, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  Ok(Json(ledger.update_notification_settings(body).await?))
}
