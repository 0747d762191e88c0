//! Handlers for `/session`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/session` | The signed-in user, or the first guard |
//! | `POST` | `/session` | Body: `{"role":"guard"}` |

use axum::{Json, extract::State};
use quickcheck_core::{
  model::{Role, User},
  notify::Notifier,
  store::LedgerStore,
};
use serde::Deserialize;

use crate::{LedgerState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub role: Role,
}

/// `POST /session`; 422 when no account holds the role.
pub async fn login<S, N>(
  State(ledger): LedgerState<S, N>,
  Json(body): Json<LoginBody>,
) -> Result<Json<User>, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  Ok(Json(ledger.login(body.role).await?))
}

/// `GET /session`
pub async fn current<S, N>(State(ledger): LedgerState<S, N>) -> Result<Json<User>, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  Ok(Json(ledger.current_user().await?))
}
