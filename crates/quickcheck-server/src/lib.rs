//! HTTP server for the QuickCheck visit ledger.
//!
//! Mounts the JSON API from `quickcheck-api` under `/api`, guarded by HTTP
//! Basic auth, with request tracing on every route.

pub mod auth;
pub mod error;

pub use error::{Error, Result};

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{Router, middleware};
use quickcheck_core::{LedgerConfig, VisitLedger, notify::Notifier, store::LedgerStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, require_auth};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Which [`LedgerStore`] backend the server runs on.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
  /// Volatile, pre-seeded with the front-desk demo data.
  #[default]
  Memory,
  Sqlite,
}

/// Runtime server configuration, deserialised from `config.toml` and
/// `QUICKCHECK_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  #[serde(default)]
  pub store:                StoreKind,
  /// Database file; only read when `store = "sqlite"`.
  #[serde(default = "default_store_path")]
  pub store_path:           PathBuf,
  pub auth_username:        String,
  pub auth_password_hash:   String,
  /// Delay added to every ledger operation.
  #[serde(default)]
  pub simulated_latency_ms: u64,
  #[serde(default = "default_review_link_base")]
  pub review_link_base:     String,
}

fn default_store_path() -> PathBuf { PathBuf::from("quickcheck.db") }

fn default_review_link_base() -> String { LedgerConfig::default().review_link_base }

impl ServerConfig {
  pub fn ledger_config(&self) -> LedgerConfig {
    LedgerConfig {
      latency:          Duration::from_millis(self.simulated_latency_ms),
      review_link_base: self.review_link_base.clone(),
    }
  }

  pub fn auth_config(&self) -> AuthConfig {
    AuthConfig {
      username:      self.auth_username.clone(),
      password_hash: self.auth_password_hash.clone(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Everything the router needs.
pub struct AppState<S, N> {
  pub ledger: Arc<VisitLedger<S, N>>,
  pub auth:   Arc<AuthConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the server [`Router`]: the ledger API under `/api`, every route
/// behind Basic auth.
pub fn router<S, N>(state: AppState<S, N>) -> Router
where
  S: LedgerStore,
  N: Notifier,
{
  let api = quickcheck_api::api_router(state.ledger)
    .layer(middleware::from_fn_with_state(state.auth, require_auth));

  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
