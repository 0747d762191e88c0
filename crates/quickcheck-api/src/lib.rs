//! JSON REST API for the QuickCheck visit ledger.
//!
//! Exposes an axum [`Router`] backed by any [`quickcheck_core::VisitLedger`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", quickcheck_api::api_router(ledger.clone()))
//! ```

pub mod admin;
pub mod appointments;
pub mod error;
pub mod guests;
pub mod reports;
pub mod reviews;
pub mod session;
pub mod visits;

use std::sync::Arc;

use axum::{
  Router,
  extract::State,
  routing::{get, post},
};
use quickcheck_core::{VisitLedger, notify::Notifier, store::LedgerStore};

pub use error::ApiError;

/// Handler state: the shared ledger.
pub type LedgerState<S, N> = State<Arc<VisitLedger<S, N>>>;

/// Build a fully-materialised API router for `ledger`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, N>(ledger: Arc<VisitLedger<S, N>>) -> Router<()>
where
  S: LedgerStore,
  N: Notifier,
{
  Router::new()
    // Session
    .route("/session", get(session::current::<S, N>).post(session::login::<S, N>))
    // Check-in desk
    .route("/guests", get(guests::search::<S, N>).post(guests::create::<S, N>))
    .route("/check-ins", post(guests::check_in::<S, N>))
    // Visits
    .route("/visits", get(visits::log::<S, N>).post(visits::create::<S, N>))
    .route("/visits/active", get(visits::active::<S, N>))
    .route("/visits/recent", get(visits::recent::<S, N>))
    .route("/visits/{id}/checkout", post(visits::checkout::<S, N>))
    .route("/visits/{id}/approve", post(visits::approve::<S, N>))
    .route("/visits/{id}/review-request", post(visits::review_request::<S, N>))
    .route("/hosts/visits", get(visits::for_host::<S, N>))
    // Appointments
    .route(
      "/appointments",
      get(appointments::list::<S, N>).post(appointments::create::<S, N>),
    )
    .route("/appointments/lookup", get(appointments::lookup::<S, N>))
    // Administration
    .route("/users", get(admin::list_users::<S, N>).post(admin::create_user::<S, N>))
    .route("/hosts", get(admin::list_hosts::<S, N>).post(admin::create_host::<S, N>))
    .route(
      "/custom-fields",
      get(admin::list_custom_fields::<S, N>).post(admin::create_custom_field::<S, N>),
    )
    .route(
      "/settings/notifications",
      get(admin::get_settings::<S, N>).put(admin::put_settings::<S, N>),
    )
    // Feedback
    .route("/review-requests", get(reviews::list_requests::<S, N>))
    .route("/reviews", get(reviews::list::<S, N>).post(reviews::submit::<S, N>))
    // Reporting
    .route("/dashboard", get(reports::dashboard::<S, N>))
    .route("/reports/visits.csv", get(reports::visits_csv::<S, N>))
    .with_state(ledger)
}

#[cfg(test)]
mod tests;
