//! The `LedgerStore` trait.
//!
//! The trait is implemented by storage backends ([`crate::memory::MemoryStore`],
//! `quickcheck-store-sqlite`). Business rules live in
//! [`crate::ledger::VisitLedger`], which depends on this abstraction only.
//!
//! Backends own their synchronisation. Every method is independently atomic,
//! and the two operations that read-then-write a visit
//! ([`LedgerStore::update_visit`], [`LedgerStore::claim_review_request`]) must
//! not interleave with other writers to the same record.

use std::future::Future;

use uuid::Uuid;

use crate::model::{
  Appointment, CustomField, Guest, Host, NotificationSettings, Review,
  ReviewRequest, User, Visit, VisitUpdate,
};

/// Outcome of [`LedgerStore::claim_review_request`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewClaim {
  /// The request was logged and the visit flagged; carries the updated visit.
  Claimed(Visit),
  /// The visit had already been flagged; nothing was written.
  AlreadySent,
  /// No visit has the request's `visit_id`; nothing was written.
  VisitMissing,
}

/// Abstraction over a visit ledger backend.
///
/// List methods return records in insertion order.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait LedgerStore: Send + Sync + 'static {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  fn insert_user(
    &self,
    user: User,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Hosts ─────────────────────────────────────────────────────────────

  fn list_hosts(
    &self,
  ) -> impl Future<Output = Result<Vec<Host>, Self::Error>> + Send + '_;

  fn insert_host(
    &self,
    host: Host,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Guests ────────────────────────────────────────────────────────────

  fn list_guests(
    &self,
  ) -> impl Future<Output = Result<Vec<Guest>, Self::Error>> + Send + '_;

  fn get_guest(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Guest>, Self::Error>> + Send + '_;

  /// First guest (in insertion order) whose `id_number` equals `id_number`
  /// ignoring case.
  fn find_guest_by_id_number<'a>(
    &'a self,
    id_number: &'a str,
  ) -> impl Future<Output = Result<Option<Guest>, Self::Error>> + Send + 'a;

  fn insert_guest(
    &self,
    guest: Guest,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Visits ────────────────────────────────────────────────────────────

  fn list_visits(
    &self,
  ) -> impl Future<Output = Result<Vec<Visit>, Self::Error>> + Send + '_;

  fn get_visit(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Visit>, Self::Error>> + Send + '_;

  fn insert_visit(
    &self,
    visit: Visit,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Apply `update` to the visit with `id` and return the result, or `None`
  /// if no such visit exists.
  fn update_visit(
    &self,
    id: Uuid,
    update: VisitUpdate,
  ) -> impl Future<Output = Result<Option<Visit>, Self::Error>> + Send + '_;

  // ── Review requests ───────────────────────────────────────────────────

  /// Atomically append `request` to the log and set
  /// `review_request_sent` on its visit, unless the flag is already set.
  fn claim_review_request(
    &self,
    request: ReviewRequest,
  ) -> impl Future<Output = Result<ReviewClaim, Self::Error>> + Send + '_;

  fn list_review_requests(
    &self,
  ) -> impl Future<Output = Result<Vec<ReviewRequest>, Self::Error>> + Send + '_;

  // ── Appointments ──────────────────────────────────────────────────────

  fn list_appointments(
    &self,
  ) -> impl Future<Output = Result<Vec<Appointment>, Self::Error>> + Send + '_;

  fn insert_appointment(
    &self,
    appointment: Appointment,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Custom fields ─────────────────────────────────────────────────────

  fn list_custom_fields(
    &self,
  ) -> impl Future<Output = Result<Vec<CustomField>, Self::Error>> + Send + '_;

  fn insert_custom_field(
    &self,
    field: CustomField,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Settings ──────────────────────────────────────────────────────────

  fn notification_settings(
    &self,
  ) -> impl Future<Output = Result<NotificationSettings, Self::Error>> + Send + '_;

  /// Overwrite the singleton settings record.
  fn replace_notification_settings(
    &self,
    settings: NotificationSettings,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reviews ───────────────────────────────────────────────────────────

  fn insert_review(
    &self,
    review: Review,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn list_reviews(
    &self,
  ) -> impl Future<Output = Result<Vec<Review>, Self::Error>> + Send + '_;
}
