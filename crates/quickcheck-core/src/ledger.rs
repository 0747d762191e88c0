//! [`VisitLedger`], the business rules of the check-in desk.
//!
//! The ledger is generic over its [`LedgerStore`] and [`Notifier`]; it owns no
//! data itself apart from the current login. Every public operation waits out
//! the configured [`LedgerConfig::latency`] before touching the store.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
  Error, Result,
  error::Entity,
  model::{
    Appointment, AppointmentStatus, ApprovalStatus, CheckIn, CustomField, Guest,
    Host, NewAppointment, NewCustomField, NewGuest, NewHost, NewReview, NewUser,
    NewVisit, NotificationSettings, Review, ReviewRequest, Role, User, Visit,
    VisitUpdate, field_name_from_label,
  },
  notify::{
    Notice, NoticeKind, Notifier, Recipient, TracingNotifier, guest_recipient,
    render_review_message, review_channel, template_for,
  },
  store::{LedgerStore, ReviewClaim},
  view::{Join, VisitView},
};

/// Host recorded on a visit when the desk leaves the field blank.
pub const DEFAULT_HOST: &str = "Reception";

/// How far back, in hours, [`VisitLedger::recently_checked_out`] looks.
pub const RECENT_WINDOW_HOURS: i64 = 24;

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LedgerConfig {
  /// Artificial delay applied to every operation, modelling a remote backend.
  pub latency:          Duration,
  /// Review links are `<review_link_base>/<visit id>`.
  pub review_link_base: String,
}

impl Default for LedgerConfig {
  fn default() -> Self {
    Self {
      latency:          Duration::ZERO,
      review_link_base: "https://example.com/review".to_owned(),
    }
  }
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

pub struct VisitLedger<S, N = TracingNotifier> {
  store:    Arc<S>,
  notifier: Arc<N>,
  config:   LedgerConfig,
  session:  RwLock<Option<User>>,
}

impl<S: LedgerStore> VisitLedger<S> {
  /// A ledger that logs notices instead of delivering them.
  pub fn new(store: S, config: LedgerConfig) -> Self {
    Self::with_notifier(store, TracingNotifier, config)
  }
}

impl<S, N> VisitLedger<S, N>
where
  S: LedgerStore,
  N: Notifier,
{
  pub fn with_notifier(store: S, notifier: N, config: LedgerConfig) -> Self {
    Self {
      store: Arc::new(store),
      notifier: Arc::new(notifier),
      config,
      session: RwLock::new(None),
    }
  }

  /// Direct access to the backing store.
  pub fn store(&self) -> &S { &self.store }

  pub fn notifier(&self) -> &N { &self.notifier }

  async fn pause(&self) {
    if !self.config.latency.is_zero() {
      tokio::time::sleep(self.config.latency).await;
    }
  }

  fn review_link(&self, visit_id: Uuid) -> String {
    format!("{}/{visit_id}", self.config.review_link_base.trim_end_matches('/'))
  }

  // ── Session ─────────────────────────────────────────────────────────────

  /// Sign in as the first account holding `role`.
  pub async fn login(&self, role: Role) -> Result<User> {
    self.pause().await;
    let user = self
      .store
      .list_users()
      .await
      .map_err(Error::store)?
      .into_iter()
      .find(|u| u.role == role)
      .ok_or_else(|| Error::Validation(format!("no user holds the {role} role")))?;

    *self.session.write().await = Some(user.clone());
    tracing::info!(user_id = %user.id, %role, "logged in");
    Ok(user)
  }

  /// The account last passed to [`Self::login`], or the first guard if nobody
  /// has logged in yet.
  pub async fn current_user(&self) -> Result<User> {
    self.pause().await;
    if let Some(user) = self.session.read().await.clone() {
      return Ok(user);
    }
    self
      .store
      .list_users()
      .await
      .map_err(Error::store)?
      .into_iter()
      .find(|u| u.role == Role::Guard)
      .ok_or_else(|| Error::not_found(Entity::User, Role::Guard))
  }

  // ── Guests ──────────────────────────────────────────────────────────────

  /// Case-insensitive exact match on the identity document number.
  pub async fn search_guest_by_id(&self, id_number: &str) -> Result<Option<Guest>> {
    self.pause().await;
    self
      .store
      .find_guest_by_id_number(id_number)
      .await
      .map_err(Error::store)
  }

  pub async fn create_guest(&self, input: NewGuest) -> Result<Guest> {
    self.pause().await;
    let guest = Guest {
      id:         Uuid::new_v4(),
      name:       input.name,
      id_number:  input.id_number,
      phone:      input.phone,
      email:      input.email,
      consent:    input.consent,
      created_at: Utc::now(),
    };
    self.store.insert_guest(guest.clone()).await.map_err(Error::store)?;
    tracing::info!(guest_id = %guest.id, "guest registered");
    Ok(guest)
  }

  /// Find the guest by id number (registering them if unknown) and open a
  /// visit. A known guest's details are left as they are.
  pub async fn check_in(&self, input: CheckIn) -> Result<Visit> {
    let guest = match self.search_guest_by_id(&input.guest.id_number).await? {
      Some(guest) => guest,
      None => self.create_guest(input.guest).await?,
    };

    self
      .create_visit(NewVisit {
        guest_id:      guest.id,
        host:          input.host,
        reason:        input.reason,
        device_info:   input.device_info,
        custom_fields: input.custom_fields,
        checked_in_by: input.checked_in_by,
      })
      .await
  }

  // ── Visits ──────────────────────────────────────────────────────────────

  /// Open a visit and announce it to the host and guest in the background.
  pub async fn create_visit(&self, input: NewVisit) -> Result<Visit> {
    self.pause().await;
    let host = if input.host.trim().is_empty() {
      DEFAULT_HOST.to_owned()
    } else {
      input.host
    };

    let visit = Visit {
      id: Uuid::new_v4(),
      guest_id: input.guest_id,
      check_in_ts: Utc::now(),
      check_out_ts: None,
      host,
      reason: input.reason,
      device_info: input.device_info,
      custom_fields: input.custom_fields,
      checked_in_by: input.checked_in_by,
      approval_status: ApprovalStatus::Pending,
      review_request_sent: false,
    };
    self.store.insert_visit(visit.clone()).await.map_err(Error::store)?;
    tracing::info!(visit_id = %visit.id, guest_id = %visit.guest_id, host = %visit.host, "visit opened");

    let store = Arc::clone(&self.store);
    let notifier = Arc::clone(&self.notifier);
    let announced = visit.clone();
    tokio::spawn(async move {
      if let Err(e) = announce_check_in(&*store, &*notifier, &announced).await {
        tracing::warn!(visit_id = %announced.id, error = %e, "check-in notice failed");
      }
    });

    Ok(visit)
  }

  /// Close a visit. When auto-send is on, the review request goes out as
  /// part of the checkout and its failure fails the checkout.
  pub async fn checkout_visit(&self, visit_id: Uuid) -> Result<Visit> {
    self.pause().await;
    let visit = self
      .store
      .update_visit(visit_id, VisitUpdate::CheckOut(Utc::now()))
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::not_found(Entity::Visit, visit_id))?;
    tracing::info!(%visit_id, "visit checked out");

    let settings = self.store.notification_settings().await.map_err(Error::store)?;
    if settings.auto_send_on_checkout {
      return self.send_review_request(visit_id).await;
    }
    Ok(visit)
  }

  pub async fn approve_visit(&self, visit_id: Uuid) -> Result<Visit> {
    self.pause().await;
    let visit = self
      .store
      .update_visit(visit_id, VisitUpdate::Approve)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::not_found(Entity::Visit, visit_id))?;
    tracing::info!(%visit_id, "visit approved");
    Ok(visit)
  }

  /// Ask the guest of a visit for feedback. At most one request is ever
  /// recorded per visit.
  pub async fn send_review_request(&self, visit_id: Uuid) -> Result<Visit> {
    self.pause().await;
    let visit = self
      .store
      .get_visit(visit_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::not_found(Entity::Visit, visit_id))?;
    if visit.review_request_sent {
      return Err(already_sent(visit_id));
    }

    let guest = self
      .store
      .get_guest(visit.guest_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::not_found(Entity::Guest, visit.guest_id))?;

    let settings = self.store.notification_settings().await.map_err(Error::store)?;
    let channel = review_channel(&guest);
    let body = render_review_message(
      template_for(&settings, channel),
      &guest.name,
      &self.review_link(visit_id),
    );

    let request = ReviewRequest {
      id: Uuid::new_v4(),
      visit_id,
      guest_name: guest.name.clone(),
      channel,
      sent_at: Utc::now(),
    };
    let updated = match self
      .store
      .claim_review_request(request)
      .await
      .map_err(Error::store)?
    {
      ReviewClaim::Claimed(visit) => visit,
      ReviewClaim::AlreadySent => return Err(already_sent(visit_id)),
      ReviewClaim::VisitMissing => {
        return Err(Error::not_found(Entity::Visit, visit_id));
      }
    };
    tracing::info!(%visit_id, ?channel, "review request recorded");

    let notice = Notice {
      kind: NoticeKind::ReviewRequest,
      recipient: guest_recipient(&guest, channel),
      body,
    };
    if let Err(e) = self.notifier.deliver(notice).await {
      tracing::warn!(%visit_id, error = %e, "review request delivery failed");
    }

    Ok(updated)
  }

  // ── Visit queries ───────────────────────────────────────────────────────

  async fn join(&self, visits: Vec<Visit>) -> Result<Vec<VisitView>> {
    let guests = self.store.list_guests().await.map_err(Error::store)?;
    let users = self.store.list_users().await.map_err(Error::store)?;
    let join = Join::new(guests, users);
    Ok(visits.into_iter().map(|v| join.view(v)).collect())
  }

  async fn visits_where(&self, keep: impl Fn(&Visit) -> bool) -> Result<Vec<Visit>> {
    let mut visits = self.store.list_visits().await.map_err(Error::store)?;
    visits.retain(|v| keep(v));
    Ok(visits)
  }

  /// Visits still open, most recent check-in first.
  pub async fn active_visits(&self) -> Result<Vec<VisitView>> {
    self.pause().await;
    let mut visits = self.visits_where(Visit::is_active).await?;
    sort_by_check_in_desc(&mut visits);
    tracing::debug!(count = visits.len(), "listed active visits");
    self.join(visits).await
  }

  /// Approved visits checked out in the [`RECENT_WINDOW_HOURS`] leading up
  /// to `as_of` (defaults to now), most recent checkout first.
  pub async fn recently_checked_out(
    &self,
    as_of: Option<DateTime<Utc>>,
  ) -> Result<Vec<VisitView>> {
    self.pause().await;
    let cutoff = as_of.unwrap_or_else(Utc::now) - chrono::Duration::hours(RECENT_WINDOW_HOURS);
    let mut visits = self
      .visits_where(|v| {
        v.approval_status == ApprovalStatus::Approved
          && v.check_out_ts.is_some_and(|out| {
            out >= cutoff && as_of.is_none_or(|t| out <= t)
          })
      })
      .await?;
    visits.sort_by(|a, b| b.check_out_ts.cmp(&a.check_out_ts));
    tracing::debug!(count = visits.len(), "listed recently checked-out visits");
    self.join(visits).await
  }

  /// Every visit, most recent check-in first.
  pub async fn visit_log(&self) -> Result<Vec<VisitView>> {
    self.pause().await;
    let mut visits = self.visits_where(|_| true).await?;
    sort_by_check_in_desc(&mut visits);
    tracing::debug!(count = visits.len(), "listed visit log");
    self.join(visits).await
  }

  /// Completed visits for a host, by exact display name. Feeds the approval
  /// queue.
  pub async fn visits_for_host(&self, host_name: &str) -> Result<Vec<VisitView>> {
    self.pause().await;
    let mut visits = self
      .visits_where(|v| v.host == host_name && v.check_out_ts.is_some())
      .await?;
    sort_by_check_in_desc(&mut visits);
    tracing::debug!(host = host_name, count = visits.len(), "listed visits for host");
    self.join(visits).await
  }

  // ── Appointments ────────────────────────────────────────────────────────

  pub async fn create_appointment(&self, input: NewAppointment) -> Result<Appointment> {
    self.pause().await;
    let appointment = Appointment {
      id:              Uuid::new_v4(),
      guest_name:      input.guest_name,
      guest_id_number: input.guest_id_number,
      host_id:         input.host_id,
      created_at:      Utc::now(),
      status:          AppointmentStatus::Scheduled,
    };
    self
      .store
      .insert_appointment(appointment.clone())
      .await
      .map_err(Error::store)?;
    tracing::info!(appointment_id = %appointment.id, host_id = %appointment.host_id, "appointment scheduled");
    Ok(appointment)
  }

  /// A host's appointments, newest first.
  pub async fn appointments_for_host(&self, host_id: Uuid) -> Result<Vec<Appointment>> {
    self.pause().await;
    let mut appointments = self.store.list_appointments().await.map_err(Error::store)?;
    appointments.retain(|a| a.host_id == host_id);
    appointments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(appointments)
  }

  /// The first appointment whose guest id number matches, ignoring case.
  pub async fn appointment_by_id_number(
    &self,
    id_number: &str,
  ) -> Result<Option<Appointment>> {
    self.pause().await;
    let needle = id_number.to_lowercase();
    Ok(
      self
        .store
        .list_appointments()
        .await
        .map_err(Error::store)?
        .into_iter()
        .find(|a| a.guest_id_number.to_lowercase() == needle),
    )
  }

  // ── Administration ──────────────────────────────────────────────────────

  pub async fn users(&self) -> Result<Vec<User>> {
    self.pause().await;
    self.store.list_users().await.map_err(Error::store)
  }

  pub async fn add_user(&self, input: NewUser) -> Result<User> {
    self.pause().await;
    let user = User { id: Uuid::new_v4(), name: input.name, role: input.role };
    self.store.insert_user(user.clone()).await.map_err(Error::store)?;
    tracing::info!(user_id = %user.id, role = %user.role, "user added");
    Ok(user)
  }

  pub async fn hosts(&self) -> Result<Vec<Host>> {
    self.pause().await;
    self.store.list_hosts().await.map_err(Error::store)
  }

  pub async fn add_host(&self, input: NewHost) -> Result<Host> {
    self.pause().await;
    let host = Host {
      id:         Uuid::new_v4(),
      name:       input.name,
      department: input.department,
    };
    self.store.insert_host(host.clone()).await.map_err(Error::store)?;
    tracing::info!(host_id = %host.id, "host added");
    Ok(host)
  }

  pub async fn custom_fields(&self) -> Result<Vec<CustomField>> {
    self.pause().await;
    self.store.list_custom_fields().await.map_err(Error::store)
  }

  /// Define a custom field; a blank name is derived from the label.
  pub async fn add_custom_field(&self, input: NewCustomField) -> Result<CustomField> {
    self.pause().await;
    let name = if input.name.trim().is_empty() {
      field_name_from_label(&input.label)
    } else {
      input.name
    };
    let field = CustomField {
      id: Uuid::new_v4(),
      name,
      label: input.label,
      kind: input.kind,
    };
    self.store.insert_custom_field(field.clone()).await.map_err(Error::store)?;
    tracing::info!(field = %field.name, "custom field added");
    Ok(field)
  }

  pub async fn notification_settings(&self) -> Result<NotificationSettings> {
    self.pause().await;
    self.store.notification_settings().await.map_err(Error::store)
  }

  pub async fn update_notification_settings(
    &self,
    settings: NotificationSettings,
  ) -> Result<NotificationSettings> {
    self.pause().await;
    self
      .store
      .replace_notification_settings(settings.clone())
      .await
      .map_err(Error::store)?;
    tracing::info!(auto_send = settings.auto_send_on_checkout, "notification settings replaced");
    Ok(settings)
  }

  /// The review-request log, most recent first.
  pub async fn review_requests(&self) -> Result<Vec<ReviewRequest>> {
    self.pause().await;
    let mut requests = self.store.list_review_requests().await.map_err(Error::store)?;
    requests.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
    Ok(requests)
  }

  /// Record guest feedback for an existing visit. Ratings run 1 to 5.
  pub async fn submit_review(&self, input: NewReview) -> Result<Review> {
    self.pause().await;
    if !(1..=5).contains(&input.rating) {
      return Err(Error::Validation(format!(
        "rating must be between 1 and 5, got {}",
        input.rating
      )));
    }
    if self
      .store
      .get_visit(input.visit_id)
      .await
      .map_err(Error::store)?
      .is_none()
    {
      return Err(Error::not_found(Entity::Visit, input.visit_id));
    }

    let review = Review {
      visit_id:     input.visit_id,
      rating:       input.rating,
      comment:      input.comment,
      submitted_at: Utc::now(),
    };
    self.store.insert_review(review.clone()).await.map_err(Error::store)?;
    tracing::info!(visit_id = %review.visit_id, rating = review.rating, "review submitted");
    Ok(review)
  }

  pub async fn reviews(&self) -> Result<Vec<Review>> {
    self.pause().await;
    self.store.list_reviews().await.map_err(Error::store)
  }
}

fn already_sent(visit_id: Uuid) -> Error {
  Error::Conflict(format!("review request already sent for visit {visit_id}"))
}

fn sort_by_check_in_desc(visits: &mut [Visit]) {
  visits.sort_by(|a, b| b.check_in_ts.cmp(&a.check_in_ts));
}

/// Tell the host a guest has arrived, and tell the guest the host knows.
async fn announce_check_in<S, N>(store: &S, notifier: &N, visit: &Visit) -> Result<()>
where
  S: LedgerStore,
  N: Notifier,
{
  let guest = store.get_guest(visit.guest_id).await.map_err(Error::store)?;
  let guest_name = guest.as_ref().map_or("A guest", |g| g.name.as_str());

  notifier
    .deliver(Notice {
      kind:      NoticeKind::CheckIn,
      recipient: Recipient::Host(visit.host.clone()),
      body:      format!("{guest_name} has checked in to see you. Reason: {}", visit.reason),
    })
    .await
    .map_err(Error::store)?;

  if let Some(guest) = guest {
    let recipient = guest_recipient(&guest, review_channel(&guest));
    if !matches!(&recipient, Recipient::Email(a) | Recipient::Sms(a) if a.is_empty()) {
      notifier
        .deliver(Notice {
          kind: NoticeKind::CheckIn,
          recipient,
          body: format!("Welcome, {}. {} has been told you are here.", guest.name, visit.host),
        })
        .await
        .map_err(Error::store)?;
    }
  }

  Ok(())
}
