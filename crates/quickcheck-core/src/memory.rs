//! [`MemoryStore`], an in-process [`LedgerStore`] over plain vectors.
//!
//! Every collection sits behind one [`RwLock`], so each trait method sees and
//! leaves a consistent snapshot. Nothing survives a restart.

use std::convert::Infallible;

use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
  model::{
    Appointment, AppointmentStatus, ApprovalStatus, Channel, CustomField,
    CustomFieldType, CustomValues, Guest, Host, NotificationSettings, Review,
    ReviewRequest, Role, User, Visit, VisitUpdate,
  },
  store::{LedgerStore, ReviewClaim},
};

#[derive(Default)]
struct Tables {
  users:           Vec<User>,
  hosts:           Vec<Host>,
  guests:          Vec<Guest>,
  visits:          Vec<Visit>,
  appointments:    Vec<Appointment>,
  custom_fields:   Vec<CustomField>,
  settings:        NotificationSettings,
  review_requests: Vec<ReviewRequest>,
  reviews:         Vec<Review>,
}

/// A ledger store that lives entirely in memory.
#[derive(Default)]
pub struct MemoryStore {
  tables: RwLock<Tables>,
}

impl MemoryStore {
  /// An empty store with default notification settings.
  pub fn new() -> Self { Self::default() }

  /// A store pre-populated with the demo data the front desk ships with:
  /// one account per role, a returning guest with three visits, four hosts,
  /// two custom fields, a scheduled appointment and one logged review request.
  pub fn seeded() -> Self {
    let now = Utc::now();

    let admin = user("Admin User", Role::Admin);
    let guard = user("Guard User", Role::Guard);
    let host_user = user("Host User", Role::Host);

    let john = Guest {
      id:         Uuid::new_v4(),
      name:       "John Doe".into(),
      id_number:  "G1234567X".into(),
      phone:      "91234567".into(),
      email:      "john.doe@example.com".into(),
      consent:    true,
      created_at: now,
    };

    let visit = |hours_in: i64,
                 hours_out: Option<i64>,
                 host: &str,
                 reason: &str,
                 device: &str,
                 approval: ApprovalStatus,
                 sent: bool| Visit {
      id:                  Uuid::new_v4(),
      guest_id:            john.id,
      check_in_ts:         now - Duration::hours(hours_in),
      check_out_ts:        hours_out.map(|h| now - Duration::hours(h)),
      host:                host.into(),
      reason:              reason.into(),
      device_info:         device.into(),
      custom_fields:       CustomValues::new(),
      checked_in_by:       guard.id,
      approval_status:     approval,
      review_request_sent: sent,
    };

    let meeting = visit(3, Some(2), "Alice", "Meeting", "MacBook Pro", ApprovalStatus::Approved, true);
    let interview = visit(1, None, "Bob", "Interview", "", ApprovalStatus::Pending, false);
    let demo = visit(5, Some(4), "Host User", "Demo", "iPad", ApprovalStatus::Pending, false);

    let review_request = ReviewRequest {
      id:         Uuid::new_v4(),
      visit_id:   meeting.id,
      guest_name: john.name.clone(),
      channel:    Channel::Email,
      sent_at:    now - Duration::hours(2),
    };

    let appointment = Appointment {
      id:              Uuid::new_v4(),
      guest_name:      "Scheduled Guest".into(),
      guest_id_number: "S1234567A".into(),
      host_id:         host_user.id,
      created_at:      now,
      status:          AppointmentStatus::Scheduled,
    };

    let tables = Tables {
      users: vec![admin, guard, host_user],
      hosts: vec![
        host("Alice", "Engineering"),
        host("Bob", "Marketing"),
        host("Host User", "Product"),
        host("Reception", "Front Desk"),
      ],
      guests: vec![john],
      visits: vec![meeting, interview, demo],
      appointments: vec![appointment],
      custom_fields: vec![
        field("company", "Company Name", CustomFieldType::Text),
        field("has_appointment", "Has Appointment", CustomFieldType::Checkbox),
      ],
      settings: NotificationSettings::default(),
      review_requests: vec![review_request],
      reviews: Vec::new(),
    };

    Self { tables: RwLock::new(tables) }
  }
}

fn user(name: &str, role: Role) -> User {
  User { id: Uuid::new_v4(), name: name.into(), role }
}

fn host(name: &str, department: &str) -> Host {
  Host { id: Uuid::new_v4(), name: name.into(), department: department.into() }
}

fn field(name: &str, label: &str, kind: CustomFieldType) -> CustomField {
  CustomField { id: Uuid::new_v4(), name: name.into(), label: label.into(), kind }
}

impl LedgerStore for MemoryStore {
  type Error = Infallible;

  async fn list_users(&self) -> Result<Vec<User>, Infallible> {
    Ok(self.tables.read().await.users.clone())
  }

  async fn insert_user(&self, user: User) -> Result<(), Infallible> {
    self.tables.write().await.users.push(user);
    Ok(())
  }

  async fn list_hosts(&self) -> Result<Vec<Host>, Infallible> {
    Ok(self.tables.read().await.hosts.clone())
  }

  async fn insert_host(&self, host: Host) -> Result<(), Infallible> {
    self.tables.write().await.hosts.push(host);
    Ok(())
  }

  async fn list_guests(&self) -> Result<Vec<Guest>, Infallible> {
    Ok(self.tables.read().await.guests.clone())
  }

  async fn get_guest(&self, id: Uuid) -> Result<Option<Guest>, Infallible> {
    let tables = self.tables.read().await;
    Ok(tables.guests.iter().find(|g| g.id == id).cloned())
  }

  async fn find_guest_by_id_number<'a>(
    &'a self,
    id_number: &'a str,
  ) -> Result<Option<Guest>, Infallible> {
    let needle = id_number.to_lowercase();
    let tables = self.tables.read().await;
    Ok(
      tables
        .guests
        .iter()
        .find(|g| g.id_number.to_lowercase() == needle)
        .cloned(),
    )
  }

  async fn insert_guest(&self, guest: Guest) -> Result<(), Infallible> {
    self.tables.write().await.guests.push(guest);
    Ok(())
  }

  async fn list_visits(&self) -> Result<Vec<Visit>, Infallible> {
    Ok(self.tables.read().await.visits.clone())
  }

  async fn get_visit(&self, id: Uuid) -> Result<Option<Visit>, Infallible> {
    let tables = self.tables.read().await;
    Ok(tables.visits.iter().find(|v| v.id == id).cloned())
  }

  async fn insert_visit(&self, visit: Visit) -> Result<(), Infallible> {
    self.tables.write().await.visits.push(visit);
    Ok(())
  }

  async fn update_visit(
    &self,
    id: Uuid,
    update: VisitUpdate,
  ) -> Result<Option<Visit>, Infallible> {
    let mut tables = self.tables.write().await;
    Ok(tables.visits.iter_mut().find(|v| v.id == id).map(|visit| {
      update.apply(visit);
      visit.clone()
    }))
  }

  async fn claim_review_request(
    &self,
    request: ReviewRequest,
  ) -> Result<ReviewClaim, Infallible> {
    let mut tables = self.tables.write().await;
    let Some(visit) = tables.visits.iter_mut().find(|v| v.id == request.visit_id)
    else {
      return Ok(ReviewClaim::VisitMissing);
    };
    if visit.review_request_sent {
      return Ok(ReviewClaim::AlreadySent);
    }
    visit.review_request_sent = true;
    let updated = visit.clone();
    tables.review_requests.push(request);
    Ok(ReviewClaim::Claimed(updated))
  }

  async fn list_review_requests(&self) -> Result<Vec<ReviewRequest>, Infallible> {
    Ok(self.tables.read().await.review_requests.clone())
  }

  async fn list_appointments(&self) -> Result<Vec<Appointment>, Infallible> {
    Ok(self.tables.read().await.appointments.clone())
  }

  async fn insert_appointment(
    &self,
    appointment: Appointment,
  ) -> Result<(), Infallible> {
    self.tables.write().await.appointments.push(appointment);
    Ok(())
  }

  async fn list_custom_fields(&self) -> Result<Vec<CustomField>, Infallible> {
    Ok(self.tables.read().await.custom_fields.clone())
  }

  async fn insert_custom_field(&self, field: CustomField) -> Result<(), Infallible> {
    self.tables.write().await.custom_fields.push(field);
    Ok(())
  }

  async fn notification_settings(&self) -> Result<NotificationSettings, Infallible> {
    Ok(self.tables.read().await.settings.clone())
  }

  async fn replace_notification_settings(
    &self,
    settings: NotificationSettings,
  ) -> Result<(), Infallible> {
    self.tables.write().await.settings = settings;
    Ok(())
  }

  async fn insert_review(&self, review: Review) -> Result<(), Infallible> {
    self.tables.write().await.reviews.push(review);
    Ok(())
  }

  async fn list_reviews(&self) -> Result<Vec<Review>, Infallible> {
    Ok(self.tables.read().await.reviews.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn seeded_store_has_demo_records() {
    let store = MemoryStore::seeded();
    assert_eq!(store.list_users().await.unwrap().len(), 3);
    assert_eq!(store.list_hosts().await.unwrap().len(), 4);
    assert_eq!(store.list_visits().await.unwrap().len(), 3);
    assert_eq!(store.list_review_requests().await.unwrap().len(), 1);

    let john = store.find_guest_by_id_number("g1234567x").await.unwrap();
    assert_eq!(john.map(|g| g.name).as_deref(), Some("John Doe"));
  }

  #[tokio::test]
  async fn claim_is_rejected_once_flagged() {
    let store = MemoryStore::seeded();
    let visits = store.list_visits().await.unwrap();
    let already_sent = visits.iter().find(|v| v.review_request_sent).unwrap();

    let request = ReviewRequest {
      id:         Uuid::new_v4(),
      visit_id:   already_sent.id,
      guest_name: "John Doe".into(),
      channel:    Channel::Email,
      sent_at:    Utc::now(),
    };
    let claim = store.claim_review_request(request).await.unwrap();
    assert_eq!(claim, ReviewClaim::AlreadySent);
    assert_eq!(store.list_review_requests().await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn update_missing_visit_returns_none() {
    let store = MemoryStore::new();
    let result = store.update_visit(Uuid::new_v4(), VisitUpdate::Approve).await;
    assert_eq!(result.unwrap(), None);
  }
}
