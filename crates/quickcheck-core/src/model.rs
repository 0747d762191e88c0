//! Stored entities of the visit ledger.
//!
//! These are the raw records a [`crate::store::LedgerStore`] persists. Display
//! joins live in [`crate::view`]; a stored record never carries joined data.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── People ──────────────────────────────────────────────────────────────────

/// What a staff account is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Guard,
  Host,
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Admin => "admin",
      Self::Guard => "guard",
      Self::Host => "host",
    })
  }
}

/// A staff account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:   Uuid,
  pub name: String,
  pub role: Role,
}

/// A person or desk that guests can be checked in to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
  pub id:         Uuid,
  pub name:       String,
  pub department: String,
}

/// An external visitor, tracked across visits by their identity document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
  pub id:         Uuid,
  pub name:       String,
  /// Identity document number; matched case-insensitively.
  pub id_number:  String,
  pub phone:      String,
  pub email:      String,
  pub consent:    bool,
  pub created_at: DateTime<Utc>,
}

// ─── Appointments ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
  #[default]
  Scheduled,
  /// Defined for completeness; no ledger operation produces it.
  Arrived,
}

/// A visit announced ahead of time by a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
  pub id:              Uuid,
  pub guest_name:      String,
  pub guest_id_number: String,
  /// The [`User`] id of the host who scheduled it.
  pub host_id:         Uuid,
  pub created_at:      DateTime<Utc>,
  pub status:          AppointmentStatus,
}

// ─── Visits ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
  #[default]
  Pending,
  Approved,
}

/// Values captured for admin-defined custom fields, keyed by field name.
pub type CustomValues = BTreeMap<String, serde_json::Value>;

/// One guest's presence on the premises.
///
/// A visit is active while `check_out_ts` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
  pub id:                  Uuid,
  pub guest_id:            Uuid,
  pub check_in_ts:         DateTime<Utc>,
  pub check_out_ts:        Option<DateTime<Utc>>,
  /// Free-text host name; not a reference to a [`Host`] record.
  pub host:                String,
  pub reason:              String,
  pub device_info:         String,
  pub custom_fields:       CustomValues,
  /// The [`User`] id of the staff member who checked the guest in.
  pub checked_in_by:       Uuid,
  pub approval_status:     ApprovalStatus,
  /// Only ever flips from `false` to `true`.
  pub review_request_sent: bool,
}

impl Visit {
  pub fn is_active(&self) -> bool { self.check_out_ts.is_none() }
}

/// A narrow mutation applied to a stored visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitUpdate {
  CheckOut(DateTime<Utc>),
  Approve,
}

impl VisitUpdate {
  /// Apply the mutation in place.
  pub fn apply(self, visit: &mut Visit) {
    match self {
      Self::CheckOut(at) => visit.check_out_ts = Some(at),
      Self::Approve => visit.approval_status = ApprovalStatus::Approved,
    }
  }
}

// ─── Custom fields ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomFieldType {
  Text,
  Number,
  Checkbox,
}

/// An extra check-in form field defined by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
  pub id:    Uuid,
  /// Machine key used in [`Visit::custom_fields`].
  pub name:  String,
  pub label: String,
  #[serde(rename = "type")]
  pub kind:  CustomFieldType,
}

/// Derive a machine key from a human label: lowercase, every whitespace run
/// (leading and trailing ones included) replaced by a single `_`.
pub fn field_name_from_label(label: &str) -> String {
  let mut name = String::with_capacity(label.len());
  let mut in_gap = false;
  for c in label.to_lowercase().chars() {
    if c.is_whitespace() {
      if !in_gap {
        name.push('_');
      }
      in_gap = true;
    } else {
      name.push(c);
      in_gap = false;
    }
  }
  name
}

// ─── Notifications ───────────────────────────────────────────────────────────

pub const GUEST_NAME_TOKEN: &str = "{{GUEST_NAME}}";
pub const REVIEW_LINK_TOKEN: &str = "{{REVIEW_LINK}}";

const DEFAULT_EMAIL_TEMPLATE: &str = "Hi {{GUEST_NAME}},\n\nThanks for visiting us! We'd love to get your feedback.\n\nPlease complete our short survey here: {{REVIEW_LINK}}\n\nBest,\nThe Team";
const DEFAULT_SMS_TEMPLATE: &str = "Hi {{GUEST_NAME}}, thanks for visiting! Please give us your feedback here: {{REVIEW_LINK}}";

/// The singleton notification configuration. Always replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
  pub auto_send_on_checkout: bool,
  pub email_template:        String,
  pub sms_template:          String,
}

impl Default for NotificationSettings {
  fn default() -> Self {
    Self {
      auto_send_on_checkout: false,
      email_template:        DEFAULT_EMAIL_TEMPLATE.to_owned(),
      sms_template:          DEFAULT_SMS_TEMPLATE.to_owned(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
  Email,
  Sms,
}

/// Log entry recording that a review request went out for a visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
  pub id:         Uuid,
  pub visit_id:   Uuid,
  /// Copied from the guest at send time.
  pub guest_name: String,
  pub channel:    Channel,
  pub sent_at:    DateTime<Utc>,
}

/// Feedback left by a guest after a visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
  pub visit_id:     Uuid,
  /// 1 to 5 stars.
  pub rating:       u8,
  pub comment:      String,
  pub submitted_at: DateTime<Utc>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────
//
// Server-assigned fields (ids, timestamps, initial statuses) are never
// accepted from callers.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
  pub name: String,
  pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHost {
  pub name:       String,
  pub department: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewGuest {
  pub name:      String,
  pub id_number: String,
  #[serde(default)]
  pub phone:     String,
  #[serde(default)]
  pub email:     String,
  #[serde(default)]
  pub consent:   bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVisit {
  pub guest_id:      Uuid,
  /// Falls back to `"Reception"` when empty.
  #[serde(default)]
  pub host:          String,
  #[serde(default)]
  pub reason:        String,
  #[serde(default)]
  pub device_info:   String,
  #[serde(default)]
  pub custom_fields: CustomValues,
  pub checked_in_by: Uuid,
}

/// Everything the check-in desk captures in one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckIn {
  pub guest:         NewGuest,
  #[serde(default)]
  pub host:          String,
  #[serde(default)]
  pub reason:        String,
  #[serde(default)]
  pub device_info:   String,
  #[serde(default)]
  pub custom_fields: CustomValues,
  pub checked_in_by: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
  pub guest_name:      String,
  pub guest_id_number: String,
  pub host_id:         Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomField {
  /// Derived from `label` when empty.
  #[serde(default)]
  pub name:  String,
  pub label: String,
  #[serde(rename = "type")]
  pub kind:  CustomFieldType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
  pub visit_id: Uuid,
  pub rating:   u8,
  #[serde(default)]
  pub comment:  String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn field_name_is_derived_from_label() {
    assert_eq!(field_name_from_label("Company Name"), "company_name");
    assert_eq!(field_name_from_label(" Has  Appointment "), "_has_appointment_");
    assert_eq!(field_name_from_label("Badge\tNo"), "badge_no");
  }

  #[test]
  fn custom_field_type_serializes_under_type_key() {
    let json = serde_json::to_value(NewCustomField {
      name:  String::new(),
      label: "Badge".into(),
      kind:  CustomFieldType::Checkbox,
    })
    .unwrap();
    assert_eq!(json["type"], "checkbox");
  }

  #[test]
  fn visit_update_sets_fields() {
    let mut visit = Visit {
      id:                  Uuid::new_v4(),
      guest_id:            Uuid::new_v4(),
      check_in_ts:         Utc::now(),
      check_out_ts:        None,
      host:                "Alice".into(),
      reason:              String::new(),
      device_info:         String::new(),
      custom_fields:       CustomValues::new(),
      checked_in_by:       Uuid::new_v4(),
      approval_status:     ApprovalStatus::Pending,
      review_request_sent: false,
    };
    let at = Utc::now();
    VisitUpdate::CheckOut(at).apply(&mut visit);
    VisitUpdate::Approve.apply(&mut visit);
    assert_eq!(visit.check_out_ts, Some(at));
    assert_eq!(visit.approval_status, ApprovalStatus::Approved);
    assert!(!visit.is_active());
  }
}
