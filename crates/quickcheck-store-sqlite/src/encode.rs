//! Encoding and decoding helpers between ledger types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings and UUIDs as hyphenated
//! lowercase strings. Visit custom field values are stored as compact JSON.

use chrono::{DateTime, Utc};
use quickcheck_core::model::{
  Appointment, AppointmentStatus, ApprovalStatus, Channel, CustomField,
  CustomFieldType, CustomValues, Guest, Host, Review, ReviewRequest, Role,
  User, Visit,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

fn unknown(column: &'static str, value: &str) -> Error {
  Error::UnknownVariant { column, value: value.to_owned() }
}

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::Admin => "admin",
    Role::Guard => "guard",
    Role::Host => "host",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "admin" => Ok(Role::Admin),
    "guard" => Ok(Role::Guard),
    "host" => Ok(Role::Host),
    other => Err(unknown("role", other)),
  }
}

pub fn encode_approval(a: ApprovalStatus) -> &'static str {
  match a {
    ApprovalStatus::Pending => "pending",
    ApprovalStatus::Approved => "approved",
  }
}

pub fn decode_approval(s: &str) -> Result<ApprovalStatus> {
  match s {
    "pending" => Ok(ApprovalStatus::Pending),
    "approved" => Ok(ApprovalStatus::Approved),
    other => Err(unknown("approval_status", other)),
  }
}

pub fn encode_appointment_status(s: AppointmentStatus) -> &'static str {
  match s {
    AppointmentStatus::Scheduled => "scheduled",
    AppointmentStatus::Arrived => "arrived",
  }
}

pub fn decode_appointment_status(s: &str) -> Result<AppointmentStatus> {
  match s {
    "scheduled" => Ok(AppointmentStatus::Scheduled),
    "arrived" => Ok(AppointmentStatus::Arrived),
    other => Err(unknown("status", other)),
  }
}

pub fn encode_field_kind(k: CustomFieldType) -> &'static str {
  match k {
    CustomFieldType::Text => "text",
    CustomFieldType::Number => "number",
    CustomFieldType::Checkbox => "checkbox",
  }
}

pub fn decode_field_kind(s: &str) -> Result<CustomFieldType> {
  match s {
    "text" => Ok(CustomFieldType::Text),
    "number" => Ok(CustomFieldType::Number),
    "checkbox" => Ok(CustomFieldType::Checkbox),
    other => Err(unknown("kind", other)),
  }
}

pub fn encode_channel(c: Channel) -> &'static str {
  match c {
    Channel::Email => "email",
    Channel::Sms => "sms",
  }
}

pub fn decode_channel(s: &str) -> Result<Channel> {
  match s {
    "email" => Ok(Channel::Email),
    "sms" => Ok(Channel::Sms),
    other => Err(unknown("channel", other)),
  }
}

// ─── Custom values ───────────────────────────────────────────────────────────

pub fn encode_custom_values(v: &CustomValues) -> Result<String> {
  Ok(serde_json::to_string(v)?)
}

pub fn decode_custom_values(s: &str) -> Result<CustomValues> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id: String,
  pub name:    String,
  pub role:    String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:   decode_uuid(&self.user_id)?,
      name: self.name,
      role: decode_role(&self.role)?,
    })
  }
}

/// Raw strings read directly from a `hosts` row.
pub struct RawHost {
  pub host_id:    String,
  pub name:       String,
  pub department: String,
}

impl RawHost {
  pub fn into_host(self) -> Result<Host> {
    Ok(Host {
      id:         decode_uuid(&self.host_id)?,
      name:       self.name,
      department: self.department,
    })
  }
}

/// Raw values read directly from a `guests` row.
pub struct RawGuest {
  pub guest_id:   String,
  pub name:       String,
  pub id_number:  String,
  pub phone:      String,
  pub email:      String,
  pub consent:    bool,
  pub created_at: String,
}

impl RawGuest {
  pub fn into_guest(self) -> Result<Guest> {
    Ok(Guest {
      id:         decode_uuid(&self.guest_id)?,
      name:       self.name,
      id_number:  self.id_number,
      phone:      self.phone,
      email:      self.email,
      consent:    self.consent,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `visits` row.
pub struct RawVisit {
  pub visit_id:            String,
  pub guest_id:            String,
  pub check_in_ts:         String,
  pub check_out_ts:        Option<String>,
  pub host:                String,
  pub reason:              String,
  pub device_info:         String,
  pub custom_fields:       String,
  pub checked_in_by:       String,
  pub approval_status:     String,
  pub review_request_sent: bool,
}

impl RawVisit {
  pub fn into_visit(self) -> Result<Visit> {
    let check_out_ts = self.check_out_ts.as_deref().map(decode_dt).transpose()?;

    Ok(Visit {
      id: decode_uuid(&self.visit_id)?,
      guest_id: decode_uuid(&self.guest_id)?,
      check_in_ts: decode_dt(&self.check_in_ts)?,
      check_out_ts,
      host: self.host,
      reason: self.reason,
      device_info: self.device_info,
      custom_fields: decode_custom_values(&self.custom_fields)?,
      checked_in_by: decode_uuid(&self.checked_in_by)?,
      approval_status: decode_approval(&self.approval_status)?,
      review_request_sent: self.review_request_sent,
    })
  }
}

/// Raw strings read directly from an `appointments` row.
pub struct RawAppointment {
  pub appointment_id:  String,
  pub guest_name:      String,
  pub guest_id_number: String,
  pub host_id:         String,
  pub created_at:      String,
  pub status:          String,
}

impl RawAppointment {
  pub fn into_appointment(self) -> Result<Appointment> {
    Ok(Appointment {
      id:              decode_uuid(&self.appointment_id)?,
      guest_name:      self.guest_name,
      guest_id_number: self.guest_id_number,
      host_id:         decode_uuid(&self.host_id)?,
      created_at:      decode_dt(&self.created_at)?,
      status:          decode_appointment_status(&self.status)?,
    })
  }
}

/// Raw strings read directly from a `custom_fields` row.
pub struct RawCustomField {
  pub field_id: String,
  pub name:     String,
  pub label:    String,
  pub kind:     String,
}

impl RawCustomField {
  pub fn into_field(self) -> Result<CustomField> {
    Ok(CustomField {
      id:    decode_uuid(&self.field_id)?,
      name:  self.name,
      label: self.label,
      kind:  decode_field_kind(&self.kind)?,
    })
  }
}

/// Raw strings read directly from a `review_requests` row.
pub struct RawReviewRequest {
  pub request_id: String,
  pub visit_id:   String,
  pub guest_name: String,
  pub channel:    String,
  pub sent_at:    String,
}

impl RawReviewRequest {
  pub fn into_request(self) -> Result<ReviewRequest> {
    Ok(ReviewRequest {
      id:         decode_uuid(&self.request_id)?,
      visit_id:   decode_uuid(&self.visit_id)?,
      guest_name: self.guest_name,
      channel:    decode_channel(&self.channel)?,
      sent_at:    decode_dt(&self.sent_at)?,
    })
  }
}

/// Raw values read directly from a `reviews` row.
pub struct RawReview {
  pub visit_id:     String,
  pub rating:       u8,
  pub comment:      String,
  pub submitted_at: String,
}

impl RawReview {
  pub fn into_review(self) -> Result<Review> {
    Ok(Review {
      visit_id:     decode_uuid(&self.visit_id)?,
      rating:       self.rating,
      comment:      self.comment,
      submitted_at: decode_dt(&self.submitted_at)?,
    })
  }
}
