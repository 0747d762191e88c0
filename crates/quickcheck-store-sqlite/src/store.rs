//! [`SqliteStore`], the SQLite implementation of [`LedgerStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use quickcheck_core::{
  model::{
    Appointment, CustomField, Guest, Host, NotificationSettings, Review,
    ReviewRequest, User, Visit, VisitUpdate,
  },
  store::{LedgerStore, ReviewClaim},
};

use crate::{
  encode::{
    encode_appointment_status, encode_approval, encode_channel,
    encode_custom_values, encode_dt, encode_field_kind, encode_role,
    encode_uuid, RawAppointment, RawCustomField, RawGuest, RawHost, RawReview,
    RawReviewRequest, RawUser, RawVisit,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Row mapping ─────────────────────────────────────────────────────────────

const GUEST_COLUMNS: &str =
  "guest_id, name, id_number, phone, email, consent, created_at";

const VISIT_COLUMNS: &str = "visit_id, guest_id, check_in_ts, check_out_ts, \
                             host, reason, device_info, custom_fields, \
                             checked_in_by, approval_status, review_request_sent";

fn guest_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawGuest> {
  Ok(RawGuest {
    guest_id:   row.get(0)?,
    name:       row.get(1)?,
    id_number:  row.get(2)?,
    phone:      row.get(3)?,
    email:      row.get(4)?,
    consent:    row.get(5)?,
    created_at: row.get(6)?,
  })
}

fn visit_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawVisit> {
  Ok(RawVisit {
    visit_id:            row.get(0)?,
    guest_id:            row.get(1)?,
    check_in_ts:         row.get(2)?,
    check_out_ts:        row.get(3)?,
    host:                row.get(4)?,
    reason:              row.get(5)?,
    device_info:         row.get(6)?,
    custom_fields:       row.get(7)?,
    checked_in_by:       row.get(8)?,
    approval_status:     row.get(9)?,
    review_request_sent: row.get(10)?,
  })
}

fn select_visit(
  conn: &rusqlite::Connection,
  id: &str,
) -> rusqlite::Result<Option<RawVisit>> {
  conn
    .query_row(
      &format!("SELECT {VISIT_COLUMNS} FROM visits WHERE visit_id = ?1"),
      rusqlite::params![id],
      visit_row,
    )
    .optional()
}

/// [`ReviewClaim`] before the visit row has been decoded.
enum RawClaim {
  Claimed(RawVisit),
  AlreadySent,
  VisitMissing,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A visit ledger backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All calls
/// run on the connection's own thread one at a time, and the read-then-write
/// operations additionally run inside a transaction.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let defaults = NotificationSettings::default();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(SCHEMA)?;
        conn.execute(
          "INSERT OR IGNORE INTO notification_settings
             (id, auto_send_on_checkout, email_template, sms_template)
           VALUES (1, ?1, ?2, ?3)",
          rusqlite::params![
            defaults.auto_send_on_checkout,
            defaults.email_template,
            defaults.sms_template,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_guests_raw(&self) -> Result<Vec<RawGuest>> {
    let raws = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {GUEST_COLUMNS} FROM guests ORDER BY rowid"))?;
        let rows = stmt
          .query_map([], guest_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(raws)
  }
}

// ─── LedgerStore impl ────────────────────────────────────────────────────────

impl LedgerStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT user_id, name, role FROM users ORDER BY rowid")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawUser {
              user_id: row.get(0)?,
              name:    row.get(1)?,
              role:    row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn insert_user(&self, user: User) -> Result<()> {
    let id_str   = encode_uuid(user.id);
    let role_str = encode_role(user.role);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, name, role) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, user.name, role_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Hosts ─────────────────────────────────────────────────────────────────

  async fn list_hosts(&self) -> Result<Vec<Host>> {
    let raws: Vec<RawHost> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT host_id, name, department FROM hosts ORDER BY rowid")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawHost {
              host_id:    row.get(0)?,
              name:       row.get(1)?,
              department: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHost::into_host).collect()
  }

  async fn insert_host(&self, host: Host) -> Result<()> {
    let id_str = encode_uuid(host.id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO hosts (host_id, name, department) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, host.name, host.department],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Guests ────────────────────────────────────────────────────────────────

  async fn list_guests(&self) -> Result<Vec<Guest>> {
    let raws = self.list_guests_raw().await?;
    raws.into_iter().map(RawGuest::into_guest).collect()
  }

  async fn get_guest(&self, id: Uuid) -> Result<Option<Guest>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawGuest> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {GUEST_COLUMNS} FROM guests WHERE guest_id = ?1"),
            rusqlite::params![id_str],
            guest_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawGuest::into_guest).transpose()
  }

  // SQLite's `lower()` only folds ASCII, so the comparison happens here to
  // match the in-memory store exactly.
  async fn find_guest_by_id_number<'a>(
    &'a self,
    id_number: &'a str,
  ) -> Result<Option<Guest>> {
    let needle = id_number.to_lowercase();
    let raws = self.list_guests_raw().await?;

    raws
      .into_iter()
      .find(|g| g.id_number.to_lowercase() == needle)
      .map(RawGuest::into_guest)
      .transpose()
  }

  async fn insert_guest(&self, guest: Guest) -> Result<()> {
    let id_str = encode_uuid(guest.id);
    let at_str = encode_dt(guest.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO guests (
             guest_id, name, id_number, phone, email, consent, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            guest.name,
            guest.id_number,
            guest.phone,
            guest.email,
            guest.consent,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Visits ────────────────────────────────────────────────────────────────

  async fn list_visits(&self) -> Result<Vec<Visit>> {
    let raws: Vec<RawVisit> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {VISIT_COLUMNS} FROM visits ORDER BY rowid"))?;
        let rows = stmt
          .query_map([], visit_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVisit::into_visit).collect()
  }

  async fn get_visit(&self, id: Uuid) -> Result<Option<Visit>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| Ok(select_visit(conn, &id_str)?))
      .await?;

    raw.map(RawVisit::into_visit).transpose()
  }

  async fn insert_visit(&self, visit: Visit) -> Result<()> {
    let id_str        = encode_uuid(visit.id);
    let guest_id_str  = encode_uuid(visit.guest_id);
    let in_str        = encode_dt(visit.check_in_ts);
    let out_str       = visit.check_out_ts.map(encode_dt);
    let custom_str    = encode_custom_values(&visit.custom_fields)?;
    let by_str        = encode_uuid(visit.checked_in_by);
    let approval_str  = encode_approval(visit.approval_status);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO visits ({VISIT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
          ),
          rusqlite::params![
            id_str,
            guest_id_str,
            in_str,
            out_str,
            visit.host,
            visit.reason,
            visit.device_info,
            custom_str,
            by_str,
            approval_str,
            visit.review_request_sent,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn update_visit(&self, id: Uuid, update: VisitUpdate) -> Result<Option<Visit>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = match update {
          VisitUpdate::CheckOut(at) => tx.execute(
            "UPDATE visits SET check_out_ts = ?2 WHERE visit_id = ?1",
            rusqlite::params![id_str, encode_dt(at)],
          )?,
          VisitUpdate::Approve => tx.execute(
            "UPDATE visits SET approval_status = 'approved' WHERE visit_id = ?1",
            rusqlite::params![id_str],
          )?,
        };
        if changed == 0 {
          return Ok(None);
        }
        let raw = select_visit(&tx, &id_str)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawVisit::into_visit).transpose()
  }

  // ── Review requests ───────────────────────────────────────────────────────

  async fn claim_review_request(&self, request: ReviewRequest) -> Result<ReviewClaim> {
    let request_id_str = encode_uuid(request.id);
    let visit_id_str   = encode_uuid(request.visit_id);
    let channel_str    = encode_channel(request.channel);
    let sent_at_str    = encode_dt(request.sent_at);
    let guest_name     = request.guest_name;

    let claim = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let sent: Option<bool> = tx
          .query_row(
            "SELECT review_request_sent FROM visits WHERE visit_id = ?1",
            rusqlite::params![visit_id_str],
            |r| r.get(0),
          )
          .optional()?;

        match sent {
          None => return Ok(RawClaim::VisitMissing),
          Some(true) => return Ok(RawClaim::AlreadySent),
          Some(false) => {}
        }

        tx.execute(
          "UPDATE visits SET review_request_sent = 1 WHERE visit_id = ?1",
          rusqlite::params![visit_id_str],
        )?;
        tx.execute(
          "INSERT INTO review_requests (request_id, visit_id, guest_name, channel, sent_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![request_id_str, visit_id_str, guest_name, channel_str, sent_at_str],
        )?;
        let raw = select_visit(&tx, &visit_id_str)?;
        tx.commit()?;

        Ok(raw.map_or(RawClaim::VisitMissing, RawClaim::Claimed))
      })
      .await?;

    Ok(match claim {
      RawClaim::Claimed(raw) => ReviewClaim::Claimed(raw.into_visit()?),
      RawClaim::AlreadySent => ReviewClaim::AlreadySent,
      RawClaim::VisitMissing => ReviewClaim::VisitMissing,
    })
  }

  async fn list_review_requests(&self) -> Result<Vec<ReviewRequest>> {
    let raws: Vec<RawReviewRequest> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT request_id, visit_id, guest_name, channel, sent_at
           FROM review_requests ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawReviewRequest {
              request_id: row.get(0)?,
              visit_id:   row.get(1)?,
              guest_name: row.get(2)?,
              channel:    row.get(3)?,
              sent_at:    row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReviewRequest::into_request).collect()
  }

  // ── Appointments ──────────────────────────────────────────────────────────

  async fn list_appointments(&self) -> Result<Vec<Appointment>> {
    let raws: Vec<RawAppointment> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT appointment_id, guest_name, guest_id_number, host_id, created_at, status
           FROM appointments ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawAppointment {
              appointment_id:  row.get(0)?,
              guest_name:      row.get(1)?,
              guest_id_number: row.get(2)?,
              host_id:         row.get(3)?,
              created_at:      row.get(4)?,
              status:          row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAppointment::into_appointment).collect()
  }

  async fn insert_appointment(&self, appointment: Appointment) -> Result<()> {
    let id_str      = encode_uuid(appointment.id);
    let host_id_str = encode_uuid(appointment.host_id);
    let at_str      = encode_dt(appointment.created_at);
    let status_str  = encode_appointment_status(appointment.status);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO appointments (
             appointment_id, guest_name, guest_id_number, host_id, created_at, status
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            id_str,
            appointment.guest_name,
            appointment.guest_id_number,
            host_id_str,
            at_str,
            status_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Custom fields ─────────────────────────────────────────────────────────

  async fn list_custom_fields(&self) -> Result<Vec<CustomField>> {
    let raws: Vec<RawCustomField> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT field_id, name, label, kind FROM custom_fields ORDER BY rowid")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawCustomField {
              field_id: row.get(0)?,
              name:     row.get(1)?,
              label:    row.get(2)?,
              kind:     row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCustomField::into_field).collect()
  }

  async fn insert_custom_field(&self, field: CustomField) -> Result<()> {
    let id_str   = encode_uuid(field.id);
    let kind_str = encode_field_kind(field.kind);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO custom_fields (field_id, name, label, kind) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, field.name, field.label, kind_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Settings ──────────────────────────────────────────────────────────────

  async fn notification_settings(&self) -> Result<NotificationSettings> {
    let settings = self
      .conn
      .call(|conn| {
        Ok(conn
          .query_row(
            "SELECT auto_send_on_checkout, email_template, sms_template
             FROM notification_settings WHERE id = 1",
            [],
            |row| {
              Ok(NotificationSettings {
                auto_send_on_checkout: row.get(0)?,
                email_template:        row.get(1)?,
                sms_template:          row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    Ok(settings.unwrap_or_default())
  }

  async fn replace_notification_settings(&self, settings: NotificationSettings) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO notification_settings
             (id, auto_send_on_checkout, email_template, sms_template)
           VALUES (1, ?1, ?2, ?3)",
          rusqlite::params![
            settings.auto_send_on_checkout,
            settings.email_template,
            settings.sms_template,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Reviews ───────────────────────────────────────────────────────────────

  async fn insert_review(&self, review: Review) -> Result<()> {
    let visit_id_str = encode_uuid(review.visit_id);
    let at_str       = encode_dt(review.submitted_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO reviews (visit_id, rating, comment, submitted_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![visit_id_str, review.rating, review.comment, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_reviews(&self) -> Result<Vec<Review>> {
    let raws: Vec<RawReview> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT visit_id, rating, comment, submitted_at FROM reviews ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawReview {
              visit_id:     row.get(0)?,
              rating:       row.get(1)?,
              comment:      row.get(2)?,
              submitted_at: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReview::into_review).collect()
  }
}
