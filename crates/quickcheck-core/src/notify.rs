//! Outbound notifications and the transport seam that delivers them.
//!
//! The ledger only decides *what* to say and *to whom*; a [`Notifier`]
//! performs delivery.

use std::{convert::Infallible, fmt, future::Future};

use serde::{Deserialize, Serialize};

use crate::model::{Channel, Guest, NotificationSettings, REVIEW_LINK_TOKEN, GUEST_NAME_TOKEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
  CheckIn,
  ReviewRequest,
}

/// Where a notice should go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "to", rename_all = "snake_case")]
pub enum Recipient {
  /// A host, addressed by display name.
  Host(String),
  Email(String),
  Sms(String),
}

impl fmt::Display for Recipient {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Host(name) => write!(f, "host {name}"),
      Self::Email(address) => write!(f, "email {address}"),
      Self::Sms(phone) => write!(f, "sms {phone}"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
  pub kind:      NoticeKind,
  pub recipient: Recipient,
  pub body:      String,
}

/// A delivery transport for [`Notice`]s.
pub trait Notifier: Send + Sync + 'static {
  type Error: std::error::Error + Send + Sync + 'static;

  fn deliver(
    &self,
    notice: Notice,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Writes every notice to the log instead of sending it anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
  type Error = Infallible;

  async fn deliver(&self, notice: Notice) -> Result<(), Infallible> {
    tracing::info!(
      kind = ?notice.kind,
      recipient = %notice.recipient,
      body = %notice.body,
      "delivering notice"
    );
    Ok(())
  }
}

// ─── Templating ──────────────────────────────────────────────────────────────

/// Email when the guest has one, otherwise SMS.
pub fn review_channel(guest: &Guest) -> Channel {
  if guest.email.is_empty() { Channel::Sms } else { Channel::Email }
}

/// Where a notice on `channel` reaches `guest`.
pub fn guest_recipient(guest: &Guest, channel: Channel) -> Recipient {
  match channel {
    Channel::Email => Recipient::Email(guest.email.clone()),
    Channel::Sms => Recipient::Sms(guest.phone.clone()),
  }
}

/// Fill a review-request template. Only the first occurrence of each token is
/// replaced, guest name first.
pub fn render_review_message(template: &str, guest_name: &str, review_link: &str) -> String {
  template
    .replacen(GUEST_NAME_TOKEN, guest_name, 1)
    .replacen(REVIEW_LINK_TOKEN, review_link, 1)
}

/// The configured template for `channel`.
pub fn template_for(settings: &NotificationSettings, channel: Channel) -> &str {
  match channel {
    Channel::Email => &settings.email_template,
    Channel::Sms => &settings.sms_template,
  }
}
