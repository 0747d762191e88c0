//! Read models assembled at query time.
//!
//! A [`VisitView`] is never stored; the ledger builds it by joining a
//! [`Visit`] against the guest and user collections.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Guest, User, Visit};

/// A visit joined with the records it references, for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitView {
  #[serde(flatten)]
  pub visit:              Visit,
  /// `None` when the referenced guest no longer resolves.
  pub guest:              Option<Guest>,
  pub checked_in_by_user: Option<User>,
}

/// Lookup tables for joining visits, built once per query.
pub(crate) struct Join {
  guests: HashMap<Uuid, Guest>,
  users:  HashMap<Uuid, User>,
}

impl Join {
  pub(crate) fn new(guests: Vec<Guest>, users: Vec<User>) -> Self {
    Self {
      guests: guests.into_iter().map(|g| (g.id, g)).collect(),
      users:  users.into_iter().map(|u| (u.id, u)).collect(),
    }
  }

  pub(crate) fn view(&self, visit: Visit) -> VisitView {
    VisitView {
      guest: self.guests.get(&visit.guest_id).cloned(),
      checked_in_by_user: self.users.get(&visit.checked_in_by).cloned(),
      visit,
    }
  }
}
