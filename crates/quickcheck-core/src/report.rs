//! CSV export of the visit log.

use crate::{Result, view::VisitView};

const HEADERS: [&str; 8] = [
  "Visitor Name",
  "ID Number",
  "Check-in Time",
  "Check-out Time",
  "Host",
  "Reason",
  "Checked In By",
  "Review Request Sent",
];

/// Render `visits` as CSV, one row per visit in the given order. Every field
/// is quoted; missing joins render as empty fields.
pub fn visit_log_csv(visits: &[VisitView]) -> Result<String> {
  let mut writer = csv::WriterBuilder::new()
    .quote_style(csv::QuoteStyle::Always)
    .from_writer(Vec::new());

  writer.write_record(HEADERS)?;
  for v in visits {
    let guest = v.guest.as_ref();
    writer.write_record([
      guest.map_or("", |g| g.name.as_str()),
      guest.map_or("", |g| g.id_number.as_str()),
      v.visit.check_in_ts.to_rfc3339().as_str(),
      v.visit
        .check_out_ts
        .map_or_else(|| "Active".to_owned(), |out| out.to_rfc3339())
        .as_str(),
      v.visit.host.as_str(),
      v.visit.reason.as_str(),
      v.checked_in_by_user.as_ref().map_or("", |u| u.name.as_str()),
      if v.visit.review_request_sent { "Yes" } else { "No" },
    ])?;
  }

  let bytes = writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
  Ok(String::from_utf8_lossy(&bytes).into_owned())
}
