//! Front-desk dashboard figures derived from the visit log.
//!
//! Pure functions over a log snapshot; nothing here touches a store.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc, Weekday};
use serde::Serialize;

use crate::view::VisitView;

const DAY_MS: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Visitor count for one weekday bucket of the weekly trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
  /// Short weekday name, e.g. `"Mon"`.
  pub label:    &'static str,
  pub visitors: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
  /// Visits checked in since local midnight.
  pub today:     usize,
  /// Guests with more than one visit in the log.
  pub returning: usize,
  /// Host with the most visits today. Ties go to whichever host appears
  /// first in the input.
  pub top_host:  Option<String>,
  /// Seven buckets, oldest day first, ending with today.
  pub weekly:    Vec<DayCount>,
}

/// Summarise `visits` as seen at `now`, in `now`'s timezone.
///
/// `visits` is expected in log order (most recent check-in first); that order
/// decides top-host ties.
pub fn summarize<Tz: TimeZone>(visits: &[VisitView], now: DateTime<Tz>) -> DashboardSummary {
  let midnight = local_midnight(&now);
  let todays: Vec<&VisitView> = visits
    .iter()
    .filter(|v| v.visit.check_in_ts >= midnight)
    .collect();

  DashboardSummary {
    today:     todays.len(),
    returning: returning_guests(visits),
    top_host:  top_host(&todays),
    weekly:    weekly_trend(visits, &now),
  }
}

fn local_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
  let naive = now.date_naive().and_time(NaiveTime::MIN);
  now
    .timezone()
    .from_local_datetime(&naive)
    .earliest()
    .map(|d| d.with_timezone(&Utc))
    .unwrap_or_else(|| naive.and_utc())
}

fn returning_guests(visits: &[VisitView]) -> usize {
  let mut counts: std::collections::HashMap<uuid::Uuid, usize> = Default::default();
  for v in visits {
    *counts.entry(v.visit.guest_id).or_default() += 1;
  }
  counts.values().filter(|&&n| n > 1).count()
}

fn top_host(todays: &[&VisitView]) -> Option<String> {
  // Counted in first-seen order so ties resolve to the earliest host.
  let mut counts: Vec<(&str, usize)> = Vec::new();
  for v in todays {
    match counts.iter_mut().find(|(host, _)| *host == v.visit.host) {
      Some((_, n)) => *n += 1,
      None => counts.push((v.visit.host.as_str(), 1)),
    }
  }

  let mut best: Option<(&str, usize)> = None;
  for (host, n) in counts {
    if best.is_none_or(|(_, top)| n > top) {
      best = Some((host, n));
    }
  }
  best.map(|(host, _)| host.to_owned())
}

/// Buckets are matched by weekday name only, and any visit at most seven
/// (rounded-up) days old is counted. A visit from exactly a week ago therefore
/// lands in today's bucket.
fn weekly_trend<Tz: TimeZone>(visits: &[VisitView], now: &DateTime<Tz>) -> Vec<DayCount> {
  let today = now.date_naive();
  let mut buckets: Vec<DayCount> = (0..7)
    .rev()
    .map(|back| DayCount {
      label:    short_name((today - Duration::days(back)).weekday()),
      visitors: 0,
    })
    .collect();

  let tz = now.timezone();
  let now_utc = now.with_timezone(&Utc);
  for v in visits {
    let elapsed_ms = (now_utc - v.visit.check_in_ts).num_milliseconds() as f64;
    if (elapsed_ms / DAY_MS).ceil() > 7.0 {
      continue;
    }
    let label = short_name(v.visit.check_in_ts.with_timezone(&tz).weekday());
    if let Some(bucket) = buckets.iter_mut().find(|b| b.label == label) {
      bucket.visitors += 1;
    }
  }
  buckets
}

fn short_name(day: Weekday) -> &'static str {
  match day {
    Weekday::Mon => "Mon",
    Weekday::Tue => "Tue",
    Weekday::Wed => "Wed",
    Weekday::Thu => "Thu",
    Weekday::Fri => "Fri",
    Weekday::Sat => "Sat",
    Weekday::Sun => "Sun",
  }
}
