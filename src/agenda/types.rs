use chrono::{Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A single schedule entry as listed in the agenda.
///
/// Appointments round-trip through the local cache, so they serialize.
/// The cache treats them as opaque records: nothing below is interpreted
/// beyond the date used for grouping and invalidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
  pub id: String,
  pub date: NaiveDate,
  /// Start time in "HH:MM" as the backend sends it
  pub start: String,
  pub duration_min: u32,
  pub patient: String,
  pub procedure: Option<String>,
  pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
  Scheduled,
  Confirmed,
  Done,
  Cancelled,
}

impl AppointmentStatus {
  pub fn label(&self) -> &'static str {
    match self {
      AppointmentStatus::Scheduled => "scheduled",
      AppointmentStatus::Confirmed => "confirmed",
      AppointmentStatus::Done => "done",
      AppointmentStatus::Cancelled => "cancelled",
    }
  }
}

/// The granularity of the agenda view: one day or a full Monday-Sunday week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
  Day,
  Week,
}

impl ViewKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      ViewKind::Day => "day",
      ViewKind::Week => "week",
    }
  }

  /// The date a cache entry for this view is keyed by: the reference date
  /// itself for day views, the canonical Monday for week views. Any
  /// reference date inside the same week resolves to the same week entry.
  pub fn anchor(&self, reference: NaiveDate) -> NaiveDate {
    match self {
      ViewKind::Day => reference,
      ViewKind::Week => week_monday(reference),
    }
  }
}

/// Calendar-date cache key in `YYYY-MM-DD` form.
pub fn date_key(date: NaiveDate) -> String {
  date.format("%Y-%m-%d").to_string()
}

/// The Monday of the week containing `date`.
pub fn week_monday(date: NaiveDate) -> NaiveDate {
  date.week(Weekday::Mon).first_day()
}

/// The Sunday closing the week containing `date`.
pub fn week_sunday(date: NaiveDate) -> NaiveDate {
  week_monday(date) + Days::new(6)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
  }

  #[test]
  fn test_date_key_format() {
    assert_eq!(date_key(date("2024-06-10")), "2024-06-10");
    assert_eq!(date_key(date("2024-01-05")), "2024-01-05");
  }

  #[test]
  fn test_week_monday_for_each_weekday() {
    // 2024-06-10 is a Monday
    let monday = date("2024-06-10");
    for offset in 0..7 {
      let day = monday + Days::new(offset);
      assert_eq!(week_monday(day), monday, "offset {}", offset);
    }
  }

  #[test]
  fn test_week_monday_of_monday_is_itself() {
    let monday = date("2024-06-10");
    assert_eq!(week_monday(monday), monday);
  }

  #[test]
  fn test_week_sunday() {
    assert_eq!(week_sunday(date("2024-06-12")), date("2024-06-16"));
  }

  #[test]
  fn test_anchor_day_is_reference() {
    let wednesday = date("2024-06-12");
    assert_eq!(ViewKind::Day.anchor(wednesday), wednesday);
  }

  #[test]
  fn test_anchor_week_is_canonical_monday() {
    assert_eq!(ViewKind::Week.anchor(date("2024-06-12")), date("2024-06-10"));
    assert_eq!(ViewKind::Week.anchor(date("2024-06-16")), date("2024-06-10"));
  }
}
