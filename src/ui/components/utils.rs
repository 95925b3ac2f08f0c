//! Shared text helpers for the agenda views.

use chrono::{Duration, NaiveTime};

/// Render a start time plus duration as "09:00-09:30". Falls back to the
/// raw start when the backend sends a time the client cannot parse.
pub fn time_span(start: &str, duration_min: u32) -> String {
  match NaiveTime::parse_from_str(start, "%H:%M") {
    Ok(time) => {
      let end = time + Duration::minutes(duration_min as i64);
      format!("{}-{}", start, end.format("%H:%M"))
    }
    Err(_) => start.to_string(),
  }
}

pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", cut)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_time_span() {
    assert_eq!(time_span("09:00", 30), "09:00-09:30");
    assert_eq!(time_span("14:15", 45), "14:15-15:00");
  }

  #[test]
  fn test_time_span_wraps_past_midnight() {
    assert_eq!(time_span("23:45", 30), "23:45-00:15");
  }

  #[test]
  fn test_time_span_unparseable_start_passes_through() {
    assert_eq!(time_span("soon", 30), "soon");
    assert_eq!(time_span("", 30), "");
  }

  #[test]
  fn test_truncate_short_string_unchanged() {
    assert_eq!(truncate("Ana", 10), "Ana");
  }

  #[test]
  fn test_truncate_long_string_gets_ellipsis() {
    assert_eq!(truncate("Ana Carolina Souza", 10), "Ana Car...");
  }

  #[test]
  fn test_truncate_counts_chars_not_bytes() {
    assert_eq!(truncate("Jose", 4), "Jose");
    assert_eq!(truncate("José", 4), "José");
  }
}
