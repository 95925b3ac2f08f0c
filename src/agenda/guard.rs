use std::sync::atomic::{AtomicU64, Ordering};

use super::types::ViewKind;

/// Sequence guard that lets only the newest load win.
///
/// One monotonic counter per view kind. A load captures the value handed
/// out by `begin` before its first await point and checks `is_current`
/// once the fetch resolves; a mismatch means a newer load started in the
/// meantime and this result must be discarded. Counters start at zero and
/// never reset for the lifetime of the process.
#[derive(Debug, Default)]
pub struct LoadSequencer {
  day: AtomicU64,
  week: AtomicU64,
}

impl LoadSequencer {
  fn counter(&self, kind: ViewKind) -> &AtomicU64 {
    match kind {
      ViewKind::Day => &self.day,
      ViewKind::Week => &self.week,
    }
  }

  /// Start a new load, superseding any still in flight for this view kind.
  pub fn begin(&self, kind: ViewKind) -> u64 {
    self.counter(kind).fetch_add(1, Ordering::SeqCst) + 1
  }

  /// Whether `seq` is still the latest load for this view kind.
  pub fn is_current(&self, kind: ViewKind, seq: u64) -> bool {
    self.counter(kind).load(Ordering::SeqCst) == seq
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_begin_is_monotonic() {
    let seq = LoadSequencer::default();
    assert_eq!(seq.begin(ViewKind::Day), 1);
    assert_eq!(seq.begin(ViewKind::Day), 2);
    assert_eq!(seq.begin(ViewKind::Day), 3);
  }

  #[test]
  fn test_newer_load_supersedes_older() {
    let seq = LoadSequencer::default();
    let first = seq.begin(ViewKind::Day);
    assert!(seq.is_current(ViewKind::Day, first));

    let second = seq.begin(ViewKind::Day);
    assert!(!seq.is_current(ViewKind::Day, first));
    assert!(seq.is_current(ViewKind::Day, second));
  }

  #[test]
  fn test_view_kinds_are_independent() {
    let seq = LoadSequencer::default();
    let day = seq.begin(ViewKind::Day);
    let week = seq.begin(ViewKind::Week);

    assert!(seq.is_current(ViewKind::Day, day));
    assert!(seq.is_current(ViewKind::Week, week));

    seq.begin(ViewKind::Week);
    assert!(seq.is_current(ViewKind::Day, day));
    assert!(!seq.is_current(ViewKind::Week, week));
  }
}
