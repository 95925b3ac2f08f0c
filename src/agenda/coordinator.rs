//! Stale-while-revalidate load orchestration for the agenda.
//!
//! A load serves whatever the cache holds immediately, then revalidates
//! against the backend and re-renders, unless a newer load for the same
//! view kind started in the meantime. Superseded results are discarded
//! whole: no render, no cache write, no error.

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use color_eyre::Result;

use crate::cache::AgendaCache;

use super::guard::LoadSequencer;
use super::types::{date_key, week_monday, Appointment, ViewKind};

/// UI hooks the coordinator drives. The TUI feeds these into its event
/// channel; tests record them.
pub trait RenderSink: Send + Sync {
  /// Blocking indicator: nothing usable is on screen for this view yet.
  fn show_loading(&self);
  /// Non-blocking indicator layered over already-rendered cached data.
  fn show_updating(&self);
  fn render_items(&self, kind: ViewKind, date_key: &str, items: Vec<Appointment>);
  fn show_error(&self, message: String);
  fn hide_indicators(&self);
}

/// How a load ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
  /// Fresh data was cached and rendered.
  Applied,
  /// A newer load started before this one resolved; the result was
  /// discarded without touching cache or screen.
  Superseded,
  /// The fetch failed on the winning load. The error reaches the screen
  /// only when no cached data was rendered first.
  Failed,
}

pub struct LoadCoordinator {
  cache: AgendaCache,
  seq: LoadSequencer,
  sink: Arc<dyn RenderSink>,
}

impl LoadCoordinator {
  pub fn new(cache: AgendaCache, sink: Arc<dyn RenderSink>) -> Self {
    Self {
      cache,
      seq: LoadSequencer::default(),
      sink,
    }
  }

  /// Run one load for `(kind, reference)`.
  ///
  /// The fetch is supplied by the caller so the coordinator stays
  /// transport-agnostic; it is awaited exactly once and only its winning
  /// result is applied.
  pub async fn load<F, Fut>(&self, kind: ViewKind, reference: NaiveDate, fetch: F) -> LoadOutcome
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<Appointment>>>,
  {
    // Claim the sequence before the suspension point below.
    let my_seq = self.seq.begin(kind);
    let key = date_key(kind.anchor(reference));

    let cached = self.cache.get(kind, &key);
    match &cached {
      Some(items) => {
        self.sink.render_items(kind, &key, items.clone());
        self.sink.show_updating();
      }
      None => self.sink.show_loading(),
    }

    let result = fetch().await;

    if !self.seq.is_current(kind, my_seq) {
      tracing::debug!(
        kind = kind.as_str(),
        seq = my_seq,
        "load superseded, discarding result"
      );
      return LoadOutcome::Superseded;
    }

    match result {
      Ok(items) => {
        self.cache.set(kind, &key, &items);
        self.sink.render_items(kind, &key, items);
        self.sink.hide_indicators();
        LoadOutcome::Applied
      }
      Err(err) => {
        if cached.is_some() {
          // Stale-but-displayed beats an error banner.
          tracing::warn!(kind = kind.as_str(), %err, "revalidation failed, keeping cached listing");
          self.sink.hide_indicators();
        } else {
          tracing::warn!(kind = kind.as_str(), %err, "agenda load failed");
          self.sink.show_error(format!("Failed to load agenda: {err}"));
        }
        LoadOutcome::Failed
      }
    }
  }

  /// Drop the cached day listing for a date. Must run in the success path
  /// of every mutation that can change that day's appointments, before
  /// the next load is triggered.
  pub fn invalidate_for_date(&self, date: NaiveDate) {
    self.cache.invalidate(ViewKind::Day, &date_key(date));
  }

  /// Drop the cached week listing whose span contains `date`. Week
  /// entries are keyed by their canonical Monday, so any date within the
  /// week resolves to the same entry.
  pub fn invalidate_for_week_containing(&self, date: NaiveDate) {
    self.cache.invalidate(ViewKind::Week, &date_key(week_monday(date)));
  }

  /// Drop every cached listing, both view kinds. For operations whose
  /// date impact is not cheaply known.
  pub fn invalidate_all(&self) {
    self.cache.invalidate_all();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::agenda::AppointmentStatus;
  use crate::cache::MemoryKv;
  use color_eyre::eyre::eyre;
  use std::sync::Mutex;
  use tokio::sync::oneshot;

  #[derive(Debug, Clone, PartialEq)]
  enum SinkCall {
    Loading,
    Updating,
    Render(Vec<Appointment>),
    Error(String),
    HideIndicators,
  }

  #[derive(Default)]
  struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
  }

  impl RecordingSink {
    fn calls(&self) -> Vec<SinkCall> {
      self.calls.lock().unwrap().clone()
    }
  }

  impl RenderSink for RecordingSink {
    fn show_loading(&self) {
      self.calls.lock().unwrap().push(SinkCall::Loading);
    }

    fn show_updating(&self) {
      self.calls.lock().unwrap().push(SinkCall::Updating);
    }

    fn render_items(&self, _kind: ViewKind, _date_key: &str, items: Vec<Appointment>) {
      self.calls.lock().unwrap().push(SinkCall::Render(items));
    }

    fn show_error(&self, message: String) {
      self.calls.lock().unwrap().push(SinkCall::Error(message));
    }

    fn hide_indicators(&self) {
      self.calls.lock().unwrap().push(SinkCall::HideIndicators);
    }
  }

  fn appt(id: &str) -> Appointment {
    Appointment {
      id: id.to_string(),
      date: "2024-06-10".parse().unwrap(),
      start: "09:00".to_string(),
      duration_min: 30,
      patient: "Ana Souza".to_string(),
      procedure: None,
      status: AppointmentStatus::Scheduled,
    }
  }

  fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
  }

  struct Fixture {
    cache: AgendaCache,
    sink: Arc<RecordingSink>,
    coordinator: Arc<LoadCoordinator>,
  }

  fn fixture() -> Fixture {
    let cache = AgendaCache::new(Arc::new(MemoryKv::default()));
    let sink = Arc::new(RecordingSink::default());
    let coordinator = Arc::new(LoadCoordinator::new(cache.clone(), sink.clone()));
    Fixture {
      cache,
      sink,
      coordinator,
    }
  }

  #[tokio::test]
  async fn test_cache_miss_fetches_and_applies() {
    let f = fixture();
    let items = vec![appt("a")];

    let fetched = items.clone();
    let outcome = f
      .coordinator
      .load(ViewKind::Day, date("2024-06-10"), || async move {
        Ok(fetched)
      })
      .await;

    assert_eq!(outcome, LoadOutcome::Applied);
    assert_eq!(
      f.sink.calls(),
      vec![
        SinkCall::Loading,
        SinkCall::Render(items.clone()),
        SinkCall::HideIndicators,
      ]
    );
    assert_eq!(f.cache.get(ViewKind::Day, "2024-06-10"), Some(items));
  }

  #[tokio::test]
  async fn test_cache_hit_renders_then_revalidates() {
    let f = fixture();
    let cached = vec![appt("a")];
    let fresh = vec![appt("a"), appt("b")];
    f.cache.set(ViewKind::Day, "2024-06-10", &cached);

    let fetched = fresh.clone();
    let outcome = f
      .coordinator
      .load(ViewKind::Day, date("2024-06-10"), || async move {
        Ok(fetched)
      })
      .await;

    assert_eq!(outcome, LoadOutcome::Applied);
    assert_eq!(
      f.sink.calls(),
      vec![
        SinkCall::Render(cached),
        SinkCall::Updating,
        SinkCall::Render(fresh.clone()),
        SinkCall::HideIndicators,
      ]
    );
    assert_eq!(f.cache.get(ViewKind::Day, "2024-06-10"), Some(fresh));
  }

  #[tokio::test]
  async fn test_fetch_error_is_suppressed_when_cached() {
    let f = fixture();
    let cached = vec![appt("a")];
    f.cache.set(ViewKind::Day, "2024-06-10", &cached);

    let outcome = f
      .coordinator
      .load(ViewKind::Day, date("2024-06-10"), || async {
        Err(eyre!("connection reset"))
      })
      .await;

    assert_eq!(outcome, LoadOutcome::Failed);
    assert_eq!(
      f.sink.calls(),
      vec![
        SinkCall::Render(cached.clone()),
        SinkCall::Updating,
        SinkCall::HideIndicators,
      ]
    );
    // The cached entry survives the failed revalidation
    assert_eq!(f.cache.get(ViewKind::Day, "2024-06-10"), Some(cached));
  }

  #[tokio::test]
  async fn test_fetch_error_is_shown_when_uncached() {
    let f = fixture();

    let outcome = f
      .coordinator
      .load(ViewKind::Day, date("2024-06-10"), || async {
        Err(eyre!("connection reset"))
      })
      .await;

    assert_eq!(outcome, LoadOutcome::Failed);
    let calls = f.sink.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], SinkCall::Loading);
    match &calls[1] {
      SinkCall::Error(message) => assert!(!message.is_empty()),
      other => panic!("expected error call, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_superseded_result_is_fully_discarded() {
    let f = fixture();
    let old = vec![appt("old")];
    let new = vec![appt("new")];

    // First load parks on a channel so a second one can overtake it.
    let (release_tx, release_rx) = oneshot::channel::<()>();
    let (started_tx, started_rx) = oneshot::channel::<()>();

    let coordinator = f.coordinator.clone();
    let slow_items = old.clone();
    let slow = tokio::spawn(async move {
      coordinator
        .load(ViewKind::Day, date("2024-06-10"), move || async move {
          let _ = started_tx.send(());
          let _ = release_rx.await;
          Ok(slow_items)
        })
        .await
    });

    // Make sure the first load claimed its sequence and is in flight.
    started_rx.await.unwrap();

    let fetched = new.clone();
    let outcome = f
      .coordinator
      .load(ViewKind::Day, date("2024-06-10"), || async move {
        Ok(fetched)
      })
      .await;
    assert_eq!(outcome, LoadOutcome::Applied);

    // Let the slow load finish after the fast one already applied.
    release_tx.send(()).unwrap();
    assert_eq!(slow.await.unwrap(), LoadOutcome::Superseded);

    // The late result neither rendered nor overwrote the cache.
    assert_eq!(f.cache.get(ViewKind::Day, "2024-06-10"), Some(new.clone()));
    let renders: Vec<_> = f
      .sink
      .calls()
      .into_iter()
      .filter(|c| matches!(c, SinkCall::Render(_)))
      .collect();
    assert_eq!(renders, vec![SinkCall::Render(new)]);
    assert!(!f.sink.calls().contains(&SinkCall::Render(old)));
  }

  #[tokio::test]
  async fn test_superseded_failure_surfaces_no_error() {
    let f = fixture();
    let (release_tx, release_rx) = oneshot::channel::<()>();
    let (started_tx, started_rx) = oneshot::channel::<()>();

    let coordinator = f.coordinator.clone();
    let slow = tokio::spawn(async move {
      coordinator
        .load(ViewKind::Day, date("2024-06-10"), move || async move {
          let _ = started_tx.send(());
          let _ = release_rx.await;
          Err(eyre!("timeout"))
        })
        .await
    });

    started_rx.await.unwrap();

    let fetched = vec![appt("a")];
    f.coordinator
      .load(ViewKind::Day, date("2024-06-10"), || async move {
        Ok(fetched)
      })
      .await;

    release_tx.send(()).unwrap();
    assert_eq!(slow.await.unwrap(), LoadOutcome::Superseded);

    assert!(!f
      .sink
      .calls()
      .iter()
      .any(|c| matches!(c, SinkCall::Error(_))));
  }

  #[tokio::test]
  async fn test_week_load_anchors_on_monday() {
    let f = fixture();
    let items = vec![appt("a")];

    let fetched = items.clone();
    // Wednesday reference lands on the Monday-keyed entry
    f.coordinator
      .load(ViewKind::Week, date("2024-06-12"), || async move {
        Ok(fetched)
      })
      .await;

    assert_eq!(f.cache.get(ViewKind::Week, "2024-06-10"), Some(items));
  }

  #[tokio::test]
  async fn test_invalidate_for_date_forces_next_fetch() {
    let f = fixture();
    f.cache.set(ViewKind::Day, "2024-06-10", &[appt("a")]);

    f.coordinator.invalidate_for_date(date("2024-06-10"));
    assert_eq!(f.cache.get(ViewKind::Day, "2024-06-10"), None);

    // With the entry gone the next load goes through the loading path.
    let fetched = vec![appt("b")];
    f.coordinator
      .load(ViewKind::Day, date("2024-06-10"), || async move {
        Ok(fetched)
      })
      .await;
    assert_eq!(f.sink.calls()[0], SinkCall::Loading);
  }

  #[tokio::test]
  async fn test_invalidate_week_resolves_to_canonical_monday() {
    let f = fixture();
    f.cache.set(ViewKind::Week, "2024-06-10", &[appt("a")]);

    // Invalidating via a Friday inside the week clears the Monday entry,
    // and leaves a day entry for the same date alone.
    f.cache.set(ViewKind::Day, "2024-06-14", &[appt("b")]);
    f.coordinator
      .invalidate_for_week_containing(date("2024-06-14"));

    assert_eq!(f.cache.get(ViewKind::Week, "2024-06-10"), None);
    assert!(f.cache.get(ViewKind::Day, "2024-06-14").is_some());
  }
}
