use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::agenda::{Appointment, ViewKind};

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Periodic tick for UI refresh
  Tick,
  /// Load progress reported by the coordinator's render hooks
  Agenda(AgendaEvent),
  /// Background task failure outside a load (mutations)
  Error(String),
}

/// Render-hook traffic emitted by load and mutation tasks.
#[derive(Debug)]
pub enum AgendaEvent {
  /// Blocking load started with nothing cached to show
  Loading,
  /// Background revalidation started on top of rendered cached data
  Updating,
  /// A listing is ready for the given view and cache key
  Rendered {
    kind: ViewKind,
    date_key: String,
    items: Vec<Appointment>,
  },
  /// The winning load failed with no cached fallback
  LoadFailed(String),
  /// Load settled; clear loading and updating indicators
  IndicatorsCleared,
  /// A mutation landed and its cache entries are already invalidated
  MutationApplied,
}

/// Spawn the terminal input pump: key presses and ticks are forwarded to
/// the app's event channel until the receiver goes away.
pub fn spawn_input_pump(tick_rate: Duration, tx: mpsc::UnboundedSender<Event>) {
  tokio::spawn(async move {
    loop {
      if event::poll(tick_rate).unwrap_or(false) {
        if let Ok(CrosstermEvent::Key(key)) = event::read() {
          if tx.send(Event::Key(key)).is_err() {
            break;
          }
        }
      } else {
        // Tick
        if tx.send(Event::Tick).is_err() {
          break;
        }
      }
    }
  });
}
