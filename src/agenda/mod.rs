//! Agenda loading: domain types, range fetching, and the sequence-guarded
//! stale-while-revalidate coordination around the local cache.

mod coordinator;
mod fetcher;
mod guard;
mod types;

pub use coordinator::{LoadCoordinator, LoadOutcome, RenderSink};
pub use fetcher::AgendaFetcher;
pub use types::{date_key, week_monday, week_sunday, Appointment, AppointmentStatus, ViewKind};
