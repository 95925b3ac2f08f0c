use chrono::{Days, NaiveDate};
use color_eyre::Result;

use crate::api::ApiClient;

use super::types::{week_monday, Appointment, ViewKind};

/// Turns a view selection into the period the backend understands and
/// fetches it. One outbound call per invocation, no retries; errors
/// bubble to the load that asked.
#[derive(Clone)]
pub struct AgendaFetcher {
  api: ApiClient,
}

impl AgendaFetcher {
  pub fn new(api: ApiClient) -> Self {
    Self { api }
  }

  /// Fetch the listing for a view. Day views request the reference date
  /// itself; week views the Monday-to-Sunday span containing it.
  pub async fn fetch_range(&self, kind: ViewKind, reference: NaiveDate) -> Result<Vec<Appointment>> {
    let (start, end) = period(kind, reference);
    self.api.list_appointments(start, end).await
  }
}

fn period(kind: ViewKind, reference: NaiveDate) -> (NaiveDate, NaiveDate) {
  match kind {
    ViewKind::Day => (reference, reference),
    ViewKind::Week => {
      let monday = week_monday(reference);
      (monday, monday + Days::new(6))
    }
  }
}
