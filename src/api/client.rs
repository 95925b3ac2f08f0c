use chrono::NaiveDate;
use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use crate::agenda::Appointment;
use crate::config::Config;

use super::types::{ApiAppointment, ApiEnvelope, ApiItems};

/// Prontio API client wrapper.
///
/// The backend exposes a single action-dispatch endpoint: every call
/// POSTs `{"action": ..., "payload": ...}` and gets an `{ok, data,
/// error}` envelope back.
#[derive(Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  endpoint: Url,
  token: String,
  professional: Option<String>,
}

impl ApiClient {
  pub fn new(config: &Config) -> Result<Self> {
    let endpoint = Url::parse(&config.api.url)
      .map_err(|e| eyre!("Invalid API url {}: {}", config.api.url, e))?;
    let token = Config::get_api_token()?;
    let http = reqwest::Client::builder()
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      endpoint,
      token,
      professional: config.agenda.professional.clone(),
    })
  }

  /// Dispatch one action and decode the envelope's data.
  async fn call<T: DeserializeOwned>(&self, action: &str, payload: serde_json::Value) -> Result<T> {
    let envelope = self.dispatch(action, payload).await?;
    unwrap_envelope(action, envelope)
  }

  /// Dispatch an action where only success matters.
  async fn call_ok(&self, action: &str, payload: serde_json::Value) -> Result<()> {
    let envelope = self.dispatch(action, payload).await?;
    if envelope.ok {
      Ok(())
    } else {
      Err(rejection(action, envelope))
    }
  }

  async fn dispatch(&self, action: &str, payload: serde_json::Value) -> Result<ApiEnvelope> {
    let body = json!({ "action": action, "payload": payload });

    let response = self
      .http
      .post(self.endpoint.clone())
      .bearer_auth(&self.token)
      .json(&body)
      .send()
      .await
      .map_err(|e| eyre!("Request for {} failed: {}", action, e))?;

    response
      .error_for_status()
      .map_err(|e| eyre!("{} returned an error status: {}", action, e))?
      .json()
      .await
      .map_err(|e| eyre!("Failed to read {} response: {}", action, e))
  }

  /// List appointments inside an inclusive date range.
  pub async fn list_appointments(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Vec<Appointment>> {
    let mut payload = json!({
      "start": start.format("%Y-%m-%d").to_string(),
      "end": end.format("%Y-%m-%d").to_string(),
    });
    if let Some(professional) = &self.professional {
      payload["professional"] = json!(professional);
    }

    let items: ApiItems = self.call("appointments.listRange", payload).await?;
    Ok(
      items
        .into_items()
        .into_iter()
        .map(ApiAppointment::into_domain)
        .collect(),
    )
  }

  /// Cancel an appointment. Callers must invalidate the affected cache
  /// entries on success.
  pub async fn cancel_appointment(&self, id: &str) -> Result<()> {
    self.call_ok("appointments.cancel", json!({ "id": id })).await
  }

  /// Mark an appointment confirmed. Same invalidation duty as cancel.
  pub async fn confirm_appointment(&self, id: &str) -> Result<()> {
    self
      .call_ok("appointments.confirm", json!({ "id": id }))
      .await
  }
}

/// Unwrap the `{ok, data, error}` envelope into the action's data.
fn unwrap_envelope<T: DeserializeOwned>(action: &str, envelope: ApiEnvelope) -> Result<T> {
  if !envelope.ok {
    return Err(rejection(action, envelope));
  }
  let data = envelope
    .data
    .ok_or_else(|| eyre!("{} returned no data", action))?;
  serde_json::from_value(data).map_err(|e| eyre!("Failed to parse {} response: {}", action, e))
}

fn rejection(action: &str, envelope: ApiEnvelope) -> color_eyre::Report {
  eyre!(
    "{} rejected: {}",
    action,
    envelope.error.unwrap_or_else(|| "unknown error".to_string())
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn envelope(value: serde_json::Value) -> ApiEnvelope {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn test_unwrap_ok_envelope() {
    let env = envelope(json!({"ok": true, "data": [1, 2, 3]}));
    let data: Vec<u32> = unwrap_envelope("test.action", env).unwrap();
    assert_eq!(data, vec![1, 2, 3]);
  }

  #[test]
  fn test_unwrap_rejected_envelope_carries_backend_message() {
    let env = envelope(json!({"ok": false, "error": "slot taken"}));
    let err = unwrap_envelope::<serde_json::Value>("appointments.create", env).unwrap_err();
    assert!(err.to_string().contains("slot taken"));
  }

  #[test]
  fn test_unwrap_rejected_envelope_without_message() {
    let env = envelope(json!({"ok": false}));
    let err = unwrap_envelope::<serde_json::Value>("test.action", env).unwrap_err();
    assert!(err.to_string().contains("unknown error"));
  }

  #[test]
  fn test_unwrap_ok_envelope_without_data_is_an_error() {
    let env = envelope(json!({"ok": true}));
    assert!(unwrap_envelope::<serde_json::Value>("test.action", env).is_err());
  }
}
