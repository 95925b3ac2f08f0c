//! Serde-deserializable types matching the Prontio API responses.
//!
//! These types are separate from domain types to tolerate the backend's
//! loose shapes during deserialization while keeping domain types focused
//! on application needs.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::agenda::{Appointment, AppointmentStatus};

/// Envelope every action response arrives in.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
  #[serde(default)]
  pub ok: bool,
  pub data: Option<serde_json::Value>,
  pub error: Option<String>,
}

/// Listing payloads come back either wrapped in `{"items": [...]}` or as
/// a bare array, depending on the backend generation serving the call.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiItems {
  Wrapped { items: Vec<ApiAppointment> },
  Bare(Vec<ApiAppointment>),
}

impl ApiItems {
  pub fn into_items(self) -> Vec<ApiAppointment> {
    match self {
      ApiItems::Wrapped { items } => items,
      ApiItems::Bare(items) => items,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct ApiAppointment {
  pub id: String,
  pub date: NaiveDate,
  #[serde(default)]
  pub start: String,
  #[serde(rename = "durationMin", default)]
  pub duration_min: u32,
  #[serde(default)]
  pub patient: String,
  pub procedure: Option<String>,
  #[serde(default)]
  pub status: String,
}

impl ApiAppointment {
  pub fn into_domain(self) -> Appointment {
    Appointment {
      id: self.id,
      date: self.date,
      start: self.start,
      duration_min: self.duration_min,
      patient: self.patient,
      procedure: self.procedure,
      status: parse_status(&self.status),
    }
  }
}

/// Map the backend's free-form status strings onto the statuses the
/// client distinguishes. Anything unrecognized counts as scheduled.
fn parse_status(raw: &str) -> AppointmentStatus {
  match raw.trim().to_lowercase().as_str() {
    "confirmed" => AppointmentStatus::Confirmed,
    "done" | "attended" => AppointmentStatus::Done,
    "cancelled" | "canceled" => AppointmentStatus::Cancelled,
    _ => AppointmentStatus::Scheduled,
  }
}
