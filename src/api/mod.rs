//! Client for the Prontio action-dispatch API.

mod client;
mod types;

pub use client::ApiClient;
