//! REST API client module for the task backend.
//!
//! This module provides the `ApiClient` used for every call to the backend.
//! Each request carries the bearer credential read from the cookie store, and
//! any unauthorized response is broadcast as a `SessionEvent::Invalidated`.

pub mod client;
pub mod error;
pub mod events;

pub use client::ApiClient;
pub use error::ApiError;
pub use events::SessionEvent;
