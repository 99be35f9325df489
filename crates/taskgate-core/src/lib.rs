//! Core library for taskgate.
//!
//! Client-side authentication and route access control for the task
//! application:
//!
//! - `api`: request client that attaches the bearer credential and reports invalidated sessions
//! - `auth`: credential cookie access, session store, cookie persistence
//! - `router`: route table, navigation guard and router
//! - `config`: configuration and API base resolution

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod router;

#[cfg(test)]
mod test_support;

pub use api::{ApiClient, ApiError, SessionEvent};
pub use auth::{AuthFailure, CookieFile, CookieJar, CredentialStore, Session, SessionStore};
pub use config::Config;
pub use models::UserProfile;
pub use router::{Navigation, NavigationGuard, RouteTable, Router};
