//! Authentication module for the client-side session.
//!
//! This module provides:
//! - `CredentialStore`: read-only access to the bearer credential cookie
//! - `SessionStore`: session state machine (login, registration, logout, auth check)
//! - `CookieFile`: persistence of the cookie store between runs
//!
//! Authorization always rides on the `access_token` cookie; the session only
//! tracks who the user is and whether that has been confirmed.

pub mod cookies;
pub mod credentials;
pub mod session;

pub use cookies::{CookieFile, CookieJar};
pub use credentials::{parse_credential, CredentialStore, ACCESS_TOKEN_COOKIE};
pub use session::{AuthFailure, Session, SessionStore};
