//! Data models exchanged with the authentication endpoints.
//!
//! - `Credentials`: login/registration request body
//! - `TokenResponse`: successful login response
//! - `UserProfile`: opaque identity payload returned by `/auth/me` and `/auth/register`

pub mod user;

pub use user::{Credentials, TokenResponse, UserProfile};
