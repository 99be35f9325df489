use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{Credentials, UserProfile};

/// Shown when a failed login carries no message from the backend
const LOGIN_FALLBACK_MESSAGE: &str = "Authorization failed";

/// Shown when a failed registration carries no message from the backend
const REGISTER_FALLBACK_MESSAGE: &str = "Registration failed";

/// In-memory view of the current session.
///
/// `is_authenticated` is only ever raised while `user` is present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    user: Option<UserProfile>,
    token: Option<String>,
    is_authenticated: bool,
}

impl Session {
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Last credential seen by the store. Informational only: requests are
    /// authorized from the cookie store, never from this field.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn is_logged_in(&self) -> bool {
        self.is_authenticated && self.user.is_some()
    }

    /// Raise the authenticated flag if a profile is known. Returns the flag.
    fn raise_flag(&mut self) -> bool {
        if self.user.is_some() {
            self.is_authenticated = true;
        }
        self.is_authenticated
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Failure of a user-initiated login or registration, ready for display.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AuthFailure {
    pub message: String,
}

impl AuthFailure {
    fn from_api(error: &ApiError, fallback: &str) -> Self {
        Self {
            message: error.detail().unwrap_or(fallback).to_string(),
        }
    }
}

/// Session context shared by the shell and the navigation guard.
pub struct SessionStore {
    api: ApiClient,
    state: RwLock<Session>,
    /// Held for the duration of an auth check
    check_lock: Mutex<()>,
    checks_completed: AtomicU64,
}

impl SessionStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: RwLock::new(Session::default()),
            check_lock: Mutex::new(()),
            checks_completed: AtomicU64::new(0),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current session state
    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.read().is_logged_in()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.read().user.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    /// Whether an auth check has run to completion in this process
    pub fn has_checked(&self) -> bool {
        self.checks_completed.load(Ordering::Acquire) > 0
    }

    /// Log in and load the profile.
    ///
    /// If the profile cannot be loaded after the backend accepted the
    /// credentials, the session is reset to anonymous and the login fails.
    pub async fn login(&self, login: &str, security_key: &str) -> Result<(), AuthFailure> {
        let credentials = Credentials::new(login, security_key);

        let token = match self.api.login(&credentials).await {
            Ok(token) => token,
            Err(e) => {
                error!(error = %e, login = login, "Login error");
                return Err(AuthFailure::from_api(&e, LOGIN_FALLBACK_MESSAGE));
            }
        };

        self.write().token = Some(token.access_token);

        if let Err(e) = self.fetch_user().await {
            warn!(error = %e, login = login, "Login accepted but profile unavailable, resetting session");
            self.write().reset();
            return Err(AuthFailure::from_api(&e, LOGIN_FALLBACK_MESSAGE));
        }

        if self.write().raise_flag() {
            info!(login = login, "Login successful");
            Ok(())
        } else {
            // Only reachable if a concurrent logout cleared the profile mid-login
            Err(AuthFailure {
                message: LOGIN_FALLBACK_MESSAGE.to_string(),
            })
        }
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, login: &str, security_key: &str) -> Result<UserProfile, AuthFailure> {
        let credentials = Credentials::new(login, security_key);
        match self.api.register(&credentials).await {
            Ok(user) => {
                info!(login = login, "Registration successful");
                Ok(user)
            }
            Err(e) => {
                error!(error = %e, login = login, "Registration error");
                Err(AuthFailure::from_api(&e, REGISTER_FALLBACK_MESSAGE))
            }
        }
    }

    /// Replace the stored profile with the one the backend reports.
    /// Leaves the authenticated flag alone; callers decide what a failure means.
    pub async fn fetch_user(&self) -> Result<UserProfile, ApiError> {
        match self.api.me().await {
            Ok(user) => {
                self.write().user = Some(user.clone());
                Ok(user)
            }
            Err(e) => {
                error!(error = %e, "Fetch user error");
                Err(e)
            }
        }
    }

    /// Notify the backend and clear the session.
    ///
    /// The reset happens on every exit path, including when this future is
    /// dropped before the backend answers.
    pub async fn logout(&self) {
        let _reset = ResetOnDrop(self);
        if let Err(e) = self.api.logout().await {
            error!(error = %e, "Logout error");
        }
        info!("Logged out");
    }

    /// Establish the session from the credential cookie.
    ///
    /// Without a credential this is a no-op. With one, the profile is fetched
    /// and the session becomes authenticated, or is reset if the fetch fails.
    /// Callers arriving while a check is running wait for it and reuse its result.
    pub async fn check_auth(&self) {
        let seen = self.checks_completed.load(Ordering::Acquire);
        let _guard = self.check_lock.lock().await;
        if self.checks_completed.load(Ordering::Acquire) != seen {
            debug!("Joined auth check completed by another caller");
            return;
        }

        self.run_check().await;
        self.checks_completed.fetch_add(1, Ordering::AcqRel);
    }

    async fn run_check(&self) {
        let Some(token) = self.api.credentials().read_credential() else {
            debug!("No credential cookie, session stays anonymous");
            return;
        };

        self.write().token = Some(token);

        match self.fetch_user().await {
            Ok(user) => {
                if self.write().raise_flag() {
                    info!(user = %user.display_name(), "Session restored");
                }
            }
            Err(e) => {
                warn!(error = %e, "Auth check failed, session reset");
                self.write().reset();
            }
        }
    }
}

struct ResetOnDrop<'a>(&'a SessionStore);

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        self.0.write().reset();
    }
}
