use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::SessionEvent;

use super::{Navigation, NavigationGuard, LOGIN_PATH};

/// Maximum guard redirects followed for a single push
const MAX_REDIRECTS: usize = 5;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Too many redirects navigating to {0}")]
    RedirectLoop(String),
}

/// Current location plus the guard every routed transition goes through.
pub struct Router {
    guard: NavigationGuard,
    current: RwLock<Option<String>>,
    forced_redirects: AtomicUsize,
}

impl Router {
    pub fn new(guard: NavigationGuard) -> Self {
        Self {
            guard,
            current: RwLock::new(None),
            forced_redirects: AtomicUsize::new(0),
        }
    }

    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    /// Location after the last completed navigation
    pub fn current(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of forced redirects performed so far
    pub fn forced_redirects(&self) -> usize {
        self.forced_redirects.load(Ordering::Acquire)
    }

    fn set_current(&self, path: &str) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(path.to_string());
    }

    /// Navigate to `to`, following guard redirects. Returns the final location.
    pub async fn push(&self, to: &str) -> Result<String, NavigationError> {
        let mut target = to.to_string();
        for _ in 0..=MAX_REDIRECTS {
            match self.guard.before_each(&target).await {
                Navigation::Proceed => {
                    debug!(path = %target, "Navigated");
                    self.set_current(&target);
                    return Ok(target);
                }
                Navigation::Redirect(next) => {
                    debug!(from = %target, to = %next, "Guard redirect");
                    target = next;
                }
            }
        }
        warn!(to = to, "Redirect loop, navigation abandoned");
        Err(NavigationError::RedirectLoop(to.to_string()))
    }

    /// Replace the location without consulting the guard
    pub fn force_redirect(&self, to: &str) {
        info!(to = to, "Forced redirect");
        self.set_current(to);
        self.forced_redirects.fetch_add(1, Ordering::AcqRel);
    }
}

/// Redirect to the login entry point whenever the session is invalidated.
///
/// Runs until the event channel closes.
pub fn spawn_redirect_listener(
    router: Arc<Router>,
    mut events: broadcast::Receiver<SessionEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SessionEvent::Invalidated { url }) => {
                    info!(url = %url, "Session invalidated, redirecting to login");
                    router.force_redirect(LOGIN_PATH);
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Every missed event was an invalidation
                    warn!(skipped, "Missed session events, redirecting for each");
                    for _ in 0..skipped {
                        router.force_redirect(LOGIN_PATH);
                    }
                }
                Err(RecvError::Closed) => {
                    debug!("Session event channel closed, listener stopping");
                    break;
                }
            }
        }
    })
}
