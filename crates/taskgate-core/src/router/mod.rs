//! Client-side routing with session-aware navigation guards.
//!
//! - `RouteTable`: static route records with `requires_auth` / `requires_guest` metadata
//! - `NavigationGuard`: decides whether a transition proceeds or is redirected
//! - `Router`: tracks the current location and applies the guard to every push
//! - `spawn_redirect_listener`: turns session invalidation events into forced redirects

pub mod guard;
pub mod history;
pub mod routes;

pub use guard::{decide, Navigation, NavigationGuard, HOME_PATH, LOGIN_PATH};
pub use history::{spawn_redirect_listener, NavigationError, Router};
pub use routes::{RouteMeta, RouteRecord, RouteTable};
