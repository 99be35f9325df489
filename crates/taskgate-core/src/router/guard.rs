use std::sync::Arc;

use tracing::debug;

use crate::auth::SessionStore;

use super::RouteTable;

/// Public entry point for visitors without a session
pub const LOGIN_PATH: &str = "/login";

/// Main view for authenticated users
pub const HOME_PATH: &str = "/";

/// Outcome of a guarded transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(String),
}

/// Gate evaluated before every route transition.
pub struct NavigationGuard {
    session: Arc<SessionStore>,
    routes: RouteTable,
}

impl NavigationGuard {
    pub fn new(session: Arc<SessionStore>, routes: RouteTable) -> Self {
        Self { session, routes }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Decide whether navigating to `to` may proceed.
    ///
    /// The first transition of the process waits for the session check; a
    /// failed check leaves the session anonymous and navigation continues.
    pub async fn before_each(&self, to: &str) -> Navigation {
        if !self.session.is_authenticated() && !self.session.has_checked() {
            debug!(to = to, "Session not checked yet, checking before navigation");
            self.session.check_auth().await;
        }

        let matched = self.routes.resolve(to);
        let requires_auth = matched.iter().any(|r| r.meta.requires_auth);
        let requires_guest = matched.iter().any(|r| r.meta.requires_guest);

        let outcome = decide(requires_auth, requires_guest, self.session.is_logged_in());
        debug!(to = to, requires_auth, requires_guest, ?outcome, "Navigation guard");
        outcome
    }
}

/// Route access decision for the given requirements and login state
pub fn decide(requires_auth: bool, requires_guest: bool, is_logged_in: bool) -> Navigation {
    if requires_auth && !is_logged_in {
        Navigation::Redirect(LOGIN_PATH.to_string())
    } else if requires_guest && is_logged_in {
        Navigation::Redirect(HOME_PATH.to_string())
    } else {
        Navigation::Proceed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::auth::CookieJar;
    use crate::test_support::{can_bind_localhost, client_for, seed_cookie};
    use anyhow::Result;
    use futures::future::join_all;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_decision_table() {
        let to_login = Navigation::Redirect(LOGIN_PATH.to_string());
        let to_home = Navigation::Redirect(HOME_PATH.to_string());

        assert_eq!(decide(true, false, false), to_login);
        assert_eq!(decide(true, false, true), Navigation::Proceed);
        assert_eq!(decide(false, true, true), to_home);
        assert_eq!(decide(false, true, false), Navigation::Proceed);
        assert_eq!(decide(false, false, false), Navigation::Proceed);
        assert_eq!(decide(false, false, true), Navigation::Proceed);
    }

    /// Guard over a store whose backend is never reached (no credential cookie)
    fn offline_guard() -> Result<NavigationGuard> {
        let client = ApiClient::new("http://127.0.0.1:9/api", Arc::new(CookieJar::default()))?;
        let session = Arc::new(SessionStore::new(client));
        Ok(NavigationGuard::new(session, RouteTable::application()))
    }

    #[tokio::test]
    async fn anonymous_visitor_is_sent_to_login() -> Result<()> {
        let guard = offline_guard()?;

        assert_eq!(
            guard.before_each("/").await,
            Navigation::Redirect(LOGIN_PATH.to_string())
        );
        assert!(guard.session().has_checked());
        assert_eq!(guard.before_each("/login").await, Navigation::Proceed);
        assert_eq!(guard.before_each("/elsewhere").await, Navigation::Proceed);
        Ok(())
    }

    #[tokio::test]
    async fn authenticated_visitor_is_sent_home() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "login": "alice"})))
            .expect(1)
            .mount(&server)
            .await;

        let (client, jar) = client_for(&server)?;
        seed_cookie(&jar, &client, "access_token=abc123");
        let guard = NavigationGuard::new(
            Arc::new(SessionStore::new(client)),
            RouteTable::application(),
        );

        assert_eq!(
            guard.before_each("/login").await,
            Navigation::Redirect(HOME_PATH.to_string())
        );
        // Checked once; later transitions reuse the result
        assert_eq!(guard.before_each("/").await, Navigation::Proceed);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_first_navigations_check_once() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": 1, "login": "alice"}))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (client, jar) = client_for(&server)?;
        seed_cookie(&jar, &client, "access_token=abc123");
        let guard = NavigationGuard::new(
            Arc::new(SessionStore::new(client)),
            RouteTable::application(),
        );

        let outcomes = join_all(["/", "/", "/login"].map(|to| guard.before_each(to))).await;
        assert_eq!(
            outcomes,
            vec![
                Navigation::Proceed,
                Navigation::Proceed,
                Navigation::Redirect(HOME_PATH.to_string()),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn failed_check_still_navigates() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (client, jar) = client_for(&server)?;
        seed_cookie(&jar, &client, "access_token=abc123");
        let guard = NavigationGuard::new(
            Arc::new(SessionStore::new(client)),
            RouteTable::application(),
        );

        assert_eq!(guard.before_each("/login").await, Navigation::Proceed);
        assert!(!guard.session().is_logged_in());
        Ok(())
    }
}
