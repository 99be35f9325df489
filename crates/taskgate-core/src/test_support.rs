//! Shared helpers for tests that talk to a local mock backend.

use std::net::TcpListener;
use std::sync::Arc;

use anyhow::Result;
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use reqwest::Url;
use wiremock::MockServer;

use crate::api::ApiClient;
use crate::auth::CookieJar;

pub fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

/// Client pointed at `<server>/api` with a fresh cookie jar
pub fn client_for(server: &MockServer) -> Result<(ApiClient, Arc<CookieJar>)> {
    let jar = Arc::new(CookieJar::default());
    let client = ApiClient::new(&format!("{}/api", server.uri()), Arc::clone(&jar))?;
    Ok((client, jar))
}

/// Apply a `Set-Cookie` value received from `url`
pub fn store_cookie(jar: &CookieJar, url: &Url, set_cookie: &str) {
    let value = HeaderValue::from_str(set_cookie).expect("valid Set-Cookie value");
    jar.set_cookies(&mut std::iter::once(&value), url);
}

/// Store a cookie the way the backend would have set it
pub fn seed_cookie(jar: &CookieJar, client: &ApiClient, cookie: &str) {
    store_cookie(jar, client.credentials().url(), &format!("{}; Path=/", cookie));
}
