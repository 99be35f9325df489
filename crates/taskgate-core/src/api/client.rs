//! API client for communicating with the task backend.
//!
//! This module provides the `ApiClient` struct. Every outbound request is
//! decorated with the bearer credential from the cookie store, cookies ride
//! along on every call, and unauthorized responses are broadcast to listeners
//! before the error is handed back to the caller.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, RequestBuilder, Response, Url};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::auth::{CookieJar, CredentialStore};
use crate::models::{Credentials, TokenResponse, UserProfile};

use super::events::{self, SessionEvent};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";
const ME_PATH: &str = "/auth/me";
const LOGOUT_PATH: &str = "/auth/logout";

/// API client for the task backend.
/// Clone is cheap - reqwest::Client and the event sender are shared handles.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    credentials: CredentialStore,
    events: broadcast::Sender<SessionEvent>,
}

impl ApiClient {
    /// Create a client for `base_url` that stores and sends cookies through `jar`.
    pub fn new(base_url: &str, jar: Arc<CookieJar>) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let cookie_url = Url::parse(&format!("{}/", base_url))
            .with_context(|| format!("Invalid API base URL: {}", base_url))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .cookie_provider(Arc::clone(&jar))
            .build()
            .context("Failed to build HTTP client")?;

        let (events, _) = events::channel();

        Ok(Self {
            client,
            base_url,
            credentials: CredentialStore::new(jar, cookie_url),
            events,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Accessor for the credential held in this client's cookie store
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Receive a `SessionEvent` for every call rejected as unauthorized
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn auth_headers(&self) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.credentials.read_credential() {
            match header::HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(header::AUTHORIZATION, value);
                }
                Err(_) => warn!("Credential is not a valid header value, sending request without it"),
            }
        }
        headers
    }

    /// Decorate, dispatch and check a request.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.headers(self.auth_headers()).send().await?;
        Self::check_response(response, &self.events).await
    }

    /// Check if response is successful, returning an error with body if not.
    /// Unauthorized responses are announced on `events` first.
    async fn check_response(
        response: Response,
        events: &broadcast::Sender<SessionEvent>,
    ) -> Result<Response, ApiError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_status(status, &body);

        if error.is_unauthorized() {
            warn!(url = %url, "Request unauthorized, session invalidated");
            // No subscribers is fine; the caller still gets the error.
            let _ = events.send(SessionEvent::Invalidated { url });
        } else {
            debug!(url = %url, status = %status, "Request failed");
        }

        Err(error)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let url = response.url().to_string();
        response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
        })
    }

    /// GET `path` relative to the API base
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path);
        let response = self.send(self.client.get(&url)).await?;
        Self::parse(response).await
    }

    /// POST a JSON body to `path` relative to the API base
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path);
        let response = self.send(self.client.post(&url).json(body)).await?;
        Self::parse(response).await
    }

    // ===== Authentication Endpoints =====

    pub async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError> {
        self.post(LOGIN_PATH, credentials).await
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<UserProfile, ApiError> {
        self.post(REGISTER_PATH, credentials).await
    }

    /// Fetch the profile of the user owning the current session
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.get(ME_PATH).await
    }

    /// Ask the backend to end the session. The response body is ignored.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let url = self.endpoint(LOGOUT_PATH);
        self.send(self.client.post(&url)).await?;
        Ok(())
    }
}
