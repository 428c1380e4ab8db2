use std::fmt;
use std::time::{Duration, Instant};

use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{Instrument, Span};

use crate::{
    backoff::Backoff,
    classify::check_status,
    decode::decode_response,
    request::{has_dot_segment, new_request},
    Application, CentralError, ClientOptions, Membership, Result, User,
};

const LOG_TARGET: &str = "central";

#[derive(Clone)]
/// HTTP client for the central directory API.
///
/// Cloning is cheap and the clone shares the underlying connection pool.
pub struct CentralClient {
    http: reqwest::Client,
    base_url: Url,
    session_key: Option<String>,
    span: Span,
    options: ClientOptions,
}

/// Settings applied on top of an existing client by [`CentralClient::derive`].
///
/// `None` fields keep the base client's value.
#[derive(Clone, Debug, Default)]
pub struct ClientOverrides {
    pub http: Option<reqwest::Client>,
    pub session_key: Option<String>,
    pub span: Option<Span>,
    pub options: Option<ClientOptions>,
}

impl fmt::Debug for CentralClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CentralClient")
            .field("base_url", &self.base_url.as_str())
            .field(
                "session_key",
                &self.session_key.as_ref().map(|_| "<redacted>"),
            )
            .field("options", &self.options)
            .finish()
    }
}

impl CentralClient {
    /// Creates a client for the service at `base_url`.
    ///
    /// Only the scheme, host, port and query of `base_url` are used; request
    /// paths always start at `/api/central/v1`.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = parse_base_url(base_url.as_ref())?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            session_key: None,
            span: Span::none(),
            options: ClientOptions::default(),
        })
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `CENTRAL_URL` — service base URL (required)
    /// - `CENTRAL_SESSION_KEY` — session key sent as a cookie (optional)
    pub fn from_env() -> std::result::Result<Self, String> {
        let url = std::env::var("CENTRAL_URL")
            .map_err(|_| "missing CENTRAL_URL environment variable".to_owned())?;
        if url.trim().is_empty() {
            return Err("CENTRAL_URL is set but empty".to_owned());
        }

        let client = Self::new(url.trim()).map_err(|err| err.to_string())?;
        match std::env::var("CENTRAL_SESSION_KEY") {
            Ok(key) if !key.trim().is_empty() => Ok(client.with_session_key(key.trim())),
            _ => Ok(client),
        }
    }

    /// Uses `http` to execute requests instead of a default `reqwest::Client`.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Instruments every call made by this client with `span`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Authenticates calls with the `checkpoint.session` cookie.
    pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = Some(key.into());
        self
    }

    /// Applies timeout and backoff options.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Returns a copy of this client with `overrides` applied.
    ///
    /// `self` is left untouched, so a shared client can be scoped to a
    /// request-specific session key without affecting other callers.
    pub fn derive(&self, overrides: ClientOverrides) -> Self {
        let mut client = self.clone();
        if let Some(http) = overrides.http {
            client = client.with_http_client(http);
        }
        if let Some(key) = overrides.session_key {
            client = client.with_session_key(key);
        }
        if let Some(span) = overrides.span {
            client = client.with_span(span);
        }
        if let Some(options) = overrides.options {
            client = client.with_options(options);
        }
        client
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Lists the memberships of the user behind `identity_id`.
    ///
    /// An unknown identity yields an empty list rather than an error.
    pub async fn get_memberships_by_identity(&self, identity_id: i64) -> Result<Vec<Membership>> {
        let path = format!("/identities/{identity_id}/memberships");
        let memberships: Option<Option<Vec<Membership>>> =
            not_found_as_none(self.get_json(&path, None).await)?;
        Ok(memberships.flatten().unwrap_or_default())
    }

    /// Looks up the user behind `identity_id`, `None` if there is none.
    pub async fn get_user_by_identity(&self, identity_id: i64) -> Result<Option<User>> {
        let path = format!("/users/by-identity/{identity_id}");
        let user: Option<Option<User>> = not_found_as_none(self.get_json(&path, None).await)?;
        Ok(user.flatten())
    }

    /// Looks up an application by its key, `None` if there is none.
    ///
    /// A key containing a `.` or `..` path segment cannot be placed in a URL
    /// without being collapsed into another path, so it yields `None` without
    /// contacting the service.
    pub async fn get_application_by_key(&self, key: &str) -> Result<Option<Application>> {
        if has_dot_segment(key) {
            tracing::debug!(target: LOG_TARGET, key, "application key is not addressable");
            return Ok(None);
        }
        let path = format!("/applications/keys/{key}");
        let application: Option<Option<Application>> =
            not_found_as_none(self.get_json(&path, None).await)?;
        Ok(application.flatten())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<&[(&str, &str)]>,
    ) -> Result<T> {
        self.send_with_retry(Method::GET, path, query)
            .instrument(self.span.clone())
            .await
    }

    /// Runs the request/classify/decode loop until a value decodes.
    ///
    /// Transport and status errors end the call immediately. Decode failures
    /// are retried with jittered exponential backoff and no attempt limit, so
    /// a service that keeps returning malformed bodies keeps this future
    /// pending until the caller drops it (for example via
    /// `tokio::time::timeout`).
    async fn send_with_retry<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, &str)]>,
    ) -> Result<T> {
        let mut backoff = Backoff::from_options(&self.options);
        loop {
            let mut request = new_request(
                &self.http,
                &self.base_url,
                self.session_key.as_deref(),
                method.clone(),
                path,
                query,
            )?;
            *request.timeout_mut() = Some(Duration::from_millis(self.options.timeout_ms));
            let url = request.url().clone();

            let started = Instant::now();
            let response = self
                .http
                .execute(request)
                .await
                .map_err(CentralError::Transport)?;
            let status = response.status();

            tracing::info!(
                target: LOG_TARGET,
                method = %method,
                url = %url,
                time = started.elapsed().as_secs_f64(),
                status = status.as_u16(),
                "central response"
            );

            check_status(&method, &url, status)?;

            match decode_response(response).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let delay = backoff.next_delay();
                    tracing::warn!(
                        target: LOG_TARGET,
                        error = %err,
                        attempt = backoff.attempt(),
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "response error, will retry"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|err| CentralError::InvalidBaseUrl(format!("{raw}: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CentralError::InvalidBaseUrl(format!(
            "{raw}: unsupported scheme '{}'",
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(CentralError::InvalidBaseUrl(format!("{raw}: missing host")));
    }
    Ok(url)
}

fn not_found_as_none<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_status(StatusCode::NOT_FOUND) => Ok(None),
        Err(err) => Err(err),
    }
}
