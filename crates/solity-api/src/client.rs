// Solity API HTTP client
//
// Wraps `reqwest::Client` with the vendor's header conventions, envelope
// parsing, status classification, and the lazily established session.
// Endpoint methods live in `devices.rs` as inherent methods so this module
// stays focused on transport mechanics.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderValue, USER_AGENT};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};
use url::Url;

use crate::auth::{Credentials, Session};
use crate::error::Error;
use crate::models::{Envelope, LoginContents};
use crate::transport::{DEFAULT_TIMEOUT, TransportConfig};

const AUTHORIZATION: &str = "Authorization";
const AUTHORIZATION_PWD: &str = "AuthorizationPwd";

/// Authenticated gateway to the Solity cloud API.
///
/// Holds the account credentials and the current session. Every
/// authenticated call goes through [`ensure_session`](Self::ensure_session),
/// which logs in at most once even when several calls race on an empty
/// session.
pub struct SolityClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    timeout: Duration,
    /// Current tokens. `None` until the first login, and again after a
    /// rejected login or a 401/403 on an authenticated request.
    session: Mutex<Option<Session>>,
}

impl SolityClient {
    /// Create a client talking to the production API.
    pub fn new(credentials: Credentials, transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = Url::parse(crate::API_BASE_URL)?;
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, credentials).with_timeout(transport.timeout))
    }

    /// Create a client around a shared `reqwest::Client`.
    ///
    /// The host owns the HTTP client; this one only borrows its connection
    /// pool. `base_url` is the API root, e.g. `https://www.smartsolity.com/api_v2`.
    pub fn with_client(http: reqwest::Client, base_url: Url, credentials: Credentials) -> Self {
        Self {
            http,
            base_url,
            credentials,
            timeout: DEFAULT_TIMEOUT,
            session: Mutex::new(None),
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether a session is currently held.
    pub async fn has_session(&self) -> bool {
        self.session.lock().await.is_some()
    }

    // ── Session management ───────────────────────────────────────────

    /// Log in with the stored credentials, replacing any current session.
    ///
    /// `POST /login` with `{email, password}`. A non-zero `result` fails with
    /// [`Error::Authentication`] carrying the vendor's message and leaves no
    /// session behind.
    pub async fn login(&self) -> Result<(), Error> {
        let mut slot = self.session.lock().await;
        *slot = None;
        let session = self.authenticate().await?;
        *slot = Some(session);
        Ok(())
    }

    /// Drop the current session. The next authenticated call logs in again.
    pub async fn logout(&self) {
        if self.session.lock().await.take().is_some() {
            debug!("session cleared");
        }
    }

    /// Return the current session, logging in first if there is none.
    ///
    /// The session lock is held across the login so concurrent callers
    /// wait for the one login in flight instead of starting their own.
    pub async fn ensure_session(&self) -> Result<Session, Error> {
        let mut slot = self.session.lock().await;
        if let Some(session) = slot.as_ref() {
            return Ok(session.clone());
        }
        debug!("no session, logging in");
        let session = self.authenticate().await?;
        *slot = Some(session.clone());
        Ok(session)
    }

    async fn authenticate(&self) -> Result<Session, Error> {
        let url = self.endpoint(&["login"])?;
        debug!(username = %self.credentials.username, "logging in at {}", url);

        let body = json!({
            "email": self.credentials.username,
            "password": self.credentials.password.expose_secret(),
        });

        let envelope: Envelope<LoginContents> =
            self.request(Method::POST, url, Some(&body), None).await?;

        if !envelope.is_success() {
            return Err(Error::Authentication {
                message: envelope.error_message_or("Login failed"),
            });
        }

        let contents = envelope.contents.ok_or_else(|| Error::Authentication {
            message: "login response carried no contents".into(),
        })?;
        let (Some(token), Some(pwd)) = (contents.auth_token, contents.auth_pwd) else {
            return Err(Error::Authentication {
                message: "login response missing authToken/authPwd".into(),
            });
        };

        debug!("login successful");
        Ok(Session::new(token, pwd))
    }

    /// Clear the stored session if it is still the one that was rejected.
    async fn invalidate(&self, rejected: &Session) {
        let mut slot = self.session.lock().await;
        if slot.as_ref().is_some_and(|current| current.same_as(rejected)) {
            warn!("session rejected by API, clearing");
            *slot = None;
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/{segments...}`, percent-encoding each segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::api(format!("base URL cannot carry a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Ensure a session, then send an authenticated request.
    ///
    /// A 401/403 clears the session before the error propagates.
    pub(crate) async fn authed<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<T, Error> {
        let session = self.ensure_session().await?;
        let result = self.request(method, url, body, Some(&session)).await;
        if let Err(Error::Authentication { .. }) = &result {
            self.invalidate(&session).await;
        }
        result
    }

    /// Send a request and parse the JSON body.
    ///
    /// Status 401/403 is an authentication failure whatever the body says;
    /// other non-2xx statuses are HTTP errors. Transport failures are
    /// classified by [`Error::from_transport`].
    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
        session: Option<&Session>,
    ) -> Result<T, Error> {
        debug!("{} {}", method, url);

        let mut builder = self
            .http
            .request(method, url)
            .timeout(self.timeout)
            .header(USER_AGENT, crate::USER_AGENT)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(session) = session {
            builder = builder
                .header(AUTHORIZATION, session.auth_token().expose_secret())
                .header(AUTHORIZATION_PWD, session.auth_pwd().expose_secret());
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(Error::from_transport)?;
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Authentication {
                message: "Invalid credentials".into(),
            });
        }
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(Error::from_transport)?;
        trace!(bytes = body.len(), "response body received");

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}
