//! The single chokepoint for backend calls.
//!
//! Every request goes through [`Gateway`], which
//!
//! 1. attaches `Authorization: Bearer <token>` when a session is active and
//!    sends no Authorization header otherwise;
//! 2. on a 401 clears the session and navigates to the login page, unless
//!    the user is already there. The call is not retried.
//!
//! Non-2xx bodies are normalized into one string whatever shape the backend
//! used (a bare string, `{"message": ..}` or `{"error": ..}`).

use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::multipart::Form;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::{LmsError, Result, AUTH_REJECTED_STATUS};
use crate::navigation::Navigator;
use crate::session::SessionStore;

/// Request body variants the backend accepts.
pub(crate) enum Payload {
    /// No body.
    Empty,
    /// JSON document.
    Json(Value),
    /// `multipart/form-data`.
    Multipart(Form),
}

impl Payload {
    /// Serializes `body` as JSON.
    pub(crate) fn json<T: Serialize + ?Sized>(body: &T) -> Result<Self> {
        Ok(Self::Json(serde_json::to_value(body)?))
    }
}

/// HTTP client bound to one backend and one session.
#[derive(Clone)]
pub struct Gateway {
    http: Client,
    base_url: String,
    login_path: String,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.base_url)
            .field("login_path", &self.login_path)
            .field("navigator", &self.navigator)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    /// Builds a gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::ConfigValidationError` if the configuration is
    /// invalid, or `LmsError::NetworkUnavailable` if the HTTP client cannot be
    /// constructed.
    pub fn new(
        config: &Config,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| LmsError::network(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            login_path: config.login_path.clone(),
            session,
            navigator,
        })
    }

    /// Full address of a backend path.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Base address with no trailing `/`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The session this gateway authenticates with.
    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    /// The navigator used for forced re-authentication.
    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Path of the login page.
    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    // ------------------------------------------------------------------------
    // Typed helpers used by the resource clients
    // ------------------------------------------------------------------------

    pub(crate) async fn get<Res>(&self, path: &str) -> Result<Res>
    where
        Res: DeserializeOwned,
    {
        let response = self.call(Method::GET, path, Payload::Empty).await?;
        decode(response).await
    }

    pub(crate) async fn send<Res>(&self, method: Method, path: &str, payload: Payload) -> Result<Res>
    where
        Res: DeserializeOwned,
    {
        let response = self.call(method, path, payload).await?;
        decode(response).await
    }

    pub(crate) async fn send_json<Req, Res>(&self, method: Method, path: &str, body: &Req) -> Result<Res>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        self.send(method, path, Payload::json(body)?).await
    }

    /// Sends a request whose response body is irrelevant.
    pub(crate) async fn send_discarding(&self, method: Method, path: &str) -> Result<()> {
        self.call(method, path, Payload::Empty).await?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    #[instrument(skip(self, method, payload), fields(method = %method))]
    async fn call(&self, method: Method, path: &str, payload: Payload) -> Result<Response> {
        let mut request = self.http.request(method, self.endpoint(path));

        let credential = self.session.credential();
        debug!(authenticated = credential.is_some(), "Dispatching request");
        if let Some(token) = credential {
            request = request.bearer_auth(token);
        }

        request = match payload {
            Payload::Empty => request,
            Payload::Json(body) => request.json(&body),
            Payload::Multipart(form) => request.multipart(form),
        };

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "No response from backend");
            LmsError::network(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "Request succeeded");
            return Ok(response);
        }

        let raw = response.text().await.unwrap_or_default();
        let body = normalize_error_body(&raw);
        warn!(status = status.as_u16(), body = %body, "Backend rejected request");

        if status.as_u16() == AUTH_REJECTED_STATUS {
            self.expire_session();
        }
        Err(LmsError::rejected(status.as_u16(), body))
    }

    /// Clears the session and sends the user to the login page.
    fn expire_session(&self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear rejected session");
        }
        if self.navigator.current_path() == self.login_path {
            debug!("Already on the login page, not redirecting");
        } else {
            self.navigator.navigate(&self.login_path);
        }
    }
}

/// Decodes a 2xx body. An empty body decodes as JSON `null`.
async fn decode<Res>(response: Response) -> Result<Res>
where
    Res: DeserializeOwned,
{
    let bytes = response
        .bytes()
        .await
        .map_err(|e| LmsError::network(format!("response body interrupted: {e}")))?;
    let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        &bytes
    };
    serde_json::from_slice(bytes).map_err(|e| LmsError::invalid_response(e.to_string()))
}

/// Collapses the backend's error body shapes into one string.
///
/// A JSON string is unwrapped; an object yields its non-empty `message` or
/// else `error` field; anything else is returned trimmed.
#[must_use]
pub fn normalize_error_body(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::String(text)) => text,
        Ok(Value::Object(map)) => ["message", "error"]
            .iter()
            .find_map(|key| {
                map.get(*key)
                    .and_then(Value::as_str)
                    .filter(|text| !text.is_empty())
                    .map(ToString::to_string)
            })
            .unwrap_or_else(|| raw.trim().to_string()),
        _ => raw.trim().to_string(),
    }
}
