//! This module provides a client to the task API
//!
//! Every call goes through the same pipeline:
//! * calls to the authentication endpoints (`/auth/...`) are sent as-is, without any token,
//! * other calls carry the stored access token as a bearer token, if there is one,
//! * when a call is rejected with `401 Unauthorized` and a refresh token is stored, the session is refreshed
//!   once and the call is retried once with the new access token. The outcome of this retry is final.
//! * when the refresh itself fails, the stored tokens are cleared, the session-end hook is called, and
//!   [`Error::SessionEnded`] is returned.
//!
//! Refreshes are serialized: when several calls are rejected at the same time, only the first one actually
//! refreshes the session, the others re-use its new access token.

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::credentials::TokenStore;
use crate::error::Error;

mod auth;
mod tasks;
pub use auth::{AuthResponse, validate_login, validate_registration};


/// A request to the API, kept around so that it can be sent a second time after a refresh
#[derive(Clone, Debug)]
pub(crate) struct ApiRequest {
    method: Method,
    url: Url,
    query: Vec<(&'static str, String)>,
    body: Option<serde_json::Value>,
    /// Whether this is a call to one of the `auth/...` endpoints
    is_auth: bool,
}

impl ApiRequest {
    fn with_query(mut self, query: Vec<(&'static str, String)>) -> Self {
        self.query = query;
        self
    }

    fn with_json<T: Serialize>(mut self, body: &T) -> Result<Self, Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Authentication calls must never carry a (possibly stale) bearer token
    fn targets_auth(&self) -> bool {
        self.is_auth
    }
}


/// A client to the task API
pub struct Client<S: TokenStore> {
    http: reqwest::Client,
    base_url: Url,
    tokens: S,

    refresh_lock: tokio::sync::Mutex<()>,
    on_session_end: Option<Box<dyn Fn() + Send + Sync>>,
}

impl<S: TokenStore> Client<S> {
    /// Create a client. This does not start a connection.
    ///
    /// `base_url` is the root of the API (e.g. `http://localhost:8080/api`), endpoint paths are appended to it.
    pub fn new<U: AsRef<str>>(base_url: U, tokens: S) -> Result<Self, Error> {
        let base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Validation(format!("{} cannot be used as a base URL", base_url)));
        }

        let http = reqwest::Client::builder()
            .user_agent(crate::config::user_agent())
            .build()?;

        Ok(Self {
            http,
            base_url,
            tokens,
            refresh_lock: tokio::sync::Mutex::new(()),
            on_session_end: None,
        })
    }

    /// Create a client to the URL set in [`crate::config::API_URL`]
    pub fn from_config(tokens: S) -> Result<Self, Error> {
        Self::new(crate::config::api_url(), tokens)
    }

    /// Register a function that is called whenever the session ends because a refresh failed.
    /// This is typically where an app navigates back to its login screen.
    pub fn with_session_end_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_session_end = Some(Box::new(hook));
        self
    }

    pub fn base_url(&self) -> &Url { &self.base_url }
    pub fn tokens(&self) -> &S     { &self.tokens   }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_authenticated()
    }

    /// Build a request to `base_url/segment1/segment2/...`. Segments are percent-encoded.
    ///
    /// Only the first segment tells an authentication endpoint apart, the base path and task IDs never do.
    pub(crate) fn request(&self, method: Method, segments: &[&str]) -> ApiRequest {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }

        let is_auth = segments.first() == Some(&"auth");
        ApiRequest { method, url, query: Vec::new(), body: None, is_auth }
    }

    /// Send a request and decode its JSON reply
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, Error> {
        let response = self.send(request).await?;
        decode(response).await
    }

    /// Send a request through the authentication pipeline
    pub(crate) async fn send(&self, request: ApiRequest) -> Result<reqwest::Response, Error> {
        if request.targets_auth() {
            return self.dispatch(&request, None).await;
        }

        let token = self.tokens.access_token().filter(|t| t.is_empty() == false);
        let err = match self.dispatch(&request, token.as_deref()).await {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };

        if err.is_unauthorized() == false || self.tokens.refresh_token().is_none() {
            return Err(err);
        }

        log::info!("{} {} was rejected as unauthorized, refreshing the session", request.method, request.url.path());
        let new_token = self.refresh_after_rejection(token.as_deref()).await?;

        log::debug!("Retrying {} {}", request.method, request.url.path());
        self.dispatch(&request, Some(&new_token)).await
    }

    /// Return a fresh access token, after `rejected` has been refused by the server
    async fn refresh_after_rejection(&self, rejected: Option<&str>) -> Result<String, Error> {
        let _guard = self.refresh_lock.lock().await;

        // Another request may have refreshed the session while we were waiting for the lock
        if let Some(current) = self.tokens.access_token() {
            if current.is_empty() == false && Some(current.as_str()) != rejected {
                log::debug!("The session has already been refreshed");
                return Ok(current);
            }
        }
        // ...or it may have failed to, in which case the session has already ended
        if self.tokens.refresh_token().is_none() {
            return Err(Error::SessionEnded(Box::new(Error::Unauthorized { message: None })));
        }

        match self.refresh().await {
            Ok(creds) => Ok(creds.access_token),
            Err(err) => {
                log::warn!("Unable to refresh the session: {}", err);
                self.end_session();
                Err(Error::SessionEnded(Box::new(err)))
            }
        }
    }

    fn end_session(&self) {
        self.tokens.clear();
        if let Some(hook) = &self.on_session_end {
            hook();
        }
    }

    /// Actually send a request, once
    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> Result<reqwest::Response, Error> {
        let mut builder = self.http.request(request.method.clone(), request.url.clone());
        if request.query.is_empty() == false {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() == false {
            let body = response.text().await.unwrap_or_default();
            log::debug!("{} {} replied {}", request.method, request.url.path(), status);
            return Err(Error::from_status(status, &body));
        }

        Ok(response)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
    let text = response.text().await?;
    let decoded = serde_json::from_str(&text)?;
    Ok(decoded)
}
