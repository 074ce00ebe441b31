//! HTTP client for the NeoNest backend
//!
//! Wraps a [`reqwest::Client`] with the base URL, the bearer token and the
//! response-to-error mapping every screen shares. Non-success responses are
//! read as `{"error": "..."}` when possible and classified by
//! [`AppError::from_status`].

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::types::{ApiErrorBody, AppError, AuthResponse, LoginRequest, Result, SignupRequest};
use crate::utils::toml_config::ApiConfig;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Build from the `[api]` config section, picking the token up from the
    /// environment variable it names.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let client = Self::with_timeout(&config.base_url, Duration::from_secs(config.timeout_secs))?;
        let token = std::env::var(&config.token_env).ok().filter(|t| !t.is_empty());
        Ok(client.with_token_opt(token))
    }

    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.with_token_opt(Some(token.into()))
    }

    fn with_token_opt(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let resp = self.send(self.http.get(self.url(path))).await?;
        Ok(resp.json::<R>().await?)
    }

    pub async fn post_json<T, R>(&self, path: &str, body: &T) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let resp = self.send(self.http.post(self.url(path)).json(body)).await?;
        Ok(resp.json::<R>().await?)
    }

    pub async fn patch_json<T, R>(&self, path: &str, body: &T) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let resp = self.send(self.http.patch(self.url(path)).json(body)).await?;
        Ok(resp.json::<R>().await?)
    }

    /// DELETE; any success body is ignored.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(self.http.delete(self.url(path))).await?;
        Ok(())
    }

    /// Attach auth, send, and turn non-success statuses into errors.
    async fn send(&self, req: RequestBuilder) -> Result<reqwest::Response> {
        let req = match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        };

        let resp = req.send().await.map_err(|e| {
            warn!("Request to {} failed: {}", self.base_url, e);
            AppError::from(e)
        })?;

        let status = resp.status();
        debug!(status = status.as_u16(), url = %resp.url(), "Backend responded");

        if status.is_success() {
            return Ok(resp);
        }

        let backend_error = resp.json::<ApiErrorBody>().await.ok().map(|body| body.error);
        Err(AppError::from_status(status.as_u16(), backend_error))
    }

    /// Log in and return the session token.
    ///
    /// A 200 without `success` and `token` is treated as a rejection carrying
    /// the body's `error` text.
    pub async fn login(&self, request: &LoginRequest) -> Result<String> {
        let resp: AuthResponse = self.post_json("/api/auth/login", request).await?;

        match (resp.success, resp.token) {
            (Some(_), Some(token)) => Ok(token),
            _ => Err(AppError::Unauthorized(
                resp.error.unwrap_or_else(|| "wrong password".to_string()),
            )),
        }
    }

    /// Create an account; the backend answers `201 {token, success}`.
    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse> {
        let resp = self
            .send(self.http.post(self.url("/api/auth/signup")).json(request))
            .await?;
        let status = resp.status();
        let body: AuthResponse = resp.json().await?;

        if status != StatusCode::CREATED || body.token.is_none() {
            return Err(AppError::from_status(status.as_u16(), body.error));
        }
        Ok(body)
    }
}
