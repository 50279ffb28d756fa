//! Authenticated HTTP client for the GrowthCanvas API.
//!
//! Every request reads the stored credential at send time and carries it as
//! `Authorization: <token_type> <access_token>`. A 401 on anything but the
//! login endpoint exchanges the refresh token for a new access token and
//! resends the request once.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::auth::{Credential, Session, TokenResponse};

use super::request::{ApiRequest, RequestBody, REFRESH_PATH};
use super::retry;
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Backend used when neither the environment nor the config names one
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the forecasting backend.
/// Clone is cheap - clones share the connection pool, the session store and
/// the refresh lock.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
    session: Session,
    /// Serializes token refreshes across all clones
    refresh_lock: Arc<Mutex<()>>,
}

impl ApiClient {
    /// Create a new API client for `base_url` that reads and writes
    /// credentials through `session`
    pub fn new(base_url: &str, session: Session) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self::with_http_client(client, base_url, session))
    }

    /// Create a client around an existing `reqwest::Client`
    pub fn with_http_client(client: Client, base_url: &str, session: Session) -> Self {
        Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            session,
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request, refreshing the credential and resending once on a 401.
    ///
    /// Returns the upstream response for every status the retry policy does
    /// not claim, including error statuses and a 401 on the resend. Fails with
    /// [`ApiError::AuthExpired`] when the credential cannot be refreshed.
    pub async fn send(&self, request: &ApiRequest) -> Result<Response, ApiError> {
        let mut attempt = 1;
        loop {
            let credential = self.session.credential()?;
            let response = self.transmit(request, credential.as_ref()).await?;
            let status = response.status();
            debug!(
                method = %request.method(),
                path = request.path(),
                status = status.as_u16(),
                attempt,
                "API response"
            );

            if !retry::should_refresh(status, request, attempt) {
                return Ok(response);
            }

            attempt += 1;
            let failed_token = credential.map(|c| c.access_token);
            self.refresh_credential(failed_token.as_deref()).await?;
        }
    }

    async fn transmit(
        &self,
        request: &ApiRequest,
        credential: Option<&Credential>,
    ) -> Result<Response, ApiError> {
        let mut builder = self
            .client
            .request(request.method().clone(), self.url(request.path()));

        if let Some(credential) = credential {
            builder = builder.header(header::AUTHORIZATION, credential.authorization_value());
        }

        builder = match request.body() {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Form(fields) => builder.form(fields),
        };

        Ok(builder.send().await?)
    }

    /// Replace the stored credential after a 401.
    ///
    /// `failed_token` is the access token the rejected request carried. If
    /// the store holds a different one by the time the lock is acquired,
    /// another request already refreshed and the caller just resends.
    async fn refresh_credential(&self, failed_token: Option<&str>) -> Result<(), ApiError> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.session.access_token()?;
        if current.is_some() && current.as_deref() != failed_token {
            debug!("Credential already refreshed by a concurrent request");
            return Ok(());
        }

        let Some(refresh_token) = self.session.refresh_token()? else {
            warn!("Access token rejected and no refresh token stored");
            self.discard_session();
            return Err(ApiError::AuthExpired);
        };

        match self.request_refresh(&refresh_token).await {
            Ok(tokens) => {
                self.session.apply_refresh(&tokens)?;
                info!(
                    rotated_refresh_token = tokens.refresh_token.is_some(),
                    "Access token refreshed"
                );
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, clearing session");
                self.discard_session();
                Err(ApiError::AuthExpired)
            }
        }
    }

    /// Exchange the refresh token for a new access token. Bypasses `send`,
    /// so a failing refresh can never trigger another refresh.
    async fn request_refresh(&self, refresh_token: &str) -> Result<TokenResponse, ApiError> {
        let response = self
            .client
            .post(self.url(REFRESH_PATH))
            .bearer_auth(refresh_token)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::parse_json(response).await
    }

    fn discard_session(&self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear stored credentials");
        }
    }

    /// Forget the stored credential. No backend call is made.
    pub fn logout(&self) {
        self.discard_session();
        info!("Logged out");
    }

    // ===== Response Helpers =====

    /// Check if response is successful, returning an error with body if not.
    pub(crate) async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    pub(crate) async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let path = response.url().path().to_string();
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", path, e))
        })
    }

    /// Send, check the status, and decode the JSON body
    pub(crate) async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.send(&request).await?;
        let response = Self::check_response(response).await?;
        Self::parse_json(response).await
    }

    /// Send and check the status, ignoring the body
    pub(crate) async fn execute(&self, request: ApiRequest) -> Result<(), ApiError> {
        let response = self.send(&request).await?;
        Self::check_response(response).await?;
        Ok(())
    }
}
