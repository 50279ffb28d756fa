//! Account endpoints: login, registration, profile and OAuth hand-off.

use reqwest::StatusCode;
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::{Credential, TokenResponse};
use crate::models::{NewUser, OAuthProvider, UserProfile};

use super::request::{ApiRequest, LOGIN_PATH};
use super::{ApiClient, ApiError};

const REGISTER_PATH: &str = "/api/auth/register";
const ME_PATH: &str = "/api/auth/me";

/// Base for resolving callback strings that are only a query (`?token=...`)
const CALLBACK_BASE: &str = "http://localhost/auth/callback";

impl ApiClient {
    /// Log in with a username and password and store the returned credential.
    ///
    /// The credential's token type defaults to `Bearer` when the server omits
    /// it. A rejected login is never retried through the refresh path.
    pub async fn login(&self, username: &str, password: &str) -> Result<Credential, ApiError> {
        let request =
            ApiRequest::post(LOGIN_PATH).form(&[("username", username), ("password", password)]);
        let response = self.send(&request).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            let detail = ApiError::error_message(&body);
            warn!(username, "Login rejected");
            return Err(ApiError::InvalidCredentials(if detail.is_empty() {
                "Incorrect username or password".to_string()
            } else {
                detail
            }));
        }

        let response = Self::check_response(response).await?;
        let tokens: TokenResponse = Self::parse_json(response).await?;
        let credential = tokens.into_credential();
        self.session().store_credential(&credential)?;

        info!(username, "Login successful");
        Ok(credential)
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, user: &NewUser) -> Result<UserProfile, ApiError> {
        let profile: UserProfile = self.fetch(ApiRequest::post(REGISTER_PATH).json(user)?).await?;
        info!(username = %user.username, "Account registered");
        Ok(profile)
    }

    /// Profile of the logged-in user
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.fetch(ApiRequest::get(ME_PATH)).await
    }

    /// Check whether the stored credential is still accepted.
    ///
    /// Returns false without a network call when no access token is stored.
    /// An authentication failure drops the access token and token type; other
    /// failures leave the store untouched.
    pub async fn verify_session(&self) -> bool {
        if !self.session().is_logged_in() {
            return false;
        }

        match self.me().await {
            Ok(user) => {
                debug!(user = user.display_name(), "Session verified");
                true
            }
            Err(e) if e.requires_login() => {
                warn!(error = %e, "Stored session rejected");
                if let Err(e) = self.session().clear_access() {
                    warn!(error = %e, "Failed to clear access token");
                }
                false
            }
            Err(e) => {
                warn!(error = %e, "Could not verify session");
                false
            }
        }
    }

    /// Browser URL that starts a third-party login
    pub fn oauth_login_url(&self, provider: OAuthProvider) -> String {
        self.url(&format!("{}/{}", LOGIN_PATH, provider.slug()))
    }

    /// Finish a third-party login from the URL the provider redirected to.
    ///
    /// Accepts a full URL or just its query string; the access token is taken
    /// from the `token` parameter.
    pub fn complete_oauth_callback(&self, callback: &str) -> Result<(), ApiError> {
        let url = Url::parse(callback)
            .or_else(|_| Url::parse(CALLBACK_BASE).and_then(|base| base.join(callback)))
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid callback URL: {}", e)))?;

        let token = url
            .query_pairs()
            .find(|(key, _)| key == "token")
            .map(|(_, value)| value.into_owned())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ApiError::InvalidResponse(
                    "No token received from authentication provider".to_string(),
                )
            })?;

        self.session().store_access_token(&token)?;
        info!("Third-party login completed");
        Ok(())
    }
}
