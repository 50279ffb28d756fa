use reqwest::Method;
use serde::Serialize;

use super::ApiError;

/// Login endpoint; 401s from it (and its provider children) are never retried
pub const LOGIN_PATH: &str = "/api/auth/login";

/// Token refresh endpoint
pub const REFRESH_PATH: &str = "/api/auth/refresh-token";

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

/// Outbound call descriptor.
///
/// Immutable once built: a resend after a token refresh transmits the same
/// descriptor again, only the Authorization header is recomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode body: {}", e)))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn form<K, V>(mut self, fields: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.body = RequestBody::Form(
            fields
                .iter()
                .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
                .collect(),
        );
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Whether this request targets the login endpoint
    pub fn is_login(&self) -> bool {
        let path = self.path.split(['?', '#']).next().unwrap_or_default();
        path == LOGIN_PATH
            || path
                .strip_prefix(LOGIN_PATH)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}
