use serde::{Deserialize, Serialize};

/// Token type assumed when the server or the store does not name one.
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Bearer credential as held in the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
}

impl Credential {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            token_type: DEFAULT_TOKEN_TYPE.to_string(),
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Value for the `Authorization` header, e.g. `Bearer eyJ...`
    pub fn authorization_value(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

/// Body returned by the login and refresh endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// Token type with the `Bearer` fallback applied. Empty strings count as missing.
    pub fn token_type(&self) -> &str {
        match self.token_type.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => DEFAULT_TOKEN_TYPE,
        }
    }

    pub fn into_credential(self) -> Credential {
        Credential {
            token_type: self.token_type().to_string(),
            access_token: self.access_token,
            refresh_token: self.refresh_token,
        }
    }
}
