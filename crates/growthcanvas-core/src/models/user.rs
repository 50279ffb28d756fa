use serde::{Deserialize, Serialize};

/// Registration form body for `/api/auth/register`
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Profile returned by `/api/auth/me` and registration.
///
/// Only the fields the client displays are typed; anything else the backend
/// sends is kept in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserProfile {
    /// Name to greet the user with
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.username.as_deref())
            .or(self.email.as_deref())
            .unwrap_or("unknown user")
    }
}

/// Third-party identity providers offered on the login page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Github,
    LinkedIn,
}

impl OAuthProvider {
    pub fn slug(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Github => "github",
            OAuthProvider::LinkedIn => "linkedin",
        }
    }

    pub fn from_slug(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Some(OAuthProvider::Google),
            "github" => Some(OAuthProvider::Github),
            "linkedin" => Some(OAuthProvider::LinkedIn),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallbacks() {
        let json = r#"{"id": 3, "username": "alice", "email": "a@example.com", "is_active": true}"#;
        let user: UserProfile = serde_json::from_str(json).expect("Failed to parse user");
        assert_eq!(user.display_name(), "alice");
        assert_eq!(user.extra.get("is_active"), Some(&serde_json::Value::Bool(true)));

        let json = r#"{"email": "a@example.com", "full_name": ""}"#;
        let user: UserProfile = serde_json::from_str(json).expect("Failed to parse user");
        assert_eq!(user.display_name(), "a@example.com");
    }

    #[test]
    fn test_provider_slugs() {
        assert_eq!(OAuthProvider::from_slug("GitHub"), Some(OAuthProvider::Github));
        assert_eq!(OAuthProvider::LinkedIn.slug(), "linkedin");
        assert_eq!(OAuthProvider::from_slug("myspace"), None);
    }
}
