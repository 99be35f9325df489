use serde::{Deserialize, Serialize};

/// Request body for `/auth/login` and `/auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub login: String,
    pub security_key: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, security_key: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            security_key: security_key.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Identity payload returned by the backend.
///
/// The session layer only cares whether a profile is present, so the body is
/// kept as-is. Accessors cover the fields the shell displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(serde_json::Value);

impl UserProfile {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn login(&self) -> Option<&str> {
        self.0.get("login").and_then(|v| v.as_str())
    }

    pub fn id(&self) -> Option<i64> {
        self.0.get("id").and_then(|v| v.as_i64())
    }

    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }

    /// Display name for prompts and status lines
    pub fn display_name(&self) -> String {
        match (self.login(), self.id()) {
            (Some(login), _) => login.to_string(),
            (None, Some(id)) => format!("user #{}", id),
            (None, None) => "unknown user".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_is_opaque() {
        let body = json!({
            "id": 7,
            "login": "alice",
            "is_active": true,
            "created_at": "2024-05-01T10:00:00",
            "last_login": null,
            "unexpected": {"nested": [1, 2, 3]}
        });
        let profile: UserProfile = serde_json::from_value(body.clone())
            .expect("Failed to parse profile");
        assert_eq!(profile.login(), Some("alice"));
        assert_eq!(profile.id(), Some(7));
        assert_eq!(profile.as_json(), &body);
        assert_eq!(profile.display_name(), "alice");
    }

    #[test]
    fn test_display_name_fallbacks() {
        assert_eq!(UserProfile::new(json!({"id": 3})).display_name(), "user #3");
        assert_eq!(UserProfile::new(json!({})).display_name(), "unknown user");
    }

    #[test]
    fn test_credentials_wire_format() {
        let body = serde_json::to_value(Credentials::new("alice", "key-1"))
            .expect("Failed to serialize credentials");
        assert_eq!(body, json!({"login": "alice", "security_key": "key-1"}));
    }
}
