use serde::{Deserialize, Serialize};

/// The user an identity provider vouched for.
/// Owned by the session manager; storage only ever holds a serialized copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    /// Identity key. For Google Sign-In this is the Google user id.
    pub id: String,

    pub email: String,

    pub full_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl AuthenticatedUser {
    pub fn new(id: String, email: String, full_name: String) -> Self {
        Self {
            id,
            email,
            full_name,
            avatar_url: None,
        }
    }

    pub fn with_avatar(mut self, avatar_url: String) -> Self {
        self.avatar_url = Some(avatar_url);
        self
    }
}

impl std::fmt::Display for AuthenticatedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.full_name, self.email)
    }
}

/// Snapshot of the session as the presentation layer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub current_user: Option<AuthenticatedUser>,
    pub is_authenticating: bool,
}

impl Session {
    pub fn is_signed_in(&self) -> bool {
        self.current_user.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case_without_missing_avatar() {
        let user = AuthenticatedUser::new(
            "u1".to_string(),
            "a@example.com".to_string(),
            "Ada".to_string(),
        );
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["fullName"], "Ada");
        assert!(json.get("avatarUrl").is_none());
    }

    #[test]
    fn test_deserializes_stored_payload() {
        let raw = r#"{"id":"x","email":"e@x.io","fullName":"X","avatarUrl":"https://a/b.png"}"#;
        let user: AuthenticatedUser = serde_json::from_str(raw).unwrap();
        assert_eq!(user.avatar_url.as_deref(), Some("https://a/b.png"));
    }
}
