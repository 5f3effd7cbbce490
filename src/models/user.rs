//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// Account role. Admins manage other users and bypass the subscription gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// User account stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// UUID v4 (also used as document ID)
    pub id: String,
    /// Display name
    pub name: String,
    /// Unique login email
    pub email: String,
    /// bcrypt hash, never sent to clients
    pub password_hash: String,
    pub role: Role,
    /// Subscription flag; false until an admin activates the account
    pub is_active: bool,
    /// When the subscription was last activated (RFC3339)
    #[serde(default)]
    pub activated_at: Option<String>,
    /// End of the subscription window (RFC3339)
    #[serde(default)]
    pub expires_at: Option<String>,
    /// SHA-256 of the single currently-valid refresh token
    #[serde(default)]
    pub refresh_token_hash: Option<String>,
    /// When the account was created (RFC3339)
    pub created_at: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Public view of this account, with credential material stripped.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            is_active: self.is_active,
            activated_at: self.activated_at.clone(),
            expires_at: self.expires_at.clone(),
            created_at: self.created_at.clone(),
        }
    }
}

/// What clients see of a user. Excludes the password hash and the stored
/// refresh-token hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub activated_at: Option<String>,
    pub expires_at: Option<String>,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_strips_credentials() {
        let user = User {
            id: "u1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$2b$10$secret".to_string(),
            role: Role::User,
            is_active: false,
            activated_at: None,
            expires_at: None,
            refresh_token_hash: Some("deadbeef".to_string()),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        };

        let body = serde_json::to_value(user.profile()).unwrap();
        assert!(body.get("password_hash").is_none());
        assert!(body.get("refresh_token_hash").is_none());
        assert_eq!(body["email"], "ada@example.com");
        assert_eq!(body["is_active"], false);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }
}
