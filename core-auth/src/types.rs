use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// An identifier as the service writes it: a JSON string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IdRepr {
    Text(String),
    Number(i64),
}

impl From<IdRepr> for String {
    fn from(id: IdRepr) -> Self {
        match id {
            IdRepr::Text(text) => text,
            IdRepr::Number(number) => number.to_string(),
        }
    }
}

/// Identifier of the remote account that owns uploaded entities.
///
/// The service hands out opaque identifiers; they are passed back verbatim as
/// `user_id` on every create call. Numeric ids are read as their decimal
/// text and always written back as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        IdRepr::deserialize(deserializer).map(|id| Self(id.into()))
    }
}

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Credentials for the remote subtitle service.
///
/// Acquired once when the uploader is built. The token is sent as a bearer
/// token on every request and the user id is stamped on every created entity.
///
/// # Examples
///
/// ```
/// use core_auth::AuthData;
///
/// let auth = AuthData::new("secret-token", "42");
/// assert_eq!(auth.user_id.as_str(), "42");
/// assert!(!format!("{:?}", auth).contains("secret-token"));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthData {
    pub token: String,
    #[serde(rename = "id")]
    pub user_id: UserId,
}

impl AuthData {
    pub fn new(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_id: UserId::new(user_id),
        }
    }
}

impl fmt::Debug for AuthData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthData")
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_data_wire_format() {
        let auth: AuthData = serde_json::from_str(r#"{"token":"abc","id":"u-1"}"#).unwrap();
        assert_eq!(auth.token, "abc");
        assert_eq!(auth.user_id, UserId::from("u-1"));

        let json = serde_json::to_value(&auth).unwrap();
        assert_eq!(json["id"], "u-1");
    }

    #[test]
    fn test_auth_data_accepts_numeric_id() {
        let auth: AuthData = serde_json::from_str(r#"{"token":"abc","id":42}"#).unwrap();
        assert_eq!(auth.user_id, UserId::new("42"));

        let json = serde_json::to_value(&auth).unwrap();
        assert_eq!(json["id"], "42");
    }

    #[test]
    fn test_user_id_rejects_other_shapes() {
        assert!(serde_json::from_str::<UserId>("true").is_err());
        assert!(serde_json::from_str::<UserId>("null").is_err());
    }

    #[test]
    fn test_user_id_display() {
        assert_eq!(UserId::new("7").to_string(), "7");
    }
}
