//! User identity entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::UserValidationError;

/// User identifier - a positive integer assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct UserId(i64);

impl UserId {
    /// Create a new UserId, rejecting zero and negative values
    pub fn new(id: i64) -> Result<Self, UserValidationError> {
        if id <= 0 {
            return Err(UserValidationError::NonPositiveId(id));
        }

        Ok(Self(id))
    }

    /// Get the inner integer value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for UserId {
    type Error = UserValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for i64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user as persisted by the storage collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Store-assigned identifier, immutable
    id: UserId,
    /// Login email, unique and compared case-sensitively
    email: String,
    /// Argon2 PHC string - never exposed in serialization
    #[serde(skip_serializing, default)]
    password_hash: String,
    /// Creation timestamp, set once
    created_at: DateTime<Utc>,
}

impl UserIdentity {
    /// Rehydrate a user from stored fields
    pub fn from_parts(
        id: UserId,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            password_hash: password_hash.into(),
            created_at,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A user that has not been persisted yet; the store assigns the id
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }

    /// Attach the store-assigned id
    pub fn into_identity(self, id: UserId) -> UserIdentity {
        UserIdentity::from_parts(id, self.email, self.password_hash, self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_must_be_positive() {
        assert!(UserId::new(1).is_ok());
        assert_eq!(UserId::new(0), Err(UserValidationError::NonPositiveId(0)));
        assert_eq!(UserId::new(-5), Err(UserValidationError::NonPositiveId(-5)));
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = NewUser::new("a@x.com", "$argon2id$secret").into_identity(UserId::new(3).unwrap());
        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["id"], 3);
        assert_eq!(json["email"], "a@x.com");
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_user_id_deserialize_rejects_zero() {
        let result: Result<UserId, _> = serde_json::from_str("0");
        assert!(result.is_err());
    }
}
