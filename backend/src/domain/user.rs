//! User identity model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::email::EmailAddress;

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID, e.g. one loaded from the database.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Account record.
///
/// The password is stored only as a one-way hash; plaintext never
/// survives [`crate::domain::AccountService::create_user`]. The staff
/// and superuser flags are plain booleans set at creation or by
/// administrative action.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Normalized, unique email address.
    pub email: EmailAddress,
    /// PHC-format password hash.
    pub password_hash: String,
    /// Inactive accounts cannot authenticate.
    pub is_active: bool,
    /// Grants access to administrative surfaces.
    pub is_staff: bool,
    /// Grants all permissions.
    pub is_superuser: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
