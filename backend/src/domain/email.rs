//! Normalized email address for account identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors returned by [`EmailAddress::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailValidationError {
    /// The address was absent or blank after trimming.
    Empty,
    /// The address is not shaped like `local@domain`.
    Malformed,
}

impl fmt::Display for EmailValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "email address must not be empty"),
            Self::Malformed => write!(f, "email address must contain a local part and a domain"),
        }
    }
}

impl std::error::Error for EmailValidationError {}

/// Account email address, normalized at construction.
///
/// Normalization lower-cases the whole address, not only the domain
/// part, so two registrations differing only in case collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalize an address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, EmailValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EmailValidationError::Empty);
        }
        let (local, domain) = trimmed.split_once('@').ok_or(EmailValidationError::Malformed)?;
        if local.is_empty() || domain.is_empty() {
            return Err(EmailValidationError::Malformed);
        }
        Ok(Self(trimmed.to_lowercase()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = EmailValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
