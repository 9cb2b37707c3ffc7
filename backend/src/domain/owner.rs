//! Owner identity attached to every task.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum accepted length of an owner identifier, in characters.
pub const OWNER_ID_MAX_CHARS: usize = 255;

/// Validation errors returned by [`OwnerId::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OwnerIdValidationError {
    #[error("owner id must not be empty")]
    Empty,
    #[error("owner id must not contain surrounding whitespace")]
    SurroundingWhitespace,
    #[error("owner id must be at most {max} characters")]
    TooLong { max: usize },
}

/// Opaque identifier of the user owning a task.
///
/// The identifier is issued by the authentication collaborator, so no format
/// is imposed beyond being non-empty, trimmed and fitting the storage column.
///
/// # Examples
/// ```
/// use taskflow::domain::OwnerId;
///
/// let owner = OwnerId::new("user-42").expect("valid owner id");
/// assert_eq!(owner.as_ref(), "user-42");
/// assert!(OwnerId::new(" user-42").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

impl OwnerId {
    /// Validate and construct an [`OwnerId`].
    pub fn new(id: impl Into<String>) -> Result<Self, OwnerIdValidationError> {
        let raw = id.into();
        if raw.is_empty() {
            return Err(OwnerIdValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(OwnerIdValidationError::SurroundingWhitespace);
        }
        if raw.chars().count() > OWNER_ID_MAX_CHARS {
            return Err(OwnerIdValidationError::TooLong {
                max: OWNER_ID_MAX_CHARS,
            });
        }
        Ok(Self(raw))
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for OwnerId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<OwnerId> for String {
    fn from(value: OwnerId) -> Self {
        value.0
    }
}

impl TryFrom<String> for OwnerId {
    type Error = OwnerIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
