use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;

/// The identifier of a requirement, such as `REQ-1` or `CORE-RESET-004`.
///
/// An identifier is any non-empty string without whitespace. Comparison and
/// ordering are plain, case-sensitive string comparison, which is also the
/// order used by the requirement index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequirementId(NonEmptyString);

impl RequirementId {
    /// Creates a new `RequirementId` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidIdError`] if the string is empty or contains
    /// whitespace.
    pub fn new(s: String) -> Result<Self, InvalidIdError> {
        if s.chars().any(char::is_whitespace) {
            return Err(InvalidIdError::Whitespace(s));
        }

        NonEmptyString::new(s)
            .map(Self)
            .map_err(|_| InvalidIdError::Empty)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The first character of the identifier.
    ///
    /// This is the key the requirement is grouped under in the index.
    #[must_use]
    pub fn group_key(&self) -> char {
        // non-empty by construction
        self.0.as_str().chars().next().unwrap_or_default()
    }

    /// The fragment identifier requirement tables are anchored at.
    ///
    /// ```
    /// use reqdoc::RequirementId;
    ///
    /// let id = RequirementId::try_from("REQ-1").unwrap();
    /// assert_eq!(id.anchor(), "req-REQ-1");
    /// ```
    #[must_use]
    pub fn anchor(&self) -> String {
        format!("req-{}", self.0)
    }

    /// The fully qualified object name of the requirement, such as
    /// `req.REQ-1`.
    #[must_use]
    pub fn object_name(&self) -> String {
        format!("req.{}", self.0)
    }
}

/// Error returned when a string is not a valid requirement identifier.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum InvalidIdError {
    /// The identifier was empty.
    #[error("requirement identifier must not be empty")]
    Empty,
    /// The identifier contained whitespace.
    #[error("invalid requirement identifier '{0}': must not contain whitespace")]
    Whitespace(String),
}

impl TryFrom<String> for RequirementId {
    type Error = InvalidIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for RequirementId {
    type Error = InvalidIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl FromStr for RequirementId {
    type Err = InvalidIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl AsRef<str> for RequirementId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for RequirementId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl fmt::Display for RequirementId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
