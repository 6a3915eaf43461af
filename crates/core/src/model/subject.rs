use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validated quiz subject tag (e.g. `html`, `css`, `js`).
///
/// Subjects select a question bank and key the per-subject progress
/// aggregate, so they are restricted to lowercase ASCII letters, digits,
/// `-` and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Subject(String);

impl Subject {
    /// Create a validated subject tag. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::Empty` for blank input and
    /// `SubjectError::InvalidChar` for anything outside `[a-z0-9_-]`.
    pub fn new(value: impl Into<String>) -> Result<Self, SubjectError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SubjectError::Empty);
        }
        if let Some(ch) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_'))
        {
            return Err(SubjectError::InvalidChar(ch));
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Heading shown above a quiz, e.g. `HTML Quiz`.
    #[must_use]
    pub fn quiz_title(&self) -> String {
        format!("{} Quiz", self.0.to_uppercase())
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Subject {
    type Error = SubjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Subject> for String {
    fn from(value: Subject) -> Self {
        value.0
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubjectError {
    #[error("subject cannot be empty")]
    Empty,

    #[error("subject contains invalid character {0:?}")]
    InvalidChar(char),
}
