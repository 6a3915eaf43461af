//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use quiz_core::model::{AttemptError, QuestionError, SubjectError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted while fetching or parsing a question bank.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankLoadError {
    #[error("failed to read question bank {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("question bank request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("malformed question bank: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] QuestionError),
}

/// Errors emitted while starting a quiz.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no quiz is configured for subject {0}")]
    UnknownSubject(String),
    #[error(transparent)]
    Load(#[from] BankLoadError),
}

/// Errors emitted by `AttemptRecorder::record`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecorderError {
    #[error("failed to encode progress: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProfileService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("profile document is malformed: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `DashboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DashboardError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by a `SessionProvider`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionProviderError {
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("password cannot be empty")]
    EmptyPassword,
    #[error("session provider unavailable: {0}")]
    Unavailable(String),
}

/// Errors emitted while reading the quiz catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("failed to read quiz catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid quiz catalog: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Subject(#[from] SubjectError),
    #[error("quiz bank location for {subject} is empty")]
    EmptyBank { subject: String },
    #[error("subject {0} is configured more than once")]
    Duplicate(String),
    #[error("quiz catalog has no quizzes")]
    Empty,
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
