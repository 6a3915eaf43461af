#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth;
pub mod bank;
pub mod catalog;
pub mod dashboard;
pub mod error;
pub mod gatekeeper;
pub mod profile;
pub mod quiz;
pub mod recorder;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use auth::{AuthUser, LocalSessionProvider, Session, SessionProvider};
pub use bank::{BankSource, QuestionBankLoader};
pub use catalog::{QuizCatalog, QuizPage};
pub use dashboard::{AttemptListItem, Dashboard, DashboardService, SubjectCard};
pub use error::{
    AppServicesError, BankLoadError, CatalogError, DashboardError, ProfileError, QuizError,
    RecorderError, SessionProviderError,
};
pub use gatekeeper::SessionGatekeeper;
pub use profile::ProfileService;
pub use quiz::{QuizEvent, QuizOptions, QuizPhase, QuizRunner, QuizState};
pub use recorder::{AttemptRecorder, SaveOutcome, SkipReason};
