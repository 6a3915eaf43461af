mod dashboard;
mod login;
mod quiz;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use dashboard::{AttemptRow, DashboardView, SubjectCardItem};
pub use login::LoginView;
pub use quiz::{QuestionCard, QuizView, ResultsPanel};
pub use state::{ViewError, ViewState, view_state_from_resource};
