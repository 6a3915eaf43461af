mod attempt;
mod ids;
mod progress;
mod question;
mod subject;

pub use ids::{AttemptId, ParseIdError, QuestionId, UserId};

pub use attempt::{Attempt, AttemptError, percentage};
pub use progress::{DEFAULT_PROFILE_NAME, SubjectProgress, UserProfile};
pub use question::{Question, QuestionBank, QuestionBankDocument, QuestionError, QuestionRecord};
pub use subject::{Subject, SubjectError};
