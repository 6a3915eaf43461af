use thiserror::Error;

use crate::model::{AttemptError, ParseIdError, QuestionError, SubjectError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Subject(#[from] SubjectError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Id(#[from] ParseIdError),
}
