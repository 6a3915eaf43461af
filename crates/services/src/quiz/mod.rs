mod plan;
mod results;
mod runner;
mod session;

pub use plan::{
    DEFAULT_QUESTION_COUNT, DEFAULT_SECONDS_PER_QUESTION, MAX_QUESTION_COUNT, MIN_QUESTION_COUNT,
    MIN_SECONDS_PER_QUESTION, QuizOptions, sample_questions,
};
pub use results::{FinishedQuiz, NO_ANSWER_LABEL, ResultDetail, score};
pub use runner::QuizRunner;
pub use session::{Countdown, FinishReason, QuizEvent, QuizPhase, QuizState, RunningQuiz};
