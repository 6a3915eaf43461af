use chrono::{DateTime, Utc};

use quiz_core::model::{Attempt, AttemptError, Question, QuestionId, Subject, percentage};
use quiz_core::time::elapsed_seconds;

use super::session::FinishReason;

/// Label shown in place of the chosen option when a question was skipped.
pub const NO_ANSWER_LABEL: &str = "No answer";

/// Count of answers equal to the question's correct index. Unset answers never match.
#[must_use]
pub fn score(questions: &[Question], answers: &[Option<usize>]) -> u32 {
    let correct = questions
        .iter()
        .zip(answers)
        .filter(|(question, answer)| question.is_correct(**answer))
        .count();
    u32::try_from(correct).unwrap_or(u32::MAX)
}

/// One row of the results list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultDetail {
    pub question_id: QuestionId,
    pub prompt: String,
    pub selected: Option<String>,
    pub correct: String,
    pub explanation: Option<String>,
    pub is_correct: bool,
}

impl ResultDetail {
    #[must_use]
    pub fn selected_text(&self) -> &str {
        self.selected.as_deref().unwrap_or(NO_ANSWER_LABEL)
    }
}

/// A quiz that has stopped; nothing about it changes any more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedQuiz {
    subject: Subject,
    questions: Vec<Question>,
    answers: Vec<Option<usize>>,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    reason: FinishReason,
}

impl FinishedQuiz {
    pub(crate) fn new(
        subject: Subject,
        questions: Vec<Question>,
        answers: Vec<Option<usize>>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        reason: FinishReason,
    ) -> Self {
        Self {
            subject,
            questions,
            answers,
            started_at,
            finished_at,
            reason,
        }
    }

    #[must_use]
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    #[must_use]
    pub fn reason(&self) -> FinishReason {
        self.reason
    }

    #[must_use]
    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        score(&self.questions, &self.answers)
    }

    #[must_use]
    pub fn max_score(&self) -> u32 {
        u32::try_from(self.questions.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn percentage(&self) -> u8 {
        percentage(self.score(), self.max_score())
    }

    #[must_use]
    pub fn duration_seconds(&self) -> u64 {
        elapsed_seconds(self.started_at, self.finished_at)
    }

    /// Whether the run should be persisted at all.
    #[must_use]
    pub fn is_recordable(&self) -> bool {
        self.reason != FinishReason::NothingAsked && !self.questions.is_empty()
    }

    #[must_use]
    pub fn details(&self) -> Vec<ResultDetail> {
        self.questions
            .iter()
            .zip(&self.answers)
            .map(|(question, answer)| ResultDetail {
                question_id: question.id().clone(),
                prompt: question.prompt().to_owned(),
                selected: answer
                    .and_then(|index| question.option(index))
                    .map(str::to_owned),
                correct: question.correct_option().to_owned(),
                explanation: question.explanation().map(str::to_owned),
                is_correct: question.is_correct(*answer),
            })
            .collect()
    }

    /// Snapshot this run as an immutable attempt, timestamped at finish.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError` if the answers no longer line up with the questions.
    pub fn attempt(&self) -> Result<Attempt, AttemptError> {
        Attempt::new(
            self.subject.clone(),
            self.questions.iter().map(|q| q.id().clone()).collect(),
            self.answers.clone(),
            self.score(),
            self.duration_seconds(),
            self.finished_at,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{QuizEvent, QuizOptions, QuizState};
    use chrono::Duration;
    use quiz_core::time::fixed_now;

    fn questions() -> Vec<Question> {
        (0..5)
            .map(|i| {
                Question::new(
                    i,
                    QuestionId::new(format!("js-{i}")),
                    format!("Question {i}?"),
                    vec!["zero".into(), "one".into()],
                    1,
                    (i == 0).then(|| "Because.".to_owned()),
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn scoring_counts_only_matching_answers() {
        let qs = questions();
        assert_eq!(score(&qs, &[Some(1), Some(0), None, Some(1), Some(1)]), 3);
        assert_eq!(score(&qs, &[None; 5]), 0);
    }

    #[test]
    fn unanswered_third_question_is_excluded_and_labelled() {
        let start = fixed_now();
        let mut state = QuizState::start(
            Subject::new("js").unwrap(),
            questions(),
            &QuizOptions::new(5, false, 30),
            start,
        );
        for position in 0..5 {
            if position != 2 {
                state = state.apply(QuizEvent::Select(1), start);
            }
            state = state.apply(QuizEvent::Next, start);
        }
        let state = state.apply(QuizEvent::Finish, start + Duration::seconds(42));
        let finished = state.finished().unwrap();

        assert_eq!(finished.score(), 4);
        assert_eq!(finished.percentage(), 80);

        let details = finished.details();
        assert_eq!(details[2].selected_text(), NO_ANSWER_LABEL);
        assert!(!details[2].is_correct);
        assert_eq!(details[0].selected_text(), "one");
        assert_eq!(details[0].explanation.as_deref(), Some("Because."));
        assert_eq!(details[1].explanation, None);

        let attempt = finished.attempt().unwrap();
        assert_eq!(attempt.answers()[2], None);
        assert_eq!(attempt.score(), 4);
        assert_eq!(attempt.max_score(), 5);
        assert_eq!(attempt.duration_seconds(), 42);
        assert_eq!(attempt.created_at(), start + Duration::seconds(42));
    }
}
