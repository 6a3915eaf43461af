use chrono::{DateTime, Utc};

use quiz_core::model::{Question, Subject};

use super::plan::QuizOptions;
use super::results::FinishedQuiz;

/// Input delivered to a running quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizEvent {
    /// Choose an option for the current question. Does not advance.
    Select(usize),
    Next,
    Previous,
    /// One second elapsed.
    Tick,
    Finish,
}

/// Why a quiz stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Manual,
    TimeUp,
    /// The selection was empty, so there was nothing to answer.
    NothingAsked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Idle,
    Running,
    Finished,
}

/// Per-question countdown used in timed mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    per_question: u32,
    remaining: u32,
}

impl Countdown {
    #[must_use]
    pub fn new(per_question: u32) -> Self {
        Self {
            per_question,
            remaining: per_question,
        }
    }

    #[must_use]
    pub fn per_question(&self) -> u32 {
        self.per_question
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    fn reset(&mut self) {
        self.remaining = self.per_question;
    }

    /// Returns true once the countdown reaches zero.
    fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }
}

/// A quiz in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningQuiz {
    subject: Subject,
    questions: Vec<Question>,
    answers: Vec<Option<usize>>,
    position: usize,
    countdown: Option<Countdown>,
    started_at: DateTime<Utc>,
}

impl RunningQuiz {
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
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.position)
    }

    #[must_use]
    pub fn current_answer(&self) -> Option<usize> {
        self.answers.get(self.position).copied().flatten()
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.position == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.position + 1 >= self.questions.len()
    }

    #[must_use]
    pub fn countdown(&self) -> Option<Countdown> {
        self.countdown
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    fn apply(mut self, event: QuizEvent, at: DateTime<Utc>) -> QuizState {
        match event {
            QuizEvent::Select(option) => {
                let in_range = self
                    .current()
                    .is_some_and(|question| option < question.options().len());
                if in_range {
                    self.answers[self.position] = Some(option);
                }
            }
            QuizEvent::Next => self.move_to(self.position.saturating_add(1)),
            QuizEvent::Previous => self.move_to(self.position.saturating_sub(1)),
            QuizEvent::Tick => {
                let expired = self.countdown.as_mut().is_some_and(Countdown::tick);
                if expired {
                    if self.is_last() {
                        return self.finish(FinishReason::TimeUp, at);
                    }
                    self.move_to(self.position + 1);
                }
            }
            QuizEvent::Finish => return self.finish(FinishReason::Manual, at),
        }
        QuizState::Running(self)
    }

    fn move_to(&mut self, target: usize) {
        let target = target.min(self.questions.len().saturating_sub(1));
        if target == self.position {
            return;
        }
        self.position = target;
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.reset();
        }
    }

    fn finish(self, reason: FinishReason, at: DateTime<Utc>) -> QuizState {
        QuizState::Finished(FinishedQuiz::new(
            self.subject,
            self.questions,
            self.answers,
            self.started_at,
            at,
            reason,
        ))
    }
}

/// Lifecycle of a single quiz page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QuizState {
    #[default]
    Idle,
    Running(RunningQuiz),
    Finished(FinishedQuiz),
}

impl QuizState {
    /// Begin a quiz over an already sampled selection.
    ///
    /// Allowed from any state so that a finished quiz can be restarted.
    /// An empty selection finishes immediately with nothing asked.
    #[must_use]
    pub fn start(
        subject: Subject,
        questions: Vec<Question>,
        options: &QuizOptions,
        at: DateTime<Utc>,
    ) -> Self {
        let answers = vec![None; questions.len()];
        if questions.is_empty() {
            return Self::Finished(FinishedQuiz::new(
                subject,
                questions,
                answers,
                at,
                at,
                FinishReason::NothingAsked,
            ));
        }
        let countdown = options
            .timed()
            .then(|| Countdown::new(options.seconds_per_question()));
        Self::Running(RunningQuiz {
            subject,
            questions,
            answers,
            position: 0,
            countdown,
            started_at: at,
        })
    }

    /// Apply one event. Events outside `Running` are ignored.
    #[must_use]
    pub fn apply(self, event: QuizEvent, at: DateTime<Utc>) -> Self {
        match self {
            QuizState::Running(running) => running.apply(event, at),
            other => other,
        }
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        match self {
            QuizState::Idle => QuizPhase::Idle,
            QuizState::Running(_) => QuizPhase::Running,
            QuizState::Finished(_) => QuizPhase::Finished,
        }
    }

    #[must_use]
    pub fn running(&self) -> Option<&RunningQuiz> {
        match self {
            QuizState::Running(running) => Some(running),
            _ => None,
        }
    }

    #[must_use]
    pub fn finished(&self) -> Option<&FinishedQuiz> {
        match self {
            QuizState::Finished(finished) => Some(finished),
            _ => None,
        }
    }

    /// True while a countdown should be ticking.
    #[must_use]
    pub fn needs_ticks(&self) -> bool {
        self.running().is_some_and(|r| r.countdown.is_some())
    }
}
