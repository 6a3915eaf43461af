use std::sync::Arc;

use rand::Rng;
use tracing::info;

use quiz_core::model::{QuestionBank, Subject};

use crate::Clock;
use crate::bank::QuestionBankLoader;
use crate::catalog::QuizCatalog;
use crate::error::QuizError;

use super::plan::{QuizOptions, sample_questions};
use super::session::QuizState;

/// Loads banks for catalog subjects and starts quizzes from them.
#[derive(Clone)]
pub struct QuizRunner {
    clock: Clock,
    loader: QuestionBankLoader,
    catalog: Arc<QuizCatalog>,
}

impl QuizRunner {
    #[must_use]
    pub fn new(clock: Clock, loader: QuestionBankLoader, catalog: Arc<QuizCatalog>) -> Self {
        Self {
            clock,
            loader,
            catalog,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &QuizCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Fetch the bank configured for `subject`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::UnknownSubject` when the catalog has no such quiz,
    /// or `QuizError::Load` when the bank cannot be loaded.
    pub async fn load_bank(&self, subject: &Subject) -> Result<QuestionBank, QuizError> {
        let page = self
            .catalog
            .find(subject)
            .ok_or_else(|| QuizError::UnknownSubject(subject.to_string()))?;
        Ok(self.loader.load(subject, page.bank()).await?)
    }

    /// Load the bank, sample it and start the quiz.
    ///
    /// # Errors
    ///
    /// See [`QuizRunner::load_bank`].
    pub async fn start(
        &self,
        subject: &Subject,
        options: &QuizOptions,
    ) -> Result<QuizState, QuizError> {
        let bank = self.load_bank(subject).await?;
        let mut rng = rand::rng();
        Ok(self.start_with_rng(&bank, options, &mut rng))
    }

    /// Start a quiz over an already loaded bank.
    #[must_use]
    pub fn start_with_rng<R>(
        &self,
        bank: &QuestionBank,
        options: &QuizOptions,
        rng: &mut R,
    ) -> QuizState
    where
        R: Rng + ?Sized,
    {
        let questions = sample_questions(bank.questions(), options.count(), rng);
        info!(
            subject = %bank.subject(),
            available = bank.len(),
            selected = questions.len(),
            timed = options.timed(),
            "starting quiz"
        );
        QuizState::start(bank.subject().clone(), questions, options, self.clock.now())
    }
}
