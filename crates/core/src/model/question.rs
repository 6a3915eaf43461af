use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::subject::Subject;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// A question record in a bank that cannot be turned into a `Question`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question #{index} has an empty prompt")]
    EmptyPrompt { index: usize },

    #[error("question #{index} has no options")]
    NoOptions { index: usize },

    #[error("question #{index} marks option {answer} correct but has only {options} options")]
    AnswerOutOfRange {
        index: usize,
        answer: usize,
        options: usize,
    },
}

//
// ─── WIRE FORMAT ───────────────────────────────────────────────────────────────
//

/// One element of the bank's `questions` array, exactly as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub question: String,
    pub options: Vec<String>,
    pub answer: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Top-level question bank document: `{ "questions": [...] }`.
///
/// A document without a `questions` key is an empty bank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBankDocument {
    #[serde(default)]
    pub questions: Vec<QuestionRecord>,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Immutable multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct: usize,
    explanation: Option<String>,
}

impl Question {
    /// Build a question, validating the option list and the correct index.
    ///
    /// `index` is the position in the bank and is only used for error reports.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, there are no options,
    /// or `correct` does not point at an option.
    pub fn new(
        index: usize,
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct: usize,
        explanation: Option<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt { index });
        }
        if options.is_empty() {
            return Err(QuestionError::NoOptions { index });
        }
        if correct >= options.len() {
            return Err(QuestionError::AnswerOutOfRange {
                index,
                answer: correct,
                options: options.len(),
            });
        }
        let explanation = explanation.filter(|text| !text.trim().is_empty());

        Ok(Self {
            id,
            prompt,
            options,
            correct,
            explanation,
        })
    }

    /// Convert a wire record at position `index` of a `subject` bank.
    ///
    /// Records without an `id` get `{subject}-{index}`.
    ///
    /// # Errors
    ///
    /// See [`Question::new`].
    pub fn from_record(
        subject: &Subject,
        index: usize,
        record: QuestionRecord,
    ) -> Result<Self, QuestionError> {
        let id = record
            .id
            .filter(|id| !id.trim().is_empty())
            .map_or_else(|| QuestionId::new(format!("{subject}-{index}")), QuestionId::new);
        Self::new(
            index,
            id,
            record.question,
            record.options,
            record.answer,
            record.explanation,
        )
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct]
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// True only when `answer` is set and equals the correct index.
    #[must_use]
    pub fn is_correct(&self, answer: Option<usize>) -> bool {
        answer == Some(self.correct)
    }
}

//
// ─── BANK ──────────────────────────────────────────────────────────────────────
//

/// All questions loaded for one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    subject: Subject,
    questions: Vec<Question>,
}

impl QuestionBank {
    #[must_use]
    pub fn new(subject: Subject, questions: Vec<Question>) -> Self {
        Self { subject, questions }
    }

    /// Validate every record of a parsed bank document.
    ///
    /// # Errors
    ///
    /// Returns the first `QuestionError` encountered.
    pub fn from_document(
        subject: Subject,
        document: QuestionBankDocument,
    ) -> Result<Self, QuestionError> {
        let questions = document
            .questions
            .into_iter()
            .enumerate()
            .map(|(index, record)| Question::from_record(&subject, index, record))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { subject, questions })
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
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
