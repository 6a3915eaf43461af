use chrono::{DateTime, Utc};

use quiz_core::model::Subject;
use services::quiz::{FinishReason, FinishedQuiz, RunningQuiz};
use services::{QuizEvent, QuizOptions, QuizPhase, QuizState, SaveOutcome, SkipReason};

use super::time_fmt::{format_countdown, format_duration};

/// Raw values of the start form, as typed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartForm {
    pub count: String,
    pub timed: bool,
    pub seconds: String,
}

impl Default for StartForm {
    fn default() -> Self {
        Self {
            count: services::quiz::DEFAULT_QUESTION_COUNT.to_string(),
            timed: false,
            seconds: services::quiz::DEFAULT_SECONDS_PER_QUESTION.to_string(),
        }
    }
}

impl StartForm {
    #[must_use]
    pub fn options(&self) -> QuizOptions {
        QuizOptions::from_raw(&self.count, self.timed, &self.seconds)
    }
}

/// Holds the quiz state and reports when an event ends the run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuizVm {
    subject: Option<Subject>,
    state: QuizState,
}

impl QuizVm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A view model that only adopts runs for `subject`.
    #[must_use]
    pub fn for_subject(subject: Subject) -> Self {
        Self {
            subject: Some(subject),
            state: QuizState::Idle,
        }
    }

    #[must_use]
    pub fn subject(&self) -> Option<&Subject> {
        self.subject.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> &QuizState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.state.phase()
    }

    /// Replace the current run. Returns the result if it finished straight away.
    /// A run started for another subject is dropped and the state kept.
    pub fn begin(&mut self, state: QuizState) -> Option<FinishedQuiz> {
        let run_subject = match &state {
            QuizState::Idle => None,
            QuizState::Running(running) => Some(running.subject()),
            QuizState::Finished(finished) => Some(finished.subject()),
        };
        if let (Some(expected), Some(actual)) = (&self.subject, run_subject) {
            if expected != actual {
                return None;
            }
        }
        self.state = state;
        self.state.finished().cloned()
    }

    /// Back to the start form for the same subject.
    pub fn reset(&mut self) {
        self.state = QuizState::Idle;
    }

    /// Apply `event`; returns the result only on the transition into `Finished`.
    pub fn dispatch(&mut self, event: QuizEvent, at: DateTime<Utc>) -> Option<FinishedQuiz> {
        let was_running = self.state.phase() == QuizPhase::Running;
        self.state = std::mem::take(&mut self.state).apply(event, at);
        if was_running {
            self.state.finished().cloned()
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub index: usize,
    pub text: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub position_label: String,
    pub prompt: String,
    pub options: Vec<OptionVm>,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub answered: usize,
    pub total: usize,
    pub timer_label: Option<String>,
    pub timer_low: bool,
}

#[must_use]
pub fn map_question(quiz: &RunningQuiz) -> Option<QuestionVm> {
    let question = quiz.current()?;
    let selected = quiz.current_answer();
    let options = question
        .options()
        .iter()
        .enumerate()
        .map(|(index, text)| OptionVm {
            index,
            text: text.clone(),
            selected: selected == Some(index),
        })
        .collect();
    let countdown = quiz.countdown();
    Some(QuestionVm {
        position_label: format!("Question {} of {}", quiz.position() + 1, quiz.len()),
        prompt: question.prompt().to_owned(),
        options,
        can_go_back: !quiz.is_first(),
        can_go_forward: !quiz.is_last(),
        answered: quiz.answers().iter().filter(|a| a.is_some()).count(),
        total: quiz.len(),
        timer_label: countdown.map(|c| format!("Time left: {}", format_countdown(c.remaining()))),
        timer_low: countdown.is_some_and(|c| c.remaining() <= 5),
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultRowVm {
    pub number: usize,
    pub prompt: String,
    pub selected: String,
    pub correct: String,
    pub explanation: Option<String>,
    pub is_correct: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsVm {
    pub score_label: String,
    pub percentage: u8,
    pub headline: String,
    pub duration_str: String,
    pub rows: Vec<ResultRowVm>,
}

#[must_use]
pub fn map_results(finished: &FinishedQuiz) -> ResultsVm {
    let headline = match finished.reason() {
        FinishReason::TimeUp => "Time's up!",
        FinishReason::Manual => "Quiz complete",
        FinishReason::NothingAsked => "This quiz has no questions yet",
    };
    let rows = finished
        .details()
        .into_iter()
        .enumerate()
        .map(|(i, detail)| ResultRowVm {
            number: i + 1,
            selected: detail.selected_text().to_owned(),
            prompt: detail.prompt,
            correct: detail.correct,
            explanation: detail.explanation,
            is_correct: detail.is_correct,
        })
        .collect();
    ResultsVm {
        score_label: format!("{} / {}", finished.score(), finished.max_score()),
        percentage: finished.percentage(),
        headline: headline.to_owned(),
        duration_str: format_duration(finished.duration_seconds()),
        rows,
    }
}

/// Status line shown under the results.
#[must_use]
pub fn save_status_message(outcome: &SaveOutcome) -> &'static str {
    match outcome {
        SaveOutcome::Saved(_) => "Your score has been saved.",
        SaveOutcome::Skipped(SkipReason::SignedOut) => "Sign in to save your progress.",
        SaveOutcome::Skipped(SkipReason::NothingAsked) => "Nothing to save.",
        SaveOutcome::Failed(_) => "Your score could not be saved.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::{AttemptId, Question, QuestionId, Subject};
    use quiz_core::time::fixed_now;

    fn questions(len: usize) -> Vec<Question> {
        (0..len)
            .map(|i| {
                Question::new(
                    i,
                    QuestionId::new(format!("html-{i}")),
                    format!("Prompt {i}"),
                    vec!["first".into(), "second".into()],
                    0,
                    (i == 1).then(|| "Explained.".to_owned()),
                )
                .unwrap()
            })
            .collect()
    }

    fn started(len: usize, options: QuizOptions) -> QuizVm {
        let mut vm = QuizVm::new();
        let finished = vm.begin(QuizState::start(
            Subject::new("html").unwrap(),
            questions(len),
            &options,
            fixed_now(),
        ));
        assert_eq!(finished.is_none(), len > 0);
        vm
    }

    #[test]
    fn start_form_defaults_and_clamps() {
        let form = StartForm::default();
        assert_eq!(form.options(), QuizOptions::new(10, false, 30));

        let form = StartForm {
            count: "99".into(),
            timed: true,
            seconds: "x".into(),
        };
        assert_eq!(form.options(), QuizOptions::new(50, true, 30));
    }

    #[test]
    fn question_vm_tracks_selection_and_timer() {
        let mut vm = started(3, QuizOptions::new(3, true, 10));
        assert!(vm.dispatch(QuizEvent::Select(1), fixed_now()).is_none());
        for _ in 0..6 {
            vm.dispatch(QuizEvent::Tick, fixed_now());
        }

        let question = map_question(vm.state().running().unwrap()).unwrap();
        assert_eq!(question.position_label, "Question 1 of 3");
        assert!(question.options[1].selected);
        assert!(!question.options[0].selected);
        assert!(!question.can_go_back);
        assert!(question.can_go_forward);
        assert_eq!(question.answered, 1);
        assert_eq!(question.timer_label.as_deref(), Some("Time left: 0:04"));
        assert!(question.timer_low);
    }

    #[test]
    fn dispatch_reports_finish_once() {
        let mut vm = started(2, QuizOptions::default());
        let at = fixed_now() + Duration::seconds(30);
        let finished = vm.dispatch(QuizEvent::Finish, at).unwrap();
        assert_eq!(finished.max_score(), 2);
        assert!(vm.dispatch(QuizEvent::Finish, at).is_none());
        assert_eq!(vm.phase(), QuizPhase::Finished);
    }

    #[test]
    fn results_vm_labels_unanswered_questions() {
        let mut vm = started(2, QuizOptions::default());
        vm.dispatch(QuizEvent::Select(0), fixed_now());
        let finished = vm
            .dispatch(QuizEvent::Finish, fixed_now() + Duration::seconds(75))
            .unwrap();

        let results = map_results(&finished);
        assert_eq!(results.score_label, "1 / 2");
        assert_eq!(results.percentage, 50);
        assert_eq!(results.headline, "Quiz complete");
        assert_eq!(results.duration_str, "1m 15s");
        assert_eq!(results.rows[0].selected, "first");
        assert!(results.rows[0].is_correct);
        assert_eq!(results.rows[1].selected, "No answer");
        assert_eq!(results.rows[1].explanation.as_deref(), Some("Explained."));
    }

    #[test]
    fn empty_run_finishes_on_begin() {
        let mut vm = QuizVm::new();
        let finished = vm
            .begin(QuizState::start(
                Subject::new("html").unwrap(),
                Vec::new(),
                &QuizOptions::default(),
                fixed_now(),
            ))
            .unwrap();
        assert_eq!(map_results(&finished).score_label, "0 / 0");
    }

    #[test]
    fn save_messages() {
        assert_eq!(
            save_status_message(&SaveOutcome::Saved(AttemptId::generate())),
            "Your score has been saved."
        );
        assert_eq!(
            save_status_message(&SaveOutcome::Skipped(SkipReason::SignedOut)),
            "Sign in to save your progress."
        );
        assert_eq!(
            save_status_message(&SaveOutcome::Failed("offline".into())),
            "Your score could not be saved."
        );
    }

    #[test]
    fn quiz_for_another_subject_is_ignored() {
        let css = Subject::new("css").unwrap();
        let mut vm = QuizVm::for_subject(css.clone());
        let late_html = QuizState::start(
            Subject::new("html").unwrap(),
            questions(2),
            &QuizOptions::default(),
            fixed_now(),
        );

        assert!(vm.begin(late_html).is_none());
        assert_eq!(vm.phase(), QuizPhase::Idle);
        assert_eq!(vm.subject(), Some(&css));

        let css_run = QuizState::start(css, questions(2), &QuizOptions::default(), fixed_now());
        vm.begin(css_run);
        assert_eq!(vm.phase(), QuizPhase::Running);
        vm.reset();
        assert_eq!(vm.phase(), QuizPhase::Idle);
    }
}
