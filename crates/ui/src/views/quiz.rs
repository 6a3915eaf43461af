use std::time::Duration;

use dioxus::core::Task;
use dioxus::prelude::*;
use dioxus_router::Link;
use tracing::{debug, warn};

use quiz_core::model::Subject;
use services::quiz::FinishedQuiz;
use services::{QuizError, QuizEvent, QuizState, SaveOutcome};

use crate::context::AppContext;
use crate::routes::{Route, SessionSignal};
use crate::views::ViewError;
use crate::vm::{
    QuestionVm, QuizVm, ResultsVm, StartForm, map_question, map_results, save_status_message,
};

fn map_quiz_error(err: &QuizError) -> ViewError {
    match err {
        QuizError::UnknownSubject(_) => ViewError::UnknownQuiz,
        _ => ViewError::LoadFailed,
    }
}

/// View model that only accepts runs for the page's subject.
fn vm_for_page(subject: &str) -> QuizVm {
    Subject::new(subject).map_or_else(|_| QuizVm::new(), QuizVm::for_subject)
}

#[component]
pub fn QuizView(subject: String) -> Element {
    let ctx = use_context::<AppContext>();
    let SessionSignal(session) = use_context::<SessionSignal>();
    let runner = ctx.quiz_runner();
    let recorder = ctx.recorder();
    let catalog = ctx.catalog();
    let clock = runner.clock();

    let page = Subject::new(subject.clone())
        .ok()
        .and_then(|s| catalog.find(&s).cloned());

    let mut form = use_signal(StartForm::default);
    let mut vm = use_signal(|| vm_for_page(&subject));
    let mut loading = use_signal(|| false);
    let mut loader = use_signal(|| None::<Task>);
    let mut error = use_signal(|| None::<ViewError>);
    let mut save_status = use_signal(|| None::<SaveOutcome>);
    let mut timer = use_signal(|| None::<Task>);

    // A different subject starts from a clean slate.
    use_effect(use_reactive!(|subject| {
        debug!(%subject, "quiz page opened");
        if let Some(task) = timer.take() {
            task.cancel();
        }
        if let Some(task) = loader.take() {
            task.cancel();
        }
        loading.set(false);
        vm.set(vm_for_page(&subject));
        error.set(None);
        save_status.set(None);
    }));

    let on_finished = use_callback(move |finished: FinishedQuiz| {
        let recorder = recorder.clone();
        let user = session.peek().clone();
        spawn(async move {
            let outcome = recorder.submit_finished(user.as_ref(), &finished).await;
            save_status.set(Some(outcome));
        });
    });

    let dispatch = use_callback(move |event: QuizEvent| {
        let finished = vm.write().dispatch(event, clock.now());
        if let Some(finished) = finished {
            on_finished.call(finished);
        }
    });

    // The countdown task stops as soon as the quiz leaves the running state.
    use_effect(move || {
        if !vm.read().state().needs_ticks() {
            if let Some(task) = timer.take() {
                task.cancel();
            }
        }
    });

    let mut start_timer = move || {
        if let Some(task) = timer.take() {
            task.cancel();
        }
        let task = spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                if !vm.peek().state().needs_ticks() {
                    break;
                }
                dispatch.call(QuizEvent::Tick);
            }
        });
        timer.set(Some(task));
    };

    let start = {
        let page = page.clone();
        move |_: MouseEvent| {
            if loading() {
                return;
            }
            let Some(page) = page.clone() else {
                error.set(Some(ViewError::UnknownQuiz));
                return;
            };
            loading.set(true);
            error.set(None);
            save_status.set(None);
            let options = form.read().options();
            let runner = runner.clone();
            let task = spawn(async move {
                let result = runner.start(page.subject(), &options).await;
                loader.set(None);
                loading.set(false);
                match result {
                    Ok(state) => {
                        let ticking = state.needs_ticks();
                        let finished = vm.write().begin(state);
                        if let Some(finished) = finished {
                            on_finished.call(finished);
                        }
                        if ticking {
                            start_timer();
                        }
                    }
                    Err(err) => {
                        warn!(subject = %page.subject(), error = %err, "failed to start quiz");
                        error.set(Some(map_quiz_error(&err)));
                    }
                }
            });
            loader.set(Some(task));
        }
    };

    let Some(page) = page else {
        return rsx! {
            div { class: "page quiz",
                h2 { "Quiz not found" }
                p { class: "error", "{ViewError::UnknownQuiz.message()}" }
                Link { to: Route::Dashboard {}, "Back to dashboard" }
            }
        };
    };

    let state = vm.read().state().clone();
    let question = state.running().and_then(map_question);
    let form_value = form();

    rsx! {
        div { class: "page quiz",
            h2 { "{page.title()}" }
            match state {
                QuizState::Idle => rsx! {
                    div { class: "quiz-start",
                        label { r#for: "question-count", "Number of questions" }
                        input {
                            id: "question-count",
                            r#type: "number",
                            min: "1",
                            max: "50",
                            value: "{form_value.count}",
                            oninput: move |evt| form.write().count = evt.value(),
                        }
                        label { class: "checkbox",
                            input {
                                id: "timed",
                                r#type: "checkbox",
                                checked: form_value.timed,
                                onchange: move |evt| form.write().timed = evt.checked(),
                            }
                            "Timed mode"
                        }
                        if form_value.timed {
                            label { r#for: "seconds-per-question", "Seconds per question" }
                            input {
                                id: "seconds-per-question",
                                r#type: "number",
                                min: "5",
                                value: "{form_value.seconds}",
                                oninput: move |evt| form.write().seconds = evt.value(),
                            }
                        }
                        if let Some(err) = error() {
                            p { class: "error", "{err.message()}" }
                        }
                        button {
                            id: "start-quiz",
                            class: "primary",
                            disabled: loading(),
                            onclick: start,
                            if loading() { "Loading questions..." } else { "Start quiz" }
                        }
                    }
                },
                QuizState::Running(_) => rsx! {
                    if let Some(question) = question.clone() {
                        QuestionCard {
                            question,
                            on_select: move |index| dispatch.call(QuizEvent::Select(index)),
                            on_previous: move |()| dispatch.call(QuizEvent::Previous),
                            on_next: move |()| dispatch.call(QuizEvent::Next),
                            on_finish: move |()| dispatch.call(QuizEvent::Finish),
                        }
                    } else {
                        p { class: "error", "{ViewError::Unknown.message()}" }
                    }
                },
                QuizState::Finished(finished) => rsx! {
                    ResultsPanel { results: map_results(&finished) }
                    if let Some(outcome) = save_status() {
                        p { class: "save-status", "{save_status_message(&outcome)}" }
                    }
                    div { class: "actions",
                        button {
                            class: "primary",
                            onclick: move |_| {
                                vm.write().reset();
                                save_status.set(None);
                            },
                            "Try again"
                        }
                        Link { to: Route::Dashboard {}, "Back to dashboard" }
                    }
                },
            }
        }
    }
}

#[component]
pub fn QuestionCard(
    question: QuestionVm,
    on_select: EventHandler<usize>,
    on_previous: EventHandler<()>,
    on_next: EventHandler<()>,
    on_finish: EventHandler<()>,
) -> Element {
    rsx! {
        section { class: "question-card",
            header { class: "question-header",
                span { class: "position", "{question.position_label}" }
                span { class: "answered", "Answered {question.answered} of {question.total}" }
                if let Some(label) = question.timer_label.clone() {
                    span {
                        class: if question.timer_low { "timer low" } else { "timer" },
                        "{label}"
                    }
                }
            }
            h3 { class: "prompt", "{question.prompt}" }
            ul { class: "options",
                for option in question.options.clone() {
                    li { key: "{option.index}",
                        button {
                            class: if option.selected { "option selected" } else { "option" },
                            onclick: move |_| on_select.call(option.index),
                            "{option.text}"
                        }
                    }
                }
            }
            div { class: "navigation",
                button {
                    id: "previous",
                    disabled: !question.can_go_back,
                    onclick: move |_| on_previous.call(()),
                    "Previous"
                }
                if question.can_go_forward {
                    button { id: "next", onclick: move |_| on_next.call(()), "Next" }
                }
                button {
                    id: "finish",
                    class: "primary",
                    onclick: move |_| on_finish.call(()),
                    "Finish"
                }
            }
        }
    }
}

#[component]
pub fn ResultsPanel(results: ResultsVm) -> Element {
    rsx! {
        section { class: "results",
            h3 { "{results.headline}" }
            p { class: "final-score", "Score: {results.score_label} ({results.percentage}%)" }
            p { class: "duration", "Time taken: {results.duration_str}" }
            ol { class: "result-list",
                for row in results.rows.clone() {
                    li {
                        key: "{row.number}",
                        class: if row.is_correct { "result correct" } else { "result incorrect" },
                        p { class: "result-prompt", "{row.prompt}" }
                        p { "Your answer: {row.selected}" }
                        p { "Correct answer: {row.correct}" }
                        if let Some(explanation) = row.explanation.clone() {
                            p { class: "explanation", "{explanation}" }
                        }
                    }
                }
            }
        }
    }
}
