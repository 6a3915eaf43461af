mod dashboard_vm;
mod quiz_vm;
mod time_fmt;

pub use dashboard_vm::{
    AttemptRowVm, DashboardVm, SubjectCardVm, map_attempt_row, map_dashboard, map_subject_card,
};
pub use quiz_vm::{
    OptionVm, QuestionVm, QuizVm, ResultRowVm, ResultsVm, StartForm, map_question, map_results,
    save_status_message,
};
pub use time_fmt::{format_countdown, format_datetime, format_duration};
