use services::{AttemptListItem, Dashboard, SubjectCard};

use super::time_fmt::{format_datetime, format_duration};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubjectCardVm {
    pub subject: String,
    pub title: String,
    pub score_label: String,
    pub progress: u8,
    pub last_attempt_str: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptRowVm {
    pub id: String,
    pub subject: String,
    pub score_label: String,
    pub percentage: u8,
    pub duration_str: String,
    pub created_at_str: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardVm {
    pub greeting: String,
    pub cards: Vec<SubjectCardVm>,
    pub recent: Vec<AttemptRowVm>,
}

#[must_use]
pub fn map_subject_card(card: &SubjectCard) -> SubjectCardVm {
    let (score_label, last_attempt_str) = match &card.last {
        Some(last) => (
            format!("{} / {}", last.score, last.max_score),
            last.last_attempt_date.map(format_datetime),
        ),
        None => ("Not attempted yet".to_owned(), None),
    };
    SubjectCardVm {
        subject: card.subject.to_string(),
        title: card.title.clone(),
        score_label,
        progress: card.progress(),
        last_attempt_str,
    }
}

#[must_use]
pub fn map_attempt_row(item: &AttemptListItem) -> AttemptRowVm {
    AttemptRowVm {
        id: item.id.to_string(),
        subject: item.subject.quiz_title(),
        score_label: format!("{} / {}", item.score, item.max_score),
        percentage: item.percentage,
        duration_str: format_duration(item.duration_seconds),
        created_at_str: format_datetime(item.created_at),
    }
}

#[must_use]
pub fn map_dashboard(dashboard: &Dashboard) -> DashboardVm {
    DashboardVm {
        greeting: format!("Welcome back, {}", dashboard.display_name),
        cards: dashboard.subjects.iter().map(map_subject_card).collect(),
        recent: dashboard.recent.iter().map(map_attempt_row).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AttemptId, Subject, SubjectProgress};
    use quiz_core::time::fixed_now;

    #[test]
    fn maps_cards_with_and_without_progress() {
        let dashboard = Dashboard {
            display_name: "Ada".into(),
            subjects: vec![
                SubjectCard {
                    subject: Subject::new("html").unwrap(),
                    title: "HTML Quiz".into(),
                    last: Some(SubjectProgress {
                        score: 3,
                        max_score: 4,
                        last_attempt_date: Some(fixed_now()),
                        progress: 75,
                    }),
                },
                SubjectCard {
                    subject: Subject::new("css").unwrap(),
                    title: "CSS Quiz".into(),
                    last: None,
                },
            ],
            recent: vec![AttemptListItem {
                id: AttemptId::generate(),
                subject: Subject::new("html").unwrap(),
                score: 3,
                max_score: 4,
                percentage: 75,
                duration_seconds: 61,
                created_at: fixed_now(),
            }],
        };

        let vm = map_dashboard(&dashboard);
        assert_eq!(vm.greeting, "Welcome back, Ada");
        assert_eq!(vm.cards[0].score_label, "3 / 4");
        assert_eq!(vm.cards[0].progress, 75);
        assert_eq!(
            vm.cards[0].last_attempt_str.as_deref(),
            Some("2023-11-14 22:13 UTC")
        );
        assert_eq!(vm.cards[1].score_label, "Not attempted yet");
        assert_eq!(vm.cards[1].progress, 0);
        assert_eq!(vm.recent[0].subject, "HTML Quiz");
        assert_eq!(vm.recent[0].duration_str, "1m 01s");
    }
}
