use super::{Choice, ChoiceTally, PublishWindow, ScheduleWarning};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: uuid::Uuid,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

impl Question {
    /// A new question whose end date defaults to the creation instant when
    /// not given.
    pub fn new(
        question_text: String,
        pub_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            question_text,
            pub_date,
            end_date: Some(end_date.unwrap_or(now)),
        }
    }

    /// Like [`Question::new`], also returning the schedule problems the
    /// question starts with. A defaulted end date is always reported.
    pub fn with_warnings(
        question_text: String,
        pub_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> (Self, Vec<ScheduleWarning>) {
        let question = Self::new(question_text, pub_date, end_date, now);
        let mut warnings = Vec::new();
        if end_date.is_none() {
            warnings.push(ScheduleWarning::EndDefaultedToCreation { end_date: now });
        }
        warnings.extend(question.schedule_warnings(now));
        (question, warnings)
    }

    pub fn window(&self) -> PublishWindow {
        PublishWindow::new(self.pub_date, self.end_date)
    }

    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        self.window().is_published(now)
    }

    pub fn was_published_recently(&self, now: DateTime<Utc>) -> bool {
        self.window().was_published_recently(now)
    }

    pub fn can_vote(&self, now: DateTime<Utc>) -> bool {
        self.window().can_vote(now)
    }

    pub fn schedule_warnings(&self, now: DateTime<Utc>) -> Vec<ScheduleWarning> {
        self.window().warnings(now)
    }
}

/// Question plus its choices, as shown on the voting form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDetail {
    pub question: Question,
    pub choices: Vec<Choice>,
    /// The visitor's current ballot, if logged in and already voted.
    pub selected_choice_id: Option<uuid::Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResults {
    pub question: Question,
    pub choices: Vec<ChoiceTally>,
}

impl QuestionResults {
    pub fn total_votes(&self) -> i64 {
        self.choices.iter().map(|c| c.votes).sum()
    }

    /// Percentage of all ballots held by `tally`, 0 when nobody voted.
    pub fn share(&self, tally: &ChoiceTally) -> f64 {
        let total = self.total_votes();
        if total == 0 {
            0.0
        } else {
            tally.votes as f64 * 100.0 / total as f64
        }
    }
}

/// Admin list row with the computed flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSummary {
    #[serde(flatten)]
    pub question: Question,
    pub choice_count: u64,
    pub was_published_recently: bool,
    pub is_published: bool,
    pub can_vote: bool,
}

impl QuestionSummary {
    pub fn new(question: Question, choice_count: u64, now: DateTime<Utc>) -> Self {
        Self {
            was_published_recently: question.was_published_recently(now),
            is_published: question.is_published(now),
            can_vote: question.can_vote(now),
            choice_count,
            question,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn end_date_defaults_to_creation_instant() {
        let question = Question::new("Tabs or spaces?".into(), now() - Duration::days(1), None, now());
        assert_eq!(question.end_date, Some(now()));
        assert!(question.can_vote(now()));
        assert!(!question.can_vote(now() + Duration::seconds(1)));
    }

    #[test]
    fn future_publish_with_default_end_is_never_votable() {
        let question = Question::new("Later?".into(), now() + Duration::days(5), None, now());
        assert!(!question.can_vote(now()));
        assert!(!question.can_vote(now() + Duration::days(6)));
        assert_eq!(question.schedule_warnings(now()).len(), 1);
    }

    #[test]
    fn defaulted_end_date_is_reported() {
        let (question, warnings) = Question::with_warnings("Q".into(), now() - Duration::days(1), None, now());
        assert_eq!(question.end_date, Some(now()));
        assert_eq!(warnings, vec![ScheduleWarning::EndDefaultedToCreation { end_date: now() }]);
        assert!(warnings[0].to_string().contains("no end date given"));
    }

    #[test]
    fn explicit_end_date_adds_no_default_warning() {
        let (_, warnings) = Question::with_warnings(
            "Q".into(),
            now() - Duration::days(1),
            Some(now() + Duration::days(3)),
            now(),
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn defaulted_end_before_future_publish_reports_both() {
        let (_, warnings) = Question::with_warnings("Q".into(), now() + Duration::days(2), None, now());
        assert_eq!(warnings.len(), 2);
        assert!(matches!(warnings[0], ScheduleWarning::EndDefaultedToCreation { .. }));
        assert!(matches!(warnings[1], ScheduleWarning::EndsBeforePublish { .. }));
    }

    #[test]
    fn results_share() {
        let question = Question::new("Q".into(), now(), Some(now()), now());
        let tally = |votes| ChoiceTally {
            id: uuid::Uuid::new_v4(),
            choice_text: "c".into(),
            votes,
        };
        let results = QuestionResults {
            question,
            choices: vec![tally(3), tally(1)],
        };
        assert_eq!(results.total_votes(), 4);
        assert_eq!(results.share(&results.choices[0]), 75.0);

        let empty = QuestionResults {
            choices: vec![tally(0)],
            ..results
        };
        assert_eq!(empty.share(&empty.choices[0]), 0.0);
    }

    #[test]
    fn summary_flags() {
        let question = Question::new("Q".into(), now() - Duration::hours(2), Some(now() + Duration::days(1)), now());
        let summary = QuestionSummary::new(question, 3, now());
        assert!(summary.was_published_recently);
        assert!(summary.is_published);
        assert!(summary.can_vote);
        assert_eq!(summary.choice_count, 3);
    }
}
