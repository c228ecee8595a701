//! Time-window rules for publishing and voting.
//!
//! Every predicate takes `now` from the caller so the rules stay pure.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const RECENT_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishWindow {
    pub pub_date: DateTime<Utc>,
    /// `None` keeps the poll open once published.
    pub end_date: Option<DateTime<Utc>>,
}

impl PublishWindow {
    pub fn new(pub_date: DateTime<Utc>, end_date: Option<DateTime<Utc>>) -> Self {
        Self { pub_date, end_date }
    }

    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        now >= self.pub_date
    }

    /// True when published within the last day, inclusive on both ends.
    pub fn was_published_recently(&self, now: DateTime<Utc>) -> bool {
        now - Duration::hours(RECENT_WINDOW_HOURS) <= self.pub_date && self.pub_date <= now
    }

    pub fn can_vote(&self, now: DateTime<Utc>) -> bool {
        let before_end = match self.end_date {
            Some(end) => now <= end,
            None => true,
        };
        self.pub_date <= now && before_end
    }

    /// Configurations under which voting can never happen. These are reported,
    /// never corrected.
    pub fn warnings(&self, now: DateTime<Utc>) -> Vec<ScheduleWarning> {
        let Some(end) = self.end_date else {
            return Vec::new();
        };

        let mut warnings = Vec::new();
        if end < self.pub_date {
            warnings.push(ScheduleWarning::EndsBeforePublish {
                pub_date: self.pub_date,
                end_date: end,
            });
        } else if end < now {
            warnings.push(ScheduleWarning::AlreadyClosed { end_date: end });
        }
        warnings
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleWarning {
    EndsBeforePublish {
        pub_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    },
    AlreadyClosed {
        end_date: DateTime<Utc>,
    },
    /// No end date was given, so it was set to the creation instant.
    EndDefaultedToCreation {
        end_date: DateTime<Utc>,
    },
}

impl fmt::Display for ScheduleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndsBeforePublish { pub_date, end_date } => write!(
                f,
                "end date {end_date} is before publish date {pub_date}; this poll can never be voted on"
            ),
            Self::AlreadyClosed { end_date } => {
                write!(f, "end date {end_date} has already passed; voting is closed")
            }
            Self::EndDefaultedToCreation { end_date } => write!(
                f,
                "no end date given, so voting closed at creation ({end_date}); set an end date to open the poll"
            ),
        }
    }
}

/// Date buckets for the admin question list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishedFilter {
    Today,
    #[serde(rename = "past_7_days")]
    Past7Days,
    ThisMonth,
    ThisYear,
}

impl PublishedFilter {
    /// Half-open range `[since, until)` the filter selects, relative to `now`.
    pub fn range(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let today = now.date_naive();
        let midnight = |date: chrono::NaiveDate| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
        let tomorrow = midnight(today) + Duration::days(1);

        match self {
            Self::Today => (midnight(today), tomorrow),
            Self::Past7Days => (midnight(today) - Duration::days(7), tomorrow),
            Self::ThisMonth => {
                let first = today.with_day(1).unwrap_or(today);
                let next = if first.month() == 12 {
                    first.with_year(first.year() + 1).and_then(|d| d.with_month(1))
                } else {
                    first.with_month(first.month() + 1)
                };
                (midnight(first), next.map(midnight).unwrap_or(tomorrow))
            }
            Self::ThisYear => {
                let first = today.with_ordinal(1).unwrap_or(today);
                let next = first.with_year(first.year() + 1);
                (midnight(first), next.map(midnight).unwrap_or(tomorrow))
            }
        }
    }
}
