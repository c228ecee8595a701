mod choice;
mod eligibility;
mod question;
mod user;
mod vote;

pub use choice::{Choice, ChoiceTally};
pub use eligibility::{PublishWindow, PublishedFilter, ScheduleWarning, RECENT_WINDOW_HOURS};
pub use question::{Question, QuestionDetail, QuestionResults, QuestionSummary};
pub use user::User;
pub use vote::{Vote, VoteResult};
