mod browse_polls;
mod cast_vote;
mod manage_questions;

pub use browse_polls::{BrowsePolls, INDEX_PAGE_SIZE};
pub use cast_vote::{Ballot, CastVote};
pub use manage_questions::{ManageQuestions, QuestionDraft, QuestionUpdate, SavedQuestion};

use polls_errors::AppError;
use sea_orm::DbErr;

pub(crate) fn db_error(err: DbErr) -> AppError {
    tracing::error!(error = %err, "Database error");
    AppError::Database(err.to_string())
}
