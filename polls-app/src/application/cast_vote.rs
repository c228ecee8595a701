use super::db_error;
use crate::domain::{Question, VoteResult};
use crate::infrastructure::db::{ChoiceRepository, QuestionRepository, VoteRepository};
use crate::infrastructure::security::RateLimiter;
use chrono::{DateTime, Utc};
use polls_errors::AppError;
use uuid::Uuid;

/// A submitted voting form. `choice` is the raw form value.
#[derive(Debug, Clone)]
pub struct Ballot {
    pub question_id: Uuid,
    pub user_id: Uuid,
    pub choice: Option<String>,
}

pub struct CastVote {
    questions: QuestionRepository,
    choices: ChoiceRepository,
    votes: VoteRepository,
    limiter: RateLimiter,
}

impl CastVote {
    pub fn new(
        questions: QuestionRepository,
        choices: ChoiceRepository,
        votes: VoteRepository,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            questions,
            choices,
            votes,
            limiter,
        }
    }

    /// Records the ballot as the user's single vote on the question.
    ///
    /// Every rejection happens before the write: unknown question, closed
    /// voting window, the per-user rate limit, then a missing or foreign
    /// choice. Only ballots for a votable question count against the limit.
    pub async fn execute(&self, ballot: Ballot, now: DateTime<Utc>) -> Result<VoteResult, AppError> {
        let question: Question = self
            .questions
            .find_by_id(ballot.question_id)
            .await
            .map_err(db_error)?
            .ok_or(AppError::NotFound)?
            .into();

        if !question.can_vote(now) {
            tracing::info!(question_id = %question.id, user_id = %ballot.user_id, "Vote rejected: outside voting window");
            return Err(AppError::NotVotable(question.question_text));
        }

        if let Err(e) = self.limiter.check(ballot.user_id) {
            tracing::warn!(question_id = %question.id, user_id = %ballot.user_id, "Vote rate limited");
            return Err(e.into());
        }

        let raw_choice = ballot
            .choice
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(AppError::MissingSelection)?;
        let choice_id = Uuid::parse_str(raw_choice).map_err(|_| AppError::InvalidSelection)?;

        let choice = self
            .choices
            .find_in_question(question.id, choice_id)
            .await
            .map_err(db_error)?
            .ok_or(AppError::InvalidSelection)?;

        self.votes
            .upsert(ballot.user_id, question.id, choice.id, now)
            .await
            .map_err(db_error)?;

        let choice_votes = self.votes.count_for_choice(choice.id).await.map_err(db_error)?;

        tracing::info!(
            question_id = %question.id,
            choice_id = %choice.id,
            user_id = %ballot.user_id,
            choice_votes,
            "Vote recorded"
        );

        Ok(VoteResult {
            question_id: question.id,
            choice_id: choice.id,
            choice_votes,
        })
    }
}
