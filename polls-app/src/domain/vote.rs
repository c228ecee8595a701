use serde::{Deserialize, Serialize};

/// One user's current ballot for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: uuid::Uuid,
    pub question_id: uuid::Uuid,
    pub choice_id: uuid::Uuid,
    pub user_id: Option<uuid::Uuid>,
}

impl Vote {
    pub fn new(user_id: uuid::Uuid, question_id: uuid::Uuid, choice_id: uuid::Uuid) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            question_id,
            choice_id,
            user_id: Some(user_id),
        }
    }
}

/// Result of casting a ballot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteResult {
    pub question_id: uuid::Uuid,
    pub choice_id: uuid::Uuid,
    pub choice_votes: i64,
}
