use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: uuid::Uuid,
    pub question_id: uuid::Uuid,
    pub choice_text: String,
    pub position: i32,
}

impl Choice {
    pub fn new(question_id: uuid::Uuid, choice_text: String, position: i32) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            question_id,
            choice_text,
            position,
        }
    }
}

/// A choice with its vote count, always computed from the vote rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceTally {
    pub id: uuid::Uuid,
    pub choice_text: String,
    pub votes: i64,
}
