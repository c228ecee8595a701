use super::{db_error, BrowsePolls};
use crate::domain::{Choice, Question, QuestionResults, QuestionSummary, ScheduleWarning};
use crate::infrastructure::db::{ChoiceRepository, QuestionFilter, QuestionRepository};
use crate::infrastructure::security::InputSanitizer;
use chrono::{DateTime, Utc};
use polls_errors::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionDraft {
    pub question_text: String,
    /// Defaults to the creation instant.
    pub pub_date: Option<DateTime<Utc>>,
    /// Defaults to the creation instant.
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub choices: Vec<String>,
}

/// Full replacement of the editable question fields. A missing `end_date`
/// leaves voting open once published.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionUpdate {
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedQuestion {
    pub question: Question,
    pub choices: Vec<Choice>,
    pub warnings: Vec<ScheduleWarning>,
}

/// Administrator operations on questions and their choices.
pub struct ManageQuestions {
    questions: QuestionRepository,
    choices: ChoiceRepository,
    browse: Arc<BrowsePolls>,
}

impl ManageQuestions {
    pub fn new(questions: QuestionRepository, choices: ChoiceRepository, browse: Arc<BrowsePolls>) -> Self {
        Self {
            questions,
            choices,
            browse,
        }
    }

    pub async fn list(&self, filter: &QuestionFilter, now: DateTime<Utc>) -> Result<Vec<QuestionSummary>, AppError> {
        let rows = self.questions.list(filter, now).await.map_err(db_error)?;
        let ids: Vec<Uuid> = rows.iter().map(|q| q.id).collect();
        let counts = self.choices.count_by_questions(&ids).await.map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let choice_count = counts.get(&row.id).copied().unwrap_or(0);
                QuestionSummary::new(row.into(), choice_count, now)
            })
            .collect())
    }

    pub async fn get(&self, question_id: Uuid) -> Result<QuestionResults, AppError> {
        self.browse.results(question_id).await
    }

    pub async fn create(&self, draft: QuestionDraft, now: DateTime<Utc>) -> Result<SavedQuestion, AppError> {
        let text = InputSanitizer::question_text(&draft.question_text)?;
        let choice_texts = InputSanitizer::choice_texts(&draft.choices)?;

        let (question, warnings) = Question::with_warnings(text, draft.pub_date.unwrap_or(now), draft.end_date, now);
        log_warnings(&question, &warnings);

        self.questions
            .create(&question, &choice_texts)
            .await
            .map_err(db_error)?;

        let choices = self.choices_of(question.id).await?;
        tracing::info!(question_id = %question.id, choices = choices.len(), "Question created");

        Ok(SavedQuestion {
            question,
            choices,
            warnings,
        })
    }

    pub async fn update(
        &self,
        question_id: Uuid,
        update: QuestionUpdate,
        now: DateTime<Utc>,
    ) -> Result<SavedQuestion, AppError> {
        let text = InputSanitizer::question_text(&update.question_text)?;

        let question: Question = self
            .questions
            .update(question_id, text, update.pub_date, update.end_date)
            .await
            .map_err(db_error)?
            .ok_or(AppError::NotFound)?
            .into();

        let warnings = question.schedule_warnings(now);
        log_warnings(&question, &warnings);

        let choices = self.choices_of(question.id).await?;
        tracing::info!(question_id = %question.id, "Question updated");

        Ok(SavedQuestion {
            question,
            choices,
            warnings,
        })
    }

    pub async fn delete(&self, question_id: Uuid) -> Result<(), AppError> {
        if !self.questions.delete(question_id).await.map_err(db_error)? {
            return Err(AppError::NotFound);
        }
        tracing::info!(question_id = %question_id, "Question deleted");
        Ok(())
    }

    pub async fn add_choice(&self, question_id: Uuid, choice_text: &str) -> Result<Choice, AppError> {
        let text = InputSanitizer::choice_text(choice_text)?;

        if self.questions.find_by_id(question_id).await.map_err(db_error)?.is_none() {
            return Err(AppError::NotFound);
        }

        let choice = self.choices.append(question_id, text).await.map_err(db_error)?;
        Ok(choice.into())
    }

    pub async fn remove_choice(&self, question_id: Uuid, choice_id: Uuid) -> Result<(), AppError> {
        if !self.choices.delete(question_id, choice_id).await.map_err(db_error)? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn choices_of(&self, question_id: Uuid) -> Result<Vec<Choice>, AppError> {
        Ok(self
            .choices
            .find_by_question(question_id)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(Choice::from)
            .collect())
    }
}

fn log_warnings(question: &Question, warnings: &[ScheduleWarning]) {
    for warning in warnings {
        tracing::warn!(question_id = %question.id, %warning, "Question schedule hazard");
    }
}
