use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::poll_models::{Choice, Question, MAX_TEXT_LEN};
use crate::utils::error::{AppError, AppResult};

pub const NO_CHOICE_MESSAGE: &str = "You didn't select a choice.";
pub const BLANK_CHOICE_SLOTS: usize = 3;

#[derive(Deserialize, Serialize, Debug)]
pub struct CreatePollRequest {
    pub question: String,
    pub choices: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct UpdatePollRequest {
    pub question: String,
    pub choices: Vec<ChoiceInput>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ChoiceInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub choice: String,
}

/// Form body of `POST /{id}/vote/`.
#[derive(Deserialize, Debug)]
pub struct VoteForm {
    pub choice: Option<String>,
}

/// Blank form handed out by `GET /create/`.
#[derive(Serialize, Debug)]
pub struct PollForm {
    pub question: String,
    pub choices: Vec<ChoiceInput>,
}

impl PollForm {
    pub fn blank() -> Self {
        Self {
            question: String::new(),
            choices: vec![
                ChoiceInput {
                    id: None,
                    choice: String::new(),
                };
                BLANK_CHOICE_SLOTS
            ],
        }
    }

    pub fn from_question(question: &Question) -> Self {
        Self {
            question: question.question_text.clone(),
            choices: question
                .choices
                .iter()
                .map(|choice| ChoiceInput {
                    id: Some(choice.id.clone()),
                    choice: choice.choice_text.clone(),
                })
                .collect(),
        }
    }
}

/// Row in the index and "my polls" listings.
#[derive(Deserialize, Serialize, Debug)]
pub struct QuestionSummary {
    pub id: String,
    pub question: String,
    pub owner_id: String,
    pub pub_date: DateTime<Utc>,
    pub published_recently: bool,
}

impl QuestionSummary {
    pub fn new(question: &Question, now: DateTime<Utc>) -> Self {
        Self {
            id: question.id.to_hex(),
            question: question.question_text.clone(),
            owner_id: question.owner_id.to_hex(),
            pub_date: question.pub_date,
            published_recently: question.was_published_recently(now),
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ChoiceView {
    pub id: String,
    pub choice: String,
}

/// The voting page. Tallies are not shown here.
#[derive(Deserialize, Serialize, Debug)]
pub struct DetailResponse {
    pub id: String,
    pub question: String,
    pub pub_date: DateTime<Utc>,
    pub choices: Vec<ChoiceView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl DetailResponse {
    pub fn new(question: &Question, error_message: Option<String>) -> Self {
        Self {
            id: question.id.to_hex(),
            question: question.question_text.clone(),
            pub_date: question.pub_date,
            choices: question
                .choices
                .iter()
                .map(|choice| ChoiceView {
                    id: choice.id.clone(),
                    choice: choice.choice_text.clone(),
                })
                .collect(),
            error_message,
        }
    }
}

/// Full poll including tallies; returned to the owner.
#[derive(Deserialize, Serialize, Debug)]
pub struct PollResponse {
    pub id: String,
    pub question: String,
    pub owner_id: String,
    pub pub_date: DateTime<Utc>,
    pub choices: Vec<Choice>,
    pub total_votes: u64,
}

impl From<Question> for PollResponse {
    fn from(question: Question) -> Self {
        let total_votes = question.total_votes();
        Self {
            id: question.id.to_hex(),
            question: question.question_text,
            owner_id: question.owner_id.to_hex(),
            pub_date: question.pub_date,
            choices: question.choices,
            total_votes,
        }
    }
}

pub fn clean_text(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(AppError::ValidationError(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(AppError::ValidationError(format!(
            "{field} must be at most {MAX_TEXT_LEN} characters"
        )));
    }

    Ok(trimmed.to_string())
}

impl CreatePollRequest {
    /// Trimmed question text and choice texts, in submitted order.
    pub fn validate(self) -> AppResult<(String, Vec<String>)> {
        let question = clean_text("Question", &self.question)?;

        if self.choices.is_empty() {
            return Err(AppError::ValidationError(
                "Enter at least one choice".to_string(),
            ));
        }

        let choices = self
            .choices
            .iter()
            .map(|text| clean_text("Choice", text))
            .collect::<AppResult<Vec<String>>>()?;

        Ok((question, choices))
    }
}

impl UpdatePollRequest {
    /// Applies the edit to `question`: retained choices keep id and votes,
    /// new ones start at zero, unlisted ones are dropped. Owner and
    /// publish date are left alone.
    pub fn apply_to(&self, question: &mut Question) -> AppResult<()> {
        let question_text = clean_text("Question", &self.question)?;

        if self.choices.is_empty() {
            return Err(AppError::ValidationError(
                "Enter at least one choice".to_string(),
            ));
        }

        let mut choices: Vec<Choice> = Vec::with_capacity(self.choices.len());
        for input in &self.choices {
            let choice_text = clean_text("Choice", &input.choice)?;

            match &input.id {
                Some(id) => {
                    if choices.iter().any(|kept| &kept.id == id) {
                        return Err(AppError::ValidationError(format!(
                            "Choice {id} is listed more than once"
                        )));
                    }
                    let existing = question.choice(id).ok_or_else(|| {
                        AppError::ValidationError(format!("Choice {id} does not belong to this poll"))
                    })?;
                    choices.push(Choice {
                        id: existing.id.clone(),
                        choice_text,
                        votes: existing.votes,
                    });
                }
                None => choices.push(Choice::new(choice_text)),
            }
        }

        question.question_text = question_text;
        question.choices = choices;
        Ok(())
    }
}
