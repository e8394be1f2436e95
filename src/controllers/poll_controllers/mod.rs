use bson::oid::ObjectId;
use chrono::{DateTime, Utc};

use crate::models::poll_models::Question;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

pub mod cast_vote;
pub mod create_poll;
pub mod delete_poll;
pub mod edit_poll;
pub mod get_poll;
pub mod get_results;
pub mod get_user_polls;
pub mod models;
pub mod polls;

pub const LATEST_LIMIT: i64 = 5;

fn not_found() -> AppError {
    AppError::NotFound("Poll not found".to_string())
}

/// Ids that cannot name a question are reported the same as missing ones.
pub(crate) fn parse_question_id(raw: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| not_found())
}

pub(crate) async fn load_question(state: &AppState, raw_id: &str) -> AppResult<Question> {
    let id = parse_question_id(raw_id)?;
    state.polls.find_question(id).await?.ok_or_else(not_found)
}

/// Like [`load_question`], but questions dated in the future do not exist yet.
pub(crate) async fn load_published(
    state: &AppState,
    raw_id: &str,
    now: DateTime<Utc>,
) -> AppResult<Question> {
    let question = load_question(state, raw_id).await?;
    if !question.is_published_at(now) {
        return Err(not_found());
    }
    Ok(question)
}
