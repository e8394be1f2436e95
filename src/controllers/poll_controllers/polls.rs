use axum::{extract::State, Json};
use chrono::Utc;

use crate::controllers::poll_controllers::{models::QuestionSummary, LATEST_LIMIT};
use crate::state::AppState;
use crate::utils::error::AppResult;

/// The five most recently published questions.
pub async fn index(State(state): State<AppState>) -> AppResult<Json<Vec<QuestionSummary>>> {
    let now = Utc::now();

    let questions = state.polls.latest_published(now, LATEST_LIMIT).await?;

    let summaries = questions
        .iter()
        .filter(|question| question.is_published_at(now))
        .map(|question| QuestionSummary::new(question, now))
        .collect();

    Ok(Json(summaries))
}
