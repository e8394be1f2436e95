use axum::{
    extract::{Extension, State},
    Json,
};
use chrono::Utc;

use crate::controllers::poll_controllers::models::QuestionSummary;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::session::CurrentUser;

pub async fn my_polls(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<QuestionSummary>>> {
    let now = Utc::now();

    let questions = state.polls.questions_by_owner(user.id).await?;

    Ok(Json(
        questions
            .iter()
            .map(|question| QuestionSummary::new(question, now))
            .collect(),
    ))
}
