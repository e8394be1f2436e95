use axum::{
    extract::{Extension, State},
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use tracing::info;

use crate::controllers::poll_controllers::models::{CreatePollRequest, PollForm, PollResponse};
use crate::models::poll_models::Question;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::session::CurrentUser;

pub async fn create_form() -> Json<PollForm> {
    Json(PollForm::blank())
}

pub async fn create_poll(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreatePollRequest>,
) -> AppResult<impl IntoResponse> {
    let (question_text, choice_texts) = payload.validate()?;

    let question = Question::new(user.id, question_text, choice_texts, Utc::now());

    state.polls.insert_question(&question).await?;

    info!(
        question = %question.id,
        owner = %user.username,
        choices = question.choices.len(),
        "Poll created"
    );

    let location = format!("/{}/", question.id.to_hex());
    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        Json(PollResponse::from(question)),
    ))
}
