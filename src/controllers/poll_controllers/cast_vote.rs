use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::Utc;
use tracing::{debug, info};

use crate::controllers::poll_controllers::{
    load_published,
    models::{DetailResponse, VoteForm, NO_CHOICE_MESSAGE},
};
use crate::models::poll_models::Question;
use crate::state::AppState;
use crate::utils::error::AppResult;

pub async fn cast_vote(
    Path(poll_id): Path<String>,
    State(state): State<AppState>,
    Form(form): Form<VoteForm>,
) -> AppResult<Response> {
    let question = load_published(&state, &poll_id, Utc::now()).await?;

    let Some(choice_id) = form
        .choice
        .as_deref()
        .map(str::trim)
        .filter(|id| question.choice(id).is_some())
    else {
        debug!(question = %question.id, submitted = ?form.choice, "Vote without a valid choice");
        return Ok(no_choice(&question));
    };

    // The increment is a single atomic update; it misses only if the
    // choice was removed by an edit after we read the question.
    if !state.polls.increment_vote(question.id, choice_id).await? {
        return Ok(no_choice(&question));
    }

    info!(question = %question.id, choice = choice_id, "Vote recorded");

    Ok(Redirect::to(&format!("/{}/results/", question.id.to_hex())).into_response())
}

fn no_choice(question: &Question) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(DetailResponse::new(question, Some(NO_CHOICE_MESSAGE.to_string()))),
    )
        .into_response()
}
