use axum::{
    extract::{Extension, Path, State},
    response::Redirect,
    Json,
};
use tracing::info;

use crate::controllers::poll_controllers::{load_question, models::PollResponse};
use crate::state::AppState;
use crate::utils::auth::require_owner;
use crate::utils::error::{AppError, AppResult};
use crate::utils::session::CurrentUser;

pub const AFTER_DELETE: &str = "/mypolls/";

pub async fn confirm_delete(
    Path(poll_id): Path<String>,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<PollResponse>> {
    let question = load_question(&state, &poll_id).await?;
    require_owner(&question, &user, "delete")?;

    Ok(Json(PollResponse::from(question)))
}

pub async fn delete_poll(
    Path(poll_id): Path<String>,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Redirect> {
    let question = load_question(&state, &poll_id).await?;
    require_owner(&question, &user, "delete")?;

    // The choices live inside the question document and go with it.
    if !state.polls.delete_question(question.id, user.id).await? {
        return Err(AppError::NotFound("Poll not found".to_string()));
    }

    info!(question = %question.id, owner = %user.username, "Poll deleted");

    Ok(Redirect::to(AFTER_DELETE))
}
