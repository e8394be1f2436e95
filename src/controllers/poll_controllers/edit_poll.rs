use axum::{
    extract::{Extension, Path, State},
    Json,
};
use tracing::{info, warn};

use crate::controllers::poll_controllers::{
    load_question,
    models::{PollForm, PollResponse, UpdatePollRequest},
};
use crate::db::WriteOutcome;
use crate::state::AppState;
use crate::utils::auth::require_owner;
use crate::utils::error::{AppError, AppResult};
use crate::utils::session::CurrentUser;

const MAX_EDIT_ATTEMPTS: usize = 3;

pub async fn edit_form(
    Path(poll_id): Path<String>,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<PollForm>> {
    let question = load_question(&state, &poll_id).await?;
    require_owner(&question, &user, "edit")?;

    Ok(Json(PollForm::from_question(&question)))
}

pub async fn update_poll(
    Path(poll_id): Path<String>,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<UpdatePollRequest>,
) -> AppResult<Json<PollResponse>> {
    // Votes can land between the read and the write; re-apply the edit on
    // the fresh document instead of overwriting their counts.
    for attempt in 1..=MAX_EDIT_ATTEMPTS {
        let mut question = load_question(&state, &poll_id).await?;
        require_owner(&question, &user, "edit")?;

        let read_revision = question.revision;
        payload.apply_to(&mut question)?;

        match state.polls.replace_question(&question, read_revision).await? {
            WriteOutcome::Applied => {
                question.revision = read_revision + 1;
                info!(question = %question.id, owner = %user.username, "Poll updated");
                return Ok(Json(PollResponse::from(question)));
            }
            WriteOutcome::Stale => {
                warn!(question = %question.id, attempt, "Poll changed during edit, retrying");
            }
            WriteOutcome::Missing => {
                return Err(AppError::NotFound("Poll not found".to_string()));
            }
        }
    }

    Err(AppError::Conflict(
        "The poll kept changing while saving, please try again".to_string(),
    ))
}
