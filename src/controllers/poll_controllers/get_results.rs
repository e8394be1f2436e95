use axum::{
    extract::{Extension, Path, State},
    Json,
};
use chrono::Utc;

use crate::controllers::poll_controllers::{load_published, models::PollResponse};
use crate::state::AppState;
use crate::utils::auth::require_owner;
use crate::utils::error::AppResult;
use crate::utils::session::CurrentUser;

pub async fn get_results(
    Path(poll_id): Path<String>,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<PollResponse>> {
    let question = load_published(&state, &poll_id, Utc::now()).await?;
    require_owner(&question, &user, "view the results of")?;

    Ok(Json(PollResponse::from(question)))
}
