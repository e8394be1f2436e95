use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use crate::controllers::poll_controllers::{load_published, models::DetailResponse};
use crate::state::AppState;
use crate::utils::error::AppResult;

pub async fn get_poll(
    Path(poll_id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<DetailResponse>> {
    let question = load_published(&state, &poll_id, Utc::now()).await?;

    Ok(Json(DetailResponse::new(&question, None)))
}
