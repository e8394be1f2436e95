use axum::{
    extract::{Extension, State},
    Json,
};
use chrono::Utc;

use crate::{
    controllers::auth_controllers::models::{clean_about, ProfileResponse, UpdateProfileRequest},
    state::AppState,
    utils::{
        error::{AppError, AppResult},
        session::CurrentUser,
    },
};

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ProfileResponse>> {
    let user = state
        .accounts
        .find_user(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse::from(user)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<ProfileResponse>> {
    let about = clean_about(&body.about)?;

    if !state.accounts.update_about(user.id, &about, Utc::now()).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    get_profile(State(state), Extension(user)).await
}
