use axum::{extract::State, Json};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::{
    controllers::auth_controllers::models::{clean_about, FormDescription, RegisterStartRequest},
    models::passkey_models::{ChallengeDocument, ChallengeKind, PendingUser},
    state::AppState,
    utils::error::{AppError, AppResult},
};

pub async fn signup_form() -> Json<FormDescription> {
    Json(FormDescription {
        action: "/signup/".to_string(),
        fields: ["username", "display_name", "email", "about"]
            .into_iter()
            .map(String::from)
            .collect(),
        next: Some("/signup/finish/".to_string()),
    })
}

pub async fn register_start(
    State(state): State<AppState>,
    Json(body): Json<RegisterStartRequest>,
) -> AppResult<Json<serde_json::Value>> {
    body.validate()?;

    if state
        .accounts
        .find_user_by_username(&body.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let user_unique_id = Uuid::new_v4();

    let (ccr, reg_state) = state
        .webauthn
        .start_passkey_registration(user_unique_id, &body.username, body.display_name.trim(), None)
        .map_err(|e| AppError::WebauthnError(format!("Failed to start passkey registration: {}", e)))?;

    let challenge = ChallengeDocument {
        kind: ChallengeKind::Registration,
        username: body.username.clone(),
        state: serde_json::to_string(&reg_state)?,
        pending_user: Some(PendingUser {
            display_name: body.display_name.trim().to_string(),
            email: body.email.clone(),
            about: clean_about(body.about.as_deref().unwrap_or_default())?,
            webauthn_id: user_unique_id.to_string(),
        }),
        created_at: Utc::now(),
    };
    state.accounts.save_challenge(&challenge).await?;

    info!(username = %body.username, "Registration challenge issued");

    Ok(Json(serde_json::to_value(ccr)?))
}
