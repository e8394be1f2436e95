use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};
use webauthn_rs::prelude::*;

use crate::{
    controllers::auth_controllers::models::{AuthStartRequest, FormDescription},
    models::passkey_models::{ChallengeDocument, ChallengeKind},
    state::AppState,
    utils::error::{AppError, AppResult},
};

#[derive(Deserialize, Debug)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Where protected routes send anonymous visitors.
pub async fn login_form(Query(query): Query<LoginQuery>) -> Json<FormDescription> {
    Json(FormDescription {
        action: "/login/".to_string(),
        fields: vec!["username".to_string()],
        next: query.next,
    })
}

pub async fn auth_start(
    State(state): State<AppState>,
    Json(body): Json<AuthStartRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if body.username.is_empty() {
        return Err(AppError::ValidationError("Username is required".to_string()));
    }

    let user = state
        .accounts
        .find_user_by_username(&body.username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let passkey_docs = state.accounts.passkeys_for_user(user.id).await?;
    if passkey_docs.is_empty() {
        return Err(AppError::NotFound("No passkeys registered for this user".to_string()));
    }

    let passkeys = passkey_docs
        .iter()
        .map(|doc| serde_json::from_str::<Passkey>(&doc.passkey))
        .collect::<Result<Vec<Passkey>, _>>()?;

    debug!(username = %body.username, passkeys = passkeys.len(), "Starting authentication");

    let (rcr, auth_state) = state
        .webauthn
        .start_passkey_authentication(&passkeys)
        .map_err(|e| AppError::WebauthnError(format!("Failed to start authentication: {}", e)))?;

    state
        .accounts
        .save_challenge(&ChallengeDocument {
            kind: ChallengeKind::Authentication,
            username: body.username.clone(),
            state: serde_json::to_string(&auth_state)?,
            pending_user: None,
            created_at: Utc::now(),
        })
        .await?;

    info!(username = %body.username, "Authentication challenge issued");

    Ok(Json(serde_json::to_value(rcr)?))
}
