use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use base64::Engine;
use chrono::Utc;
use tracing::info;
use webauthn_rs::prelude::*;

use crate::{
    controllers::auth_controllers::models::{AuthFinishRequest, AuthResponse},
    models::passkey_models::ChallengeKind,
    state::AppState,
    utils::{
        error::{AppError, AppResult},
        session,
    },
};

pub async fn auth_finish(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<AuthFinishRequest>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    if body.username.is_empty() {
        return Err(AppError::ValidationError("Username is required".to_string()));
    }

    let challenge = state
        .accounts
        .take_challenge(ChallengeKind::Authentication, &body.username)
        .await?
        .ok_or_else(|| AppError::NotFound("Authentication challenge not found".to_string()))?;

    let auth_state: PasskeyAuthentication = serde_json::from_str(&challenge.state)?;

    let credential: PublicKeyCredential = serde_json::from_value(body.credential)
        .map_err(|e| AppError::BadRequest(format!("Invalid credential format: {}", e)))?;

    let auth_result = state
        .webauthn
        .finish_passkey_authentication(&credential, &auth_state)
        .map_err(|e| AppError::AuthenticationError(format!("Authentication verification failed: {}", e)))?;

    let credential_id =
        base64::engine::general_purpose::STANDARD.encode(auth_result.cred_id().to_vec());

    let passkey_doc = state
        .accounts
        .find_passkey(&credential_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Passkey not found".to_string()))?;

    let user = state
        .accounts
        .find_user(passkey_doc.user_id)
        .await?
        .filter(|user| user.username == body.username)
        .ok_or_else(|| AppError::AuthenticationError("Passkey does not belong to this user".to_string()))?;

    // Keep the signature counter current so cloned authenticators are caught.
    let mut passkey: Passkey = serde_json::from_str(&passkey_doc.passkey)?;
    passkey.update_credential(&auth_result);
    state
        .accounts
        .update_passkey(&credential_id, &serde_json::to_string(&passkey)?, Utc::now())
        .await?;

    let token = session::create_token(user.id, &user.username, &state.config)?;
    let jar = jar.add(session::session_cookie(token, &state.config)?);

    info!(user = %user.id, username = %user.username, "Login successful");

    Ok((jar, Json(AuthResponse::from(&user))))
}
