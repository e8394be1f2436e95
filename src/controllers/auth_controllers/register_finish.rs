use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use base64::Engine;
use bson::oid::ObjectId;
use chrono::Utc;
use tracing::{error, info};
use webauthn_rs::prelude::*;

use crate::{
    controllers::auth_controllers::models::{AuthResponse, RegisterFinishRequest},
    db::AccountStore,
    models::{
        passkey_models::{ChallengeKind, PasskeyDocument},
        user_models::User,
    },
    state::AppState,
    utils::{
        error::{AppError, AppResult},
        session,
    },
};

pub async fn register_finish(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterFinishRequest>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let challenge = state
        .accounts
        .take_challenge(ChallengeKind::Registration, &body.username)
        .await?
        .ok_or_else(|| AppError::BadRequest("Registration challenge not found".to_string()))?;

    let pending = challenge
        .pending_user
        .ok_or_else(|| AppError::InternalError("Registration challenge without profile".to_string()))?;

    let reg_state: PasskeyRegistration = serde_json::from_str(&challenge.state)?;

    let credential: RegisterPublicKeyCredential = serde_json::from_value(body.credential)
        .map_err(|e| AppError::BadRequest(format!("Invalid credential format: {}", e)))?;

    let passkey = state
        .webauthn
        .finish_passkey_registration(&credential, &reg_state)
        .map_err(|e| AppError::AuthenticationError(format!("Registration verification failed: {}", e)))?;

    let now = Utc::now();
    let user = User {
        id: ObjectId::new(),
        username: body.username,
        display_name: pending.display_name,
        email: pending.email,
        about: pending.about,
        webauthn_id: pending.webauthn_id,
        created_at: now,
        updated_at: now,
    };
    let credential_id =
        base64::engine::general_purpose::STANDARD.encode(passkey.cred_id().to_vec());
    let passkey_doc = PasskeyDocument {
        id: ObjectId::new(),
        credential_id,
        user_id: user.id,
        passkey: serde_json::to_string(&passkey)?,
        created_at: now,
        last_used_at: None,
    };

    save_registration(state.accounts.as_ref(), &user, &passkey_doc).await?;

    let token = session::create_token(user.id, &user.username, &state.config)?;
    let jar = jar.add(session::session_cookie(token, &state.config)?);

    info!(user = %user.id, username = %user.username, "Registration complete");

    Ok((jar, Json(AuthResponse::from(&user))))
}

/// Stores the new user together with their first passkey. A user without a
/// passkey could never log in again, so a failed passkey write removes the
/// user as well.
pub async fn save_registration(
    accounts: &dyn AccountStore,
    user: &User,
    passkey: &PasskeyDocument,
) -> AppResult<()> {
    accounts.insert_user(user).await?;

    if let Err(e) = accounts.insert_passkey(passkey).await {
        if let Err(cleanup) = accounts.delete_user(user.id).await {
            error!(user = %user.id, error = %cleanup, "Failed to remove user after passkey write failed");
        }
        return Err(e);
    }

    Ok(())
}
