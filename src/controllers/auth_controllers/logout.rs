use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use tracing::info;

use crate::state::AppState;
use crate::utils::session::{self, SESSION_COOKIE};

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<serde_json::Value>) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Ok(claims) = session::verify_token(cookie.value(), &state.config.session_secret) {
            info!(username = %claims.username, "Logout");
        }
    }

    let jar = jar.remove(session::removal_cookie());

    (
        jar,
        Json(json!({
            "success": true,
            "message": "Logged out successfully"
        })),
    )
}
