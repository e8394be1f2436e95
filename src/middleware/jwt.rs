use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use bson::oid::ObjectId;
use tracing::debug;
use url::form_urlencoded;

use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::session::{verify_token, CurrentUser, SESSION_COOKIE};

pub const LOGIN_PATH: &str = "/login/";

/// Lets the request through only with a valid session for an existing user;
/// everyone else is sent to the login page. Store failures are reported as
/// errors rather than logging the visitor out.
pub async fn require_session(
    State(state): State<AppState>,
    cookie_jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    match current_user(&state, &cookie_jar).await {
        Ok(Some(user)) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(None) => {
            let next_path = req.uri().path();
            debug!(path = next_path, "No valid session, redirecting to login");
            Redirect::to(&login_redirect(next_path)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// `/login/?next=<path>` with the path form-encoded.
pub fn login_redirect(next_path: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next_path)
        .finish();
    format!("{LOGIN_PATH}?{query}")
}

async fn current_user(state: &AppState, cookie_jar: &CookieJar) -> AppResult<Option<CurrentUser>> {
    let Some(cookie) = cookie_jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };
    let Ok(claims) = verify_token(cookie.value(), &state.config.session_secret) else {
        return Ok(None);
    };
    let Ok(user_id) = ObjectId::parse_str(&claims.sub) else {
        return Ok(None);
    };

    // A token for a deleted account is as good as no token.
    let user = state.accounts.find_user(user_id).await?;

    Ok(user.map(|user| CurrentUser {
        id: user.id,
        username: user.username,
    }))
}
