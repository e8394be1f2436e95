use axum::{
    routing::{get, post},
    Router,
};

use crate::controllers::auth_controllers::{
    auth_finish, auth_start, logout, profile, register_finish, register_start,
};
use crate::state::AppState;

/// Account routes reachable without a session.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/signup/",
            get(register_start::signup_form).post(register_start::register_start),
        )
        .route("/signup/finish/", post(register_finish::register_finish))
        .route("/login/", get(auth_start::login_form).post(auth_start::auth_start))
        .route("/login/finish/", post(auth_finish::auth_finish))
        .route("/logout/", post(logout::logout))
}

/// Account routes for the signed-in user.
pub fn profile_routes() -> Router<AppState> {
    Router::new().route(
        "/profile/",
        get(profile::get_profile).post(profile::update_profile),
    )
}
