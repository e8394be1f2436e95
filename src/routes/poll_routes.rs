use axum::{
    routing::{get, post},
    Router,
};

use crate::controllers::poll_controllers::{
    cast_vote, create_poll, delete_poll, edit_poll, get_poll, get_results, get_user_polls, polls,
};
use crate::state::AppState;

pub fn public_poll_routes() -> Router<AppState> {
    Router::new().route("/", get(polls::index))
}

pub fn poll_routes() -> Router<AppState> {
    Router::new()
        .route("/mypolls/", get(get_user_polls::my_polls))
        .route(
            "/create/",
            get(create_poll::create_form).post(create_poll::create_poll),
        )
        .route("/:poll_id/", get(get_poll::get_poll))
        .route(
            "/:poll_id/edit/",
            get(edit_poll::edit_form).post(edit_poll::update_poll),
        )
        .route(
            "/:poll_id/delete/",
            get(delete_poll::confirm_delete).post(delete_poll::delete_poll),
        )
        .route("/:poll_id/results/", get(get_results::get_results))
        .route("/:poll_id/vote/", post(cast_vote::cast_vote))
}
