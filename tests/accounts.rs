mod common;

use std::sync::Arc;

use axum::http::{header, StatusCode};
use bson::oid::ObjectId;
use chrono::Utc;
use serde_json::json;

use common::{body_json, new_user, FailingAccounts, TestApp};
use polls_backend::{
    controllers::auth_controllers::register_finish::save_registration,
    db::{memory_store::MemoryStore, AccountStore},
    models::passkey_models::{ChallengeKind, PasskeyDocument},
    utils::{error::AppError, session},
};

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();

    let response = app.get("/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn login_form_echoes_next() {
    let app = TestApp::new();

    let response = app.get("/login/?next=%2Fmypolls%2F", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["action"], "/login/");
    assert_eq!(body["next"], "/mypolls/");
}

#[tokio::test]
async fn signup_form_is_public() {
    let app = TestApp::new();

    let response = app.get("/signup/", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let fields = body_json(response).await["fields"].clone();
    assert!(fields.as_array().unwrap().iter().any(|f| f == "about"));
}

#[tokio::test]
async fn signup_start_issues_a_registration_challenge() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/signup/",
            None,
            json!({ "username": "carol", "display_name": "Carol", "about": "  likes polls " }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await.get("publicKey").is_some());

    let challenge = app
        .store
        .take_challenge(ChallengeKind::Registration, "carol")
        .await
        .unwrap()
        .expect("challenge should be stored");
    let pending = challenge.pending_user.unwrap();
    assert_eq!(pending.display_name, "Carol");
    assert_eq!(pending.about, "likes polls");
}

#[tokio::test]
async fn signup_rejects_taken_and_invalid_usernames() {
    let app = TestApp::new();
    app.user("alice").await;

    let taken = app
        .post_json("/signup/", None, json!({ "username": "alice", "display_name": "Alice" }))
        .await;
    assert_eq!(taken.status(), StatusCode::CONFLICT);

    let short = app
        .post_json("/signup/", None, json!({ "username": "al", "display_name": "Al" }))
        .await;
    assert_eq!(short.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(short).await["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn signup_finish_without_challenge_fails() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/signup/finish/",
            None,
            json!({ "username": "dave", "credential": {} }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.store.find_user_by_username("dave").await.unwrap().is_none());
}

#[tokio::test]
async fn login_start_needs_a_known_user_with_passkeys() {
    let app = TestApp::new();
    app.user("alice").await;

    let unknown = app
        .post_json("/login/", None, json!({ "username": "nobody" }))
        .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    // alice was created without registering a passkey.
    let no_passkeys = app
        .post_json("/login/", None, json!({ "username": "alice" }))
        .await;
    assert_eq!(no_passkeys.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_finish_without_challenge_is_not_found() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/login/finish/",
            None,
            json!({ "username": "alice", "credential": {} }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let app = TestApp::new();
    let alice = app.user("alice").await;

    let response = app.post_json("/logout/", Some(&alice.cookie), json!({})).await;

    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("logout should reset the cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with(&format!("{}=", session::SESSION_COOKIE)));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn profile_about_can_be_updated() {
    let app = TestApp::new();
    let alice = app.user("alice").await;

    let response = app
        .post_json("/profile/", Some(&alice.cookie), json!({ "about": " Poll enthusiast " }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["about"], "Poll enthusiast");

    let shown = body_json(app.get("/profile/", Some(&alice.cookie)).await).await;
    assert_eq!(shown["username"], "alice");
    assert_eq!(shown["about"], "Poll enthusiast");

    let too_long = app
        .post_json("/profile/", Some(&alice.cookie), json!({ "about": "x".repeat(201) }))
        .await;
    assert_eq!(too_long.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn session_for_unknown_user_is_rejected() {
    let app = TestApp::new();
    let token = session::create_token(ObjectId::new(), "ghost", &app.config).unwrap();
    let cookie = format!("{}={}", session::SESSION_COOKIE, token);

    let response = app.get("/mypolls/", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn session_lookup_failure_is_a_server_error() {
    let store = Arc::new(MemoryStore::new());
    let accounts = Arc::new(FailingAccounts {
        inner: store.clone(),
        fail_find_user: true,
        ..Default::default()
    });
    let app = TestApp::with_stores(store.clone(), store, accounts);
    let alice = app.user("alice").await;

    let response = app.get("/mypolls/", Some(&alice.cookie)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().get(header::LOCATION).is_none());
    assert_eq!(body_json(response).await["error"], "DATABASE_ERROR");
}

fn passkey_for(user_id: ObjectId) -> PasskeyDocument {
    PasskeyDocument {
        id: ObjectId::new(),
        credential_id: "Y3JlZGVudGlhbA==".to_string(),
        user_id,
        passkey: "{}".to_string(),
        created_at: Utc::now(),
        last_used_at: None,
    }
}

#[tokio::test]
async fn registration_stores_user_and_passkey() {
    let store = MemoryStore::new();
    let erin = new_user("erin");

    save_registration(&store, &erin, &passkey_for(erin.id))
        .await
        .unwrap();

    assert!(store.find_user(erin.id).await.unwrap().is_some());
    assert_eq!(store.passkeys_for_user(erin.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_passkey_write_removes_the_new_user() {
    let store = Arc::new(MemoryStore::new());
    let accounts = FailingAccounts {
        inner: store.clone(),
        fail_insert_passkey: true,
        ..Default::default()
    };
    let erin = new_user("erin");

    let err = save_registration(&accounts, &erin, &passkey_for(erin.id))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::DatabaseError(_)));
    assert!(store.find_user_by_username("erin").await.unwrap().is_none());
    assert!(store.passkeys_for_user(erin.id).await.unwrap().is_empty());

    // The username is free for another attempt.
    store.insert_user(&new_user("erin")).await.unwrap();
}
