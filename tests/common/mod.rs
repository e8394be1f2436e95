// Shared fixtures for the router-level tests. Every test gets its own
// in-memory store and router.

#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use polls_backend::{
    app,
    db::{memory_store::MemoryStore, AccountStore, PollStore, WriteOutcome},
    models::{
        passkey_models::{ChallengeDocument, ChallengeKind, PasskeyDocument},
        poll_models::Question,
        user_models::User,
    },
    state::AppState,
    utils::{
        config::{Config, StoreKind},
        error::{AppError, AppResult},
        session, webauthn,
    },
};

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub config: Arc<Config>,
}

pub struct TestUser {
    pub user: User,
    pub cookie: String,
}

pub fn test_config() -> Config {
    Config {
        store: StoreKind::Memory,
        mongo_uri: String::new(),
        db_name: String::new(),
        server_addr: "127.0.0.1:0".parse().unwrap(),
        cors_origin: "http://localhost:3000".to_string(),
        session_secret: "test-secret".to_string(),
        session_ttl_hours: 1,
        cookie_secure: false,
        rp_id: "localhost".to_string(),
        rp_origin: "http://localhost:3000".to_string(),
        rp_name: "Polls Test".to_string(),
    }
}

pub fn new_user(username: &str) -> User {
    let now = Utc::now();
    User {
        id: ObjectId::new(),
        username: username.to_string(),
        display_name: username.to_uppercase(),
        email: None,
        about: String::new(),
        webauthn_id: uuid::Uuid::new_v4().to_string(),
        created_at: now,
        updated_at: now,
    }
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::with_stores(store.clone(), store.clone(), store)
    }

    /// Routes through `polls` and `accounts`, which usually wrap `store`.
    /// `store` stays reachable for seeding and assertions.
    pub fn with_stores(
        store: Arc<MemoryStore>,
        polls: Arc<dyn PollStore>,
        accounts: Arc<dyn AccountStore>,
    ) -> Self {
        let config = Arc::new(test_config());
        let webauthn = webauthn::init_webauthn(&config).unwrap();

        let state = AppState::new(polls, accounts, webauthn, config.clone());

        Self {
            router: app(state),
            store,
            config,
        }
    }

    pub async fn user(&self, username: &str) -> TestUser {
        let user = new_user(username);
        self.store.insert_user(&user).await.unwrap();

        let token = session::create_token(user.id, &user.username, &self.config).unwrap();
        TestUser {
            user,
            cookie: format!("{}={}", session::SESSION_COOKIE, token),
        }
    }

    /// Stores a question directly, bypassing the HTTP layer.
    pub async fn seed_question(
        &self,
        owner: &TestUser,
        text: &str,
        choices: &[&str],
        pub_date: DateTime<Utc>,
    ) -> Question {
        let question = Question::new(
            owner.user.id,
            text.to_string(),
            choices.iter().map(|c| c.to_string()).collect(),
            pub_date,
        );
        self.store.insert_question(&question).await.unwrap();
        question
    }

    pub async fn question(&self, id: ObjectId) -> Option<Question> {
        self.store.find_question(id).await.unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, path: &str, cookie: Option<&str>, body: Value) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn post_form(&self, path: &str, cookie: Option<&str>, body: &str) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("response should carry a Location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// Lets another vote land on the question right before each of the next
/// `races` replaces, so the edit always finds a newer revision.
pub struct RacingVotes {
    inner: Arc<MemoryStore>,
    races: AtomicUsize,
}

impl RacingVotes {
    pub fn new(inner: Arc<MemoryStore>, races: usize) -> Self {
        Self {
            inner,
            races: AtomicUsize::new(races),
        }
    }

    pub fn remaining(&self) -> usize {
        self.races.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PollStore for RacingVotes {
    async fn insert_question(&self, question: &Question) -> AppResult<()> {
        self.inner.insert_question(question).await
    }

    async fn find_question(&self, id: ObjectId) -> AppResult<Option<Question>> {
        self.inner.find_question(id).await
    }

    async fn latest_published(&self, now: DateTime<Utc>, limit: i64) -> AppResult<Vec<Question>> {
        self.inner.latest_published(now, limit).await
    }

    async fn questions_by_owner(&self, owner_id: ObjectId) -> AppResult<Vec<Question>> {
        self.inner.questions_by_owner(owner_id).await
    }

    async fn replace_question(
        &self,
        question: &Question,
        expected_revision: i64,
    ) -> AppResult<WriteOutcome> {
        let raced = self
            .races
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        if raced {
            let stored = self.inner.find_question(question.id).await?.unwrap();
            self.inner
                .increment_vote(stored.id, &stored.choices[0].id)
                .await?;
        }

        self.inner.replace_question(question, expected_revision).await
    }

    async fn delete_question(&self, id: ObjectId, owner_id: ObjectId) -> AppResult<bool> {
        self.inner.delete_question(id, owner_id).await
    }

    async fn increment_vote(&self, question_id: ObjectId, choice_id: &str) -> AppResult<bool> {
        self.inner.increment_vote(question_id, choice_id).await
    }
}

/// Account store whose chosen operations fail like an unreachable database.
#[derive(Default)]
pub struct FailingAccounts {
    pub inner: Arc<MemoryStore>,
    pub fail_find_user: bool,
    pub fail_insert_passkey: bool,
}

fn database_down() -> AppError {
    AppError::DatabaseError("connection refused".to_string())
}

#[async_trait]
impl AccountStore for FailingAccounts {
    async fn insert_user(&self, user: &User) -> AppResult<()> {
        self.inner.insert_user(user).await
    }

    async fn find_user(&self, id: ObjectId) -> AppResult<Option<User>> {
        if self.fail_find_user {
            return Err(database_down());
        }
        self.inner.find_user(id).await
    }

    async fn delete_user(&self, id: ObjectId) -> AppResult<bool> {
        self.inner.delete_user(id).await
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.inner.find_user_by_username(username).await
    }

    async fn update_about(&self, id: ObjectId, about: &str, now: DateTime<Utc>) -> AppResult<bool> {
        self.inner.update_about(id, about, now).await
    }

    async fn insert_passkey(&self, passkey: &PasskeyDocument) -> AppResult<()> {
        if self.fail_insert_passkey {
            return Err(database_down());
        }
        self.inner.insert_passkey(passkey).await
    }

    async fn passkeys_for_user(&self, user_id: ObjectId) -> AppResult<Vec<PasskeyDocument>> {
        self.inner.passkeys_for_user(user_id).await
    }

    async fn find_passkey(&self, credential_id: &str) -> AppResult<Option<PasskeyDocument>> {
        self.inner.find_passkey(credential_id).await
    }

    async fn update_passkey(
        &self,
        credential_id: &str,
        passkey: &str,
        used_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.inner.update_passkey(credential_id, passkey, used_at).await
    }

    async fn save_challenge(&self, challenge: &ChallengeDocument) -> AppResult<()> {
        self.inner.save_challenge(challenge).await
    }

    async fn take_challenge(
        &self,
        kind: ChallengeKind,
        username: &str,
    ) -> AppResult<Option<ChallengeDocument>> {
        self.inner.take_challenge(kind, username).await
    }
}
