//! Storage seams.
//!
//! Handlers only talk to [`PollStore`] and [`AccountStore`]. `mongo_store`
//! backs them with MongoDB, `memory_store` with in-process maps.

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};

use crate::models::{
    passkey_models::{ChallengeDocument, ChallengeKind, PasskeyDocument},
    poll_models::Question,
    user_models::User,
};
use crate::utils::error::AppResult;

pub mod connection;
pub mod memory_store;
pub mod mongo_store;

/// Outcome of a conditional write against a question owned by someone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    /// The document exists but the revision moved on since it was read.
    Stale,
    /// No document with that id and owner.
    Missing,
}

/// Unit of work for the poll aggregate. Every method commits a whole
/// question (text, owner and choices) or nothing.
#[async_trait]
pub trait PollStore: Send + Sync {
    async fn insert_question(&self, question: &Question) -> AppResult<()>;

    async fn find_question(&self, id: ObjectId) -> AppResult<Option<Question>>;

    /// Newest first, `pub_date <= now`, at most `limit`.
    async fn latest_published(&self, now: DateTime<Utc>, limit: i64) -> AppResult<Vec<Question>>;

    /// Newest first.
    async fn questions_by_owner(&self, owner_id: ObjectId) -> AppResult<Vec<Question>>;

    /// Replaces the stored document when both the owner and the revision
    /// still match `question.owner_id` and `expected_revision`. The stored
    /// revision becomes `expected_revision + 1`.
    async fn replace_question(
        &self,
        question: &Question,
        expected_revision: i64,
    ) -> AppResult<WriteOutcome>;

    /// Removes the question together with its choices. Returns false when
    /// no question with that id belongs to `owner_id`.
    async fn delete_question(&self, id: ObjectId, owner_id: ObjectId) -> AppResult<bool>;

    /// Atomically adds one vote. Returns false when the choice is not part
    /// of the question.
    async fn increment_vote(&self, question_id: ObjectId, choice_id: &str) -> AppResult<bool>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with `Conflict` when the username is taken.
    async fn insert_user(&self, user: &User) -> AppResult<()>;

    async fn find_user(&self, id: ObjectId) -> AppResult<Option<User>>;

    /// Returns false when there was no such user.
    async fn delete_user(&self, id: ObjectId) -> AppResult<bool>;

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;

    async fn update_about(&self, id: ObjectId, about: &str, now: DateTime<Utc>) -> AppResult<bool>;

    async fn insert_passkey(&self, passkey: &PasskeyDocument) -> AppResult<()>;

    async fn passkeys_for_user(&self, user_id: ObjectId) -> AppResult<Vec<PasskeyDocument>>;

    async fn find_passkey(&self, credential_id: &str) -> AppResult<Option<PasskeyDocument>>;

    async fn update_passkey(
        &self,
        credential_id: &str,
        passkey: &str,
        used_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Stores the challenge, replacing any earlier one for the same
    /// kind and username.
    async fn save_challenge(&self, challenge: &ChallengeDocument) -> AppResult<()>;

    /// Removes and returns the pending challenge.
    async fn take_challenge(
        &self,
        kind: ChallengeKind,
        username: &str,
    ) -> AppResult<Option<ChallengeDocument>>;
}
