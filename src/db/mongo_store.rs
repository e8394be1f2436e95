use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    error::{Error as MongoError, ErrorKind, WriteFailure},
    Collection, Database,
};
use tracing::debug;

use crate::db::{AccountStore, PollStore, WriteOutcome};
use crate::models::{
    passkey_models::{ChallengeDocument, ChallengeKind, PasskeyDocument},
    poll_models::Question,
    user_models::User,
};
use crate::utils::error::{AppError, AppResult};

pub const QUESTIONS: &str = "questions";
pub const USERS: &str = "users";
pub const PASSKEYS: &str = "passkeys";
pub const CHALLENGES: &str = "challenges";

const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn questions(&self) -> Collection<Question> {
        self.db.collection::<Question>(QUESTIONS)
    }

    fn users(&self) -> Collection<User> {
        self.db.collection::<User>(USERS)
    }

    fn passkeys(&self) -> Collection<PasskeyDocument> {
        self.db.collection::<PasskeyDocument>(PASSKEYS)
    }

    fn challenges(&self) -> Collection<ChallengeDocument> {
        self.db.collection::<ChallengeDocument>(CHALLENGES)
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl PollStore for MongoStore {
    async fn insert_question(&self, question: &Question) -> AppResult<()> {
        self.questions().insert_one(question).await?;
        Ok(())
    }

    async fn find_question(&self, id: ObjectId) -> AppResult<Option<Question>> {
        Ok(self.questions().find_one(doc! { "_id": id }).await?)
    }

    async fn latest_published(&self, now: DateTime<Utc>, limit: i64) -> AppResult<Vec<Question>> {
        let cursor = self
            .questions()
            .find(doc! { "pub_date": { "$lte": bson::DateTime::from_chrono(now) } })
            .sort(doc! { "pub_date": -1 })
            .limit(limit)
            .await?;

        let questions: Vec<Question> = cursor.try_collect().await?;
        Ok(questions)
    }

    async fn questions_by_owner(&self, owner_id: ObjectId) -> AppResult<Vec<Question>> {
        let cursor = self
            .questions()
            .find(doc! { "owner_id": owner_id })
            .sort(doc! { "pub_date": -1 })
            .await?;

        let questions: Vec<Question> = cursor.try_collect().await?;
        Ok(questions)
    }

    async fn replace_question(
        &self,
        question: &Question,
        expected_revision: i64,
    ) -> AppResult<WriteOutcome> {
        let mut replacement = question.clone();
        replacement.revision = expected_revision + 1;

        let result = self
            .questions()
            .replace_one(
                doc! {
                    "_id": question.id,
                    "owner_id": question.owner_id,
                    "revision": expected_revision,
                },
                &replacement,
            )
            .await?;

        if result.matched_count == 1 {
            return Ok(WriteOutcome::Applied);
        }

        let still_owned = self
            .questions()
            .count_documents(doc! { "_id": question.id, "owner_id": question.owner_id })
            .await?;

        debug!(question = %question.id, still_owned, "Conditional replace missed");

        Ok(if still_owned > 0 {
            WriteOutcome::Stale
        } else {
            WriteOutcome::Missing
        })
    }

    async fn delete_question(&self, id: ObjectId, owner_id: ObjectId) -> AppResult<bool> {
        let result = self
            .questions()
            .delete_one(doc! { "_id": id, "owner_id": owner_id })
            .await?;

        Ok(result.deleted_count == 1)
    }

    async fn increment_vote(&self, question_id: ObjectId, choice_id: &str) -> AppResult<bool> {
        let result = self
            .questions()
            .update_one(
                doc! { "_id": question_id, "choices.id": choice_id },
                doc! { "$inc": { "choices.$.votes": 1, "revision": 1 } },
            )
            .await?;

        Ok(result.matched_count == 1)
    }
}

#[async_trait]
impl AccountStore for MongoStore {
    async fn insert_user(&self, user: &User) -> AppResult<()> {
        match self.users().insert_one(user).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => {
                Err(AppError::Conflict("Username already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user(&self, id: ObjectId) -> AppResult<Option<User>> {
        Ok(self.users().find_one(doc! { "_id": id }).await?)
    }

    async fn delete_user(&self, id: ObjectId) -> AppResult<bool> {
        let result = self.users().delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count == 1)
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.users().find_one(doc! { "username": username }).await?)
    }

    async fn update_about(&self, id: ObjectId, about: &str, now: DateTime<Utc>) -> AppResult<bool> {
        let result = self
            .users()
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "about": about, "updated_at": bson::DateTime::from_chrono(now) } },
            )
            .await?;

        Ok(result.matched_count == 1)
    }

    async fn insert_passkey(&self, passkey: &PasskeyDocument) -> AppResult<()> {
        self.passkeys().insert_one(passkey).await?;
        Ok(())
    }

    async fn passkeys_for_user(&self, user_id: ObjectId) -> AppResult<Vec<PasskeyDocument>> {
        let cursor = self.passkeys().find(doc! { "user_id": user_id }).await?;
        let passkeys: Vec<PasskeyDocument> = cursor.try_collect().await?;
        Ok(passkeys)
    }

    async fn find_passkey(&self, credential_id: &str) -> AppResult<Option<PasskeyDocument>> {
        Ok(self
            .passkeys()
            .find_one(doc! { "credential_id": credential_id })
            .await?)
    }

    async fn update_passkey(
        &self,
        credential_id: &str,
        passkey: &str,
        used_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.passkeys()
            .update_one(
                doc! { "credential_id": credential_id },
                doc! {
                    "$set": {
                        "passkey": passkey,
                        "last_used_at": bson::DateTime::from_chrono(used_at),
                    }
                },
            )
            .await?;

        Ok(())
    }

    async fn save_challenge(&self, challenge: &ChallengeDocument) -> AppResult<()> {
        self.challenges()
            .replace_one(
                doc! { "kind": challenge.kind.as_str(), "username": &challenge.username },
                challenge,
            )
            .upsert(true)
            .await?;

        Ok(())
    }

    async fn take_challenge(
        &self,
        kind: ChallengeKind,
        username: &str,
    ) -> AppResult<Option<ChallengeDocument>> {
        Ok(self
            .challenges()
            .find_one_and_delete(doc! { "kind": kind.as_str(), "username": username })
            .await?)
    }
}
