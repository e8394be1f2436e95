use std::collections::HashMap;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::db::{AccountStore, PollStore, WriteOutcome};
use crate::models::{
    passkey_models::{ChallengeDocument, ChallengeKind, PasskeyDocument},
    poll_models::Question,
    user_models::User,
};
use crate::utils::error::{AppError, AppResult};

/// In-process store. Each method holds its lock for the whole operation,
/// which gives the same all-or-nothing guarantees as a single-document
/// write.
#[derive(Default)]
pub struct MemoryStore {
    questions: RwLock<HashMap<ObjectId, Question>>,
    users: RwLock<HashMap<ObjectId, User>>,
    passkeys: RwLock<HashMap<String, PasskeyDocument>>,
    challenges: RwLock<HashMap<(ChallengeKind, String), ChallengeDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn question_count(&self) -> usize {
        self.questions.read().await.len()
    }

    pub async fn choice_count(&self) -> usize {
        self.questions
            .read()
            .await
            .values()
            .map(|question| question.choices.len())
            .sum()
    }
}

fn newest_first(questions: &mut [Question]) {
    questions.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
}

#[async_trait]
impl PollStore for MemoryStore {
    async fn insert_question(&self, question: &Question) -> AppResult<()> {
        let mut questions = self.questions.write().await;
        if questions.contains_key(&question.id) {
            return Err(AppError::Conflict("Question already exists".to_string()));
        }
        questions.insert(question.id, question.clone());
        Ok(())
    }

    async fn find_question(&self, id: ObjectId) -> AppResult<Option<Question>> {
        Ok(self.questions.read().await.get(&id).cloned())
    }

    async fn latest_published(&self, now: DateTime<Utc>, limit: i64) -> AppResult<Vec<Question>> {
        let mut published: Vec<Question> = self
            .questions
            .read()
            .await
            .values()
            .filter(|question| question.is_published_at(now))
            .cloned()
            .collect();

        newest_first(&mut published);
        published.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(published)
    }

    async fn questions_by_owner(&self, owner_id: ObjectId) -> AppResult<Vec<Question>> {
        let mut owned: Vec<Question> = self
            .questions
            .read()
            .await
            .values()
            .filter(|question| question.owner_id == owner_id)
            .cloned()
            .collect();

        newest_first(&mut owned);
        Ok(owned)
    }

    async fn replace_question(
        &self,
        question: &Question,
        expected_revision: i64,
    ) -> AppResult<WriteOutcome> {
        let mut questions = self.questions.write().await;

        let Some(stored) = questions
            .get_mut(&question.id)
            .filter(|stored| stored.owner_id == question.owner_id)
        else {
            return Ok(WriteOutcome::Missing);
        };

        if stored.revision != expected_revision {
            return Ok(WriteOutcome::Stale);
        }

        let mut replacement = question.clone();
        replacement.revision = expected_revision + 1;
        *stored = replacement;

        Ok(WriteOutcome::Applied)
    }

    async fn delete_question(&self, id: ObjectId, owner_id: ObjectId) -> AppResult<bool> {
        let mut questions = self.questions.write().await;

        match questions.get(&id) {
            Some(question) if question.owner_id == owner_id => {
                questions.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn increment_vote(&self, question_id: ObjectId, choice_id: &str) -> AppResult<bool> {
        let mut questions = self.questions.write().await;

        let Some(question) = questions.get_mut(&question_id) else {
            return Ok(false);
        };

        match question.choices.iter_mut().find(|choice| choice.id == choice_id) {
            Some(choice) => {
                choice.votes += 1;
                question.revision += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> AppResult<()> {
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.username == user.username) {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&self, id: ObjectId) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn delete_user(&self, id: ObjectId) -> AppResult<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn update_about(&self, id: ObjectId, about: &str, now: DateTime<Utc>) -> AppResult<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(user) => {
                user.about = about.to_string();
                user.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_passkey(&self, passkey: &PasskeyDocument) -> AppResult<()> {
        self.passkeys
            .write()
            .await
            .insert(passkey.credential_id.clone(), passkey.clone());
        Ok(())
    }

    async fn passkeys_for_user(&self, user_id: ObjectId) -> AppResult<Vec<PasskeyDocument>> {
        Ok(self
            .passkeys
            .read()
            .await
            .values()
            .filter(|passkey| passkey.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_passkey(&self, credential_id: &str) -> AppResult<Option<PasskeyDocument>> {
        Ok(self.passkeys.read().await.get(credential_id).cloned())
    }

    async fn update_passkey(
        &self,
        credential_id: &str,
        passkey: &str,
        used_at: DateTime<Utc>,
    ) -> AppResult<()> {
        if let Some(stored) = self.passkeys.write().await.get_mut(credential_id) {
            stored.passkey = passkey.to_string();
            stored.last_used_at = Some(used_at);
        }
        Ok(())
    }

    async fn save_challenge(&self, challenge: &ChallengeDocument) -> AppResult<()> {
        self.challenges.write().await.insert(
            (challenge.kind, challenge.username.clone()),
            challenge.clone(),
        );
        Ok(())
    }

    async fn take_challenge(
        &self,
        kind: ChallengeKind,
        username: &str,
    ) -> AppResult<Option<ChallengeDocument>> {
        Ok(self
            .challenges
            .write()
            .await
            .remove(&(kind, username.to_string())))
    }
}
