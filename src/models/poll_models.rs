use bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_TEXT_LEN: usize = 200;

/// A poll: the question, who owns it, and its embedded choices.
///
/// The whole aggregate lives in one document so that a question is never
/// stored without its choices.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub question_text: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub pub_date: DateTime<Utc>,
    pub owner_id: ObjectId,
    pub choices: Vec<Choice>,
    /// Bumped on every write, including votes.
    pub revision: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Choice {
    pub id: String,
    pub choice_text: String,
    pub votes: u32,
}

impl Choice {
    pub fn new(choice_text: String) -> Self {
        Self {
            id: ObjectId::new().to_hex(),
            choice_text,
            votes: 0,
        }
    }
}

impl Question {
    pub fn new(
        owner_id: ObjectId,
        question_text: String,
        choice_texts: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ObjectId::new(),
            question_text,
            pub_date: now,
            owner_id,
            choices: choice_texts.into_iter().map(Choice::new).collect(),
            revision: 0,
        }
    }

    pub fn is_published_at(&self, now: DateTime<Utc>) -> bool {
        self.pub_date <= now
    }

    pub fn was_published_recently(&self, now: DateTime<Utc>) -> bool {
        now - Duration::days(1) <= self.pub_date && self.pub_date <= now
    }

    pub fn choice(&self, choice_id: &str) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.id == choice_id)
    }

    pub fn total_votes(&self) -> u64 {
        self.choices.iter().map(|choice| u64::from(choice.votes)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(now: DateTime<Utc>) -> Question {
        Question::new(
            ObjectId::new(),
            "What's new?".to_string(),
            vec!["Not much".to_string(), "The sky".to_string()],
            now,
        )
    }

    #[test]
    fn new_question_starts_with_zero_votes() {
        let now = Utc::now();
        let question = sample(now);

        assert_eq!(question.pub_date, now);
        assert_eq!(question.choices.len(), 2);
        assert!(question.choices.iter().all(|c| c.votes == 0));
        assert_ne!(question.choices[0].id, question.choices[1].id);
        assert_eq!(question.total_votes(), 0);
    }

    #[test]
    fn future_questions_are_not_published() {
        let now = Utc::now();
        let question = sample(now + Duration::days(30));

        assert!(!question.is_published_at(now));
        assert!(!question.was_published_recently(now));
    }

    #[test]
    fn published_recently_covers_the_last_day_only() {
        let now = Utc::now();

        let old = sample(now - Duration::days(1) - Duration::seconds(1));
        assert!(!old.was_published_recently(now));

        let recent = sample(now - Duration::hours(23) - Duration::minutes(59));
        assert!(recent.was_published_recently(now));
    }

    #[test]
    fn choice_lookup_by_id() {
        let question = sample(Utc::now());
        let id = question.choices[1].id.clone();

        assert_eq!(question.choice(&id).map(|c| c.choice_text.as_str()), Some("The sky"));
        assert!(question.choice("nope").is_none());
    }
}
