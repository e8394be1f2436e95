use bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PasskeyDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub credential_id: String,
    pub user_id: ObjectId,
    /// JSON-serialized `webauthn_rs::prelude::Passkey`.
    pub passkey: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "optional_bson_datetime"
    )]
    pub last_used_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    Registration,
    Authentication,
}

impl ChallengeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeKind::Registration => "registration",
            ChallengeKind::Authentication => "authentication",
        }
    }
}

/// A WebAuthn ceremony in flight. One per (kind, username); consumed on finish.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChallengeDocument {
    pub kind: ChallengeKind,
    pub username: String,
    /// JSON-serialized ceremony state.
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_user: Option<PendingUser>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Profile fields collected at signup start, kept until the passkey is verified.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PendingUser {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub about: String,
    pub webauthn_id: String,
}

/// `Option` counterpart of `chrono_datetime_as_bson_datetime`.
mod optional_bson_datetime {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value.map(bson::DateTime::from_chrono).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Ok(Option::<bson::DateTime>::deserialize(deserializer)?.map(bson::DateTime::to_chrono))
    }
}
