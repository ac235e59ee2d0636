//! User record as returned by the directory service

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
}

impl DirectoryUser {
    /// Case-insensitive comparison; a record without an email never matches.
    pub fn email_matches(&self, email: &str) -> bool {
        self.email
            .as_deref()
            .is_some_and(|own| own.trim().to_lowercase() == email.trim().to_lowercase())
    }
}

/// List responses come either as a bare array or wrapped in `{"users": [...]}` / `{"data": [...]}`.
/// Records are decoded one by one so a single malformed entry does not hide the rest.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UserListResponse {
    Bare(Vec<Value>),
    Users { users: Vec<Value> },
    Data { data: Vec<Value> },
}

impl UserListResponse {
    pub fn into_users(self) -> Vec<DirectoryUser> {
        let records = match self {
            Self::Bare(records) | Self::Users { users: records } | Self::Data { data: records } => {
                records
            }
        };

        records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(index, error = %e, "Skipping undecodable directory record");
                    None
                }
            })
            .collect()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}
