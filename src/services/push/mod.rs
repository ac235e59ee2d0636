//! Topic-addressed push notifications.

pub mod credentials;
pub mod fcm;
pub mod token;

pub use credentials::ServiceAccount;
pub use fcm::FcmClient;
pub use token::TokenProvider;

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::config::DEFAULT_PUSH_TOPIC;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub topic: String,
    /// Extra key/value pairs delivered alongside the visible notification.
    pub data: BTreeMap<String, String>,
}

impl PushMessage {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            topic: DEFAULT_PUSH_TOPIC.to_string(),
            data: BTreeMap::new(),
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message` to its topic. Returns whether the backend accepted it;
    /// delivery failures are logged, never raised.
    async fn notify(&self, message: &PushMessage) -> bool;
}
