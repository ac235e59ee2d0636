//! Firebase Cloud Messaging HTTP v1 client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{error, info};

use super::credentials::ServiceAccount;
use super::token::TokenProvider;
use super::{Notifier, PushMessage};
use crate::config::PushConfig;
use crate::error::{ConfigError, Result};

pub struct FcmClient {
    client: Client,
    base_url: String,
    tokens: TokenProvider,
}

impl FcmClient {
    pub fn new(
        config: &PushConfig,
        account: ServiceAccount,
    ) -> std::result::Result<Self, ConfigError> {
        Self::with_client(config, account, Client::new())
    }

    pub fn with_client(
        config: &PushConfig,
        account: ServiceAccount,
        client: Client,
    ) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            tokens: TokenProvider::new(account, client.clone())?,
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the client from the configured credentials file, or `None` when push is disabled.
    pub fn from_config(config: &PushConfig) -> std::result::Result<Option<Self>, ConfigError> {
        let Some(path) = config.credentials_path.as_deref() else {
            return Ok(None);
        };
        let account = ServiceAccount::from_file(path)?;
        info!(project_id = %account.project_id, "Push notifications enabled");
        Self::new(config, account).map(Some)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.base_url,
            self.tokens.project_id()
        )
    }

    /// Send one message; returns the message name assigned by FCM.
    pub async fn send(&self, message: &PushMessage) -> Result<String> {
        let token = self.tokens.access_token().await?;
        let request = SendRequest {
            message: FcmMessage {
                topic: &message.topic,
                notification: Notification {
                    title: &message.title,
                    body: &message.body,
                },
                data: (!message.data.is_empty()).then_some(&message.data),
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<SendResponse>()
            .await?;

        Ok(response.name)
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Serialize)]
struct FcmMessage<'a> {
    topic: &'a str,
    notification: Notification<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a BTreeMap<String, String>>,
}

#[derive(Serialize)]
struct Notification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Deserialize)]
struct SendResponse {
    #[serde(default)]
    name: String,
}

#[async_trait]
impl Notifier for FcmClient {
    async fn notify(&self, message: &PushMessage) -> bool {
        match self.send(message).await {
            Ok(name) => {
                info!(topic = %message.topic, message_id = %name, "Push notification sent");
                true
            }
            Err(e) => {
                error!(topic = %message.topic, error = %e, "Push notification failed");
                false
            }
        }
    }
}
