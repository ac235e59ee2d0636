//! Directory service client: grants the paid plan to a customer after payment.
//!
//! The grant is a lookup followed by an update with nothing tying the two together.
//! A user removed in between simply makes the update fail.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{error, info, warn};
use url::Url;

use crate::config::DirectoryConfig;
use crate::error::GrantError;
use crate::models::directory::UserListResponse;
use crate::models::DirectoryUser;

#[async_trait]
pub trait AccessGrantor: Send + Sync {
    /// Grant the configured plan to the user registered under `email`.
    ///
    /// On success returns the message echoed back to the webhook caller.
    async fn grant_access(&self, email: &str) -> Result<String, GrantError>;
}

pub struct DirectoryClient {
    client: Client,
    api_key: Option<String>,
    base_url: Option<String>,
    target_plan: String,
}

impl DirectoryClient {
    pub fn new(config: &DirectoryConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: &DirectoryConfig, client: Client) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config
                .base_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
            target_plan: config.target_plan.clone(),
        }
    }

    pub fn target_plan(&self) -> &str {
        &self.target_plan
    }

    async fn list_users(&self, base_url: &str, api_key: &str) -> Result<Vec<DirectoryUser>, String> {
        let url = users_url(base_url, None)?;
        let response = self
            .client
            .get(url)
            .bearer_auth(api_key)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| e.to_string())?
            .json::<UserListResponse>()
            .await
            .map_err(|e| e.to_string())?;
        Ok(response.into_users())
    }

    async fn update_plan(&self, base_url: &str, api_key: &str, user_id: &str) -> Result<(), String> {
        let url = users_url(base_url, Some(user_id))?;
        self.client
            .put(url)
            .bearer_auth(api_key)
            .json(&json!({ "plan": self.target_plan }))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// `<base>/users`, or `<base>/users/<id>` with the id percent-encoded as a single path segment.
pub fn users_url(base_url: &str, user_id: Option<&str>) -> Result<Url, String> {
    let mut url = Url::parse(base_url).map_err(|e| format!("invalid directory URL: {}", e))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| format!("directory URL cannot be a base: {}", base_url))?;
        segments.pop_if_empty().push("users");
        if let Some(id) = user_id {
            segments.push(id);
        }
    }
    Ok(url)
}

/// First user in `users` whose email matches case-insensitively. Duplicates resolve to the
/// earliest entry in the order the directory returned them.
pub fn find_user<'a>(users: &'a [DirectoryUser], email: &str) -> Option<&'a DirectoryUser> {
    users.iter().find(|user| user.email_matches(email))
}

#[async_trait]
impl AccessGrantor for DirectoryClient {
    async fn grant_access(&self, email: &str) -> Result<String, GrantError> {
        let (Some(api_key), Some(base_url)) = (self.api_key.as_deref(), self.base_url.as_deref())
        else {
            error!("Directory service credentials are not configured");
            return Err(GrantError::NotConfigured);
        };

        let users = self.list_users(base_url, api_key).await.map_err(|e| {
            error!(error = %e, "Failed to list directory users");
            GrantError::Lookup(e)
        })?;

        let Some(user) = find_user(&users, email) else {
            warn!(email = %email, scanned = users.len(), "No directory user for email");
            return Err(GrantError::UserNotFound {
                email: email.to_string(),
            });
        };

        info!(user_id = %user.id, email = %email, plan = %self.target_plan, "Updating directory plan");

        self.update_plan(base_url, api_key, &user.id)
            .await
            .map_err(|e| {
                error!(user_id = %user.id, error = %e, "Failed to update directory plan");
                GrantError::Update {
                    user_id: user.id.clone(),
                    reason: e,
                }
            })?;

        info!(user_id = %user.id, email = %email, "Plan granted");
        Ok(format!(
            "plan {} granted to {}",
            self.target_plan, email
        ))
    }
}
