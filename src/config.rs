//! Process-wide configuration loaded once from the environment

use crate::error::ConfigError;
use std::env;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TARGET_PLAN: &str = "premium";
pub const DEFAULT_FCM_API_URL: &str = "https://fcm.googleapis.com";
pub const DEFAULT_PUSH_TOPIC: &str = "trade_alerts";

/// Deployment environment name (`production`, `sandbox`, ...)
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub target_plan: String,
}

#[derive(Debug, Clone)]
pub struct PushConfig {
    /// Service-account JSON. Push delivery is disabled when unset.
    pub credentials_path: Option<String>,
    pub base_url: String,
    pub topic: String,
}

/// Immutable configuration handed to the clients at startup.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub port: u16,
    pub gemini: GeminiConfig,
    pub directory: DirectoryConfig,
    pub push: PushConfig,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = get("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let gemini = GeminiConfig {
            api_key: get("GEMINI_API_KEY"),
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            base_url: checked_url(
                "GEMINI_API_URL",
                get("GEMINI_API_URL").unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
            )?,
        };

        let directory = DirectoryConfig {
            api_key: get("DIRECTORY_API_KEY"),
            base_url: get("DIRECTORY_API_URL")
                .map(|url| checked_url("DIRECTORY_API_URL", url))
                .transpose()?,
            target_plan: get("DIRECTORY_TARGET_PLAN")
                .unwrap_or_else(|| DEFAULT_TARGET_PLAN.to_string()),
        };

        let push = PushConfig {
            credentials_path: get("FIREBASE_CREDENTIALS_PATH")
                .or_else(|| get("GOOGLE_APPLICATION_CREDENTIALS")),
            base_url: checked_url(
                "FCM_API_URL",
                get("FCM_API_URL").unwrap_or_else(|| DEFAULT_FCM_API_URL.to_string()),
            )?,
            topic: get("PUSH_TOPIC").unwrap_or_else(|| DEFAULT_PUSH_TOPIC.to_string()),
        };

        Ok(Self {
            port,
            gemini,
            directory,
            push,
        })
    }
}

/// Validates `value` as an absolute URL and strips any trailing slash.
fn checked_url(name: &'static str, value: String) -> Result<String, ConfigError> {
    url::Url::parse(&value).map_err(|source| ConfigError::InvalidUrl { name, source })?;
    Ok(value.trim_end_matches('/').to_string())
}
