//! OAuth2 access tokens for a service account (JWT-bearer grant)

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::credentials::ServiceAccount;
use crate::error::{ConfigError, RelayError, Result};

pub const MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens are refreshed this long before the expiry the server reported.
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Mints and caches access tokens. The cache is the only state shared across requests
/// besides configuration.
pub struct TokenProvider {
    client: Client,
    account: ServiceAccount,
    key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(account: ServiceAccount, client: Client) -> std::result::Result<Self, ConfigError> {
        let key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
            .map_err(ConfigError::InvalidPrivateKey)?;
        Ok(Self {
            client,
            account,
            key,
            cached: Mutex::new(None),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.account.project_id
    }

    /// A valid access token, fetching a new one when the cached token is missing or about
    /// to expire.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref() {
            if token.expires_at > now {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.fetch(now).await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let iat = now.timestamp();
        let claims = Claims {
            iss: &self.account.client_email,
            scope: MESSAGING_SCOPE,
            aud: &self.account.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(|e| RelayError::Auth(format!("failed to sign assertion: {}", e)))
    }

    async fn fetch(&self, now: DateTime<Utc>) -> Result<CachedToken> {
        let assertion = self.assertion(now)?;
        debug!(token_uri = %self.account.token_uri, "Requesting push access token");

        let response = self
            .client
            .post(&self.account.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Auth(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token = response.json::<TokenResponse>().await?;
        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(cache_lifetime(token.expires_in)),
        })
    }
}

/// Seconds a token may be served from cache: the reported lifetime minus the refresh margin,
/// bounded to `0..=ASSERTION_LIFETIME_SECS` whatever the server sent.
fn cache_lifetime(expires_in: i64) -> i64 {
    expires_in
        .saturating_sub(REFRESH_MARGIN_SECS)
        .clamp(0, ASSERTION_LIFETIME_SECS)
}
