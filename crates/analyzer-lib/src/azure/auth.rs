//! Entra ID client-credentials authentication
//!
//! Acquires bearer tokens for the management plane via the OAuth2
//! client-credentials flow and caches them until shortly before expiry.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{Error, Result};

/// Default authority host for token requests
const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";
/// Scope covering the Azure management plane
const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";
/// Tokens are refreshed this long before their reported expiry
const EXPIRY_SKEW_SECS: i64 = 300;

/// A bearer token for the management plane
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn needs_refresh(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_SKEW_SECS) >= self.expires_at
    }
}

/// Source of management-plane bearer tokens
#[async_trait]
pub trait TokenCredential: Send + Sync {
    async fn token(&self) -> Result<AccessToken>;
}

/// OAuth2 client-credentials flow against Entra ID
pub struct ClientSecretCredential {
    tenant_id: String,
    client_id: String,
    client_secret: String,
    authority: String,
    http: reqwest::Client,
    cached: RwLock<Option<AccessToken>>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

impl ClientSecretCredential {
    /// Build a credential from the conventional AZURE_* environment variables
    pub fn from_env() -> Result<Self> {
        let tenant_id = required_env("AZURE_TENANT_ID")?;
        let client_id = required_env("AZURE_CLIENT_ID")?;
        let client_secret = required_env("AZURE_CLIENT_SECRET")?;
        Self::new(tenant_id, client_id, client_secret)
    }

    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authority: DEFAULT_AUTHORITY.to_string(),
            http,
            cached: RwLock::new(None),
        })
    }

    /// Override the authority host (for tests)
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into();
        self
    }

    async fn request_token(&self) -> Result<AccessToken> {
        let url = format!("{}/{}/oauth2/v2.0/token", self.authority, self.tenant_id);
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", MANAGEMENT_SCOPE),
        ];

        let response = self.http.post(&url).form(&params).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "token request failed ({}): {}",
                status, body
            )));
        }

        let body: TokenResponse = response.json().await?;
        Ok(AccessToken {
            token: body.access_token,
            expires_at: Utc::now() + Duration::seconds(body.expires_in),
        })
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn token(&self) -> Result<AccessToken> {
        if let Some(token) = self.cached.read().await.as_ref() {
            if !token.needs_refresh() {
                return Ok(token.clone());
            }
        }

        let fresh = self.request_token().await?;
        debug!(expires_at = %fresh.expires_at, "Acquired management-plane token");
        *self.cached.write().await = Some(fresh.clone());
        Ok(fresh)
    }
}

fn required_env(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::Auth(format!("{} is not set", name)))
}
