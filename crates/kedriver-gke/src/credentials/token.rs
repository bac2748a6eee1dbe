//! Access token providers

use super::file::{AuthorizedUserCredentials, ServiceAccountKey};
use super::CredentialsError;
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// OAuth2 scope granting access to the container API
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Lifetime requested for signed assertions
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens closer than this to expiry are refreshed
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Source of bearer tokens for API calls
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Identity the tokens are issued to (for logging)
    fn principal(&self) -> &str;

    /// A currently valid access token
    async fn access_token(&self) -> Result<String, CredentialsError>;
}

/// A fixed token, e.g. one minted out of band
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    fn principal(&self) -> &str {
        "static-token"
    }

    async fn access_token(&self) -> Result<String, CredentialsError> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Caches one token and serializes refreshes
#[derive(Debug, Default)]
struct TokenCache {
    slot: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Result<String, CredentialsError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TokenResponse, CredentialsError>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(cached) = slot.as_ref() {
            if cached.expires_at > Instant::now() + EXPIRY_MARGIN {
                return Ok(cached.token.clone());
            }
        }

        let response = refresh().await?;
        let token = response.access_token.clone();
        *slot = Some(CachedToken {
            token: response.access_token,
            expires_at: Instant::now() + Duration::from_secs(response.expires_in),
        });
        Ok(token)
    }
}

async fn exchange(
    http: &Client,
    token_uri: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse, CredentialsError> {
    let response = http.post(token_uri).form(form).send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CredentialsError::Rejected {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Exchanges signed JWT assertions for tokens on behalf of a service account
pub struct ServiceAccountTokenProvider {
    client_email: String,
    token_uri: String,
    header: Header,
    key: EncodingKey,
    http: Client,
    cache: TokenCache,
}

impl std::fmt::Debug for ServiceAccountTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountTokenProvider")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountTokenProvider {
    /// Build a provider; the key's own `token_uri` wins over `default_token_uri`
    pub fn new(
        key: &ServiceAccountKey,
        default_token_uri: &str,
        http: Client,
    ) -> Result<Self, CredentialsError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        let mut header = Header::new(Algorithm::RS256);
        if !key.private_key_id.is_empty() {
            header.kid = Some(key.private_key_id.clone());
        }

        let token_uri = if key.token_uri.is_empty() {
            default_token_uri.to_string()
        } else {
            key.token_uri.clone()
        };

        Ok(Self {
            client_email: key.client_email.clone(),
            token_uri,
            header,
            key: encoding_key,
            http,
            cache: TokenCache::default(),
        })
    }

    /// Sign a fresh assertion for the token endpoint
    pub fn assertion(&self) -> Result<String, CredentialsError> {
        let iat = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: CLOUD_PLATFORM_SCOPE,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        Ok(jsonwebtoken::encode(&self.header, &claims, &self.key)?)
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountTokenProvider {
    fn principal(&self) -> &str {
        &self.client_email
    }

    async fn access_token(&self) -> Result<String, CredentialsError> {
        self.cache
            .get_or_refresh(|| async {
                debug!(principal = %self.client_email, "exchanging service account assertion");
                let assertion = self.assertion()?;
                exchange(
                    &self.http,
                    &self.token_uri,
                    &[
                        ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                        ("assertion", assertion.as_str()),
                    ],
                )
                .await
            })
            .await
    }
}

/// Exchanges a user refresh token for access tokens
pub struct AuthorizedUserTokenProvider {
    credentials: AuthorizedUserCredentials,
    token_uri: String,
    http: Client,
    cache: TokenCache,
}

impl std::fmt::Debug for AuthorizedUserTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedUserTokenProvider")
            .field("client_id", &self.credentials.client_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl AuthorizedUserTokenProvider {
    pub fn new(credentials: &AuthorizedUserCredentials, token_uri: &str, http: Client) -> Self {
        Self {
            credentials: credentials.clone(),
            token_uri: token_uri.to_string(),
            http,
            cache: TokenCache::default(),
        }
    }
}

#[async_trait]
impl TokenProvider for AuthorizedUserTokenProvider {
    fn principal(&self) -> &str {
        &self.credentials.client_id
    }

    async fn access_token(&self) -> Result<String, CredentialsError> {
        self.cache
            .get_or_refresh(|| async {
                debug!(client_id = %self.credentials.client_id, "refreshing user access token");
                exchange(
                    &self.http,
                    &self.token_uri,
                    &[
                        ("grant_type", "refresh_token"),
                        ("client_id", self.credentials.client_id.as_str()),
                        ("client_secret", self.credentials.client_secret.as_str()),
                        ("refresh_token", self.credentials.refresh_token.as_str()),
                    ],
                )
                .await
            })
            .await
    }
}
