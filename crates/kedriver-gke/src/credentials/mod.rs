//! Credential resolution
//!
//! A [`CredentialSource`] names exactly one place to load credentials from.
//! [`CredentialResolver::resolve`] turns it into a [`TokenProvider`] scoped to
//! that source alone, so concurrent resolutions for different clusters never
//! share or overwrite each other's credentials. Nothing here writes to the
//! process environment.

mod file;
mod token;

pub use file::{AuthorizedUserCredentials, CredentialFile, ServiceAccountKey};
pub use token::{
    AuthorizedUserTokenProvider, ServiceAccountTokenProvider, StaticTokenProvider, TokenProvider,
    CLOUD_PLATFORM_SCOPE,
};

use crate::api::{ContainerApi, HttpContainerClient};
use crate::state::ClusterState;
use async_trait::async_trait;
use kedriver_core::{ApiConfig, Error};
use reqwest::Client;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Environment variable naming a credential file for ambient discovery
pub const CREDENTIALS_ENV_VAR: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Errors raised while loading credentials or obtaining tokens
#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("Credential file not found: {path}")]
    NotFound { path: String },

    #[error("Failed to read credential file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid credential file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(
        "No credentials found: set GOOGLE_APPLICATION_CREDENTIALS or run 'gcloud auth application-default login'"
    )]
    NoAmbientCredentials,

    #[error("Invalid service account key: {0}")]
    Key(#[from] jsonwebtoken::errors::Error),

    #[error("Token request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token endpoint rejected the request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}

impl From<CredentialsError> for Error {
    fn from(err: CredentialsError) -> Self {
        Error::credentials(err.to_string())
    }
}

/// Where to load credentials from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// A credential file on disk
    Path(PathBuf),
    /// Credential file content passed inline
    Inline(String),
    /// Application default credentials
    Ambient,
}

impl CredentialSource {
    /// A non-empty path wins over inline content; with neither, fall back to ambient
    pub fn from_state(state: &ClusterState) -> Self {
        if !state.credential_path.is_empty() {
            Self::Path(PathBuf::from(&state.credential_path))
        } else if !state.credential_content.is_empty() {
            Self::Inline(state.credential_content.clone())
        } else {
            Self::Ambient
        }
    }

    /// Short description for logs; never includes inline content
    pub fn describe(&self) -> String {
        match self {
            Self::Path(path) => format!("file {}", path.display()),
            Self::Inline(_) => "inline credential".to_string(),
            Self::Ambient => "application default credentials".to_string(),
        }
    }
}

/// Turns credential sources into token providers
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    http: Client,
    token_uri: String,
}

impl CredentialResolver {
    /// Create a resolver whose token requests time out after `timeout`
    pub fn new(token_uri: impl Into<String>, timeout: Duration) -> Result<Self, CredentialsError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, token_uri))
    }

    pub fn with_client(http: Client, token_uri: impl Into<String>) -> Self {
        Self {
            http,
            token_uri: token_uri.into(),
        }
    }

    /// Load the credentials named by `source` and build a token provider for them
    pub async fn resolve(
        &self,
        source: &CredentialSource,
    ) -> Result<Arc<dyn TokenProvider>, CredentialsError> {
        debug!("Resolving credentials from {}", source.describe());
        let file = match source {
            CredentialSource::Path(path) => CredentialFile::from_path(path).await?,
            CredentialSource::Inline(content) => CredentialFile::parse(content)?,
            CredentialSource::Ambient => self.discover().await?,
        };
        self.provider_for(&file)
    }

    /// Build a token provider for an already parsed credential file
    pub fn provider_for(
        &self,
        file: &CredentialFile,
    ) -> Result<Arc<dyn TokenProvider>, CredentialsError> {
        let provider: Arc<dyn TokenProvider> = match file {
            CredentialFile::ServiceAccount(key) => Arc::new(ServiceAccountTokenProvider::new(
                key,
                &self.token_uri,
                self.http.clone(),
            )?),
            CredentialFile::AuthorizedUser(credentials) => Arc::new(
                AuthorizedUserTokenProvider::new(credentials, &self.token_uri, self.http.clone()),
            ),
        };
        debug!("Using {} credentials for {}", file.kind(), provider.principal());
        Ok(provider)
    }

    /// Application default credentials: the env var first, then the gcloud well-known file
    async fn discover(&self) -> Result<CredentialFile, CredentialsError> {
        if let Ok(path) = env::var(CREDENTIALS_ENV_VAR) {
            if !path.is_empty() {
                return CredentialFile::from_path(&PathBuf::from(path)).await;
            }
        }

        match well_known_file() {
            Some(path) if path.exists() => CredentialFile::from_path(&path).await,
            _ => Err(CredentialsError::NoAmbientCredentials),
        }
    }
}

/// Location gcloud writes application default credentials to
pub fn well_known_file() -> Option<PathBuf> {
    let base = if cfg!(windows) {
        dirs::config_dir()?
    } else {
        dirs::home_dir()?.join(".config")
    };
    Some(
        base.join("gcloud")
            .join("application_default_credentials.json"),
    )
}

/// Produces API clients authenticated with a given credential source
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn connect(
        &self,
        source: &CredentialSource,
    ) -> kedriver_core::Result<Arc<dyn ContainerApi>>;
}

/// Builds [`HttpContainerClient`]s from resolved credentials
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    resolver: CredentialResolver,
    endpoint: String,
    timeout: Duration,
}

impl HttpClientFactory {
    pub fn new(config: &ApiConfig) -> kedriver_core::Result<Self> {
        let resolver = CredentialResolver::new(&config.token_uri, config.request_timeout())?;
        Ok(Self {
            resolver,
            endpoint: config.endpoint.clone(),
            timeout: config.request_timeout(),
        })
    }
}

#[async_trait]
impl ClientFactory for HttpClientFactory {
    async fn connect(
        &self,
        source: &CredentialSource,
    ) -> kedriver_core::Result<Arc<dyn ContainerApi>> {
        let tokens = self.resolver.resolve(source).await?;
        let client = HttpContainerClient::new(&self.endpoint, self.timeout, tokens)
            .map_err(|e| Error::provider("error creating container client", e))?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_precedence() {
        let mut state = ClusterState::default();
        assert_eq!(CredentialSource::from_state(&state), CredentialSource::Ambient);

        state.credential_content = "{}".into();
        assert_eq!(
            CredentialSource::from_state(&state),
            CredentialSource::Inline("{}".into())
        );

        state.credential_path = "/etc/gke/key.json".into();
        assert_eq!(
            CredentialSource::from_state(&state),
            CredentialSource::Path(PathBuf::from("/etc/gke/key.json"))
        );
    }

    #[test]
    fn test_describe_hides_inline_content() {
        let source = CredentialSource::Inline("{\"private_key\": \"secret\"}".into());
        assert!(!source.describe().contains("secret"));
    }

    #[test]
    fn test_well_known_file_location() {
        if let Some(path) = well_known_file() {
            assert!(path.ends_with("gcloud/application_default_credentials.json"));
        }
    }
}
