//! reqwest-backed container API client

use super::*;
use crate::credentials::TokenProvider;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Container API client speaking the zonal v1 REST routes
#[derive(Clone)]
pub struct HttpContainerClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl fmt::Debug for HttpContainerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpContainerClient")
            .field("base_url", &self.base_url)
            .field("principal", &self.tokens.principal())
            .finish()
    }
}

/// Error envelope returned by Google APIs
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    message: String,
    errors: Vec<ErrorItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorItem {
    reason: String,
}

impl HttpContainerClient {
    /// Create a client rooted at `base_url` (e.g. `https://container.googleapis.com/v1/`)
    ///
    /// `timeout` bounds every individual request.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        tokens: Arc<dyn TokenProvider>,
    ) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("kedriver-gke/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn cluster_path(cluster: &ClusterRef) -> String {
        cluster.to_string()
    }

    fn node_pool_path(cluster: &ClusterRef, node_pool: &str) -> String {
        format!("{}/nodePools/{}", cluster, node_pool)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }

        let envelope: ErrorEnvelope = serde_json::from_str(&body).unwrap_or_default();
        let reason = envelope
            .error
            .errors
            .first()
            .map(|item| item.reason.clone())
            .unwrap_or_default();
        let message = if envelope.error.message.is_empty() {
            body
        } else {
            envelope.error.message
        };

        debug!(status = status.as_u16(), reason = %reason, "container API call failed");
        Err(ApiError::status(status.as_u16(), reason, message))
    }

    async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<T> {
        debug!("{} {}", method, path);
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.call(request).await
    }
}

#[async_trait]
impl ContainerApi for HttpContainerClient {
    async fn create_cluster(
        &self,
        project_id: &str,
        zone: &str,
        request: &CreateClusterRequest,
    ) -> ApiResult<Operation> {
        let path = format!("projects/{}/zones/{}/clusters", project_id, zone);
        self.send(Method::POST, &path, Some(request)).await
    }

    async fn get_cluster(&self, cluster: &ClusterRef) -> ApiResult<Cluster> {
        self.send::<(), _>(Method::GET, &Self::cluster_path(cluster), None)
            .await
    }

    async fn update_cluster(
        &self,
        cluster: &ClusterRef,
        request: &UpdateClusterRequest,
    ) -> ApiResult<Operation> {
        self.send(Method::PUT, &Self::cluster_path(cluster), Some(request))
            .await
    }

    async fn delete_cluster(&self, cluster: &ClusterRef) -> ApiResult<Operation> {
        self.send::<(), _>(Method::DELETE, &Self::cluster_path(cluster), None)
            .await
    }

    async fn get_node_pool(&self, cluster: &ClusterRef, node_pool: &str) -> ApiResult<NodePool> {
        self.send::<(), _>(Method::GET, &Self::node_pool_path(cluster, node_pool), None)
            .await
    }

    async fn update_node_pool(
        &self,
        cluster: &ClusterRef,
        node_pool: &str,
        request: &UpdateNodePoolRequest,
    ) -> ApiResult<Operation> {
        let path = format!("{}/update", Self::node_pool_path(cluster, node_pool));
        self.send(Method::POST, &path, Some(request)).await
    }

    async fn set_node_pool_size(
        &self,
        cluster: &ClusterRef,
        node_pool: &str,
        request: &SetNodePoolSizeRequest,
    ) -> ApiResult<Operation> {
        let path = format!("{}/setSize", Self::node_pool_path(cluster, node_pool));
        self.send(Method::POST, &path, Some(request)).await
    }
}
