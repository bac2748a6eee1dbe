//! HTTP client tests
//!
//! Exercises the zonal REST routes against a wiremock server:
//! - request paths, methods and bodies
//! - bearer authentication
//! - Google error envelopes mapped onto ApiError

use kedriver_gke::api::{
    ClusterRef, ContainerApi, CreateClusterRequest, HttpContainerClient, SetNodePoolSizeRequest,
    UpdateClusterRequest, UpdateNodePoolRequest,
};
use kedriver_gke::credentials::StaticTokenProvider;
use kedriver_gke::{request, ClusterState};
use kedriver_core::DriverOptions;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CLUSTER_PATH: &str = "/v1/projects/p1/zones/z1/clusters/c1";

fn client(server: &MockServer) -> HttpContainerClient {
    HttpContainerClient::new(
        format!("{}/v1/", server.uri()),
        Duration::from_secs(5),
        Arc::new(StaticTokenProvider::new("ya29.test")),
    )
    .unwrap()
}

fn cluster_ref() -> ClusterRef {
    ClusterRef::new("p1", "z1", "c1")
}

fn operation(name: &str) -> serde_json::Value {
    json!({"name": name, "operationType": "CREATE_CLUSTER", "status": "RUNNING"})
}

fn error_envelope(status: u16, reason: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "error": {
            "code": status,
            "message": message,
            "errors": [{"reason": reason, "message": message}]
        }
    }))
}

#[tokio::test]
async fn test_create_cluster_posts_request_body() {
    let server = MockServer::start().await;
    let state = ClusterState::decode(
        &DriverOptions::new()
            .with_string("name", "c1")
            .with_string("project-id", "p1")
            .with_string("zone", "z1")
            .with_int("node-count", 3),
    )
    .unwrap();
    let create = request::build(&state);

    Mock::given(method("POST"))
        .and(path("/v1/projects/p1/zones/z1/clusters"))
        .and(header("authorization", "Bearer ya29.test"))
        .and(body_json(serde_json::to_value(&create).unwrap()))
        .respond_with(ResponseTemplate::new(200).set_body_json(operation("operation-1")))
        .expect(1)
        .mount(&server)
        .await;

    let op = client(&server)
        .create_cluster("p1", "z1", &create)
        .await
        .unwrap();
    assert_eq!(op.name, "operation-1");
    assert_eq!(op.operation_type, "CREATE_CLUSTER");
}

#[tokio::test]
async fn test_get_cluster_parses_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CLUSTER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "c1",
            "status": "PROVISIONING",
            "currentMasterVersion": "1.29.1-gke.1",
            "nodePools": [{"name": "default-pool", "initialNodeCount": 3}]
        })))
        .mount(&server)
        .await;

    let cluster = client(&server).get_cluster(&cluster_ref()).await.unwrap();
    assert_eq!(cluster.status, "PROVISIONING");
    assert_eq!(cluster.current_master_version, "1.29.1-gke.1");
    assert_eq!(cluster.first_node_pool().unwrap().initial_node_count, 3);
}

#[tokio::test]
async fn test_update_cluster_puts_desired_version() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(CLUSTER_PATH))
        .and(body_json(json!({"update": {"desiredMasterVersion": "1.30.0-gke.1"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(operation("operation-2")))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .update_cluster(
            &cluster_ref(),
            &UpdateClusterRequest::master_version("1.30.0-gke.1"),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_node_pool_routes() {
    let server = MockServer::start().await;
    let pool_path = format!("{}/nodePools/default-pool", CLUSTER_PATH);

    Mock::given(method("GET"))
        .and(path(pool_path.as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"name": "default-pool", "status": "RECONCILING"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{}/update", pool_path)))
        .and(body_json(json!({"nodeVersion": "1.30.0-gke.1", "imageType": "COS"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(operation("operation-3")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{}/setSize", pool_path)))
        .and(body_json(json!({"nodeCount": 5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(operation("operation-4")))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let pool = api
        .get_node_pool(&cluster_ref(), "default-pool")
        .await
        .unwrap();
    assert_eq!(pool.status, "RECONCILING");

    api.update_node_pool(
        &cluster_ref(),
        "default-pool",
        &UpdateNodePoolRequest {
            node_version: "1.30.0-gke.1".into(),
            image_type: "COS".into(),
        },
    )
    .await
    .unwrap();

    let op = api
        .set_node_pool_size(
            &cluster_ref(),
            "default-pool",
            &SetNodePoolSizeRequest { node_count: 5 },
        )
        .await
        .unwrap();
    assert_eq!(op.name, "operation-4");
}

#[tokio::test]
async fn test_delete_not_found_is_classified() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(CLUSTER_PATH))
        .respond_with(error_envelope(404, "notFound", "Not found: cluster c1."))
        .mount(&server)
        .await;

    let err = client(&server)
        .delete_cluster(&cluster_ref())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(!err.is_already_exists());
    assert_eq!(err.http_status(), Some(404));
    assert_eq!(
        err.to_string(),
        "googleapi: Error 404: Not found: cluster c1., notFound"
    );
}

#[tokio::test]
async fn test_create_conflict_is_classified() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/projects/p1/zones/z1/clusters"))
        .respond_with(error_envelope(409, "alreadyExists", "Already exists: c1."))
        .mount(&server)
        .await;

    let err = client(&server)
        .create_cluster("p1", "z1", &CreateClusterRequest::default())
        .await
        .unwrap_err();
    assert!(err.is_already_exists());
}

#[tokio::test]
async fn test_error_without_envelope_keeps_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CLUSTER_PATH))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = client(&server).get_cluster(&cluster_ref()).await.unwrap_err();
    assert_eq!(err.http_status(), Some(502));
    assert!(err.to_string().contains("upstream unavailable"));
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn test_malformed_success_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CLUSTER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server).get_cluster(&cluster_ref()).await.unwrap_err();
    assert!(err.http_status().is_none());
    assert!(err.to_string().starts_with("unexpected response body"));
}
