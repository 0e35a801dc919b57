mod common;

use common::{client_for, write_image};
use serde_json::json;
use vision3d::{MultiViewImages, ProcessingOptions, Viewpoint, VisionError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_submit_multi_attaches_only_existing_views() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/models/multi"))
        .and(query_param("quads_remesh", "false"))
        .and(query_param("textured", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "request_id": "multi_42"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let images = MultiViewImages::new()
        .with(Viewpoint::Front, write_image(dir.path(), "front.png"))
        .with(Viewpoint::Back, dir.path().join("missing_back.png"))
        .with(Viewpoint::Left, write_image(dir.path(), "left.jpg"));

    let client = client_for(&server);
    let request_id = client
        .submit_multi(&images, ProcessingOptions::new(false, true))
        .await
        .unwrap();
    assert_eq!(request_id, "multi_42");

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains(r#"name="front""#));
    assert!(body.contains(r#"name="left""#));
    assert!(!body.contains(r#"name="back""#));
    assert!(!body.contains(r#"name="right""#));
}

#[tokio::test]
async fn test_submit_multi_without_existing_views_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let images = MultiViewImages::new()
        .with(Viewpoint::Front, dir.path().join("a.png"))
        .with(Viewpoint::Right, dir.path().join("b.png"));

    let client = client_for(&server);
    let err = client
        .submit_multi(&images, ProcessingOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, VisionError::NoValidInputs));

    let err = client
        .submit_multi(&MultiViewImages::new(), ProcessingOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, VisionError::NoValidInputs));
}

#[tokio::test]
async fn test_submit_multi_rejected_by_server() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/models/multi"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid API key"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let images =
        MultiViewImages::new().with(Viewpoint::Back, write_image(dir.path(), "back.png"));

    let client = client_for(&server);
    let err = client
        .submit_multi(&images, ProcessingOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, VisionError::RemoteRejected { status: 401, .. }));
    assert!(!err.is_retryable());
}
