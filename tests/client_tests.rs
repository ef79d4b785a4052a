use std::time::Duration;

use meshy_nodes::*;
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> MeshyClient {
    let config = MeshyConfig::builder()
        .with_base_url(format!("{}/", server.uri()))
        .with_api_key("test-key")
        .with_auth_token("test-token")
        .with_request_timeout(Duration::from_secs(5))
        .build();
    MeshyClient::new(config)
}

#[tokio::test]
async fn test_submit_posts_body_with_credentials() {
    let server = MockServer::start().await;
    let body = json!({"rig_task_id": "rig-1", "action_id": 3});
    Mock::given(method("POST"))
        .and(path("/proxy/meshy/openapi/v1/animations"))
        .and(header("X-API-KEY", "test-key"))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "anim-9"})))
        .expect(1)
        .mount(&server)
        .await;

    let handle = client_for(&server)
        .submit(TaskKind::Animation, body)
        .await
        .unwrap();
    assert_eq!(handle.as_str(), "anim-9");
}

#[tokio::test]
async fn test_submit_without_task_id_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/proxy/meshy/openapi/v2/text-to-3d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": ""})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .submit(TaskKind::TextTo3d, json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, MeshyError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_http_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/proxy/meshy/openapi/v1/rigging"))
        .respond_with(ResponseTemplate::new(402).set_body_string("insufficient credits"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .submit(TaskKind::Rigging, json!({"input_task_id": "m"}))
        .await
        .unwrap_err();
    match err {
        MeshyError::Http { status, body } => {
            assert_eq!(status, 402);
            assert_eq!(body, "insufficient credits");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_poll_reads_status_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/proxy/meshy/openapi/v1/retexture/tex-1"))
        .and(header("X-API-KEY", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "tex-1", "status": "IN_PROGRESS", "progress": 12
        })))
        .mount(&server)
        .await;

    let status = client_for(&server)
        .poll(TaskKind::Retexture, &TaskHandle::new("tex-1"))
        .await
        .unwrap();
    assert_eq!(status["progress"], 12);
}

#[tokio::test]
async fn test_upload_requests_slot_then_puts_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/customers/storage"))
        .and(body_json(json!({"file_name": "chair.png", "content_type": "image/png"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "upload_url": format!("{}/signed/chair.png", server.uri()),
            "download_url": "https://cdn.test/chair.png"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/signed/chair.png"))
        .and(header("content-type", "image/png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let url = client_for(&server)
        .upload_image(&ImageInput::png(vec![137, 80, 78, 71]).with_file_name("chair.png"))
        .await
        .unwrap();
    assert_eq!(url, "https://cdn.test/chair.png");

    let requests = server.received_requests().await.unwrap();
    let put = requests
        .iter()
        .find(|r| r.method.as_str() == "PUT")
        .unwrap();
    assert_eq!(put.body, vec![137, 80, 78, 71]);
    assert!(put.headers.get("X-API-KEY").is_none());
}

#[tokio::test]
async fn test_fetch_writes_and_overwrites_file() {
    let server = MockServer::start().await;
    let bytes = b"glTF\x02\x00\x00\x00model".to_vec();
    Mock::given(method("GET"))
        .and(path("/assets/model.glb"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.clone()))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("nested").join("meshy_model_t1.glb");
    let client = client_for(&server);
    let url = format!("{}/assets/model.glb", server.uri());

    client.fetch(&url, &dest).await.unwrap();
    let first = std::fs::read(&dest).unwrap();
    client.fetch(&url, &dest).await.unwrap();
    let second = std::fs::read(&dest).unwrap();

    assert_eq!(first, bytes);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_fetch_empty_url_is_invalid_response() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let err = client_for(&server)
        .fetch("", &dir.path().join("x.glb"))
        .await
        .unwrap_err();
    assert!(matches!(err, MeshyError::InvalidResponse(_)));
    assert!(!dir.path().join("x.glb").exists());
}

#[tokio::test]
async fn test_text_to_model_against_mock_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/proxy/meshy/openapi/v2/text-to-3d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "t-1"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/proxy/meshy/openapi/v2/text-to-3d/t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "t-1",
            "type": "text-to-3d-preview",
            "status": "SUCCEEDED",
            "progress": 100,
            "model_urls": {"glb": format!("{}/assets/t-1.glb", server.uri())},
            "thumbnail_url": "",
            "texture_urls": null
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/assets/t-1.glb"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mesh".to_vec()))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let config = MeshyConfig::builder()
        .with_base_url(server.uri())
        .with_poll_interval(Duration::from_millis(1))
        .with_output_dir(dir.path().to_path_buf())
        .build();
    let ctx = ExecutionContext::from_config(config);

    let output = TextToModelNode::execute(&ctx, TextToModelInputs::new("a red chair"))
        .await
        .unwrap();
    assert_eq!(output.path, dir.path().join("meshy_model_t-1.glb"));
    assert_eq!(std::fs::read(&output.path).unwrap(), b"mesh");
}

#[tokio::test]
async fn test_download_not_bound_by_request_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/assets/slow.glb"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"large mesh".to_vec())
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("slow.glb");
    let url = format!("{}/assets/slow.glb", server.uri());

    let config = MeshyConfig::builder()
        .with_base_url(server.uri())
        .with_request_timeout(Duration::from_millis(50))
        .build();
    MeshyClient::new(config).fetch(&url, &dest).await.unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), b"large mesh");

    let config = MeshyConfig::builder()
        .with_base_url(server.uri())
        .with_download_timeout(Duration::from_millis(50))
        .build();
    let err = MeshyClient::new(config)
        .fetch(&url, &dir.path().join("cut.glb"))
        .await
        .unwrap_err();
    assert!(matches!(err, MeshyError::Network { .. }));
}
