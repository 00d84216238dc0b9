use anyhow::Result;
use serde_json::json;
use wiremock::matchers::{any, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::TestHarness;

/// Harness plus a wiremock spider upstream the gateway is pointed at.
async fn setup_gateway(upstream: &MockServer) -> Result<TestHarness> {
    let mut harness = TestHarness::new().await?;
    harness.set_env("SCITIGER_SPIDER_API_BASE_URL", &upstream.uri());
    harness.start_all_services().await?;
    Ok(harness)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_json_forward_rewrites_path_and_query() -> Result<()> {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/douyin/videos"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"aweme_id": "7421"}],
            "total": 1
        })))
        .mount(&upstream)
        .await;

    let mut harness = setup_gateway(&upstream).await?;

    let response = harness
        .http_client()
        .get(harness.gateway_url("/api/douyin/videos?page=3"))
        .send()
        .await?;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["total"], json!(1));

    harness.cleanup().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wechat_without_bearer_is_rejected_locally() -> Result<()> {
    let spider = MockServer::start().await;
    let wechat = MockServer::start().await;
    Mock::given(any()).respond_with(ResponseTemplate::new(200)).mount(&wechat).await;

    let mut harness = TestHarness::new().await?;
    harness.set_env("SCITIGER_SPIDER_API_BASE_URL", &spider.uri());
    harness.set_env("SCITIGER_WECHAT_API_BASE_URL", &wechat.uri());
    harness.start_all_services().await?;

    let response = harness
        .http_client()
        .get(harness.gateway_url("/api/wechat/articles"))
        .send()
        .await?;
    assert_eq!(response.status(), 401);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body, json!({"error": "未授权访问", "message": "请先登录"}));

    // The gate fires before any upstream call is attempted.
    assert!(wechat.received_requests().await.unwrap_or_default().is_empty());

    harness.cleanup().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_upstream_error_status_passes_through() -> Result<()> {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/crawl-tasks/999"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "task not found"})),
        )
        .mount(&upstream)
        .await;

    let mut harness = setup_gateway(&upstream).await?;

    let response = harness
        .http_client()
        .get(harness.gateway_url("/api/accounts/crawl-tasks/999"))
        .send()
        .await?;
    assert_eq!(response.status(), 404);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body, json!({"detail": "task not found"}));

    harness.cleanup().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_video_range_request_streams_partial_content() -> Result<()> {
    let payload = vec![0u8; 100];
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/douyin/proxy/video"))
        .and(header("Range", "bytes=0-99"))
        .respond_with(
            ResponseTemplate::new(206)
                .insert_header("content-type", "video/mp4")
                .insert_header("content-range", "bytes 0-99/4096")
                .insert_header("accept-ranges", "bytes")
                .insert_header("x-upstream-node", "spider-7")
                .set_body_bytes(payload.clone()),
        )
        .mount(&upstream)
        .await;

    let mut harness = setup_gateway(&upstream).await?;

    let response = harness
        .http_client()
        .get(harness.gateway_url("/api/douyin/proxy/video?url=https%3A%2F%2Fcdn%2Fv.mp4"))
        .header("Range", "bytes=0-99")
        .send()
        .await?;

    assert_eq!(response.status(), 206);
    assert_eq!(
        response.headers().get("content-range").map(|v| v.to_str().unwrap()),
        Some("bytes 0-99/4096")
    );
    // Internal upstream headers stay behind the allowlist.
    assert!(response.headers().get("x-upstream-node").is_none());
    assert_eq!(response.bytes().await?.to_vec(), payload);

    harness.cleanup().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_gateway_survives_service_restart() -> Result<()> {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"pong": true})))
        .mount(&upstream)
        .await;

    let mut harness = setup_gateway(&upstream).await?;
    let url = harness.gateway_url("/api/accounts/ping");

    assert_eq!(harness.http_client().get(&url).send().await?.status(), 200);

    harness.stop_service("gateway").await?;
    harness.restart_service("gateway").await?;

    assert_eq!(harness.http_client().get(&url).send().await?.status(), 200);

    harness.cleanup().await?;
    Ok(())
}
