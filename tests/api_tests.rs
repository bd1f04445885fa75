mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use dropcast::api::router::create_router;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn estimate_body() -> Value {
    json!({
        "wallet": "0xD86Be55512f44e643f410b743872879B174812Fd",
        "cohort": "pre2022",
        "assumptions": {
            "total_supply": 1_000_000_000u64,
            "og_pool_fraction": 0.10,
            "qualifying_wallet_count": 100_000,
            "wallet_percentile_share": 0.0018,
            "launch_fdv_usd": [4_000_000_000.0]
        }
    })
}

#[tokio::test]
async fn health_reports_cohort_count() {
    let app = create_router(common::test_state());
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["cohorts"], 1);
}

#[tokio::test]
async fn cohorts_lists_registry_with_wallet_totals() {
    let app = create_router(common::test_state());
    let response = app
        .oneshot(Request::builder().uri("/api/cohorts").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let cohorts = body.as_array().expect("array");
    assert_eq!(cohorts.len(), 1);
    assert_eq!(cohorts[0]["slug"], "pre2022");
    // 100 synthetic bands x 500 wallets
    assert_eq!(cohorts[0]["wallets"], 50_000);
    assert!(cohorts[0]["label"].as_str().unwrap().contains("Super OG"));
}

#[tokio::test]
async fn config_exposes_engine_defaults() {
    let app = create_router(common::test_state());
    let response = app
        .oneshot(Request::builder().uri("/api/config").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_supply"], 1_000_000_000u64);
    assert_eq!(body["spread_down"], 0.40);
}

#[tokio::test]
async fn metrics_exposes_prometheus_payload() {
    let app = create_router(common::test_state());
    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("estimates_total"));
}

#[tokio::test]
async fn estimate_unknown_cohort_is_not_found() {
    let app = create_router(common::test_state());
    let mut body = estimate_body();
    body["cohort"] = json!("pre1999");

    let response = app.oneshot(post_json("/api/estimates", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn estimate_rejects_negative_lever_before_any_fetch() {
    let app = create_router(common::test_state());
    let mut body = estimate_body();
    body["assumptions"]["og_pool_fraction"] = json!(-0.05);

    let response = app.oneshot(post_json("/api/estimates", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("og_pool_fraction"));
}

#[tokio::test]
async fn estimate_surfaces_unconfigured_upstream_as_bad_gateway() {
    // The test state has no upstream API key, so a valid request fails at
    // the fetch step with a typed, non-retryable error.
    let app = create_router(common::test_state());

    let response = app
        .oneshot(post_json("/api/estimates", estimate_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["retryable"], false);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = create_router(common::test_state());
    let response = app
        .oneshot(Request::builder().uri("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
