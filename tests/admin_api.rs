//! Admin API, exercised in-process.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use dashboard_gateway::config::GatewayConfig;
use dashboard_gateway::redirect::RedirectRule;
use dashboard_gateway::GatewayServer;
use tower::ServiceExt;

fn server() -> GatewayServer {
    let mut config = GatewayConfig::default();
    config.admin.enabled = true;
    config.admin.api_key = "test-key".into();
    config.redirects.rules = vec![
        RedirectRule::new("alice", "/superset/dashboard/3/"),
        RedirectRule::new("sales", "/superset/dashboard/7/"),
    ];
    GatewayServer::new(config).unwrap()
}

#[tokio::test]
async fn test_admin_requires_bearer_key() {
    let app = server().admin_router();

    let res = app
        .clone()
        .oneshot(Request::get("/admin/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .oneshot(
            Request::get("/admin/status")
                .header("authorization", "Bearer wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_lists_table_in_order() {
    let app = server().admin_router();

    let res = app
        .oneshot(
            Request::get("/admin/redirects")
                .header("authorization", "Bearer test-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = axum::body::to_bytes(res.into_body(), 64 * 1024).await.unwrap();
    let rules: Vec<RedirectRule> = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        rules,
        vec![
            RedirectRule::new("alice", "/superset/dashboard/3/"),
            RedirectRule::new("sales", "/superset/dashboard/7/"),
        ]
    );
}

#[tokio::test]
async fn test_admin_status() {
    let app = server().admin_router();

    let res = app
        .oneshot(
            Request::get("/admin/status")
                .header("authorization", "Bearer test-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = axum::body::to_bytes(res.into_body(), 64 * 1024).await.unwrap();
    let status: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status["status"], "operational");
    assert_eq!(status["redirect_rules"], 2);
    assert_eq!(status["identity_provider"], "headers");
}
