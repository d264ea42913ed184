mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

#[tokio::test]
async fn blank_issue_is_rejected() {
    let app = spawn_app(FakePlatform::default()).await;
    for body in [json!({}), json!({ "issue": "   " })] {
        let resp = send(&app.router, json_request("POST", "/api/ai", body)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"]["message"], "Issue is required");
    }
}

#[tokio::test]
async fn issue_is_forwarded_to_assistant() {
    let app = spawn_app(FakePlatform::default()).await;
    let resp = send(
        &app.router,
        json_request("POST", "/api/ai", json!({ "issue": "table logs has no RLS" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await["suggestion"],
        "Suggested fix for: table logs has no RLS"
    );
}

#[tokio::test]
async fn assistant_calls_are_rate_limited() {
    let app = spawn_app_with(FakePlatform::default(), FakeAccounts::default(), 1).await;
    let ask = || json_request("POST", "/api/ai", json!({ "issue": "mfa is off" }));

    assert_eq!(send(&app.router, ask()).await.status(), StatusCode::OK);
    let resp = send(&app.router, ask()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(resp).await["error"]["code"], "RATE_LIMIT");
}

#[tokio::test]
async fn oversized_issue_is_rejected_before_the_assistant() {
    let app = spawn_app(FakePlatform::default()).await;
    let issue = "x".repeat(BODY_LIMIT * 2);
    let resp = send(&app.router, json_request("POST", "/api/ai", json!({ "issue": issue }))).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
