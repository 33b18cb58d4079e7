use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tower::ServiceExt;

use scoreboard_back::{
    config::AppConfig,
    routes,
    services::sse_events::{EVENT_PROJECTION_CLOSE, EVENT_PROJECTION_RELOAD, EVENT_STATE_SYNC},
    state::{AppState, SharedState, clock::ManualClock},
};

fn test_app() -> (Router, SharedState, JoinHandle<()>) {
    let (state, engine) = AppState::start(AppConfig::default(), Arc::new(ManualClock::new(0)));
    (routes::router(state.clone()), state, engine)
}

async fn json_body(res: Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_command(app: &Router, body: impl Into<String>) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/commands")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.into()))
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn state_starts_idle() {
    let (app, _state, _engine) = test_app();

    let res = get(&app, "/api/state").await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = json_body(res).await;
    assert_eq!(body["phase"], json!("idle"));
    assert_eq!(body["projectionOpen"], json!(false));
    assert_eq!(body["leftTeam"]["score"], json!(0));
    assert_eq!(body["claimOwner"], json!("none"));
}

#[tokio::test]
async fn setup_then_round_start() {
    let (app, _state, _engine) = test_app();

    let res = post_command(
        &app,
        json!({
            "type": "setup:apply",
            "payload": {
                "leftTeamName": "Owls",
                "rightTeamName": "Hawks",
                "roundLengthSeconds": 600,
                "tossupLengthSeconds": 30
            }
        })
        .to_string(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["phase"], json!("pregame-ready"));
    assert_eq!(body["leftTeam"]["name"], json!("Owls"));
    assert_eq!(body["roundTimer"]["secondsRemaining"], json!(600));
    assert_eq!(body["config"]["followupLengthSeconds"], json!(120));

    let res = post_command(&app, r#"{"type": "round:toggle"}"#).await;
    let body = json_body(res).await;
    assert_eq!(body["phase"], json!("round-running:standby"));
    assert_eq!(body["roundTimer"]["running"], json!(true));
    assert_eq!(body["started"], json!(true));
}

#[tokio::test]
async fn rename_only_setup_keeps_configured_durations() {
    let config =
        AppConfig::from_json_str(r#"{"defaults": {"round_length_seconds": 300}}"#).unwrap();
    let (state, _engine) = AppState::start(config, Arc::new(ManualClock::new(0)));
    let app = routes::router(state);

    let res = post_command(
        &app,
        r#"{"type": "setup:apply", "payload": {"leftTeamName": "Owls"}}"#,
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["leftTeam"]["name"], json!("Owls"));
    assert_eq!(body["roundTimer"]["secondsRemaining"], json!(300));
    assert_eq!(body["config"]["roundLengthSeconds"], json!(300));
}

#[tokio::test]
async fn malformed_commands_are_bad_requests() {
    let (app, _state, _engine) = test_app();

    let res = post_command(&app, "{not json").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(res).await["message"].is_string());

    let res = post_command(&app, r#"{"type": "flow:teleport"}"#).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = post_command(&app, r#"{"type": "flow:tossup-correct", "side": "middle"}"#).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_setup_is_rejected() {
    let (app, _state, _engine) = test_app();

    let res = post_command(
        &app,
        json!({
            "type": "setup:apply",
            "payload": { "leftTeamName": "x".repeat(65) }
        })
        .to_string(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = post_command(
        &app,
        json!({
            "type": "setup:apply",
            "payload": { "roundLengthSeconds": 1_000_000 }
        })
        .to_string(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = json_body(get(&app, "/api/state").await).await;
    assert_eq!(body["phase"], json!("idle"));
}

#[tokio::test]
async fn ignored_commands_return_unchanged_state() {
    let (app, _state, _engine) = test_app();
    let before = json_body(get(&app, "/api/state").await).await;

    let res = post_command(&app, r#"{"type": "flow:claim-left"}"#).await;
    assert_eq!(res.status(), StatusCode::OK);
    let after = json_body(res).await;

    assert_eq!(after, before);
}

#[tokio::test]
async fn projection_commands_toggle_flag_and_notify_display() {
    let (app, state, _engine) = test_app();
    let mut projection = state.projection_sse().subscribe();
    let mut console = state.console_sse().subscribe();

    let res = post_command(&app, r#"{"type": "projection:open"}"#).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await["projectionOpen"], json!(true));

    let reload = projection.recv().await.unwrap();
    assert_eq!(reload.event.as_deref(), Some(EVENT_PROJECTION_RELOAD));
    assert_eq!(reload.data, r#"{"reason":"open"}"#);
    let sync = projection.recv().await.unwrap();
    assert_eq!(sync.event.as_deref(), Some(EVENT_STATE_SYNC));
    let sync = console.recv().await.unwrap();
    assert!(sync.data.contains("\"projectionOpen\":true"));

    let res = post_command(&app, r#"{"type": "projection:close"}"#).await;
    assert_eq!(json_body(res).await["projectionOpen"], json!(false));
    let close = projection.recv().await.unwrap();
    assert_eq!(close.event.as_deref(), Some(EVENT_PROJECTION_CLOSE));

    let body = json_body(get(&app, "/api/state").await).await;
    assert_eq!(body["projectionOpen"], json!(false));
    assert_eq!(body["phase"], json!("idle"));
}

#[tokio::test]
async fn healthcheck_reports_engine_status() {
    let (app, _state, engine) = test_app();

    let res = get(&app, "/healthcheck").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["status"], json!("ok"));
    assert!(body["startedAt"].is_string());

    engine.abort();
    let _ = engine.await;

    let body = json_body(get(&app, "/healthcheck").await).await;
    assert_eq!(body["status"], json!("degraded"));

    let res = get(&app, "/api/state").await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (app, _state, _engine) = test_app();

    let res = get(&app, "/api-doc/openapi.json").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert!(body["paths"]["/api/commands"].is_object());
    assert!(body["paths"]["/sse/projection"].is_object());
    assert_eq!(
        body["components"]["schemas"]["GameStateSnapshot"]["properties"]["phase"]["type"],
        json!("string")
    );
}
