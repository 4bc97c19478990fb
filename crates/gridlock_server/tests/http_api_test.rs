//! HTTP API tests driven in-process through the router.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use gridlock_engine::{Coord, GameConfig};
use gridlock_server::{router, MatchRegistry};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    let config = GameConfig::default().dice(vec![2], vec![3]).delay_ms(0);
    router(MatchRegistry::new(config))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create(app: &Router) -> String {
    let (status, body) = send(app, Method::POST, "/matches", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_create_list_and_delete() {
    let app = app();
    let id = create(&app).await;

    let (status, body) = send(&app, Method::GET, "/matches", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matches"], json!([id]));

    let (status, body) = send(&app, Method::GET, &format!("/matches/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["turn"], "red");
    assert_eq!(body["phase"], "placing_walls");

    let (status, _) = send(&app, Method::DELETE, &format!("/matches/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &format!("/matches/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "match_not_found");
}

#[tokio::test]
async fn test_create_with_custom_config() {
    let app = app();
    let config = GameConfig::with_board(
        3,
        3,
        gridlock_engine::PerColor::new(Coord::cell(0, 1), Coord::cell(1, 0)),
        gridlock_engine::PerColor::new(Coord::cell(2, 1), Coord::cell(1, 2)),
    );
    let (status, body) = send(
        &app,
        Method::POST,
        "/matches",
        Some(serde_json::to_value(&config).unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["width"], 3);

    let (status, body) = send(&app, Method::POST, "/matches", Some(json!({"width": 0}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_config");

    let (status, body) = send(&app, Method::POST, "/matches", Some(json!({"width": "wide"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_body");
}

#[tokio::test]
async fn test_full_turn_over_http() {
    let app = app();
    let id = create(&app).await;
    let base = format!("/matches/{id}");

    let (status, body) = send(&app, Method::POST, &format!("{base}/lock"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "dice_not_rolled");

    let (status, body) = send(&app, Method::POST, &format!("{base}/roll"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], 2);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("{base}/edges/add"),
        Some(json!({"row": 1, "col": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["wall_edit_count"], 1);
    assert_eq!(body["walls"]["red"], json!([{"row": 1, "col": 2}]));

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("{base}/edges/add"),
        Some(json!({"row": 2, "col": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "wrong_color_for_edge");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("{base}/edges/add"),
        Some(json!({"row": 1, "col": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_coordinate");

    let (status, _) = send(&app, Method::POST, &format!("{base}/lock"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("{base}/move"),
        Some(json!({"row": 3, "col": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["movement_count"], 1);

    let (status, body) = send(&app, Method::POST, &format!("{base}/switch"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["turn"], "blue");
    assert_eq!(body["dice"]["state"], "not_rolled");
}

#[tokio::test]
async fn test_event_polling_with_cursor() {
    let app = app();
    let id = create(&app).await;
    let events = format!("/matches/{id}/events");

    let (status, first) = send(&app, Method::GET, &events, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["events"].as_array().unwrap().len(), 1);
    assert_eq!(first["events"][0]["event"]["kind"], "start_game");
    let cursor = first["cursor"].as_i64().unwrap();

    send(&app, Method::POST, &format!("/matches/{id}/roll"), None).await;

    let (_, second) = send(&app, Method::GET, &format!("{events}?since={cursor}"), None).await;
    let kinds: Vec<&str> = second["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|stamped| stamped["event"]["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["dice_roll_started", "dice_roll_resolved"]);
    let next = second["cursor"].as_i64().unwrap();
    assert!(next > cursor);

    let (_, third) = send(&app, Method::GET, &format!("{events}?since={next}"), None).await;
    assert!(third["events"].as_array().unwrap().is_empty());
    assert_eq!(third["cursor"].as_i64().unwrap(), next);
}

#[tokio::test]
async fn test_malformed_coordinate_bodies_are_json_400s() {
    let app = app();
    let id = create(&app).await;
    send(&app, Method::POST, &format!("/matches/{id}/roll"), None).await;

    for route in ["edges/add", "edges/remove", "move"] {
        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/matches/{id}/{route}"),
            Some(json!({"row": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{route}");
        assert_eq!(body["error"], "invalid_body", "{route}");
        assert!(body["message"].as_str().unwrap().contains("Invalid request body"));
    }

    let (_, snapshot) = send(&app, Method::GET, &format!("/matches/{id}"), None).await;
    assert_eq!(snapshot["wall_edit_count"], 0);
}

#[tokio::test]
async fn test_unknown_match_is_404_for_every_route() {
    let app = app();
    for (method, path) in [
        (Method::POST, "/matches/nope/start"),
        (Method::POST, "/matches/nope/roll"),
        (Method::POST, "/matches/nope/lock"),
        (Method::POST, "/matches/nope/switch"),
        (Method::POST, "/matches/nope/reset"),
        (Method::GET, "/matches/nope/events"),
        (Method::DELETE, "/matches/nope"),
    ] {
        let (status, body) = send(&app, method, path, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(body["error"], "match_not_found");
    }
}
