//! HTTP routes over the match registry.

use crate::{ApiError, MatchHandle, MatchRegistry};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use gridlock_engine::events::{GameEvent, Stamped};
use gridlock_engine::{Coord, Engine, GameConfig, MatchId, Snapshot};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Builds the application router.
pub fn router(registry: MatchRegistry) -> Router {
    Router::new()
        .route("/matches", get(list_matches).post(create_match))
        .route("/matches/{id}", get(get_match).delete(delete_match))
        .route("/matches/{id}/start", post(start_game))
        .route("/matches/{id}/roll", post(roll_dice))
        .route("/matches/{id}/edges/add", post(add_edge))
        .route("/matches/{id}/edges/remove", post(remove_edge))
        .route("/matches/{id}/lock", post(lock_walls))
        .route("/matches/{id}/move", post(move_player))
        .route("/matches/{id}/switch", post(switch_turn))
        .route("/matches/{id}/reset", post(reset))
        .route("/matches/{id}/events", get(events_since))
        .with_state(registry)
}

/// Body of `GET /matches`.
#[derive(Debug, Serialize)]
pub struct MatchList {
    /// Live match ids.
    pub matches: Vec<MatchId>,
}

/// Body of `POST /matches/{id}/roll`.
#[derive(Debug, Serialize)]
pub struct RollResponse {
    /// Resolved dice value.
    pub value: u8,
    /// Match state after the roll.
    pub snapshot: Snapshot,
}

/// Query of `GET /matches/{id}/events`.
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Return only events newer than this timestamp.
    #[serde(default)]
    pub since: i64,
}

/// Body of `GET /matches/{id}/events`.
#[derive(Debug, Serialize)]
pub struct EventsResponse {
    /// Events with `ts > since`, oldest first.
    pub events: Vec<Stamped<GameEvent>>,
    /// Cursor for the next poll.
    pub cursor: i64,
}

/// Parses a JSON body, reporting failures as [`ApiError::InvalidBody`].
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidBody(e.to_string()))
}

fn lookup(registry: &MatchRegistry, id: MatchId) -> Result<MatchHandle, ApiError> {
    registry.get(&id).ok_or(ApiError::MatchNotFound(id))
}

fn apply<T>(
    registry: &MatchRegistry,
    id: MatchId,
    operation: impl FnOnce(&mut Engine) -> gridlock_engine::Result<T>,
) -> Result<Json<Snapshot>, ApiError> {
    let (_, snapshot) = lookup(registry, id)?.apply(operation)?;
    Ok(Json(snapshot))
}

#[instrument(skip(registry))]
async fn list_matches(State(registry): State<MatchRegistry>) -> Json<MatchList> {
    Json(MatchList {
        matches: registry.list(),
    })
}

#[instrument(skip(registry, body), fields(body_len = body.len()))]
async fn create_match(
    State(registry): State<MatchRegistry>,
    body: Bytes,
) -> Result<(StatusCode, Json<Snapshot>), ApiError> {
    let config = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        Some(parse_body::<GameConfig>(&body)?)
    };
    let handle = registry.create(config)?;
    info!(match_id = %handle.id(), "Match created over HTTP");
    Ok((StatusCode::CREATED, Json(handle.snapshot())))
}

#[instrument(skip(registry))]
async fn get_match(
    State(registry): State<MatchRegistry>,
    Path(id): Path<MatchId>,
) -> Result<Json<Snapshot>, ApiError> {
    Ok(Json(lookup(&registry, id)?.snapshot()))
}

#[instrument(skip(registry))]
async fn delete_match(
    State(registry): State<MatchRegistry>,
    Path(id): Path<MatchId>,
) -> Result<StatusCode, ApiError> {
    if registry.remove(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::MatchNotFound(id))
    }
}

#[instrument(skip(registry))]
async fn start_game(
    State(registry): State<MatchRegistry>,
    Path(id): Path<MatchId>,
) -> Result<Json<Snapshot>, ApiError> {
    apply(&registry, id, Engine::start_game)
}

#[instrument(skip(registry))]
async fn roll_dice(
    State(registry): State<MatchRegistry>,
    Path(id): Path<MatchId>,
) -> Result<Json<RollResponse>, ApiError> {
    let handle = lookup(&registry, id)?;
    let value = handle.roll_dice().await?;
    Ok(Json(RollResponse {
        value,
        snapshot: handle.snapshot(),
    }))
}

#[instrument(skip(registry, body))]
async fn add_edge(
    State(registry): State<MatchRegistry>,
    Path(id): Path<MatchId>,
    body: Bytes,
) -> Result<Json<Snapshot>, ApiError> {
    let coord: Coord = parse_body(&body)?;
    apply(&registry, id, |engine| engine.add_edge(coord))
}

#[instrument(skip(registry, body))]
async fn remove_edge(
    State(registry): State<MatchRegistry>,
    Path(id): Path<MatchId>,
    body: Bytes,
) -> Result<Json<Snapshot>, ApiError> {
    let coord: Coord = parse_body(&body)?;
    apply(&registry, id, |engine| engine.remove_edge(coord))
}

#[instrument(skip(registry))]
async fn lock_walls(
    State(registry): State<MatchRegistry>,
    Path(id): Path<MatchId>,
) -> Result<Json<Snapshot>, ApiError> {
    apply(&registry, id, Engine::lock_walls)
}

#[instrument(skip(registry, body))]
async fn move_player(
    State(registry): State<MatchRegistry>,
    Path(id): Path<MatchId>,
    body: Bytes,
) -> Result<Json<Snapshot>, ApiError> {
    let to: Coord = parse_body(&body)?;
    apply(&registry, id, |engine| engine.set_player_location(to))
}

#[instrument(skip(registry))]
async fn switch_turn(
    State(registry): State<MatchRegistry>,
    Path(id): Path<MatchId>,
) -> Result<Json<Snapshot>, ApiError> {
    apply(&registry, id, Engine::switch_turn)
}

#[instrument(skip(registry))]
async fn reset(
    State(registry): State<MatchRegistry>,
    Path(id): Path<MatchId>,
) -> Result<Json<Snapshot>, ApiError> {
    apply(&registry, id, Engine::reset)
}

#[instrument(skip(registry))]
async fn events_since(
    State(registry): State<MatchRegistry>,
    Path(id): Path<MatchId>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventsResponse>, ApiError> {
    let handle = lookup(&registry, id)?;
    let events = handle.events().replay_since(query.since);
    let cursor = events.last().map_or(query.since, |stamped| stamped.ts);
    Ok(Json(EventsResponse { events, cursor }))
}
