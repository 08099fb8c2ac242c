//! REST endpoints that let a presentation layer drive the wizard.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use super::manager::{OnboardingManager, OnboardingSnapshot};
use super::model::{Gender, ToggleOutcome};
use super::recommendations::Direction;
use crate::error::OnboardingError;

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct OnboardingRouteState {
    pub manager: Arc<OnboardingManager>,
}

#[derive(Debug, Deserialize)]
struct NavigateRequest {
    path: String,
}

#[derive(Debug, Deserialize)]
struct GenderRequest {
    gender: Gender,
}

/// Frames sent on the event socket besides the events themselves.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SyncMessage {
    /// Full state, sent on connect and after the client lags behind.
    Sync { state: OnboardingSnapshot },
}

/// Build the onboarding REST routes.
pub fn onboarding_routes(state: OnboardingRouteState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/onboarding/ws", get(ws_handler))
        .route("/api/onboarding/state", get(get_state))
        .route("/api/onboarding/navigate", post(navigate))
        .route("/api/onboarding/next", post(next_step))
        .route("/api/onboarding/previous", post(previous_step))
        .route("/api/onboarding/reset", post(reset))
        .route("/api/onboarding/step/{index}", post(go_to_step))
        .route("/api/onboarding/gender", post(select_gender))
        .route("/api/onboarding/tags/{id}/toggle", post(toggle_tag))
        .route("/api/onboarding/outfits/{id}/toggle", post(toggle_outfit))
        .route("/api/onboarding/outfit-page/{page}", post(set_outfit_page))
        .route("/api/onboarding/outfits/visible", get(visible_outfits))
        .route("/api/onboarding/options", get(get_options))
        .route("/api/onboarding/options/reload", post(reload_options))
        .route("/api/onboarding/data", get(get_data))
        .route("/api/onboarding/complete", post(complete))
        .route("/api/onboarding/recommendations", get(get_recommendations))
        .route(
            "/api/onboarding/recommendations/{direction}",
            post(change_recommendation),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "style-onboard"
    }))
}

/// GET /api/onboarding/state
async fn get_state(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    Json(state.manager.snapshot().await)
}

/// POST /api/onboarding/navigate
///
/// Direct navigation; guards may redirect to an earlier step.
async fn navigate(
    State(state): State<OnboardingRouteState>,
    Json(req): Json<NavigateRequest>,
) -> impl IntoResponse {
    state.manager.navigate(&req.path).await;
    Json(state.manager.snapshot().await)
}

/// POST /api/onboarding/next
///
/// 409 while the current step is incomplete, and always on the outfit step,
/// which is left through `/complete`.
async fn next_step(State(state): State<OnboardingRouteState>) -> Response {
    match state.manager.go_to_next_step().await {
        Ok(_) => Json(state.manager.snapshot().await).into_response(),
        Err(e) => error_response(StatusCode::CONFLICT, &e),
    }
}

async fn previous_step(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    state.manager.go_to_previous_step().await;
    Json(state.manager.snapshot().await)
}

async fn reset(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    state.manager.reset().await;
    Json(state.manager.snapshot().await)
}

/// POST /api/onboarding/step/{index}
async fn go_to_step(
    State(state): State<OnboardingRouteState>,
    Path(index): Path<u8>,
) -> Response {
    match state.manager.go_to_step(index).await {
        Ok(_) => Json(state.manager.snapshot().await).into_response(),
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e),
    }
}

/// POST /api/onboarding/gender
///
/// Responds immediately; the move to the tag step follows after the
/// configured delay. 409 outside the gender step.
async fn select_gender(
    State(state): State<OnboardingRouteState>,
    Json(req): Json<GenderRequest>,
) -> Response {
    // Dropping the handle leaves the delayed advance running.
    match state.manager.select_gender(req.gender).await {
        Ok(_advance) => {
            (StatusCode::ACCEPTED, Json(state.manager.snapshot().await)).into_response()
        }
        Err(e) => error_response(StatusCode::CONFLICT, &e),
    }
}

/// POST /api/onboarding/tags/{id}/toggle
async fn toggle_tag(
    State(state): State<OnboardingRouteState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    toggle_response(state.manager.toggle_tag(id).await)
}

/// POST /api/onboarding/outfits/{id}/toggle
async fn toggle_outfit(
    State(state): State<OnboardingRouteState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    toggle_response(state.manager.toggle_outfit(id).await)
}

/// POST /api/onboarding/outfit-page/{page}
async fn set_outfit_page(
    State(state): State<OnboardingRouteState>,
    Path(page): Path<u8>,
) -> Response {
    match state.manager.set_outfit_page(page).await {
        Ok(()) => Json(state.manager.snapshot().await).into_response(),
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e),
    }
}

async fn visible_outfits(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    Json(state.manager.visible_outfits().await)
}

/// GET /api/onboarding/options
///
/// Options loaded for the current gender (empty until loaded).
async fn get_options(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    Json(state.manager.options().await)
}

async fn reload_options(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    Json(state.manager.load_preferences_options().await)
}

/// GET /api/onboarding/data
async fn get_data(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    Json(state.manager.onboarding_data().await)
}

/// POST /api/onboarding/complete
///
/// Returns once the result step is entered; the recommendation load and the
/// preference submission continue in the background.
async fn complete(State(state): State<OnboardingRouteState>) -> Response {
    match state.manager.complete_onboarding().await {
        Ok(_detached) => {
            (StatusCode::ACCEPTED, Json(state.manager.snapshot().await)).into_response()
        }
        Err(e) => error_response(StatusCode::CONFLICT, &e),
    }
}

async fn get_recommendations(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    Json(state.manager.feed().await)
}

/// POST /api/onboarding/recommendations/{direction}
async fn change_recommendation(
    State(state): State<OnboardingRouteState>,
    Path(direction): Path<String>,
) -> Response {
    let direction: Direction = match direction.parse() {
        Ok(d) => d,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": e })),
            )
                .into_response();
        }
    };
    match state.manager.change_recommendation(direction).await {
        Some(outfit) => Json(outfit).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "No recommendations loaded"})),
        )
            .into_response(),
    }
}

// ── Event socket ────────────────────────────────────────────────────

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<OnboardingRouteState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state.manager))
}

/// Push a state sync on connect, then every [`OnboardingEvent`](super::OnboardingEvent).
///
/// The socket is read-only; client text frames are ignored.
async fn handle_socket(mut socket: WebSocket, manager: Arc<OnboardingManager>) {
    info!(session_id = %manager.session_id(), "Event socket connected");

    // Subscribe before the sync so nothing between the two is missed.
    let mut rx = manager.subscribe();
    if send_sync(&mut socket, &manager).await.is_err() {
        warn!("Failed to send initial sync, client disconnected");
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(event) => {
                        if let Ok(json) = serde_json::to_string(&event) {
                            if socket.send(Message::Text(json.into())).await.is_err() {
                                debug!("Client disconnected during send");
                                break;
                            }
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "Event socket lagged behind broadcast");
                        if send_sync(&mut socket, &manager).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!(error = %e, "Event socket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    info!("Event socket closed");
}

async fn send_sync(socket: &mut WebSocket, manager: &OnboardingManager) -> Result<(), axum::Error> {
    let sync = SyncMessage::Sync {
        state: manager.snapshot().await,
    };
    match serde_json::to_string(&sync) {
        Ok(json) => socket.send(Message::Text(json.into())).await,
        Err(e) => {
            warn!("Failed to serialize state sync: {}", e);
            Ok(())
        }
    }
}

fn toggle_response(outcome: ToggleOutcome) -> Response {
    let status = if outcome.is_rejected() {
        StatusCode::CONFLICT
    } else {
        StatusCode::OK
    };
    debug!(?outcome, "Toggle handled");
    (status, Json(outcome)).into_response()
}

fn error_response(status: StatusCode, error: &OnboardingError) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": error.to_string() })),
    )
        .into_response()
}
