//! HTTP surface: static assets, the question API, and the WebSocket endpoint
//!
//! One listener serves everything. Each upgraded WebSocket registers itself
//! with the coordinator, then runs two halves: a writer task draining the
//! session's outbound queue into the socket, and a read loop parsing text
//! frames into typed events. Frames that don't parse (unknown event names
//! included) are ignored.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use log::debug;
use shared::ClientEvent;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tower_http::services::ServeDir;

use crate::lifecycle::CoordinatorMessage;
use crate::questions::QuestionStore;

#[derive(Clone)]
pub struct AppState {
    pub coordinator_tx: mpsc::UnboundedSender<CoordinatorMessage>,
    pub questions: Arc<QuestionStore>,
}

/// Builds the application router. Static files (landing page, favicon) are
/// the fallback so API and WebSocket routes take precedence.
pub fn router(state: AppState, public_dir: PathBuf) -> Router {
    Router::new()
        .route("/api/v1/question", get(get_question))
        .route("/ws", get(ws_handler))
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state)
}

/// `GET /api/v1/question`: one random record, or 204 while the store is
/// empty (seeding pending or failed).
async fn get_question(State(state): State<AppState>) -> impl IntoResponse {
    match state.questions.random_one().await {
        Some(question) => Json(question).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (sender, mut outbound) = mpsc::unbounded_channel();

    let (reply_tx, reply_rx) = oneshot::channel();
    if state
        .coordinator_tx
        .send(CoordinatorMessage::Connected {
            sender,
            reply: reply_tx,
        })
        .is_err()
    {
        return;
    }
    let Ok(session_id) = reply_rx.await else {
        return;
    };

    // Writer half: the queue closes once the coordinator drops the session.
    let writer = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            if sink.send(message).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => {
                    if state
                        .coordinator_tx
                        .send(CoordinatorMessage::Event { session_id, event })
                        .is_err()
                    {
                        break;
                    }
                }
                Err(err) => {
                    debug!("Session {}: ignoring unparseable frame: {}", session_id, err);
                }
            },
            Message::Close(_) => break,
            // Ping/pong are answered by axum; binary frames are not part of
            // the protocol.
            _ => {}
        }
    }

    let _ = state
        .coordinator_tx
        .send(CoordinatorMessage::Disconnected { session_id });
    writer.abort();
}
