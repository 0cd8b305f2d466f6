//! # Trivia Room Coordination Server
//!
//! Server library for a realtime multiplayer trivia game. It issues short
//! room codes, tracks which sessions are in which room, and relays typed
//! game events to all participants of a room, alongside a small HTTP API
//! serving randomly drawn trivia questions.
//!
//! ## Architecture
//!
//! All room and session state is owned by a single coordinator task
//! (`lifecycle::Coordinator`). Transport tasks never touch that state
//! directly: they forward parsed events over an unbounded channel and the
//! coordinator processes each to completion before the next. That sequencing
//! is what guarantees room codes stay unique among live rooms without any
//! locking, and that events from one sender are relayed in send order.
//!
//! ## Module Organization
//!
//! - `session`: registry of live connections and their mutable attributes
//!   (display name, current room code) plus each connection's outbound queue.
//! - `room`: the membership index (room code -> member set) and the
//!   collision-checked 4-letter room-code generator.
//! - `relay`: fire-and-forget fan-out of server events to a room, a single
//!   session, or back to the sender.
//! - `lifecycle`: the coordinator actor dispatching the protocol's inbound
//!   events (create/join/re-join/leave/destroy/relay/disconnect).
//! - `questions`: the in-memory question store and the one-shot startup
//!   seeder that fills it from a remote JSON source.
//! - `http`: the axum router gluing it together — static assets,
//!   `GET /api/v1/question`, and the `/ws` upgrade endpoint.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use server::http::{router, AppState};
//! use server::lifecycle::Coordinator;
//! use server::questions::QuestionStore;
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (coordinator_tx, coordinator_rx) = mpsc::unbounded_channel();
//!     tokio::spawn(Coordinator::new().run(coordinator_rx));
//!
//!     let state = AppState {
//!         coordinator_tx,
//!         questions: Arc::new(QuestionStore::new()),
//!     };
//!     let app = router(state, "public".into());
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod http;
pub mod lifecycle;
pub mod questions;
pub mod relay;
pub mod room;
pub mod session;
