//! Session lifecycle coordination
//!
//! One coordinator task owns the session registry and room index and
//! processes every inbound event to completion before the next, which is
//! what keeps the room-code uniqueness invariant lock-free. Transport tasks
//! talk to it over an unbounded channel.
//!
//! The event dispatch mirrors the protocol table exactly, including its
//! quirks: room-scoped relays sent while roomless (or after a destroy left
//! the stored code stale) fan out to an empty target and silently do
//! nothing, and `destroy-room` removes the room's identity without clearing
//! members' stored codes.

use log::{debug, error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use shared::{ClientEvent, ServerEvent, PRESENTER_NAME};
use tokio::sync::{mpsc, oneshot};

use crate::relay::{emit, EmitTarget};
use crate::room::RoomIndex;
use crate::session::{SessionRegistry, SessionSender};

/// Messages from transport tasks to the coordinator.
#[derive(Debug)]
pub enum CoordinatorMessage {
    /// A connection opened; the reply carries the allocated session ID.
    Connected {
        sender: SessionSender,
        reply: oneshot::Sender<u32>,
    },
    /// A parsed inbound event from one session.
    Event {
        session_id: u32,
        event: ClientEvent,
    },
    /// The transport detected a closed connection.
    Disconnected { session_id: u32 },
    Shutdown,
}

/// Owns all coordination state and runs the single event-handling loop.
pub struct Coordinator {
    sessions: SessionRegistry,
    rooms: RoomIndex,
    rng: StdRng,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator {
    pub fn new() -> Self {
        Self {
            sessions: SessionRegistry::new(),
            rooms: RoomIndex::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Processes coordinator messages until shutdown or until every sender
    /// handle is dropped.
    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<CoordinatorMessage>) {
        while let Some(message) = rx.recv().await {
            match message {
                CoordinatorMessage::Connected { sender, reply } => {
                    let session_id = self.sessions.add(sender);
                    let _ = reply.send(session_id);
                }
                CoordinatorMessage::Event { session_id, event } => {
                    self.handle_event(session_id, event);
                }
                CoordinatorMessage::Disconnected { session_id } => {
                    self.handle_disconnect(session_id);
                }
                CoordinatorMessage::Shutdown => {
                    info!("Coordinator shutting down");
                    break;
                }
            }
        }
    }

    fn handle_event(&mut self, session_id: u32, event: ClientEvent) {
        debug!("Session {} event: {:?}", session_id, event);

        match event {
            ClientEvent::CreateRoom => self.create_room(session_id),
            ClientEvent::JoinRoom(code) => self.join_room(session_id, code),
            ClientEvent::ReJoinRoom {
                code,
                player_name,
                player_type,
            } => self.re_join_room(session_id, code, player_name, player_type),
            ClientEvent::UpdateGameState { state, player_name } => {
                self.update_game_state(session_id, state, player_name)
            }
            ClientEvent::LeaveRoom(announce) => self.leave_room(session_id, announce),
            ClientEvent::DestroyRoom => self.destroy_room(session_id),
            ClientEvent::StartGame(state) => {
                self.relay_to_room(session_id, ServerEvent::StartGame(state))
            }
            ClientEvent::FaceOffBtn(player_type) => {
                self.relay_to_room(session_id, ServerEvent::FaceOffBtn(player_type))
            }
            ClientEvent::ShowStrikes(strikes) => {
                self.relay_to_room(session_id, ServerEvent::ShowStrikes(strikes))
            }
        }
    }

    fn create_room(&mut self, session_id: u32) {
        let code = match self.rooms.generate_code(&mut self.rng) {
            Ok(code) => code,
            Err(err) => {
                // Fatal to this operation only: the request is rejected and
                // the process keeps serving.
                error!("create-room from session {} rejected: {}", session_id, err);
                return;
            }
        };

        self.rooms.join(session_id, &code);
        if let Some(session) = self.sessions.get_mut(session_id) {
            session.player_name = Some(PRESENTER_NAME.to_string());
            session.room_code = Some(code.clone());
        }

        info!("Session {} created room {}", session_id, code);
        emit(
            &self.sessions,
            &self.rooms,
            session_id,
            EmitTarget::Room(code.clone()),
            &ServerEvent::CreatedRoom(code),
        );
    }

    fn join_room(&mut self, session_id: u32, code: String) {
        if self.rooms.exists(&code) {
            self.rooms.join(session_id, &code);
            if let Some(session) = self.sessions.get_mut(session_id) {
                session.room_code = Some(code.clone());
            }

            info!("Session {} joined room {}", session_id, code);
            emit(
                &self.sessions,
                &self.rooms,
                session_id,
                EmitTarget::Room(code),
                &ServerEvent::JoinedRoom(true),
            );
        } else {
            emit(
                &self.sessions,
                &self.rooms,
                session_id,
                EmitTarget::Sender,
                &ServerEvent::JoinedRoom(false),
            );
        }
    }

    fn re_join_room(
        &mut self,
        session_id: u32,
        code: String,
        player_name: String,
        player_type: Value,
    ) {
        if self.rooms.exists(&code) {
            self.rooms.join(session_id, &code);
            if let Some(session) = self.sessions.get_mut(session_id) {
                session.room_code = Some(code.clone());
                session.player_name = Some(player_name.clone());
            }

            info!(
                "Session {} reconnected to room {} as {}",
                session_id, code, player_name
            );
            emit(
                &self.sessions,
                &self.rooms,
                session_id,
                EmitTarget::Room(code),
                &ServerEvent::ReconnectedToRoom {
                    player_name,
                    player_type,
                },
            );
        } else {
            emit(
                &self.sessions,
                &self.rooms,
                session_id,
                EmitTarget::Sender,
                &ServerEvent::ReconnectFailed,
            );
        }
    }

    fn update_game_state(&mut self, session_id: u32, state: Value, player_name: Option<String>) {
        if let Some(name) = player_name {
            if let Some(session) = self.sessions.get_mut(session_id) {
                session.player_name = Some(name);
            }
        }

        self.relay_to_room(session_id, ServerEvent::UpdateGameState(state));
    }

    fn leave_room(&mut self, session_id: u32, announce: bool) {
        let (name, former_room) = match self.sessions.get(session_id) {
            Some(session) => (session.player_name.clone(), session.room_code.clone()),
            None => return,
        };

        self.rooms.leave(session_id);
        if let Some(session) = self.sessions.get_mut(session_id) {
            session.room_code = None;
        }

        if announce {
            if let Some(code) = former_room {
                emit(
                    &self.sessions,
                    &self.rooms,
                    session_id,
                    EmitTarget::Room(code),
                    &ServerEvent::PlayerLeftRoom(name),
                );
            }
        }
    }

    fn destroy_room(&mut self, session_id: u32) {
        let Some(code) = self
            .sessions
            .get(session_id)
            .and_then(|session| session.room_code.clone())
        else {
            return;
        };

        // Notify members first, then drop the room's identity. Their stored
        // room codes go stale on purpose.
        emit(
            &self.sessions,
            &self.rooms,
            session_id,
            EmitTarget::Room(code.clone()),
            &ServerEvent::RoomDestroyed,
        );
        self.rooms.destroy(&code);
        info!("Session {} destroyed room {}", session_id, code);
    }

    /// Relays an event to the sender's current room. The stored room code is
    /// trusted as-is: no membership check happens here, and a stale or
    /// missing code means the event fans out to nobody.
    fn relay_to_room(&mut self, session_id: u32, event: ServerEvent) {
        let Some(code) = self
            .sessions
            .get(session_id)
            .and_then(|session| session.room_code.clone())
        else {
            debug!("Session {} relayed an event with no active room", session_id);
            return;
        };

        emit(
            &self.sessions,
            &self.rooms,
            session_id,
            EmitTarget::Room(code),
            &event,
        );
    }

    fn handle_disconnect(&mut self, session_id: u32) {
        let (name, former_room) = match self.sessions.get(session_id) {
            Some(session) => (session.player_name.clone(), session.room_code.clone()),
            None => return,
        };

        info!(
            "Session {} disconnected ({})",
            session_id,
            name.as_deref().unwrap_or("unnamed")
        );

        // Leave the index before emitting so the departing connection is not
        // a recipient, then tear the session down.
        self.rooms.leave(session_id);
        if let Some(code) = former_room {
            emit(
                &self.sessions,
                &self.rooms,
                session_id,
                EmitTarget::Room(code),
                &ServerEvent::PlayerDisconnected(name),
            );
        }
        self.sessions.remove(session_id);
    }
}
