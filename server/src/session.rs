//! Session registry for live WebSocket connections
//!
//! Every accepted connection gets one [`Session`] carrying its mutable
//! protocol attributes (display name, current room code) and the sender half
//! of its outbound message channel. Sessions exist from connection-open until
//! connection-close; nothing is persisted.

use axum::extract::ws::Message;
use log::info;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Sender half of a connection's outbound queue. The WebSocket task drains
/// the receiving end into the socket sink.
pub type SessionSender = mpsc::UnboundedSender<Message>;

/// Server-side representative of one active client connection.
#[derive(Debug)]
pub struct Session {
    /// Unique session identifier, stable for the connection's lifetime.
    pub id: u32,
    /// Unset until a create/join/re-join event supplies it. The session that
    /// creates a room gets the presenter name.
    pub player_name: Option<String>,
    /// Code of the room this session is currently in, at most one at a time.
    pub room_code: Option<String>,
    sender: SessionSender,
}

impl Session {
    fn new(id: u32, sender: SessionSender) -> Self {
        Self {
            id,
            player_name: None,
            room_code: None,
            sender,
        }
    }

    /// Queues a message for delivery, fire-and-forget. A send to a connection
    /// that has already gone away is silently dropped.
    pub fn send(&self, message: Message) {
        let _ = self.sender.send(message);
    }
}

/// Tracks all live sessions, indexed by their unique ID.
///
/// Mutated only from the coordinator task, so no internal locking is needed.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<u32, Session>,
    next_session_id: u32,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            next_session_id: 1,
        }
    }

    /// Allocates a session for a newly opened connection and returns its ID.
    pub fn add(&mut self, sender: SessionSender) -> u32 {
        let session_id = self.next_session_id;
        self.next_session_id += 1;

        info!("Session {} connected", session_id);
        self.sessions.insert(session_id, Session::new(session_id, sender));

        session_id
    }

    /// Removes a session on connection-close, after lifecycle cleanup has
    /// run. Returns the removed session, or None if it was already gone.
    pub fn remove(&mut self, session_id: u32) -> Option<Session> {
        let session = self.sessions.remove(&session_id);
        if session.is_some() {
            info!("Session {} removed", session_id);
        }
        session
    }

    pub fn get(&self, session_id: u32) -> Option<&Session> {
        self.sessions.get(&session_id)
    }

    pub fn get_mut(&mut self, session_id: u32) -> Option<&mut Session> {
        self.sessions.get_mut(&session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_sender() -> SessionSender {
        mpsc::unbounded_channel().0
    }

    #[test]
    fn test_new_session_has_no_name_or_room() {
        let mut registry = SessionRegistry::new();
        let id = registry.add(test_sender());

        let session = registry.get(id).unwrap();
        assert_eq!(session.id, id);
        assert_eq!(session.player_name, None);
        assert_eq!(session.room_code, None);
    }

    #[test]
    fn test_session_ids_are_unique_and_increasing() {
        let mut registry = SessionRegistry::new();

        let first = registry.add(test_sender());
        let second = registry.add(test_sender());
        let third = registry.add(test_sender());

        assert!(first < second);
        assert!(second < third);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_mutating_session_attributes() {
        let mut registry = SessionRegistry::new();
        let id = registry.add(test_sender());

        let session = registry.get_mut(id).unwrap();
        session.player_name = Some("alice".to_string());
        session.room_code = Some("ABCD".to_string());

        let session = registry.get(id).unwrap();
        assert_eq!(session.player_name.as_deref(), Some("alice"));
        assert_eq!(session.room_code.as_deref(), Some("ABCD"));
    }

    #[test]
    fn test_remove_session() {
        let mut registry = SessionRegistry::new();
        let id = registry.add(test_sender());

        assert!(registry.remove(id).is_some());
        assert!(registry.get(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_unknown_session_is_a_no_op() {
        let mut registry = SessionRegistry::new();
        assert!(registry.remove(999).is_none());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_send_queues_message_on_channel() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let mut registry = SessionRegistry::new();
        let id = registry.add(sender);

        registry
            .get(id)
            .unwrap()
            .send(Message::Text("hello".to_string()));

        match receiver.try_recv() {
            Ok(Message::Text(text)) => assert_eq!(text, "hello"),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_send_to_closed_connection_does_not_panic() {
        let mut registry = SessionRegistry::new();
        let id = registry.add(test_sender()); // receiver dropped immediately

        registry
            .get(id)
            .unwrap()
            .send(Message::Text("into the void".to_string()));
    }
}
