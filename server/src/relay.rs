//! Fire-and-forget fan-out of server events
//!
//! The relay is deliberately dumb: pick the recipient set for a target,
//! serialize the event once, and queue it on each recipient's channel. No
//! acknowledgement, no retry. A recipient whose connection is already gone
//! simply misses the event. Per-sender ordering falls out of the single
//! coordinator task plus FIFO per-session channels.

use axum::extract::ws::Message;
use log::error;
use shared::ServerEvent;

use crate::room::RoomIndex;
use crate::session::SessionRegistry;

/// Target-selection strategy for one emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitTarget {
    /// All current members of a room. A code with no room behind it (never
    /// created, or destroyed) selects nobody.
    Room(String),
    /// Exactly one session.
    Session(u32),
    /// Echo back to the sender only, used for negative acknowledgements.
    Sender,
}

/// Delivers an event to every session the target selects.
pub fn emit(
    registry: &SessionRegistry,
    index: &RoomIndex,
    sender_id: u32,
    target: EmitTarget,
    event: &ServerEvent,
) {
    let text = match serde_json::to_string(event) {
        Ok(text) => text,
        Err(err) => {
            error!("Failed to serialize outbound event: {}", err);
            return;
        }
    };

    let recipients = match &target {
        EmitTarget::Room(code) => index.members_of(code),
        EmitTarget::Session(session_id) => vec![*session_id],
        EmitTarget::Sender => vec![sender_id],
    };

    for session_id in recipients {
        if let Some(session) = registry.get(session_id) {
            session.send(Message::Text(text.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn connect(registry: &mut SessionRegistry) -> (u32, UnboundedReceiver<Message>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (registry.add(sender), receiver)
    }

    fn drain(receiver: &mut UnboundedReceiver<Message>) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(Message::Text(text)) = receiver.try_recv() {
            events.push(serde_json::from_str(&text).unwrap());
        }
        events
    }

    #[test]
    fn test_room_target_reaches_all_members() {
        let mut registry = SessionRegistry::new();
        let mut index = RoomIndex::new();

        let (a, mut a_rx) = connect(&mut registry);
        let (b, mut b_rx) = connect(&mut registry);
        let (c, mut c_rx) = connect(&mut registry);
        index.join(a, "ABCD");
        index.join(b, "ABCD");
        index.join(c, "WXYZ");

        let event = ServerEvent::RoomDestroyed;
        emit(
            &registry,
            &index,
            a,
            EmitTarget::Room("ABCD".to_string()),
            &event,
        );

        assert_eq!(drain(&mut a_rx), vec![event.clone()]);
        assert_eq!(drain(&mut b_rx), vec![event]);
        assert!(drain(&mut c_rx).is_empty());
    }

    #[test]
    fn test_session_target_reaches_one_session() {
        let mut registry = SessionRegistry::new();
        let index = RoomIndex::new();

        let (a, mut a_rx) = connect(&mut registry);
        let (b, mut b_rx) = connect(&mut registry);

        let event = ServerEvent::JoinedRoom(false);
        emit(&registry, &index, a, EmitTarget::Session(b), &event);

        assert!(drain(&mut a_rx).is_empty());
        assert_eq!(drain(&mut b_rx), vec![event]);
    }

    #[test]
    fn test_sender_target_echoes_to_sender_only() {
        let mut registry = SessionRegistry::new();
        let index = RoomIndex::new();

        let (a, mut a_rx) = connect(&mut registry);
        let (_b, mut b_rx) = connect(&mut registry);

        let event = ServerEvent::ReconnectFailed;
        emit(&registry, &index, a, EmitTarget::Sender, &event);

        assert_eq!(drain(&mut a_rx), vec![event]);
        assert!(drain(&mut b_rx).is_empty());
    }

    #[test]
    fn test_nonexistent_room_target_selects_nobody() {
        let mut registry = SessionRegistry::new();
        let index = RoomIndex::new();

        let (a, mut a_rx) = connect(&mut registry);

        emit(
            &registry,
            &index,
            a,
            EmitTarget::Room("NOPE".to_string()),
            &ServerEvent::RoomDestroyed,
        );

        assert!(drain(&mut a_rx).is_empty());
    }

    #[test]
    fn test_disconnected_recipient_is_skipped() {
        let mut registry = SessionRegistry::new();
        let mut index = RoomIndex::new();

        let (a, mut a_rx) = connect(&mut registry);
        let (b, b_rx) = connect(&mut registry);
        index.join(a, "ABCD");
        index.join(b, "ABCD");
        drop(b_rx); // b's connection is gone but cleanup has not run yet

        emit(
            &registry,
            &index,
            a,
            EmitTarget::Room("ABCD".to_string()),
            &ServerEvent::JoinedRoom(true),
        );

        assert_eq!(drain(&mut a_rx), vec![ServerEvent::JoinedRoom(true)]);
    }
}
