//! Room membership index and room-code generation
//!
//! A room is not a stored object: it is the set of sessions filed under a
//! code, and it exists exactly as long as that set is non-empty. The index
//! only ever holds non-empty member sets, so `exists` is a plain key lookup.
//!
//! `destroy` is deliberately asymmetric: it removes the index entry (the
//! room's identity) without touching the members' session-side room codes.
//! Those stay stale until each member leaves or disconnects, matching the
//! original protocol's observed behavior.

use rand::Rng;
use shared::{ROOM_CODE_ALPHABET, ROOM_CODE_LEN};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Retry cap for code generation. With a 26^4 code space this is effectively
/// unreachable below hundreds of thousands of concurrent rooms; hitting it
/// means something is badly wrong and the operation must fail loudly rather
/// than spin forever.
const MAX_CODE_ATTEMPTS: u32 = 10_000;

/// Code generation gave up after [`MAX_CODE_ATTEMPTS`] collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeSpaceExhausted;

impl fmt::Display for CodeSpaceExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no unique room code found after {} attempts",
            MAX_CODE_ATTEMPTS
        )
    }
}

impl std::error::Error for CodeSpaceExhausted {}

/// Maps room code to the set of member session IDs.
#[derive(Debug, Default)]
pub struct RoomIndex {
    rooms: HashMap<String, HashSet<u32>>,
}

impl RoomIndex {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
        }
    }

    /// True iff at least one session is currently filed under this code.
    pub fn exists(&self, code: &str) -> bool {
        self.rooms.contains_key(code)
    }

    /// Adds a session to a room. A session already in another room is
    /// removed from it first; membership is mutually exclusive.
    pub fn join(&mut self, session_id: u32, code: &str) {
        self.leave(session_id);
        self.rooms
            .entry(code.to_string())
            .or_default()
            .insert(session_id);
    }

    /// Removes a session from whatever room it is in, dropping the room
    /// entirely once its last member leaves. Returns the code of the room
    /// left, or None if the session was in no room.
    pub fn leave(&mut self, session_id: u32) -> Option<String> {
        let code = self
            .rooms
            .iter()
            .find(|(_, members)| members.contains(&session_id))
            .map(|(code, _)| code.clone())?;

        let members = self.rooms.get_mut(&code)?;
        members.remove(&session_id);
        if members.is_empty() {
            self.rooms.remove(&code);
        }

        Some(code)
    }

    /// Forcibly removes a room's identity. Members' session-side room codes
    /// are not cleared here; see the module docs on the tombstone asymmetry.
    pub fn destroy(&mut self, code: &str) -> bool {
        self.rooms.remove(code).is_some()
    }

    /// Current member session IDs, empty for a room that does not exist.
    pub fn members_of(&self, code: &str) -> Vec<u32> {
        self.rooms
            .get(code)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Draws 4-character candidates uniformly from the uppercase alphabet
    /// until one does not collide with an existing room.
    pub fn generate_code<R: Rng>(&self, rng: &mut R) -> Result<String, CodeSpaceExhausted> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code: String = (0..ROOM_CODE_LEN)
                .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
                .collect();

            if !self.exists(&code) {
                return Ok(code);
            }
        }

        Err(CodeSpaceExhausted)
    }
}
