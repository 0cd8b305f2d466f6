use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ROOM_CODE_LEN: usize = 4;
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Display name assigned to the session that creates a room.
pub const PRESENTER_NAME: &str = "presenter";

/// Inbound events, one variant per named wire event.
///
/// Frames look like `{"event": "join-room", "data": "WXYZ"}`. Game-state
/// payloads are opaque JSON passed through untouched.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    CreateRoom,
    JoinRoom(String),
    #[serde(rename_all = "camelCase")]
    ReJoinRoom {
        code: String,
        player_name: String,
        player_type: Value,
    },
    #[serde(rename_all = "camelCase")]
    UpdateGameState {
        state: Value,
        #[serde(default)]
        player_name: Option<String>,
    },
    LeaveRoom(bool),
    DestroyRoom,
    StartGame(Value),
    FaceOffBtn(Value),
    ShowStrikes(u32),
}

/// Outbound events relayed to room members or returned to a single session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    CreatedRoom(String),
    JoinedRoom(bool),
    #[serde(rename_all = "camelCase")]
    ReconnectedToRoom {
        player_name: String,
        player_type: Value,
    },
    ReconnectFailed,
    UpdateGameState(Value),
    PlayerLeftRoom(Option<String>),
    RoomDestroyed,
    StartGame(Value),
    FaceOffBtn(Value),
    ShowStrikes(u32),
    PlayerDisconnected(Option<String>),
}

/// One trivia question record as stored and served by the question API.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Question {
    pub question: String,
    pub answers: Vec<Value>,
}
