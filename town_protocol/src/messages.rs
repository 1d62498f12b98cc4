// Websocket envelopes exchanged between the town server and clients.

use crate::commands::{CommandPayload, InteractableCommand};
use crate::model::{AreaSnapshot, PlayerId};
use serde::{Deserialize, Serialize};

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    // Initial handshake; must be the first message on a connection.
    Join(JoinPayload),
    EnterArea { area_id: String },
    ExitArea { area_id: String },
    Command(CommandEnvelope),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinPayload {
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    // Correlation id echoed back in the matching response.
    pub command_id: u64,
    pub area_id: String,
    pub command: InteractableCommand,
}

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Assigned identity for the connection after Join is accepted.
    Identity { player_id: PlayerId },
    // Every area in the town, sent once after Identity and on lag recovery.
    Town { areas: Vec<AreaSnapshot> },
    AreaUpdated(AreaSnapshot),
    CommandResponse(CommandResponse),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub command_id: u64,
    pub area_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<CommandPayload>,
}
