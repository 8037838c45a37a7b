//! Relay wire protocol
//!
//! One JSON object per UDP datagram, discriminated by a `type` field.
//! Missing numeric fields decode as zero and a missing name as "Player".

use serde::{Deserialize, Serialize};

/// Largest datagram either side reads
pub const MAX_DATAGRAM: usize = 4096;

fn default_name() -> String {
    "Player".to_string()
}

/// Messages from client to relay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Join {
        #[serde(default = "default_name")]
        name: String,
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
        #[serde(default)]
        rotation: f32,
        #[serde(default)]
        color_index: u32,
    },
    /// Absent fields keep the peer's previous value
    Update {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        x: Option<f32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y: Option<f32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rotation: Option<f32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color_index: Option<u32>,
    },
    Leave,
}

impl ClientMessage {
    pub fn join(name: &str, color_index: u32) -> Self {
        Self::Join {
            name: name.to_string(),
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            color_index,
        }
    }

    pub fn update(pose: Pose) -> Self {
        Self::Update {
            x: Some(pose.x),
            y: Some(pose.y),
            rotation: Some(pose.rotation),
            color_index: Some(pose.color_index),
        }
    }
}

/// Messages from relay to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Identity assigned to the sender, formatted "ip:port"
    Joined { id: String },
    /// Every registered peer, including the recipient
    State {
        #[serde(default)]
        players: Vec<PeerState>,
    },
}

/// Public fields of one peer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerState {
    pub id: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub color_index: u32,
}

/// Local pose broadcast by the client
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub color_index: u32,
}

/// Encode a message as a JSON datagram
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, EncodeError> {
    serde_json::to_vec(message).map_err(|e| EncodeError(e.to_string()))
}

/// Decode a JSON datagram
pub fn decode<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, DecodeError> {
    serde_json::from_slice(data).map_err(|e| DecodeError(e.to_string()))
}

#[derive(Debug, thiserror::Error)]
#[error("Encode error: {0}")]
pub struct EncodeError(String);

#[derive(Debug, thiserror::Error)]
#[error("Decode error: {0}")]
pub struct DecodeError(String);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_join_wire_shape() {
        let bytes = encode(&ClientMessage::join("Ace", 2)).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            value,
            json!({"type": "join", "name": "Ace", "x": 0.0, "y": 0.0, "rotation": 0.0, "color_index": 2})
        );
    }

    #[test]
    fn test_update_wire_shape() {
        let pose = Pose {
            x: 1.5,
            y: -2.0,
            rotation: 0.25,
            color_index: 1,
        };
        let value: Value = serde_json::from_slice(&encode(&ClientMessage::update(pose)).unwrap()).unwrap();
        assert_eq!(value["type"], "update");
        assert_eq!(value["x"], 1.5);
        assert_eq!(value["color_index"], 1);
    }

    #[test]
    fn test_leave_is_type_only() {
        let bytes = encode(&ClientMessage::Leave).unwrap();
        assert_eq!(bytes, br#"{"type":"leave"}"#.to_vec());
    }

    #[test]
    fn test_join_defaults() {
        let msg: ClientMessage = decode(br#"{"type":"join"}"#).unwrap();
        assert_eq!(msg, ClientMessage::join("Player", 0));
    }

    #[test]
    fn test_partial_update() {
        let msg: ClientMessage = decode(br#"{"type":"update","x":4}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Update {
                x: Some(4.0),
                y: None,
                rotation: None,
                color_index: None,
            }
        );
    }

    #[test]
    fn test_state_decodes_peer_list() {
        let raw = br#"{"type":"state","players":[{"id":"1.2.3.4:5","name":"B","x":1,"y":2,"rotation":3,"color_index":4}]}"#;
        match decode::<ServerMessage>(raw).unwrap() {
            ServerMessage::State { players } => {
                assert_eq!(players.len(), 1);
                assert_eq!(players[0].id, "1.2.3.4:5");
                assert_eq!(players[0].color_index, 4);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(decode::<ClientMessage>(br#"{"type":"teleport"}"#).is_err());
        assert!(decode::<ClientMessage>(b"garbage").is_err());
    }
}
