//! Message definitions for the blobfield protocol.
//!
//! Every frame is a JSON object tagged by a `type` field. Field names are
//! camelCase on the wire.

use crate::{Point, ProtocolError};
use serde::{Deserialize, Serialize};

/// Client -> server messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Ask to be assigned a player and a cell.
    JoinGameRequest,
    /// New movement target for the sender's cell, in world coordinates.
    TargetPositionUpdate {
        #[serde(alias = "target")]
        position: Point,
    },
}

impl ClientMessage {
    /// Decode a client message from a text frame.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let message: ClientMessage = serde_json::from_str(text)?;
        if let ClientMessage::TargetPositionUpdate { position } = &message {
            if !position.is_finite() {
                return Err(ProtocolError::InvalidCoordinates);
            }
        }
        Ok(message)
    }

    /// Encode this message as a text frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Server -> client messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    JoinGameResponse(JoinGameResponse),
    GameUpdate(GameUpdate),
}

impl ServerMessage {
    /// Decode a server message from a text frame.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Encode this message as a text frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Reply to a join request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGameResponse {
    pub join_successful: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<u32>,
}

/// Full world snapshot for one viewer, sent once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameUpdate {
    pub camera: CameraState,
    pub cells: Vec<CellState>,
    pub food_particles: Vec<FoodState>,
}

/// What part of the world a viewer is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraState {
    pub position: Point,
    pub view_area_width: f32,
}

/// A player-controlled cell. The radius is derived from `mass`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellState {
    pub id: u32,
    pub position: Point,
    pub mass: f32,
}

impl CellState {
    /// Radius derived from `mass`.
    #[inline]
    pub fn radius(&self) -> f32 {
        crate::mass_to_radius(self.mass)
    }
}

/// A static food particle. `hue` is a 0-255 color hint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoodState {
    pub id: u32,
    pub position: Point,
    pub hue: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_join_request() {
        let msg = ClientMessage::decode(r#"{"type":"joinGameRequest"}"#).unwrap();
        assert_eq!(msg, ClientMessage::JoinGameRequest);
    }

    #[test]
    fn test_decode_target_update() {
        let msg = ClientMessage::decode(
            r#"{"type":"targetPositionUpdate","position":{"x":12.5,"y":-3}}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ClientMessage::TargetPositionUpdate {
                position: Point::new(12.5, -3.0)
            }
        );

        // `target` is accepted as an alias for `position`
        let msg = ClientMessage::decode(
            r#"{"type":"targetPositionUpdate","target":{"x":1,"y":2}}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ClientMessage::TargetPositionUpdate {
                position: Point::new(1.0, 2.0)
            }
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            ClientMessage::decode("not json"),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            ClientMessage::decode(r#"{"type":"fly"}"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            ClientMessage::decode(r#"{"type":"targetPositionUpdate"}"#),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_finite_target() {
        let result = ClientMessage::decode(
            r#"{"type":"targetPositionUpdate","position":{"x":1e39,"y":0}}"#,
        );
        assert!(matches!(result, Err(ProtocolError::InvalidCoordinates)));
    }

    #[test]
    fn test_join_response_wire_format() {
        let ok = ServerMessage::JoinGameResponse(JoinGameResponse {
            join_successful: true,
            player_id: Some(3),
        });
        assert_eq!(
            ok.encode().unwrap(),
            r#"{"type":"joinGameResponse","joinSuccessful":true,"playerId":3}"#
        );

        let full = ServerMessage::JoinGameResponse(JoinGameResponse {
            join_successful: false,
            player_id: None,
        });
        assert_eq!(
            full.encode().unwrap(),
            r#"{"type":"joinGameResponse","joinSuccessful":false}"#
        );
    }

    #[test]
    fn test_game_update_field_names() {
        let update = ServerMessage::GameUpdate(GameUpdate {
            camera: CameraState {
                position: Point::new(1.0, 2.0),
                view_area_width: 2000.0,
            },
            cells: vec![CellState {
                id: 7,
                position: Point::new(3.0, 4.0),
                mass: 100.0,
            }],
            food_particles: vec![FoodState {
                id: 8,
                position: Point::new(5.0, 6.0),
                hue: 200,
            }],
        });

        let text = update.encode().unwrap();
        assert!(text.contains(r#""type":"gameUpdate""#));
        assert!(text.contains(r#""viewAreaWidth":2000.0"#));
        assert!(text.contains(r#""foodParticles":[{"id":8"#));
        assert_eq!(ServerMessage::decode(&text).unwrap(), update);
    }
}
