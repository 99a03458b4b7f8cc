//! Client session state.

use crate::entity::PlayerId;
use glam::Vec2;
use protocol::CameraState;
use std::net::SocketAddr;

/// What part of the world a client is shown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec2,
    pub view_area_width: f32,
}

impl Camera {
    pub fn new(position: Vec2, view_area_width: f32) -> Self {
        Self {
            position,
            view_area_width,
        }
    }

    /// Center the view on `position`.
    #[inline]
    pub fn update_view(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn to_state(&self) -> CameraState {
        CameraState {
            position: self.position.into(),
            view_area_width: self.view_area_width,
        }
    }
}

/// A connected client session.
#[derive(Debug)]
pub struct Client {
    /// Unique client ID.
    pub id: u32,
    /// Remote address.
    pub addr: SocketAddr,
    /// The player this client controls. `None` while spectating.
    pub player_id: Option<PlayerId>,
    pub camera: Camera,
}

impl Client {
    pub fn new(id: u32, addr: SocketAddr, camera: Camera) -> Self {
        Self {
            id,
            addr,
            player_id: None,
            camera,
        }
    }

    #[inline]
    pub fn is_spectating(&self) -> bool {
        self.player_id.is_none()
    }
}
