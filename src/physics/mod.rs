//! Physics adapter
//!
//! The game consumes physics only through [`PhysicsWorld`]: create bodies,
//! push them, step the simulation, read back position/velocity/angle.
//! [`TableWorld`] is the top-down implementation used by the game.

pub mod collision;
pub mod table;

pub use collision::{CollisionResult, bounce_velocity, circle_circle_collision, circle_rect_collision};
pub use table::{TableWorld, add_board_edges};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Opaque runtime handle to a body inside a physics world
///
/// Handles are never persisted; a restored die gets a fresh body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub(crate) u32);

/// Collision shape of a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BodyShape {
    Circle { radius: f32 },
    Rect { width: f32, height: f32 },
}

impl BodyShape {
    /// Radius used when the body moves (dynamic bodies collide as circles)
    pub fn bounding_radius(&self) -> f32 {
        match *self {
            BodyShape::Circle { radius } => radius,
            BodyShape::Rect { width, height } => width.min(height) / 2.0,
        }
    }
}

/// Creation options for a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyOptions {
    /// Static bodies never move
    pub is_static: bool,
    /// Fraction of velocity lost per 1/60 s
    pub friction_air: f32,
    /// Bounciness on contact (0 = dead stop, 1 = perfectly elastic)
    pub restitution: f32,
    /// Initial rotation (radians)
    pub angle: f32,
}

impl Default for BodyOptions {
    fn default() -> Self {
        Self {
            is_static: false,
            friction_air: 0.01,
            restitution: 0.5,
            angle: 0.0,
        }
    }
}

impl BodyOptions {
    /// Options for an immovable body
    pub fn fixed() -> Self {
        Self {
            is_static: true,
            friction_air: 0.0,
            restitution: 1.0,
            angle: 0.0,
        }
    }
}

/// Black-box physics world contract
pub trait PhysicsWorld {
    /// Add a body and return its handle
    fn create_body(&mut self, shape: BodyShape, position: Vec2, options: BodyOptions) -> BodyHandle;

    /// Apply an instantaneous impulse at a world point (off-center points add spin)
    fn apply_impulse(&mut self, handle: BodyHandle, point: Vec2, impulse: Vec2);

    /// Teleport a body
    fn set_position(&mut self, handle: BodyHandle, position: Vec2);

    /// Overwrite a body's linear velocity
    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2);

    /// Advance the simulation by `dt` seconds
    fn step(&mut self, dt: f32);

    fn position(&self, handle: BodyHandle) -> Option<Vec2>;
    fn velocity(&self, handle: BodyHandle) -> Option<Vec2>;
    fn angle(&self, handle: BodyHandle) -> Option<f32>;

    /// Remove a body; returns false if the handle was unknown
    fn remove_body(&mut self, handle: BodyHandle) -> bool;

    /// Number of bodies currently in the world (static included)
    fn body_count(&self) -> usize;

    /// Remove every body
    fn clear(&mut self);
}
