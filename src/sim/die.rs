//! A single die and its rolling sub-state machine
//!
//! The face is decided the moment the die is cast; the physics body only
//! decides when the die has come to rest.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::physics::{BodyHandle, BodyOptions, BodyShape, PhysicsWorld};
use crate::rng::RandomSource;

/// Die sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DieState {
    #[default]
    Idle,
    Rolling,
}

/// Direction a die is cast in (canvas space, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::NEG_Y,
            Direction::Down => Vec2::Y,
            Direction::Left => Vec2::NEG_X,
            Direction::Right => Vec2::X,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Die {
    value: u8,
    state: DieState,
    body: BodyHandle,
    held: bool,
}

impl Die {
    /// Create a die resting at `position`
    pub fn new(physics: &mut dyn PhysicsWorld, position: Vec2) -> Self {
        let body = physics.create_body(
            BodyShape::Rect {
                width: DIE_SIZE,
                height: DIE_SIZE,
            },
            position,
            BodyOptions {
                friction_air: DIE_FRICTION_AIR,
                restitution: DIE_RESTITUTION,
                ..Default::default()
            },
        );
        Self {
            value: DIE_MIN_VALUE,
            state: DieState::Idle,
            body,
            held: false,
        }
    }

    /// Cast the die from `start` toward `direction`
    ///
    /// Returns false without touching anything if the die is held.
    pub fn on_roll(
        &mut self,
        direction: Direction,
        start: Vec2,
        physics: &mut dyn PhysicsWorld,
        rng: &mut dyn RandomSource,
    ) -> bool {
        if self.held {
            return false;
        }

        self.value = rng.uniform_int(DIE_MIN_VALUE as i32, DIE_MAX_VALUE as i32) as u8;
        self.state = DieState::Rolling;

        physics.set_position(self.body, start);
        physics.set_velocity(self.body, Vec2::ZERO);

        let along = direction.unit();
        let across = along.perp();
        let force = rng.positive_float(DIRECTIONAL_IMPULSE_MIN, DIRECTIONAL_IMPULSE_MAX);
        let jitter = rng.uniform_float(-LATERAL_IMPULSE_MAX, LATERAL_IMPULSE_MAX);
        let impulse = along * force + across * jitter;

        // Off-center contact so the die tumbles
        let offset = across * rng.uniform_float(-DIE_SIZE / 4.0, DIE_SIZE / 4.0);
        physics.apply_impulse(self.body, start + offset, impulse);
        true
    }

    /// Return to idle once the body has (nearly) stopped
    pub fn update(&mut self, physics: &dyn PhysicsWorld) {
        if self.state != DieState::Rolling {
            return;
        }
        match physics.velocity(self.body) {
            Some(vel) if vel.x.abs() > MIN_ROLLING_VELOCITY || vel.y.abs() > MIN_ROLLING_VELOCITY => {}
            Some(_) => self.state = DieState::Idle,
            None => {
                log::warn!("Die body {:?} missing from world; settling", self.body);
                self.state = DieState::Idle;
            }
        }
    }

    pub fn is_rolling(&self) -> bool {
        self.state == DieState::Rolling
    }

    pub fn state(&self) -> DieState {
        self.state
    }

    /// Stop the die where it is
    pub fn force_idle(&mut self, physics: &mut dyn PhysicsWorld) {
        self.state = DieState::Idle;
        physics.set_velocity(self.body, Vec2::ZERO);
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Overwrite the face (tie-break adjustments and restore only)
    pub fn set_value(&mut self, value: u8) {
        debug_assert!((DIE_MIN_VALUE..=DIE_MAX_VALUE).contains(&value));
        self.value = value.clamp(DIE_MIN_VALUE, DIE_MAX_VALUE);
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn hold(&mut self) {
        self.held = true;
    }

    pub fn release_hold(&mut self) {
        self.held = false;
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn position(&self, physics: &dyn PhysicsWorld) -> Option<Vec2> {
        physics.position(self.body)
    }

    pub fn angle(&self, physics: &dyn PhysicsWorld) -> f32 {
        physics.angle(self.body).unwrap_or(0.0)
    }

    /// Restore saved state onto a freshly created die
    pub fn restore(&mut self, value: u8, position: Vec2, held: bool, physics: &mut dyn PhysicsWorld) {
        self.set_value(value);
        self.held = held;
        physics.set_position(self.body, position);
        self.force_idle(physics);
    }

    /// Remove the body from the world
    pub fn release(&self, physics: &mut dyn PhysicsWorld) {
        physics.remove_body(self.body);
    }
}
