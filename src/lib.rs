//! Dedos de Toledo - a turn-based wagering dice game
//!
//! Core modules:
//! - `sim`: Match phase machine, dice, rule variants (Riffa, Triga, Panquist)
//! - `state`: Screen stack with enter/exit/re-enter hooks
//! - `screens`: Title, opponent selection, play, wager, result, help, end screens
//! - `physics`: Black-box physics contract plus a top-down table implementation
//! - `persistence`: Key-value store and in-flight match codec
//! - `timer`: Deferred events and tweens polled once per tick

pub mod app;
pub mod audio;
pub mod config;
pub mod error;
pub mod input;
pub mod persistence;
pub mod physics;
pub mod render;
pub mod rng;
pub mod screens;
pub mod settings;
pub mod sim;
pub mod state;
pub mod timer;

pub use app::{AutoPilot, Game, GameContext};
pub use config::{GameConfig, OpponentDefinition};
pub use error::{ConfigError, PersistenceError};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta accepted by the driver (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Virtual canvas dimensions
    pub const CANVAS_WIDTH: f32 = 1920.0;
    pub const CANVAS_HEIGHT: f32 = 1080.0;

    /// Board (table) dimensions, centered on the canvas
    pub const BOARD_WIDTH: f32 = 1000.0;
    pub const BOARD_HEIGHT: f32 = 1000.0;
    /// Thickness of the solid board edges
    pub const BOARD_EDGE_THICKNESS: f32 = 80.0;

    /// Die defaults
    pub const DIE_SIZE: f32 = 48.0;
    pub const DIE_MIN_VALUE: u8 = 1;
    pub const DIE_MAX_VALUE: u8 = 6;
    /// A rolling die settles once both velocity components are within this (px/s)
    pub const MIN_ROLLING_VELOCITY: f32 = 10.0;
    /// Cast impulse along the roll direction (px/s)
    pub const DIRECTIONAL_IMPULSE_MIN: f32 = 600.0;
    pub const DIRECTIONAL_IMPULSE_MAX: f32 = 1200.0;
    /// Maximum cast impulse across the roll direction (px/s)
    pub const LATERAL_IMPULSE_MAX: f32 = 240.0;
    /// Air friction for dice (fraction of velocity lost per 1/60 s)
    pub const DIE_FRICTION_AIR: f32 = 0.03;
    /// Bounciness of dice against edges and each other
    pub const DIE_RESTITUTION: f32 = 0.6;

    /// Character money defaults
    pub const PLAYER_STARTING_MONEY: u32 = 200;
    pub const OPPONENT_MIN_STARTING_MONEY: u32 = 100;
    pub const OPPONENT_MAX_STARTING_MONEY: u32 = 500;

    /// Delay before an opponent's non-first roll (seconds)
    pub const OPPONENT_ROLL_DELAY: f32 = 1.0;

    /// UI transition timings (seconds)
    pub const PANEL_TRANSITION: f32 = 0.75;
    pub const RESULT_HOLD: f32 = 1.0;
    pub const FADE_DURATION: f32 = 1.0;
    pub const GAME_OVER_FADE: f32 = 5.0;
    pub const VICTORY_FADE: f32 = 3.0;
}

/// Center of the board in canvas coordinates
#[inline]
pub fn board_center() -> Vec2 {
    Vec2::new(consts::CANVAS_WIDTH / 2.0, consts::CANVAS_HEIGHT / 2.0)
}

/// Top-left corner of the board once it has slid into place
#[inline]
pub fn board_origin() -> Vec2 {
    board_center() - Vec2::new(consts::BOARD_WIDTH / 2.0, consts::BOARD_HEIGHT / 2.0)
}
