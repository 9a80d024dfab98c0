//! Neon Dash Arena - a top-down wave survival arena shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, tick loop, waves, weapons, economy)
//! - `highscores`: Best-score persistence (LocalStorage on web)
//! - `wasm` (wasm32 only): bindings that hand the simulation to a JS page
//!
//! The crate is a simulation library: a rendering/input shell owns a
//! [`sim::RunState`], forwards input via its command methods, calls
//! [`sim::RunState::tick`] once per animation frame, and reads the state back
//! for drawing. All mutation happens inside `tick`; the draw pass is strictly
//! read-only.

pub mod highscores;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use highscores::HighScore;
pub use sim::{CommandError, HudSnapshot, RunPhase, RunState};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Maximum accepted frame delta (seconds); larger hitches are clamped
    pub const MAX_DT: f32 = 1.0 / 30.0;

    /// Arena dimensions (world units)
    pub const ARENA_WIDTH: f32 = 1100.0;
    pub const ARENA_HEIGHT: f32 = 700.0;
    /// Extra margin inside the arena edge the player cannot enter
    pub const ARENA_MARGIN: f32 = 8.0;
    /// Projectiles beyond this margin outside the arena are discarded
    pub const OFFSCREEN_MARGIN: f32 = 120.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 14.0;
    pub const PLAYER_BASE_SPEED: f32 = 260.0;
    pub const PLAYER_BASE_MAX_HP: i32 = 5;
    /// Base fire cooldown (ms)
    pub const PLAYER_BASE_COOLDOWN_MS: f32 = 220.0;
    pub const PLAYER_BULLET_SPEED: f32 = 420.0;
    /// Cap on simultaneous projectiles from the multi upgrade
    pub const MULTI_SHOT_CAP: u32 = 4;

    /// Dash: instant teleport distance and timings
    pub const DASH_DISTANCE: f32 = 160.0;
    pub const DASH_COOLDOWN_MS: f32 = 1200.0;
    /// Grace window granted by a dash (shorter than the on-hit window)
    pub const DASH_INVULN_MS: f32 = 200.0;
    /// Grace window granted when the player takes damage
    pub const HIT_INVULN_MS: f32 = 800.0;

    /// Charge meter: seconds of recharge per full mega shot
    pub const MEGA_CHARGE_TIME: f32 = 4.0;

    /// Orbiter drones
    pub const MAX_DRONES: usize = 3;
    pub const DRONE_ORBIT_RADIUS: f32 = 36.0;
    pub const DRONE_ORBIT_SPEED: f32 = 3.0;

    /// Enemy defaults
    pub const ENEMY_RADIUS: f32 = 12.0;
    pub const ENEMY_BASE_HP: i32 = 2;
    pub const ENEMY_BASE_SPEED: f32 = 120.0;
    /// Lateral wobble amplitude applied to the seek vector
    pub const ENEMY_WOBBLE: f32 = 30.0;
    /// Base score for a grunt kill; elites are worth 4x
    pub const ENEMY_BASE_SCORE: u64 = 20;
    pub const ELITE_SCORE_MULT: u64 = 4;

    /// Wave scaling
    pub const WAVE_BASE_ENEMIES: u32 = 6;
    pub const WAVE_GROWTH_FACTOR: f32 = 1.8;
    pub const ELITE_CHANCE_CAP: f64 = 0.12;
    /// Wave on which the boss replaces the enemy population
    pub const BOSS_WAVE: u32 = 10;

    /// Boss stats
    pub const BOSS_RADIUS: f32 = 40.0;
    pub const BOSS_MAX_HP: i32 = 150;
    /// Y position the boss descends to before attacking
    pub const BOSS_HOVER_Y: f32 = 140.0;
    pub const BOSS_ENTRY_SPEED: f32 = 90.0;
    pub const BOSS_KILL_SCORE: u64 = 1000;
    /// Attack interval per phase (ms); shrinks as phases escalate
    pub const BOSS_ATTACK_MS: [f32; 3] = [1400.0, 1000.0, 650.0];

    /// Pickup defaults
    pub const PICKUP_RADIUS: f32 = 8.0;
    /// Chance an enemy death drops credits
    pub const CREDIT_DROP_CHANCE: f64 = 0.75;
    /// Chance an enemy death also drops an HP pickup
    pub const HP_DROP_CHANCE: f64 = 0.12;

    /// Temporary effect multipliers
    pub const OVERDRIVE_COOLDOWN_MULT: f32 = 0.4;
    pub const SLOW_FIELD_PLAYER_MULT: f32 = 0.7;
    pub const SLOW_FIELD_ENEMY_MULT: f32 = 0.5;

    /// Homing steering: fraction of the heading gap closed per tick
    pub const HOMING_TURN_RATE: f32 = 0.12;
}

/// Clamp a value to `[lo, hi]`
#[inline]
pub fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    v.max(lo).min(hi)
}

/// Unit vector for an angle (radians)
#[inline]
pub fn angle_to_dir(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Euclidean distance between two points
#[inline]
pub fn dist(a: Vec2, b: Vec2) -> f32 {
    (b - a).length()
}
