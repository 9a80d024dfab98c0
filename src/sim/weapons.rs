//! Weapon catalog
//!
//! A fixed, ordered set of weapons keyed by [`WeaponKind`]. Firing is a pure
//! dispatch on the kind: no behavior closures are stored in data. Each fire
//! routine enqueues projectiles (or particles / score for the beam) from the
//! current player state; the cooldown gate lives in the tick loop.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Drone, Guidance, Owner, Particle, Projectile, RunState};
use crate::angle_to_dir;
use crate::consts::*;

/// Score awarded per beam pulse instead of projectile damage
const BEAM_SCORE: u64 = 5;
/// Homing missile launch speed
const HOMING_SPEED: f32 = 200.0;

/// Stable weapon identifiers, in catalog (cycle) order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Single forward shot; respects multi-shot and spread
    Blaster,
    /// Wide multi-pellet burst at reduced projectile speed
    Shotgun,
    /// Cosmetic sweep that awards a small fixed score
    Beam,
    /// Slow missile that steers toward the nearest enemy
    Homing,
    /// Deploys orbiter drones, then fires them at the aim point
    Orbiter,
    /// Heavy piercing shot gated on a full charge meter
    Mega,
}

impl WeaponKind {
    /// The full catalog in cycle order
    pub fn catalog() -> &'static [WeaponKind] {
        &[
            WeaponKind::Blaster,
            WeaponKind::Shotgun,
            WeaponKind::Beam,
            WeaponKind::Homing,
            WeaponKind::Orbiter,
            WeaponKind::Mega,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            WeaponKind::Blaster => "Blaster",
            WeaponKind::Shotgun => "Shotgun",
            WeaponKind::Beam => "Beam",
            WeaponKind::Homing => "Homing",
            WeaponKind::Orbiter => "Orbiter",
            WeaponKind::Mega => "Mega",
        }
    }
}

/// Fire the currently selected weapon from the player's position
pub fn fire_current(state: &mut RunState) {
    match state.current_weapon() {
        WeaponKind::Blaster => fire_blaster(state),
        WeaponKind::Shotgun => fire_shotgun(state),
        WeaponKind::Beam => fire_beam(state),
        WeaponKind::Homing => fire_homing(state),
        WeaponKind::Orbiter => fire_orbiter(state),
        WeaponKind::Mega => fire_mega(state),
    }
}

fn fire_blaster(state: &mut RunState) {
    let p = &state.player;
    let shots = p.multi.max(1);
    let spread = p.spread * 0.5;
    let origin = p.pos + Vec2::new(0.0, -10.0);
    let speed = p.bullet_speed;
    for i in 0..shots {
        let offset = (i as f32 - (shots - 1) as f32 / 2.0) * spread;
        let angle = -FRAC_PI_2 + offset;
        state
            .player_shots
            .push(Projectile::new(origin, angle_to_dir(angle) * speed, Owner::Player, 0));
    }
}

fn fire_shotgun(state: &mut RunState) {
    let p = &state.player;
    let pellets = 5 + p.multi.saturating_sub(1);
    let spread = 0.5 + p.spread;
    let speed = p.bullet_speed * 0.85;
    let origin = p.pos;
    for i in 0..pellets {
        let angle = -FRAC_PI_2 + (i as f32 - (pellets - 1) as f32 / 2.0) * spread;
        state
            .player_shots
            .push(Projectile::new(origin, angle_to_dir(angle) * speed, Owner::Player, 1));
    }
}

/// The beam never spawns projectiles: it scores directly and leaves a
/// particle trail for the draw pass.
fn fire_beam(state: &mut RunState) {
    state.score += BEAM_SCORE;
    let origin = state.player.pos;
    for i in 0..10 {
        state.particles.push(Particle {
            pos: origin + Vec2::new(0.0, -(i as f32) * 40.0),
            vel: Vec2::new(state.rng.random_range(-20.0..20.0), -60.0),
            color: 2,
            age_ms: 0.0,
            life_ms: 150.0,
        });
    }
}

fn fire_homing(state: &mut RunState) {
    let shots = state.player.multi.max(1);
    for _ in 0..shots {
        let jitter = state.rng.random_range(-6.0..6.0);
        let origin = state.player.pos + Vec2::new(jitter, -8.0);
        let mut shot = Projectile::new(origin, Vec2::new(0.0, -HOMING_SPEED), Owner::Player, 3);
        shot.guidance = Guidance::Homing;
        shot.radius = 6.0;
        state.player_shots.push(shot);
    }
}

/// Below the drone cap each pull deploys a new orbiter; at the cap it
/// launches every drone toward the aim point instead.
fn fire_orbiter(state: &mut RunState) {
    if state.player.drones.len() < MAX_DRONES {
        let angle = state.rng.random_range(0.0..TAU);
        state.player.drones.push(Drone { angle });
        return;
    }

    let target = state.input.aim.unwrap_or(state.player.pos + Vec2::new(0.0, -1.0));
    let speed = state.player.bullet_speed;
    let player_pos = state.player.pos;
    for drone in &state.player.drones {
        let origin = drone.world_pos(player_pos);
        let dir = (target - origin).normalize_or(Vec2::new(0.0, -1.0));
        state
            .player_shots
            .push(Projectile::new(origin, dir * speed, Owner::Player, 4));
    }
}

/// Heavy shot: consumes a full charge meter, pierces, larger radius.
/// Fires nothing while the meter is still filling.
fn fire_mega(state: &mut RunState) {
    if state.player.charge < 1.0 {
        return;
    }
    state.player.charge = 0.0;
    let origin = state.player.pos + Vec2::new(0.0, -10.0);
    let mut shot = Projectile::new(
        origin,
        Vec2::new(0.0, -state.player.bullet_speed * 0.8),
        Owner::Player,
        5,
    );
    shot.radius = 10.0;
    shot.pierce = 3;
    state.player_shots.push(shot);
}
