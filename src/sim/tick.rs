//! Fixed-timestep simulation tick
//!
//! One call advances the whole world by `dt` seconds. Sub-passes run in a
//! fixed order because later passes act on positions committed by earlier
//! ones: player, projectiles, particles/pickups, enemies/boss, collisions,
//! pickup collection, garbage collection, wave-clear. All reads by the shell
//! happen strictly after `tick` returns.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::state::{Guidance, Owner, Particle, Pickup, PickupKind, Projectile, RunPhase, RunState};
use super::{upgrades, waves, weapons};
use crate::consts::*;
use crate::{angle_to_dir, clamp, dist};

impl RunState {
    /// Advance the simulation by `dt` seconds (clamped to [`MAX_DT`]).
    ///
    /// No-ops entirely unless the run is in the `Playing` phase.
    pub fn tick(&mut self, dt: f32) {
        if !self.is_active() {
            return;
        }
        let dt = clamp(dt, 0.0, MAX_DT);
        let dt_ms = dt * 1000.0;
        self.time_ticks += 1;

        self.overdrive_ms = (self.overdrive_ms - dt_ms).max(0.0);
        self.slow_field_ms = (self.slow_field_ms - dt_ms).max(0.0);
        let slowed = self.slow_field_ms > 0.0 && self.player.abilities.slowmo;

        update_player(self, dt, slowed);
        update_projectiles(self, dt, slowed);
        update_particles_and_pickups(self, dt_ms, dt);
        update_enemies(self, dt, slowed);
        update_boss(self, dt);
        resolve_player_shots(self);
        resolve_enemy_shots(self);
        if self.phase == RunPhase::GameOver {
            return;
        }
        collect_pickups(self);
        collect_garbage(self);
        check_wave_clear(self);
    }
}

/// Step 1: movement, cooldowns, dash, weapon fire, drone orbits
fn update_player(state: &mut RunState, dt: f32, slowed: bool) {
    let dt_ms = dt * 1000.0;
    let movement = state.input.movement;
    let dash_queued = std::mem::take(&mut state.input.dash_queued);

    {
        let player = &mut state.player;
        let dir = movement.normalize_or_zero();
        let mut speed = player.speed;
        if slowed {
            speed *= SLOW_FIELD_PLAYER_MULT;
        }
        player.pos += dir * speed * dt;

        player.cooldown_ms -= dt_ms;
        player.dash_cooldown_ms -= dt_ms;
        player.invuln_ms = (player.invuln_ms - dt_ms).max(0.0);
        player.charge = (player.charge + dt / MEGA_CHARGE_TIME).min(1.0);

        for drone in &mut player.drones {
            drone.angle = (drone.angle + DRONE_ORBIT_SPEED * dt) % TAU;
        }
    }

    if dash_queued && state.player.abilities.dash && state.player.dash_cooldown_ms <= 0.0 {
        perform_dash(state);
    }

    // Clamp to arena bounds after any dash displacement
    let r = state.player.radius;
    state.player.pos.x = clamp(state.player.pos.x, r + ARENA_MARGIN, ARENA_WIDTH - r - ARENA_MARGIN);
    state.player.pos.y = clamp(state.player.pos.y, r + ARENA_MARGIN, ARENA_HEIGHT - r - ARENA_MARGIN);

    if state.input.fire_held && state.player.cooldown_ms <= 0.0 {
        weapons::fire_current(state);
        let mult = if state.overdrive_ms > 0.0 {
            OVERDRIVE_COOLDOWN_MULT
        } else {
            1.0
        };
        state.player.cooldown_ms = state.player.base_cooldown_ms * mult;
    }
}

/// Instant teleport toward the aim point (or the movement direction when no
/// pointer signal exists), with a short grace window.
fn perform_dash(state: &mut RunState) {
    let player_pos = state.player.pos;
    let dir = match state.input.aim {
        Some(aim) if aim != player_pos => (aim - player_pos).normalize_or_zero(),
        _ => state.input.movement.normalize_or_zero(),
    };
    if dir == Vec2::ZERO {
        return;
    }
    state.player.pos += dir * DASH_DISTANCE;
    state.player.invuln_ms = state.player.invuln_ms.max(DASH_INVULN_MS);
    state.player.dash_cooldown_ms = DASH_COOLDOWN_MS;
    spawn_burst(state, player_pos, 8, 6);
}

/// Cosmetic debris shared by dashes and enemy deaths
fn spawn_burst(state: &mut RunState, pos: Vec2, count: usize, color: u32) {
    for _ in 0..count {
        let life = state.rng.random_range(200.0..600.0);
        let vel = Vec2::new(
            state.rng.random_range(-80.0..80.0),
            state.rng.random_range(-80.0..80.0),
        );
        state.particles.push(Particle {
            pos,
            vel,
            color,
            age_ms: 0.0,
            life_ms: life,
        });
    }
}

/// Step 2: advance projectiles; homing shots steer toward the nearest enemy
fn update_projectiles(state: &mut RunState, dt: f32, slowed: bool) {
    let enemies = &state.enemies;
    let boss_pos = state.boss.as_ref().map(|b| b.pos);
    for shot in &mut state.player_shots {
        if shot.guidance == Guidance::Homing {
            // Nearest live enemy, falling back to the boss
            let target = enemies
                .iter()
                .map(|e| e.pos)
                .min_by(|a, b| {
                    dist(shot.pos, *a)
                        .partial_cmp(&dist(shot.pos, *b))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .or(boss_pos);
            if let Some(target) = target {
                let speed = shot.vel.length();
                let desired = (target - shot.pos).normalize_or_zero() * speed;
                // Blend 12% of the gap per tick, preserving speed magnitude
                shot.vel += (desired - shot.vel) * HOMING_TURN_RATE;
                shot.vel = shot.vel.normalize_or_zero() * speed;
            }
        }
        shot.pos += shot.vel * dt;
    }

    let enemy_dt = if slowed { dt * SLOW_FIELD_ENEMY_MULT } else { dt };
    for shot in &mut state.enemy_shots {
        shot.pos += shot.vel * enemy_dt;
    }
}

/// Step 3: cosmetic particles drift and age; pickups age in place
fn update_particles_and_pickups(state: &mut RunState, dt_ms: f32, dt: f32) {
    for particle in &mut state.particles {
        particle.pos += particle.vel * dt;
        particle.age_ms += dt_ms;
    }
    for pickup in &mut state.pickups {
        pickup.age_ms += dt_ms;
    }
}

/// Step 4a: enemies hunt the player with a personal wobble and take aimed
/// shots on independent timers
fn update_enemies(state: &mut RunState, dt: f32, slowed: bool) {
    let RunState {
        enemies,
        enemy_shots,
        rng,
        player,
        difficulty,
        ..
    } = state;

    let mut scale = 1.0 + (*difficulty - 1.0) * 0.12;
    if slowed {
        scale *= SLOW_FIELD_ENEMY_MULT;
    }
    let dt_ms = dt * 1000.0 * if slowed { SLOW_FIELD_ENEMY_MULT } else { 1.0 };

    for enemy in enemies.iter_mut() {
        let to_player = (player.pos - enemy.pos).normalize_or_zero();
        let lateral = Vec2::new(-to_player.y, to_player.x);
        enemy.phase = (enemy.phase + 2.0 * dt) % TAU;
        enemy.pos += to_player * enemy.speed * scale * dt
            + lateral * enemy.phase.sin() * ENEMY_WOBBLE * dt;

        enemy.shoot_timer_ms -= dt_ms;
        if enemy.shoot_timer_ms > 0.0 {
            continue;
        }
        use super::state::EnemyKind::*;
        let (reset, fires, speed, jitter) = match enemy.kind {
            Grunt => (900.0..2000.0, rng.random_bool(0.6), 200.0, 0.15),
            Sniper => (1800.0..2600.0, true, 260.0, 0.0),
            Splitter => (1500.0..2500.0, rng.random_bool(0.6), 200.0, 0.15),
        };
        enemy.shoot_timer_ms = rng.random_range(reset);
        if fires {
            let aim = (player.pos - enemy.pos).to_angle()
                + if jitter > 0.0 {
                    rng.random_range(-jitter..jitter)
                } else {
                    0.0
                };
            enemy_shots.push(Projectile::new(
                enemy.pos,
                angle_to_dir(aim) * speed,
                Owner::Enemy,
                8,
            ));
        }
    }
}

/// Step 4b: boss entry descent, phase promotion, and radial attack patterns
fn update_boss(state: &mut RunState, dt: f32) {
    let RunState {
        boss: Some(boss),
        enemy_shots,
        player,
        ..
    } = state
    else {
        return;
    };

    if !boss.entered {
        boss.pos.y += BOSS_ENTRY_SPEED * dt;
        if boss.pos.y >= BOSS_HOVER_Y {
            boss.pos.y = BOSS_HOVER_Y;
            boss.entered = true;
        }
        return;
    }

    // Gentle horizontal tracking once in position
    boss.pos.x += (player.pos.x - boss.pos.x) * 0.2 * dt;

    let promoted = boss.phase_for_hp();
    if promoted > boss.attack_phase {
        boss.attack_phase = promoted;
        log::debug!("boss promoted to attack phase {}", promoted);
    }

    boss.attack_timer_ms -= dt * 1000.0;
    if boss.attack_timer_ms > 0.0 {
        return;
    }
    boss.attack_timer_ms = BOSS_ATTACK_MS[boss.attack_phase.min(2) as usize];

    let origin = boss.pos;
    let mut shoot = |angle: f32, speed: f32| {
        enemy_shots.push(Projectile::new(origin, angle_to_dir(angle) * speed, Owner::Enemy, 9));
    };
    match boss.attack_phase {
        0 => {
            // Fan aimed at the player
            let aim = (player.pos - origin).to_angle();
            for i in 0..5 {
                shoot(aim + (i as f32 - 2.0) * 0.15, 220.0);
            }
        }
        1 => {
            // Rotating spiral arms
            boss.spiral_angle = (boss.spiral_angle + 0.35) % TAU;
            for i in 0..6 {
                shoot(boss.spiral_angle + i as f32 * TAU / 6.0, 200.0);
            }
        }
        _ => {
            // Omnidirectional burst
            for i in 0..16 {
                shoot(i as f32 * TAU / 16.0, 240.0);
            }
        }
    }
}

fn circles_hit(a_pos: Vec2, a_r: f32, b_pos: Vec2, b_r: f32) -> bool {
    dist(a_pos, b_pos) <= a_r + b_r
}

/// Step 5: player projectiles vs enemies and the boss
fn resolve_player_shots(state: &mut RunState) {
    let damage = 1 + state.permanent.damage;

    let mut shot_idx = 0;
    'shots: while shot_idx < state.player_shots.len() {
        let (shot_pos, shot_r) = {
            let shot = &state.player_shots[shot_idx];
            (shot.pos, shot.radius)
        };

        for enemy_idx in 0..state.enemies.len() {
            let enemy = &state.enemies[enemy_idx];
            if !circles_hit(shot_pos, shot_r, enemy.pos, enemy.radius) {
                continue;
            }
            state.enemies[enemy_idx].hp -= damage;
            if state.enemies[enemy_idx].hp <= 0 {
                kill_enemy(state, enemy_idx);
            }
            if consume_or_pierce(&mut state.player_shots, shot_idx) {
                // shot destroyed, same index now holds the next one
                continue 'shots;
            }
            break;
        }

        let mut boss_hit = false;
        let mut boss_destroyed = false;
        if let Some(boss) = &mut state.boss {
            if circles_hit(shot_pos, shot_r, boss.pos, boss.radius) {
                boss_hit = true;
                boss.hp = (boss.hp - damage).max(0);
                boss_destroyed = boss.hp == 0;
            }
        }
        if boss_destroyed {
            state.score += BOSS_KILL_SCORE;
            state.boss = None;
            state.enemies_left = 0;
            state.victory = true;
            log::info!("boss defeated on wave {}", state.wave);
        }
        if boss_hit && consume_or_pierce(&mut state.player_shots, shot_idx) {
            continue 'shots;
        }

        shot_idx += 1;
    }
}

/// Destroy the shot unless it has pierce charges left. Returns true if the
/// shot was removed.
fn consume_or_pierce(shots: &mut Vec<Projectile>, idx: usize) -> bool {
    if shots[idx].pierce == 0 {
        shots.remove(idx);
        true
    } else {
        shots[idx].pierce -= 1;
        false
    }
}

/// Remove a dead enemy: score, drops, splits, bookkeeping
fn kill_enemy(state: &mut RunState, idx: usize) {
    let enemy = state.enemies.remove(idx);
    state.enemies_left = state.enemies_left.saturating_sub(1);
    state.score += enemy.score_value();

    if state.rng.random_bool(CREDIT_DROP_CHANCE) {
        let amount = state.rng.random_range(40..=160);
        state.pickups.push(Pickup {
            pos: enemy.pos,
            kind: PickupKind::Credit { amount },
            radius: PICKUP_RADIUS,
            age_ms: 0.0,
        });
    }
    if state.rng.random_bool(HP_DROP_CHANCE) {
        state.pickups.push(Pickup {
            pos: enemy.pos + Vec2::new(12.0, 0.0),
            kind: PickupKind::Hp { amount: 1 },
            radius: PICKUP_RADIUS,
            age_ms: 0.0,
        });
    }
    spawn_burst(state, enemy.pos, 6, 7);

    if enemy.kind == super::state::EnemyKind::Splitter {
        waves::spawn_splits(state, enemy.pos);
    }
}

/// Step 6: enemy projectiles vs the player
fn resolve_enemy_shots(state: &mut RunState) {
    let player_pos = state.player.pos;
    let player_r = state.player.radius;

    let mut hits = 0;
    state.enemy_shots.retain(|shot| {
        if circles_hit(shot.pos, shot.radius, player_pos, player_r) {
            hits += 1;
            false
        } else {
            true
        }
    });

    for _ in 0..hits {
        if state.player.invuln_ms > 0.0 {
            continue;
        }
        let died = state.player.take_damage(1);
        state.player.invuln_ms = HIT_INVULN_MS;
        if died {
            end_run(state);
            return;
        }
    }
}

/// Step 7: pickup collection (each pickup collected at most once)
fn collect_pickups(state: &mut RunState) {
    let player_pos = state.player.pos;
    let player_r = state.player.radius;

    let mut collected: Vec<PickupKind> = Vec::new();
    state.pickups.retain(|pickup| {
        if circles_hit(pickup.pos, pickup.radius, player_pos, player_r) {
            collected.push(pickup.kind);
            false
        } else {
            true
        }
    });

    for kind in collected {
        match kind {
            PickupKind::Credit { amount } => state.credits += amount,
            PickupKind::Hp { amount } => state.player.heal(amount),
        }
    }
}

/// Step 8: expired particles, escaped projectiles, corrupted entities
fn collect_garbage(state: &mut RunState) {
    state.particles.retain(|p| !p.expired());

    let in_bounds = |pos: Vec2| {
        pos.x > -OFFSCREEN_MARGIN
            && pos.x < ARENA_WIDTH + OFFSCREEN_MARGIN
            && pos.y > -OFFSCREEN_MARGIN
            && pos.y < ARENA_HEIGHT + OFFSCREEN_MARGIN
    };
    state.player_shots.retain(|shot| {
        if !shot.is_sane() {
            log::warn!("dropping corrupted player projectile");
            return false;
        }
        in_bounds(shot.pos)
    });
    state.enemy_shots.retain(|shot| {
        if !shot.is_sane() {
            log::warn!("dropping corrupted enemy projectile");
            return false;
        }
        in_bounds(shot.pos)
    });

    // Corrupted enemies must release their wave slot, otherwise the wave
    // could never clear
    let before = state.enemies.len();
    state.enemies.retain(|e| e.is_sane());
    let dropped = before - state.enemies.len();
    if dropped > 0 {
        log::warn!("dropping {} corrupted enemies", dropped);
        state.enemies_left = state.enemies_left.saturating_sub(dropped as u32);
    }
}

/// Step 9: wave-clear transition
fn check_wave_clear(state: &mut RunState) {
    if state.enemies_left != 0 || state.boss.is_some() {
        return;
    }
    if state.victory {
        end_run(state);
        return;
    }
    state.credits += upgrades::wave_clear_bonus(state.wave);
    state.pending_choices = upgrades::draw_choices(state);
    state.phase = RunPhase::ChoosingUpgrade;
    log::info!("wave {} cleared", state.wave);
}

/// Terminal transition: commit the high score and freeze the world
fn end_run(state: &mut RunState) {
    state.phase = RunPhase::GameOver;
    if state.score > state.high_score {
        state.high_score = state.score;
    }
    log::info!(
        "run over: score {}, wave {}, victory {}",
        state.score,
        state.wave,
        state.victory
    );
}
