//! Wave director
//!
//! Builds the enemy (or boss) population for each wave and owns the
//! difficulty curve. Spawning resets every transient collection so a wave
//! always starts from a clean arena.

use glam::Vec2;
use rand::Rng;

use super::state::{Boss, Enemy, EnemyKind, RunState};
use crate::consts::*;

/// Difficulty multiplier for a wave; monotonically increasing
pub fn difficulty_for_wave(wave: u32) -> f32 {
    1.0 + (wave.saturating_sub(1)) as f32 * 0.15
}

/// Enemy count for a non-boss wave
pub fn enemy_count_for_wave(wave: u32) -> u32 {
    WAVE_BASE_ENEMIES + (wave as f32 * WAVE_GROWTH_FACTOR).floor() as u32
}

/// Populate `state` for its current wave number.
///
/// Clears enemies, both projectile lists, pickups, particles, and the boss,
/// then spawns either the boss (final wave) or a scaled enemy population at
/// random positions along the four arena edges.
pub fn start_wave(state: &mut RunState) {
    state.enemies.clear();
    state.player_shots.clear();
    state.enemy_shots.clear();
    state.pickups.clear();
    state.particles.clear();
    state.boss = None;
    state.difficulty = difficulty_for_wave(state.wave);

    if state.wave >= BOSS_WAVE {
        state.boss = Some(Boss::new());
        state.enemies_left = 1;
        log::info!("Wave {}: boss spawned ({} hp)", state.wave, BOSS_MAX_HP);
        return;
    }

    let count = enemy_count_for_wave(state.wave);
    let elite_chance = (state.wave as f64 * 0.02).min(ELITE_CHANCE_CAP);
    for _ in 0..count {
        let pos = edge_spawn_position(state);
        let kind = roll_kind(state);
        let mut enemy = spawn_enemy(state, pos, kind);
        if state.rng.random_bool(elite_chance) {
            enemy.elite = true;
            enemy.hp *= 2;
        }
        state.enemies.push(enemy);
    }
    state.enemies_left = state.enemies.len() as u32;
    log::info!(
        "Wave {}: {} enemies, difficulty {:.2}",
        state.wave,
        count,
        state.difficulty
    );
}

/// Random point just outside one of the four arena edges
fn edge_spawn_position(state: &mut RunState) -> Vec2 {
    match state.rng.random_range(0..4) {
        0 => Vec2::new(state.rng.random_range(0.0..ARENA_WIDTH), -20.0),
        1 => Vec2::new(ARENA_WIDTH + 20.0, state.rng.random_range(0.0..ARENA_HEIGHT)),
        2 => Vec2::new(state.rng.random_range(0.0..ARENA_WIDTH), ARENA_HEIGHT + 20.0),
        _ => Vec2::new(-20.0, state.rng.random_range(0.0..ARENA_HEIGHT)),
    }
}

/// Weighted kind draw: majority grunt, minority sniper, smaller minority
/// splitter
fn roll_kind(state: &mut RunState) -> EnemyKind {
    match state.rng.random_range(0..100) {
        0..70 => EnemyKind::Grunt,
        70..90 => EnemyKind::Sniper,
        _ => EnemyKind::Splitter,
    }
}

fn spawn_enemy(state: &mut RunState, pos: Vec2, kind: EnemyKind) -> Enemy {
    let (hp, speed, radius, timer) = match kind {
        EnemyKind::Grunt => (ENEMY_BASE_HP, ENEMY_BASE_SPEED, ENEMY_RADIUS, 800.0..1600.0),
        EnemyKind::Sniper => (ENEMY_BASE_HP, 90.0, ENEMY_RADIUS, 1800.0..2600.0),
        EnemyKind::Splitter => (ENEMY_BASE_HP + 1, 100.0, ENEMY_RADIUS + 2.0, 1200.0..2200.0),
    };
    Enemy {
        pos,
        radius,
        kind,
        hp,
        speed,
        phase: state.rng.random_range(0.0..std::f32::consts::TAU),
        elite: false,
        shoot_timer_ms: state.rng.random_range(timer),
    }
}

/// A killed splitter leaves two smaller grunts at its death position, each
/// counting toward `enemies_left`.
pub fn spawn_splits(state: &mut RunState, pos: Vec2) {
    for i in 0..2 {
        let offset = Vec2::new(if i == 0 { -10.0 } else { 10.0 }, 0.0);
        let mut child = spawn_enemy(state, pos + offset, EnemyKind::Grunt);
        child.radius = 8.0;
        child.hp = 1;
        child.speed = 140.0;
        state.enemies.push(child);
        state.enemies_left += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enemy_count_formula() {
        assert_eq!(enemy_count_for_wave(1), 7); // 6 + floor(1.8)
        assert_eq!(enemy_count_for_wave(5), 15); // 6 + floor(9.0)
        assert!(enemy_count_for_wave(9) > enemy_count_for_wave(2));
    }

    #[test]
    fn test_difficulty_monotonic() {
        let mut last = 0.0;
        for wave in 1..=12 {
            let d = difficulty_for_wave(wave);
            assert!(d > last);
            last = d;
        }
    }

    #[test]
    fn test_start_wave_populates_edges() {
        let mut state = RunState::new(99);
        state.wave = 3;
        start_wave(&mut state);
        assert_eq!(state.enemies.len() as u32, enemy_count_for_wave(3));
        assert_eq!(state.enemies_left, state.enemies.len() as u32);
        assert!(state.boss.is_none());
        // Every spawn sits on or just outside an arena edge
        for enemy in &state.enemies {
            let inside_x = enemy.pos.x >= 0.0 && enemy.pos.x <= ARENA_WIDTH;
            let inside_y = enemy.pos.y >= 0.0 && enemy.pos.y <= ARENA_HEIGHT;
            assert!(!(inside_x && inside_y), "spawn inside arena: {:?}", enemy.pos);
        }
    }

    #[test]
    fn test_start_wave_clears_transients() {
        let mut state = RunState::new(5);
        state.player_shots.push(crate::sim::Projectile::new(
            Vec2::ZERO,
            Vec2::ONE,
            crate::sim::Owner::Player,
            0,
        ));
        state.wave = 2;
        start_wave(&mut state);
        assert!(state.player_shots.is_empty());
        assert!(state.enemy_shots.is_empty());
        assert!(state.pickups.is_empty());
    }

    #[test]
    fn test_boss_wave_replaces_population() {
        let mut state = RunState::new(7);
        state.wave = BOSS_WAVE;
        start_wave(&mut state);
        assert!(state.enemies.is_empty());
        assert!(state.boss.is_some());
        assert_eq!(state.enemies_left, 1);
    }

    #[test]
    fn test_splits_increment_counter() {
        let mut state = RunState::new(11);
        let n = state.enemies_left;
        let count = state.enemies.len();
        spawn_splits(&mut state, Vec2::new(300.0, 300.0));
        assert_eq!(state.enemies_left, n + 2);
        assert_eq!(state.enemies.len(), count + 2);
    }

    #[test]
    fn test_elite_rate_capped() {
        // With many waves sampled, elites never dominate
        let mut state = RunState::new(13);
        state.wave = 9;
        start_wave(&mut state);
        let elites = state.enemies.iter().filter(|e| e.elite).count();
        assert!(elites < state.enemies.len());
    }
}
