//! Run state and core simulation types
//!
//! Everything the simulation owns lives in [`RunState`]. There is no ambient
//! mutable state: the shell holds exactly one `RunState`, mutates it through
//! `tick` and the command methods, and reads it back between ticks.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::upgrades::{PermanentUpgrades, UpgradeKind};
use super::weapons::WeaponKind;
use crate::consts::*;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Active gameplay
    Playing,
    /// Frozen by the pause command; entities hold position
    Paused,
    /// Wave cleared, waiting for the player to pick an upgrade
    ChoosingUpgrade,
    /// Run ended (death or boss kill)
    GameOver,
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

/// Projectile steering behavior (a tag, branched on in the update step)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Guidance {
    #[default]
    None,
    Homing,
}

/// A projectile, player- or enemy-owned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub owner: Owner,
    pub guidance: Guidance,
    /// Additional hits this projectile survives before destruction
    pub pierce: u32,
    /// Palette index for the draw pass
    pub color: u32,
}

impl Projectile {
    pub fn new(pos: Vec2, vel: Vec2, owner: Owner, color: u32) -> Self {
        Self {
            pos,
            vel,
            radius: 4.0,
            owner,
            guidance: Guidance::None,
            pierce: 0,
            color,
        }
    }

    /// False once position or velocity has gone non-finite; such projectiles
    /// are dropped during garbage collection instead of poisoning the tick.
    pub fn is_sane(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite()
    }
}

/// A cosmetic particle; carries no gameplay effect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    /// Milliseconds lived so far
    pub age_ms: f32,
    /// Milliseconds until removal
    pub life_ms: f32,
}

impl Particle {
    pub fn expired(&self) -> bool {
        self.age_ms > self.life_ms
    }
}

/// What a pickup grants on collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Credit { amount: u32 },
    Hp { amount: i32 },
}

/// A collectible drop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub pos: Vec2,
    pub kind: PickupKind,
    pub radius: f32,
    pub age_ms: f32,
}

/// Enemy behavioral archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Chases and fires probabilistically, often
    #[default]
    Grunt,
    /// Aims precisely, fires slowly, faster bullets
    Sniper,
    /// Spawns two smaller grunts on death
    Splitter,
}

/// A wave enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Vec2,
    pub radius: f32,
    pub kind: EnemyKind,
    pub hp: i32,
    pub speed: f32,
    /// Personal phase offset for the lateral wobble
    pub phase: f32,
    /// Elite: doubled HP, 4x score, distinct color
    pub elite: bool,
    /// Milliseconds until the next shot attempt
    pub shoot_timer_ms: f32,
}

impl Enemy {
    /// Score awarded when this enemy dies
    pub fn score_value(&self) -> u64 {
        let base = match self.kind {
            EnemyKind::Grunt => ENEMY_BASE_SCORE,
            EnemyKind::Sniper => 30,
            EnemyKind::Splitter => 25,
        };
        if self.elite { base * ELITE_SCORE_MULT } else { base }
    }

    pub fn is_sane(&self) -> bool {
        self.pos.is_finite()
    }
}

/// The final-wave boss. At most one exists at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub pos: Vec2,
    pub radius: f32,
    pub hp: i32,
    pub max_hp: i32,
    /// 0, 1, 2 - promoted as HP drops below 60% / 30%
    pub attack_phase: u8,
    /// Milliseconds until the next attack
    pub attack_timer_ms: f32,
    /// Running angle for the spiral pattern
    pub spiral_angle: f32,
    /// True once the scripted entry descent has finished
    pub entered: bool,
}

impl Boss {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(ARENA_WIDTH / 2.0, -BOSS_RADIUS),
            radius: BOSS_RADIUS,
            hp: BOSS_MAX_HP,
            max_hp: BOSS_MAX_HP,
            attack_phase: 0,
            attack_timer_ms: BOSS_ATTACK_MS[0],
            spiral_angle: 0.0,
            entered: false,
        }
    }

    /// Phase implied by the current HP fraction
    pub fn phase_for_hp(&self) -> u8 {
        let frac = self.hp.max(0) as f32 / self.max_hp as f32;
        if frac < 0.3 {
            2
        } else if frac < 0.6 {
            1
        } else {
            0
        }
    }

    pub fn hp_fraction(&self) -> f32 {
        self.hp.max(0) as f32 / self.max_hp as f32
    }
}

impl Default for Boss {
    fn default() -> Self {
        Self::new()
    }
}

/// A player-owned orbiter drone; position derives from the player each tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drone {
    /// Current orbit angle (radians)
    pub angle: f32,
}

impl Drone {
    /// World position for a given player position
    pub fn world_pos(&self, player_pos: Vec2) -> Vec2 {
        player_pos + crate::angle_to_dir(self.angle) * DRONE_ORBIT_RADIUS
    }
}

/// Which special abilities the player has unlocked
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Abilities {
    pub dash: bool,
    pub teleport: bool,
    pub shield: bool,
    pub slowmo: bool,
}

impl Default for Abilities {
    fn default() -> Self {
        // The dash is implemented as a short teleport, so both start unlocked
        Self {
            dash: true,
            teleport: true,
            shield: true,
            slowmo: true,
        }
    }
}

/// The player entity. Exactly one exists while a run is active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub max_hp: i32,
    pub hp: i32,
    /// Milliseconds until the weapon may fire again
    pub cooldown_ms: f32,
    /// Cooldown the weapon resets to (permanent fire-rate bonus applied)
    pub base_cooldown_ms: f32,
    pub bullet_speed: f32,
    /// Simultaneous projectiles per shot
    pub multi: u32,
    /// Extra spread angle (radians) between simultaneous projectiles
    pub spread: f32,
    /// Milliseconds of remaining damage immunity
    pub invuln_ms: f32,
    pub dash_cooldown_ms: f32,
    /// Charges that absorb damage before HP is touched
    pub shield: i32,
    pub drones: Vec<Drone>,
    /// Mega-shot charge meter in [0, 1]
    pub charge: f32,
    pub abilities: Abilities,
}

impl Player {
    /// Spawn at arena center with permanent upgrades folded into base stats
    pub fn new(permanent: &PermanentUpgrades) -> Self {
        let max_hp = PLAYER_BASE_MAX_HP + permanent.max_hp;
        Self {
            pos: Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0),
            radius: PLAYER_RADIUS,
            speed: PLAYER_BASE_SPEED + permanent.move_speed,
            max_hp,
            hp: max_hp,
            cooldown_ms: 0.0,
            base_cooldown_ms: (PLAYER_BASE_COOLDOWN_MS - permanent.fire_rate).max(0.0),
            bullet_speed: PLAYER_BULLET_SPEED,
            multi: 1,
            spread: 0.0,
            invuln_ms: 0.0,
            dash_cooldown_ms: 0.0,
            shield: 0,
            drones: Vec::new(),
            charge: 1.0,
            abilities: Abilities::default(),
        }
    }

    /// Apply damage through shield then HP, clamping HP at zero. The caller
    /// grants the post-hit invulnerability window. Returns true if the
    /// player died.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        let mut remaining = amount;
        if self.shield > 0 {
            let absorbed = remaining.min(self.shield);
            self.shield -= absorbed;
            remaining -= absorbed;
        }
        if remaining > 0 {
            self.hp = (self.hp - remaining).max(0);
        }
        self.hp == 0
    }

    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }
}

/// Input intent, set by the shell's commands and consumed by `tick`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputState {
    /// Raw movement vector (normalized inside the tick)
    pub movement: Vec2,
    pub fire_held: bool,
    /// Edge-triggered; consumed by the next tick
    pub dash_queued: bool,
    /// Pointer position in arena coordinates, if any
    pub aim: Option<Vec2>,
}

/// Complete run state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Seeded RNG; the only source of randomness in the simulation
    pub rng: Pcg32,
    pub phase: RunPhase,
    /// Set when the boss dies: the run ended in a win
    pub victory: bool,
    pub score: u64,
    pub high_score: u64,
    /// Current wave, 1-based
    pub wave: u32,
    pub credits: u32,
    /// Monotonic function of the wave number, scales enemy speed
    pub difficulty: f32,
    /// Live enemies plus in-flight splits; wave clears when this hits zero
    pub enemies_left: u32,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub boss: Option<Boss>,
    pub player_shots: Vec<Projectile>,
    pub enemy_shots: Vec<Projectile>,
    pub pickups: Vec<Pickup>,
    /// Visual only, skipped by serialization
    #[serde(skip)]
    pub particles: Vec<Particle>,
    /// Index into `weapons`
    pub weapon_index: usize,
    /// Unlocked weapons, in cycle order
    pub weapons: Vec<WeaponKind>,
    pub permanent: PermanentUpgrades,
    /// Offered upgrade choices while in `ChoosingUpgrade`
    pub pending_choices: Vec<UpgradeKind>,
    pub input: InputState,
    /// Remaining overdrive (fire-rate boost) time, ms
    pub overdrive_ms: f32,
    /// Remaining slow-field time, ms
    pub slow_field_ms: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl RunState {
    /// Create a fresh run with the given seed
    pub fn new(seed: u64) -> Self {
        let permanent = PermanentUpgrades::default();
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: RunPhase::Playing,
            victory: false,
            score: 0,
            high_score: 0,
            wave: 1,
            credits: 400,
            difficulty: 1.0,
            enemies_left: 0,
            player: Player::new(&permanent),
            enemies: Vec::new(),
            boss: None,
            player_shots: Vec::new(),
            enemy_shots: Vec::new(),
            pickups: Vec::new(),
            particles: Vec::new(),
            weapon_index: 0,
            weapons: WeaponKind::catalog().to_vec(),
            permanent,
            pending_choices: Vec::new(),
            input: InputState::default(),
            overdrive_ms: 0.0,
            slow_field_ms: 0.0,
            time_ticks: 0,
        };
        super::waves::start_wave(&mut state);
        state
    }

    /// Currently selected weapon. The index is kept in range by
    /// `switch_weapon`, but wrap defensively rather than panic.
    pub fn current_weapon(&self) -> WeaponKind {
        self.weapons[self.weapon_index % self.weapons.len()]
    }

    /// True while the world should advance
    pub fn is_active(&self) -> bool {
        self.phase == RunPhase::Playing
    }

    /// Read-only aggregate for the HUD / shell
    pub fn snapshot(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.score,
            high_score: self.high_score,
            wave: self.wave,
            enemies_left: self.enemies_left,
            hp: self.player.hp,
            max_hp: self.player.max_hp,
            credits: self.credits,
            weapon_index: self.weapon_index,
            weapon_name: self.current_weapon().name(),
            boss_hp_fraction: self.boss.as_ref().map(Boss::hp_fraction),
            phase: self.phase,
            victory: self.victory,
        }
    }
}

/// One-stop read-only view for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub score: u64,
    pub high_score: u64,
    pub wave: u32,
    pub enemies_left: u32,
    pub hp: i32,
    pub max_hp: i32,
    pub credits: u32,
    pub weapon_index: usize,
    pub weapon_name: &'static str,
    pub boss_hp_fraction: Option<f32>,
    pub phase: RunPhase,
    pub victory: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shield_absorbs_before_hp() {
        let mut player = Player::new(&PermanentUpgrades::default());
        player.shield = 3;
        let hp = player.hp;

        let died = player.take_damage(2);
        assert!(!died);
        assert_eq!(player.shield, 1);
        assert_eq!(player.hp, hp);

        // Shield 1, damage 2: shield empties and HP drops by 1
        player.shield = 1;
        let died = player.take_damage(2);
        assert!(!died);
        assert_eq!(player.shield, 0);
        assert_eq!(player.hp, hp - 1);
    }

    #[test]
    fn test_hp_clamped_at_zero() {
        let mut player = Player::new(&PermanentUpgrades::default());
        let died = player.take_damage(999);
        assert!(died);
        assert_eq!(player.hp, 0);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut player = Player::new(&PermanentUpgrades::default());
        player.hp = 1;
        player.heal(100);
        assert_eq!(player.hp, player.max_hp);
    }

    #[test]
    fn test_boss_phase_thresholds() {
        let mut boss = Boss::new();
        assert_eq!(boss.phase_for_hp(), 0);
        boss.hp = (boss.max_hp as f32 * 0.59) as i32;
        assert_eq!(boss.phase_for_hp(), 1);
        boss.hp = (boss.max_hp as f32 * 0.29) as i32;
        assert_eq!(boss.phase_for_hp(), 2);
    }

    #[test]
    fn test_elite_score_multiplier() {
        let mut enemy = Enemy {
            pos: Vec2::ZERO,
            radius: ENEMY_RADIUS,
            kind: EnemyKind::Grunt,
            hp: 2,
            speed: ENEMY_BASE_SPEED,
            phase: 0.0,
            elite: false,
            shoot_timer_ms: 1000.0,
        };
        assert_eq!(enemy.score_value(), ENEMY_BASE_SCORE);
        enemy.elite = true;
        assert_eq!(enemy.score_value(), ENEMY_BASE_SCORE * ELITE_SCORE_MULT);
    }

    #[test]
    fn test_new_run_starts_wave_one() {
        let state = RunState::new(42);
        assert_eq!(state.phase, RunPhase::Playing);
        assert_eq!(state.wave, 1);
        assert!(state.enemies_left > 0);
        assert_eq!(state.enemies_left as usize, state.enemies.len());
        assert!(state.boss.is_none());
    }
}
