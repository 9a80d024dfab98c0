//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies
//!
//! The shell drives it with commands ([`commands`]) between calls to
//! [`RunState::tick`], and reads snapshots afterward.

pub mod commands;
pub mod state;
pub mod tick;
pub mod upgrades;
pub mod waves;
pub mod weapons;

pub use commands::CommandError;
pub use state::{
    Abilities, Boss, Drone, Enemy, EnemyKind, Guidance, HudSnapshot, InputState, Owner, Particle,
    Pickup, PickupKind, Player, Projectile, RunPhase, RunState,
};
pub use upgrades::{PermanentUpgrades, ShopItem, UpgradeKind};
pub use waves::{difficulty_for_wave, enemy_count_for_wave, start_wave};
pub use weapons::WeaponKind;
