//! Progression and economy
//!
//! Two layers, both pure data plus effect functions (no behavior stored in
//! records):
//! - per-wave upgrade choices: a free pick-one-of-three drawn from a fixed
//!   pool after every cleared wave, mutating live player stats;
//! - the persistent shop: credit purchases that accumulate in
//!   [`PermanentUpgrades`] and are re-folded into the live player
//!   immediately, surviving wave resets within the run.

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::state::{Drone, RunState};
use crate::consts::*;

/// Accumulated shop purchases; applied on top of base player stats
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PermanentUpgrades {
    /// Extra max HP
    pub max_hp: i32,
    /// Extra damage added to every player projectile hit
    pub damage: i32,
    /// Extra move speed (units/s)
    pub move_speed: f32,
    /// Milliseconds shaved off the base fire cooldown
    pub fire_rate: f32,
}

/// The fixed pool of per-wave upgrade choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeKind {
    /// -20% fire cooldown
    CooldownCut,
    /// +1 simultaneous projectile, capped
    ExtraShot,
    /// +20% move speed
    MoveSpeed,
    /// +1 max HP and a partial heal
    MaxHp,
    /// Wider spread between simultaneous projectiles
    WiderSpread,
    /// A free orbiter drone (if below the cap)
    FreeDrone,
}

impl UpgradeKind {
    pub const POOL: [UpgradeKind; 6] = [
        UpgradeKind::CooldownCut,
        UpgradeKind::ExtraShot,
        UpgradeKind::MoveSpeed,
        UpgradeKind::MaxHp,
        UpgradeKind::WiderSpread,
        UpgradeKind::FreeDrone,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            UpgradeKind::CooldownCut => "Rapid Fire (-20% cooldown)",
            UpgradeKind::ExtraShot => "+1 Projectile",
            UpgradeKind::MoveSpeed => "+20% Move Speed",
            UpgradeKind::MaxHp => "+1 Max HP",
            UpgradeKind::WiderSpread => "Wider Spread",
            UpgradeKind::FreeDrone => "Free Drone",
        }
    }

    /// Mutate the live player stats for this choice
    pub fn apply(&self, state: &mut RunState) {
        let player = &mut state.player;
        match self {
            UpgradeKind::CooldownCut => {
                player.base_cooldown_ms *= 0.8;
            }
            UpgradeKind::ExtraShot => {
                player.multi = (player.multi + 1).min(MULTI_SHOT_CAP);
            }
            UpgradeKind::MoveSpeed => {
                player.speed *= 1.2;
            }
            UpgradeKind::MaxHp => {
                player.max_hp += 1;
                player.heal(2);
            }
            UpgradeKind::WiderSpread => {
                player.spread += 0.1;
            }
            UpgradeKind::FreeDrone => {
                if player.drones.len() < MAX_DRONES {
                    player.drones.push(Drone { angle: 0.0 });
                }
            }
        }
    }
}

/// Draw three distinct choices from the pool using the run RNG
pub fn draw_choices(state: &mut RunState) -> Vec<UpgradeKind> {
    UpgradeKind::POOL
        .choose_multiple(&mut state.rng, 3)
        .copied()
        .collect()
}

/// Credits granted when a wave is cleared
pub fn wave_clear_bonus(wave: u32) -> u32 {
    60 + wave * 8
}

/// Shop inventory: permanent stat purchases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShopItem {
    MaxHp,
    FireRate,
    MoveSpeed,
    Damage,
}

impl ShopItem {
    pub const CATALOG: [ShopItem; 4] = [
        ShopItem::MaxHp,
        ShopItem::FireRate,
        ShopItem::MoveSpeed,
        ShopItem::Damage,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ShopItem::MaxHp => "Permanent +1 Max HP",
            ShopItem::FireRate => "Permanent Fire Rate",
            ShopItem::MoveSpeed => "Permanent Move Speed",
            ShopItem::Damage => "Permanent +1 Damage",
        }
    }

    fn base_cost(&self) -> u32 {
        match self {
            ShopItem::MaxHp => 120,
            ShopItem::FireRate => 160,
            ShopItem::MoveSpeed => 140,
            ShopItem::Damage => 200,
        }
    }

    /// Prices inflate gently with the wave counter
    pub fn price(&self, wave: u32) -> u32 {
        let scaled = self.base_cost() as f32 * (1.0 + wave as f32 * 0.04);
        (scaled.floor() as u32).max(5)
    }

    /// Record the purchase in the permanent accumulators and apply its
    /// delta to the live player. Deltas stack on top of wave upgrades
    /// instead of resetting them.
    pub fn apply(&self, state: &mut RunState) {
        match self {
            ShopItem::MaxHp => state.permanent.max_hp += 1,
            ShopItem::FireRate => state.permanent.fire_rate += 15.0,
            ShopItem::MoveSpeed => state.permanent.move_speed += 20.0,
            ShopItem::Damage => state.permanent.damage += 1,
        }
        let player = &mut state.player;
        match self {
            ShopItem::MaxHp => {
                player.max_hp += 1;
                player.heal(1);
            }
            // Hard floor so stacked purchases cannot zero the cooldown
            ShopItem::FireRate => {
                player.base_cooldown_ms = (player.base_cooldown_ms - 15.0).max(40.0);
            }
            ShopItem::MoveSpeed => player.speed += 20.0,
            // Read from the accumulator at hit resolution
            ShopItem::Damage => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_choices_distinct() {
        let mut state = RunState::new(123);
        for _ in 0..20 {
            let choices = draw_choices(&mut state);
            assert_eq!(choices.len(), 3);
            assert_ne!(choices[0], choices[1]);
            assert_ne!(choices[0], choices[2]);
            assert_ne!(choices[1], choices[2]);
        }
    }

    #[test]
    fn test_extra_shot_capped() {
        let mut state = RunState::new(1);
        for _ in 0..10 {
            UpgradeKind::ExtraShot.apply(&mut state);
        }
        assert_eq!(state.player.multi, MULTI_SHOT_CAP);
    }

    #[test]
    fn test_cooldown_cut_compounds() {
        let mut state = RunState::new(1);
        let base = state.player.base_cooldown_ms;
        UpgradeKind::CooldownCut.apply(&mut state);
        assert!((state.player.base_cooldown_ms - base * 0.8).abs() < 1e-3);
    }

    #[test]
    fn test_shop_price_scales_with_wave() {
        let early = ShopItem::MaxHp.price(1);
        let late = ShopItem::MaxHp.price(9);
        assert!(late > early);
        assert_eq!(early, (120.0_f32 * 1.04).floor() as u32);
    }

    #[test]
    fn test_shop_purchase_reapplies_to_live_player() {
        let mut state = RunState::new(1);
        let max_before = state.player.max_hp;
        ShopItem::MaxHp.apply(&mut state);
        assert_eq!(state.permanent.max_hp, 1);
        assert_eq!(state.player.max_hp, max_before + 1);

        let speed_before = state.player.speed;
        ShopItem::MoveSpeed.apply(&mut state);
        assert!(state.player.speed > speed_before);
    }

    #[test]
    fn test_free_drone_respects_cap() {
        let mut state = RunState::new(1);
        for _ in 0..5 {
            UpgradeKind::FreeDrone.apply(&mut state);
        }
        assert_eq!(state.player.drones.len(), MAX_DRONES);
    }
}
