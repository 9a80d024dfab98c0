//! Shell-facing command surface
//!
//! The rendering shell never mutates [`RunState`] fields directly. It calls
//! these methods between ticks; each validates the request against the
//! current phase and either applies it or returns a [`CommandError`]. Input
//! intents (movement, fire, aim) persist until overwritten; the dash trigger
//! is an edge that the next tick consumes.

use glam::Vec2;
use thiserror::Error;

use super::state::{RunPhase, RunState};
use super::upgrades::{ShopItem, UpgradeKind};
use super::waves;

/// Why a command was rejected. The shell surfaces these instead of the core
/// silently ignoring bad requests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("command requires the {required:?} phase, current phase is {actual:?}")]
    WrongPhase { required: RunPhase, actual: RunPhase },
    #[error("upgrade choice {index} out of range ({available} offered)")]
    ChoiceOutOfRange { index: usize, available: usize },
    #[error("weapon index {index} out of range ({available} equipped)")]
    WeaponOutOfRange { index: usize, available: usize },
    #[error("need {price} credits for {item:?}, have {credits}")]
    InsufficientCredits {
        item: ShopItem,
        price: u32,
        credits: u32,
    },
    #[error("movement intent is not finite")]
    NonFiniteInput,
}

impl RunState {
    fn require_phase(&self, required: RunPhase) -> Result<(), CommandError> {
        if self.phase == required {
            Ok(())
        } else {
            log::debug!("command rejected: needs {:?}, phase is {:?}", required, self.phase);
            Err(CommandError::WrongPhase {
                required,
                actual: self.phase,
            })
        }
    }

    /// Set the held movement direction. Magnitude above 1 is normalized by
    /// the tick; non-finite input is rejected outright.
    pub fn set_movement_intent(&mut self, movement: Vec2) -> Result<(), CommandError> {
        if !movement.is_finite() {
            return Err(CommandError::NonFiniteInput);
        }
        self.input.movement = movement;
        Ok(())
    }

    /// Hold or release the fire button.
    pub fn set_fire_held(&mut self, held: bool) {
        self.input.fire_held = held;
    }

    /// Point the aim cursor at an arena position, or clear it.
    pub fn set_aim_point(&mut self, aim: Option<Vec2>) -> Result<(), CommandError> {
        if let Some(point) = aim {
            if !point.is_finite() {
                return Err(CommandError::NonFiniteInput);
            }
        }
        self.input.aim = aim;
        Ok(())
    }

    /// Queue a dash for the next tick. Queuing while on cooldown is not an
    /// error; the tick simply ignores the trigger.
    pub fn trigger_dash(&mut self) -> Result<(), CommandError> {
        self.require_phase(RunPhase::Playing)?;
        self.input.dash_queued = true;
        Ok(())
    }

    /// Select an equipped weapon by slot index.
    pub fn switch_weapon(&mut self, index: usize) -> Result<(), CommandError> {
        self.require_phase(RunPhase::Playing)?;
        if index >= self.weapons.len() {
            return Err(CommandError::WeaponOutOfRange {
                index,
                available: self.weapons.len(),
            });
        }
        self.weapon_index = index;
        Ok(())
    }

    /// Step the weapon selection forward or backward, wrapping around the
    /// catalog.
    pub fn cycle_weapon(&mut self, dir: i32) -> Result<(), CommandError> {
        self.require_phase(RunPhase::Playing)?;
        let len = self.weapons.len() as i32;
        self.weapon_index = (self.weapon_index as i32 + dir).rem_euclid(len) as usize;
        Ok(())
    }

    /// Take one of the offered wave-clear upgrades, then start the next
    /// wave. Only valid while a choice is pending.
    pub fn apply_upgrade_choice(&mut self, index: usize) -> Result<UpgradeKind, CommandError> {
        self.require_phase(RunPhase::ChoosingUpgrade)?;
        if index >= self.pending_choices.len() {
            return Err(CommandError::ChoiceOutOfRange {
                index,
                available: self.pending_choices.len(),
            });
        }
        let chosen = self.pending_choices[index];
        chosen.apply(self);
        self.pending_choices.clear();
        self.wave += 1;
        waves::start_wave(self);
        self.phase = RunPhase::Playing;
        log::info!("upgrade taken: {}, starting wave {}", chosen.label(), self.wave);
        Ok(chosen)
    }

    /// Buy a shop item with run credits. The shop stays open in every phase
    /// except game over.
    pub fn purchase_shop_item(&mut self, item: ShopItem) -> Result<(), CommandError> {
        if self.phase == RunPhase::GameOver {
            return Err(CommandError::WrongPhase {
                required: RunPhase::Playing,
                actual: self.phase,
            });
        }
        let price = item.price(self.wave);
        if self.credits < price {
            return Err(CommandError::InsufficientCredits {
                item,
                price,
                credits: self.credits,
            });
        }
        self.credits -= price;
        item.apply(self);
        log::debug!("purchased {:?} for {} credits", item, price);
        Ok(())
    }

    /// Toggle between `Playing` and `Paused`. Any other phase rejects.
    pub fn toggle_pause(&mut self) -> Result<RunPhase, CommandError> {
        self.phase = match self.phase {
            RunPhase::Playing => RunPhase::Paused,
            RunPhase::Paused => RunPhase::Playing,
            actual => {
                return Err(CommandError::WrongPhase {
                    required: RunPhase::Playing,
                    actual,
                });
            }
        };
        Ok(self.phase)
    }

    /// Discard the run and start fresh with a new seed, carrying over the
    /// session high score.
    pub fn restart(&mut self, seed: u64) {
        let high_score = self.high_score.max(self.score);
        *self = RunState::new(seed);
        self.high_score = high_score;
        log::info!("run restarted with seed {}", seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_rejected_while_paused() {
        let mut state = RunState::new(1);
        state.phase = RunPhase::Paused;
        let err = state.trigger_dash().unwrap_err();
        assert!(matches!(err, CommandError::WrongPhase { .. }));
        assert!(!state.input.dash_queued);
    }

    #[test]
    fn test_non_finite_movement_rejected() {
        let mut state = RunState::new(1);
        let err = state
            .set_movement_intent(Vec2::new(f32::NAN, 0.0))
            .unwrap_err();
        assert_eq!(err, CommandError::NonFiniteInput);
        assert_eq!(state.input.movement, Vec2::ZERO);
    }

    #[test]
    fn test_switch_weapon_bounds() {
        let mut state = RunState::new(1);
        let count = state.weapons.len();
        assert!(state.switch_weapon(count - 1).is_ok());
        assert_eq!(state.weapon_index, count - 1);
        let err = state.switch_weapon(count).unwrap_err();
        assert!(matches!(err, CommandError::WeaponOutOfRange { .. }));
    }

    #[test]
    fn test_cycle_weapon_wraps_both_ways() {
        let mut state = RunState::new(1);
        let count = state.weapons.len();
        state.cycle_weapon(-1).unwrap();
        assert_eq!(state.weapon_index, count - 1);
        state.cycle_weapon(1).unwrap();
        assert_eq!(state.weapon_index, 0);
    }

    #[test]
    fn test_shop_open_mid_wave() {
        let mut state = RunState::new(1);
        state.credits = 10_000;
        state.purchase_shop_item(ShopItem::MoveSpeed).unwrap();
        assert!((state.permanent.move_speed - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_shop_closed_after_game_over() {
        let mut state = RunState::new(1);
        state.phase = RunPhase::GameOver;
        state.credits = 10_000;
        let err = state.purchase_shop_item(ShopItem::MoveSpeed).unwrap_err();
        assert!(matches!(err, CommandError::WrongPhase { .. }));
    }

    #[test]
    fn test_upgrade_choice_starts_next_wave() {
        let mut state = RunState::new(2);
        state.enemies.clear();
        state.enemies_left = 0;
        state.tick(1.0 / 60.0);
        assert_eq!(state.phase, RunPhase::ChoosingUpgrade);

        state.apply_upgrade_choice(0).unwrap();
        assert_eq!(state.phase, RunPhase::Playing);
        assert_eq!(state.wave, 2);
        assert!(state.pending_choices.is_empty());
        assert!(!state.enemies.is_empty());
    }

    #[test]
    fn test_upgrade_choice_out_of_range() {
        let mut state = RunState::new(3);
        state.enemies.clear();
        state.enemies_left = 0;
        state.tick(1.0 / 60.0);
        let err = state.apply_upgrade_choice(9).unwrap_err();
        assert!(matches!(err, CommandError::ChoiceOutOfRange { .. }));
        assert_eq!(state.phase, RunPhase::ChoosingUpgrade);
    }

    #[test]
    fn test_upgrade_choice_rejected_mid_wave() {
        let mut state = RunState::new(4);
        let err = state.apply_upgrade_choice(0).unwrap_err();
        assert!(matches!(err, CommandError::WrongPhase { .. }));
    }

    #[test]
    fn test_shop_purchase_deducts_credits() {
        let mut state = RunState::new(5);
        state.enemies.clear();
        state.enemies_left = 0;
        state.tick(1.0 / 60.0);

        state.credits = 10_000;
        let credits = state.credits;
        let price = ShopItem::MaxHp.price(state.wave);
        state.purchase_shop_item(ShopItem::MaxHp).unwrap();
        assert_eq!(state.credits, credits - price);
        assert_eq!(state.permanent.max_hp, 1);
    }

    #[test]
    fn test_shop_rejects_when_broke() {
        let mut state = RunState::new(6);
        state.enemies.clear();
        state.enemies_left = 0;
        state.tick(1.0 / 60.0);

        state.credits = 0;
        let err = state.purchase_shop_item(ShopItem::Damage).unwrap_err();
        assert!(matches!(err, CommandError::InsufficientCredits { .. }));
        assert_eq!(state.permanent.damage, 0);
    }

    #[test]
    fn test_pause_round_trip() {
        let mut state = RunState::new(7);
        assert_eq!(state.toggle_pause().unwrap(), RunPhase::Paused);
        assert_eq!(state.toggle_pause().unwrap(), RunPhase::Playing);
    }

    #[test]
    fn test_pause_rejected_after_game_over() {
        let mut state = RunState::new(8);
        state.phase = RunPhase::GameOver;
        assert!(state.toggle_pause().is_err());
    }

    #[test]
    fn test_restart_keeps_high_score() {
        let mut state = RunState::new(9);
        state.score = 4200;
        state.phase = RunPhase::GameOver;
        state.restart(10);
        assert_eq!(state.high_score, 4200);
        assert_eq!(state.score, 0);
        assert_eq!(state.wave, 1);
        assert_eq!(state.phase, RunPhase::Playing);
    }
}
