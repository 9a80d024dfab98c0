//! Browser bindings
//!
//! Exposes the simulation core to JavaScript. The page owns the canvas and
//! the requestAnimationFrame loop; per frame it forwards input, calls
//! [`Arena::tick`], and pulls the serialized state back for drawing.

use wasm_bindgen::prelude::*;

use crate::highscores::HighScore;
use crate::sim::{RunPhase, RunState, ShopItem};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// One running game plus the stored device best.
#[wasm_bindgen]
pub struct Arena {
    state: RunState,
    best: HighScore,
    was_over: bool,
}

#[wasm_bindgen]
impl Arena {
    /// Start a new run. Without an explicit seed the wall clock seeds it.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<u64>) -> Arena {
        let seed = seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let best = HighScore::load();
        let mut state = RunState::new(seed);
        state.high_score = best.score;
        Arena {
            state,
            best,
            was_over: false,
        }
    }

    /// Advance the simulation by `dt` seconds. Persists the device best once
    /// when a run ends.
    pub fn tick(&mut self, dt: f32) {
        self.state.tick(dt);
        let over = self.state.phase == RunPhase::GameOver;
        if over && !self.was_over {
            if self
                .best
                .submit(self.state.score, self.state.wave, self.state.victory)
            {
                self.best.save();
            }
        }
        self.was_over = over;
    }

    pub fn set_movement(&mut self, x: f32, y: f32) -> Result<(), JsError> {
        self.state.set_movement_intent(glam::Vec2::new(x, y))?;
        Ok(())
    }

    pub fn set_fire(&mut self, held: bool) {
        self.state.set_fire_held(held);
    }

    pub fn set_aim(&mut self, x: f32, y: f32) -> Result<(), JsError> {
        self.state.set_aim_point(Some(glam::Vec2::new(x, y)))?;
        Ok(())
    }

    pub fn clear_aim(&mut self) {
        // Infallible for None
        let _ = self.state.set_aim_point(None);
    }

    pub fn dash(&mut self) -> Result<(), JsError> {
        self.state.trigger_dash()?;
        Ok(())
    }

    pub fn switch_weapon(&mut self, index: usize) -> Result<(), JsError> {
        self.state.switch_weapon(index)?;
        Ok(())
    }

    pub fn cycle_weapon(&mut self, dir: i32) -> Result<(), JsError> {
        self.state.cycle_weapon(dir)?;
        Ok(())
    }

    /// Take the offered upgrade at `index`; returns its display label.
    pub fn choose_upgrade(&mut self, index: usize) -> Result<String, JsError> {
        let chosen = self.state.apply_upgrade_choice(index)?;
        Ok(chosen.label().to_string())
    }

    /// Buy a shop item by slot: 0 max HP, 1 fire rate, 2 move speed, 3 damage.
    pub fn buy_shop_item(&mut self, slot: u32) -> Result<(), JsError> {
        let item = match slot {
            0 => ShopItem::MaxHp,
            1 => ShopItem::FireRate,
            2 => ShopItem::MoveSpeed,
            _ => ShopItem::Damage,
        };
        self.state.purchase_shop_item(item)?;
        Ok(())
    }

    pub fn toggle_pause(&mut self) -> Result<(), JsError> {
        self.state.toggle_pause()?;
        Ok(())
    }

    pub fn restart(&mut self, seed: Option<u64>) {
        let seed = seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        self.state.restart(seed);
        self.state.high_score = self.state.high_score.max(self.best.score);
        self.was_over = false;
    }

    /// Full world state as JSON for the draw pass.
    pub fn state_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.state)?)
    }

    /// Compact HUD aggregate as JSON.
    pub fn hud_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.state.snapshot())?)
    }
}
