//! Session-best persistence
//!
//! The arena keeps a single best result (score plus the wave it ended on),
//! persisted to LocalStorage on the web and held in memory on native.

use serde::{Deserialize, Serialize};

/// The best run recorded on this device
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HighScore {
    /// Final score of the best run
    pub score: u64,
    /// Wave that run ended on
    pub wave: u32,
    /// Whether that run defeated the boss
    pub victory: bool,
}

impl HighScore {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "neon_arena_highscore";

    /// Record a finished run; returns true when it becomes the new best.
    pub fn submit(&mut self, score: u64, wave: u32, victory: bool) -> bool {
        if score <= self.score {
            return false;
        }
        *self = Self {
            score,
            wave,
            victory,
        };
        true
    }

    pub fn is_empty(&self) -> bool {
        self.score == 0
    }

    /// Load the stored best (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(best) = serde_json::from_str::<HighScore>(&json) {
                    log::info!("Loaded high score: {} (wave {})", best.score, best.wave);
                    return best;
                }
            }
        }

        log::info!("No stored high score, starting fresh");
        Self::default()
    }

    /// Save the best to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High score saved ({})", self.score);
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_improves_best() {
        let mut best = HighScore::default();
        assert!(best.is_empty());
        assert!(best.submit(500, 3, false));
        assert_eq!(best.score, 500);
        assert_eq!(best.wave, 3);
    }

    #[test]
    fn test_submit_rejects_lower() {
        let mut best = HighScore::default();
        best.submit(500, 3, false);
        assert!(!best.submit(400, 9, true));
        assert_eq!(best.score, 500);
        assert_eq!(best.wave, 3);
        assert!(!best.victory);
    }

    #[test]
    fn test_zero_score_never_recorded() {
        let mut best = HighScore::default();
        assert!(!best.submit(0, 1, false));
        assert!(best.is_empty());
    }

    #[test]
    fn test_round_trips_through_json() {
        let mut best = HighScore::default();
        best.submit(12_345, 10, true);
        let json = serde_json::to_string(&best).unwrap();
        let parsed: HighScore = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, best);
    }
}
