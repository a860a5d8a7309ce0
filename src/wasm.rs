//! Browser-facing API. All values cross the boundary as plain JS objects
//! produced by `serde-wasm-bindgen`.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::{Difficulty, SessionConfig};
use crate::game::{GameSession, Trigger};
use crate::types::Position;

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}

/// Routes `log` output to the browser console. Calling it again only
/// adjusts the level.
#[wasm_bindgen]
pub fn init_logging(level: &str) -> Result<(), JsError> {
    let level: log::Level = level
        .parse()
        .map_err(|_| JsError::new(&format!("unknown log level: {level}")))?;

    #[cfg(target_arch = "wasm32")]
    {
        let _ = console_log::init_with_level(level);
    }
    log::set_max_level(level.to_level_filter());
    Ok(())
}

#[derive(Serialize)]
struct DifficultyOption {
    id: Difficulty,
    label: &'static str,
    depth: u8,
    description: &'static str,
}

/// Handle owning one game session for the page.
#[wasm_bindgen]
pub struct OthelloGame {
    session: GameSession,
}

#[wasm_bindgen]
impl OthelloGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> OthelloGame {
        Self {
            session: GameSession::default(),
        }
    }

    /// Accepts `{ human: "black" | "white", timeLimitMs?: number }`; missing
    /// fields take their defaults.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<OthelloGame, JsError> {
        let config: SessionConfig = if config.is_undefined() || config.is_null() {
            SessionConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(Self {
            session: GameSession::new(config),
        })
    }

    /// Entries for the difficulty picker.
    pub fn difficulties() -> Result<JsValue, JsError> {
        let options: Vec<DifficultyOption> = Difficulty::ALL
            .into_iter()
            .map(|level| DifficultyOption {
                id: level,
                label: level.label(),
                depth: level.depth(),
                description: level.description(),
            })
            .collect();
        to_js(&options)
    }

    #[wasm_bindgen(js_name = chooseDifficulty)]
    pub fn choose_difficulty(&mut self, level: &str) -> Result<JsValue, JsError> {
        let level: Difficulty = level.parse()?;
        self.fire(Trigger::DifficultyChosen(level))
    }

    pub fn click(&mut self, row: u8, col: u8) -> Result<JsValue, JsError> {
        let position = Position::new(row, col)?;
        self.fire(Trigger::CellClicked(position))
    }

    /// Blocks until the engine has answered, then applies its move.
    #[wasm_bindgen(js_name = aiMove)]
    pub fn ai_move(&mut self) -> Result<JsValue, JsError> {
        self.session.step_ai()?;
        self.state()
    }

    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self) -> Result<JsValue, JsError> {
        to_js(&self.session.legal_moves())
    }

    pub fn state(&self) -> Result<JsValue, JsError> {
        to_js(&self.session.snapshot())
    }

    /// `undefined` until the game is over.
    pub fn result(&self) -> Result<JsValue, JsError> {
        to_js(&self.session.result())
    }

    #[wasm_bindgen(js_name = playAgain)]
    pub fn play_again(&mut self) -> Result<JsValue, JsError> {
        self.fire(Trigger::PlayAgain)
    }

    #[wasm_bindgen(js_name = changeDifficulty)]
    pub fn change_difficulty(&mut self) -> Result<JsValue, JsError> {
        self.fire(Trigger::ChangeDifficulty)
    }
}

impl OthelloGame {
    fn fire(&mut self, trigger: Trigger) -> Result<JsValue, JsError> {
        self.session.handle(trigger)?;
        self.state()
    }
}

impl Default for OthelloGame {
    fn default() -> Self {
        Self::new()
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    Ok(serde_wasm_bindgen::to_value(value)?)
}
