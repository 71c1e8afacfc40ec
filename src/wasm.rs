//! Browser bindings. The human plays black against an agent playing white.

use std::fmt::Display;
use std::time::Duration;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::ai::heuristics::AgentType;
use crate::game::{GameConfig, GameInstance, PlayerKind};

#[wasm_bindgen]
pub struct WasmGame {
    inner: GameInstance,
}

#[wasm_bindgen]
impl WasmGame {
    /// `agent` is a kebab-case agent name such as `composite`.
    #[wasm_bindgen(constructor)]
    pub fn new(level: u8, agent: &str, timeout_ms: u32) -> Result<WasmGame, JsValue> {
        let agent: AgentType = agent.parse().map_err(to_js_error)?;
        let config = GameConfig {
            black: PlayerKind::Human,
            white: PlayerKind::Agent(agent),
            level,
            timeout: Duration::from_millis(timeout_ms.into()),
            ..GameConfig::default()
        };
        Ok(Self {
            inner: GameInstance::new_with_default_selector(config),
        })
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.to_game_state())
    }

    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.get_legal_moves())
    }

    #[wasm_bindgen(js_name = needsPass)]
    pub fn needs_pass(&self) -> bool {
        self.inner.needs_pass()
    }

    #[wasm_bindgen(js_name = isAiTurn)]
    pub fn is_ai_turn(&self) -> bool {
        matches!(
            self.inner.config().player(self.inner.current_player()),
            PlayerKind::Agent(_)
        )
    }

    /// Plays the human move and returns the new state.
    pub fn place(&mut self, col: u8, row: u8) -> Result<JsValue, JsValue> {
        self.inner.place(col, row).map_err(to_js_error)?;
        self.state()
    }

    /// Same as `place`, with the square given as `c4`-style notation.
    #[wasm_bindgen(js_name = placeNotation)]
    pub fn place_notation(&mut self, notation: &str) -> Result<JsValue, JsValue> {
        self.inner.place_notation(notation).map_err(to_js_error)?;
        self.state()
    }

    pub fn pass(&mut self) -> Result<JsValue, JsValue> {
        self.inner.pass().map_err(to_js_error)?;
        self.state()
    }

    #[wasm_bindgen(js_name = aiMove)]
    pub fn ai_move(&mut self) -> Result<JsValue, JsValue> {
        self.inner.do_ai_move().map_err(to_js_error)?;
        self.state()
    }

    pub fn result(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.to_game_result())
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}

fn to_js_error(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
