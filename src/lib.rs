//! Falling-block game engine for the browser.
//!
//! [`Session`] is the whole engine: board, active piece, scoring and the
//! Ready/Running/Paused/GameOver state machine. [`GameClient`] wraps one
//! session for the JavaScript host; the host queues input intents as they
//! arrive and calls `frame(dtMs)` once per animation frame, which applies the
//! queued intents before advancing gravity.

use std::collections::VecDeque;

use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use tsify::Tsify;
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use web_sys::console;

pub mod autoplay;
pub mod board;
pub mod config;
pub mod error;
pub mod piece;
pub mod randomizer;
pub mod scoring;
pub mod session;

pub use board::Board;
pub use config::GameConfig;
pub use error::EngineError;
pub use piece::{ActivePiece, PieceKind, Point, Rotation};
pub use randomizer::{Randomizer, RandomizerKind};
pub use session::{GameEvent, Intent, Phase, Session, SessionState};

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn log(msg: &str) {
    console::log_1(&JsValue::from_str(msg));
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn log(msg: &str) {
    tracing::debug!("{msg}");
}

/// What every mutating client call hands back to the host.
#[derive(Serialize, Tsify)]
pub struct Frame {
    pub state: SessionState,
    pub events: Vec<GameEvent>,
}

#[derive(Serialize, Tsify)]
#[serde(rename_all = "camelCase")]
pub struct PieceInfo {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub color_id: u8,
    pub color: String,
    pub blocks: Vec<Point>,
}

impl PieceInfo {
    fn new(kind: PieceKind, rotation: Rotation) -> Self {
        Self {
            kind,
            rotation,
            color_id: kind.color_id(),
            color: kind.color().to_string(),
            blocks: piece::shape_blocks(kind, rotation).to_vec(),
        }
    }
}

#[wasm_bindgen]
pub struct GameClient {
    session: Session,
    pending: VecDeque<Intent>,
}

impl GameClient {
    fn frame_value(&self, events: Vec<GameEvent>) -> Result<JsValue, JsValue> {
        let frame = Frame {
            state: self.session.state(),
            events,
        };
        to_value(&frame).map_err(|e| e.into())
    }
}

#[wasm_bindgen]
impl GameClient {
    /// `config` may be `undefined` for the defaults. Without a seed the piece
    /// order comes from the platform's entropy source.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, seed: Option<u32>) -> Result<GameClient, JsValue> {
        let config: GameConfig = if config.is_undefined() || config.is_null() {
            GameConfig::default()
        } else {
            from_value(config)?
        };
        let session = match seed {
            Some(seed) => Session::seeded(config, u64::from(seed))?,
            None => Session::from_entropy(config)?,
        };
        Ok(Self {
            session,
            pending: VecDeque::new(),
        })
    }

    #[wasm_bindgen(js_name = start)]
    pub fn start(&mut self) -> Result<JsValue, JsValue> {
        self.pending.clear();
        let events = self.session.start();
        self.frame_value(events)
    }

    /// Applies an intent immediately, bypassing the queue.
    #[wasm_bindgen(js_name = applyIntent)]
    pub fn apply_intent(&mut self, intent: JsValue) -> Result<JsValue, JsValue> {
        let intent: Intent = from_value(intent)?;
        let events = self.session.apply_intent(intent);
        self.frame_value(events)
    }

    #[wasm_bindgen(js_name = queueIntent)]
    pub fn queue_intent(&mut self, intent: JsValue) -> Result<(), JsValue> {
        let intent: Intent = from_value(intent)?;
        self.pending.push_back(intent);
        Ok(())
    }

    #[wasm_bindgen(js_name = tick)]
    pub fn tick(&mut self) -> Result<JsValue, JsValue> {
        let events = self.session.tick();
        self.frame_value(events)
    }

    /// Drains queued intents in arrival order, then advances gravity by
    /// `dt_ms`.
    #[wasm_bindgen(js_name = frame)]
    pub fn frame(&mut self, dt_ms: f64) -> Result<JsValue, JsValue> {
        let events = self.session.run_frame(self.pending.drain(..), dt_ms);
        self.frame_value(events)
    }

    #[wasm_bindgen(js_name = pause)]
    pub fn pause(&mut self) -> Result<JsValue, JsValue> {
        self.session.pause();
        self.frame_value(Vec::new())
    }

    #[wasm_bindgen(js_name = resume)]
    pub fn resume(&mut self) -> Result<JsValue, JsValue> {
        self.session.resume();
        self.frame_value(Vec::new())
    }

    #[wasm_bindgen(js_name = state)]
    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_value(&self.session.state()).map_err(|e| e.into())
    }

    /// Same snapshot as `state`, as a JSON string for worker messaging.
    #[wasm_bindgen(js_name = stateJson)]
    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.state()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Color and cell offsets for a piece index (0..=6, in `I J L O S Z T`
    /// order) and rotation index (0..=3).
    #[wasm_bindgen(js_name = pieceInfo)]
    pub fn piece_info(index: u8, rotation: u8) -> Result<JsValue, JsValue> {
        let kind = PieceKind::try_from(index)?;
        let rotation = Rotation::try_from(rotation)?;
        to_value(&PieceInfo::new(kind, rotation)).map_err(|e| e.into())
    }
}
