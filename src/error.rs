use thiserror::Error;
use wasm_bindgen::JsValue;

/// Contract violations. Gameplay rejections (blocked moves, top-outs) are
/// never reported through this type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid piece index {0} (expected 0..=6)")]
    InvalidPiece(u8),
    #[error("invalid rotation index {0} (expected 0..=3)")]
    InvalidRotation(u8),
    #[error("board must be between {min}x{min} and {max}x{max}, got {cols}x{rows}")]
    InvalidBoardSize {
        cols: usize,
        rows: usize,
        min: usize,
        max: usize,
    },
    #[error("lines per level must be at least 1")]
    InvalidLinesPerLevel,
}

impl From<EngineError> for JsValue {
    fn from(err: EngineError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}
