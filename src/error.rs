use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::arena::Cue;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("no window")]
    NoWindow,
    #[error("no document")]
    NoDocument,
    #[error("missing element #{0}")]
    MissingElement(&'static str),
    #[error("could not play {cue:?}: {reason}")]
    Audio { cue: Cue, reason: String },
    #[error("javascript error: {0}")]
    Js(String),
    #[error("invalid level: {0}")]
    Level(String),
}

impl From<JsValue> for GameError {
    fn from(value: JsValue) -> Self {
        GameError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<GameError> for JsValue {
    fn from(err: GameError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
