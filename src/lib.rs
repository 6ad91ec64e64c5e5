//! Suzu vs The Hats core crate.
//!
//! Gameplay lives in [`arena`] and never touches the browser directly; the
//! `web` module adapts it to the page markup. `start_game()` is the entry
//! point called from JS once the DOM is ready.

use wasm_bindgen::prelude::*;

pub mod arena;
pub mod error;
mod web;

pub use arena::{Game, GameState, LevelDesc, Phase, level1};
pub use error::GameError;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    #[cfg(target_arch = "wasm32")]
    console_log::init_with_level(log::Level::Info).ok();
}

#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    web::install(level1().clone())?;
    Ok(())
}

/// Same as `start_game()` but with a level described in JSON.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_game_with_level(json: &str) -> Result<(), JsValue> {
    let level = LevelDesc::from_json(json)?;
    web::install(level)?;
    Ok(())
}

/// Current session as JSON, or `undefined` before `start_game()`.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn game_snapshot() -> Option<String> {
    web::with_game(|g| serde_json::to_string(&g.snapshot()).ok()).flatten()
}
