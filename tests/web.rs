// Browser tests: `wasm-pack test --headless --firefox`.
// Builds the page markup the game expects, then drives it through the
// exported entry point.
#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

const MARKUP: &str = r#"
<div id="game-container" style="position:relative;width:1200px;height:600px;">
  <div id="intro-screen"><button id="start-btn">Start</button></div>
  <div id="player" style="position:absolute;"></div>
  <div id="hats-container"></div>
  <div id="obstacles-container"></div>
  <span id="score">0</span><span id="time">60</span>
  <div id="win-message" style="display:none;"><button id="next-level-btn">Next</button></div>
  <div id="game-over" style="display:none;"><button id="restart-btn">Again</button></div>
</div>
<audio id="bg-music"></audio>
<audio id="collect-sound"></audio>
<audio id="win-sound"></audio>
"#;

fn mount() -> web_sys::Document {
    let doc = web_sys::window().unwrap().document().unwrap();
    doc.body().unwrap().set_inner_html(MARKUP);
    doc
}

#[wasm_bindgen_test]
fn start_button_spawns_hats_and_obstacles() {
    let doc = mount();
    suzu_hats::start_game().unwrap();
    doc.get_element_by_id("start-btn")
        .unwrap()
        .unchecked_into::<HtmlElement>()
        .click();

    let hats = doc.get_element_by_id("hats-container").unwrap();
    let obstacles = doc.get_element_by_id("obstacles-container").unwrap();
    assert_eq!(hats.child_element_count(), 3);
    assert_eq!(obstacles.child_element_count(), 4);
    assert_eq!(
        doc.get_element_by_id("time").unwrap().text_content().as_deref(),
        Some("60")
    );
    let intro: HtmlElement = doc.get_element_by_id("intro-screen").unwrap().unchecked_into();
    assert_eq!(intro.style().get_property_value("display").unwrap(), "none");
}

#[wasm_bindgen_test]
fn reinstalling_clears_the_previous_session() {
    let doc = mount();
    suzu_hats::start_game().unwrap();
    doc.get_element_by_id("start-btn")
        .unwrap()
        .unchecked_into::<HtmlElement>()
        .click();
    assert_eq!(
        doc.get_element_by_id("hats-container").unwrap().child_element_count(),
        3
    );

    suzu_hats::start_game().unwrap();
    let hats = doc.get_element_by_id("hats-container").unwrap();
    let obstacles = doc.get_element_by_id("obstacles-container").unwrap();
    assert_eq!(hats.child_element_count(), 0);
    assert_eq!(obstacles.child_element_count(), 0);
    let intro: HtmlElement = doc.get_element_by_id("intro-screen").unwrap().unchecked_into();
    assert_eq!(intro.style().get_property_value("display").unwrap(), "flex");

    // the new game starts cleanly from the same page
    doc.get_element_by_id("start-btn")
        .unwrap()
        .unchecked_into::<HtmlElement>()
        .click();
    assert_eq!(hats.child_element_count(), 3);
    assert_eq!(obstacles.child_element_count(), 4);
}

#[wasm_bindgen_test]
fn missing_markup_is_an_error() {
    let doc = web_sys::window().unwrap().document().unwrap();
    doc.body().unwrap().set_inner_html("");
    assert!(suzu_hats::start_game().is_err());
}
