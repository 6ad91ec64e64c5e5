//! Browser glue: DOM rendering, `<audio>` cues, listeners and the frame pump.
//!
//! The page supplies the markup (ids below); this module only positions and
//! toggles existing elements and creates the hat / obstacle divs.
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlAudioElement, HtmlElement, window};

use crate::arena::geometry::{Point, Rect, Size};
use crate::arena::input::suppresses_scroll;
use crate::arena::{
    Cue, Display, EntityId, EntityKind, Flag, Game, LevelDesc, Panel, Sounds, Surface,
};
use crate::error::GameError;

/// Keeps the countdown and deferred effects running while rAF is throttled
/// (hidden tab). Does not move the player.
const PUMP_INTERVAL_MS: i32 = 250;

fn element(doc: &Document, id: &'static str) -> Result<HtmlElement, GameError> {
    doc.get_element_by_id(id)
        .ok_or(GameError::MissingElement(id))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| GameError::MissingElement(id))
}

fn px(v: i32) -> String {
    format!("{v}px")
}

fn place(el: &HtmlElement, rect: Rect) {
    let style = el.style();
    style.set_property("left", &px(rect.left())).ok();
    style.set_property("top", &px(rect.top())).ok();
    style.set_property("width", &px(rect.size.width)).ok();
    style.set_property("height", &px(rect.size.height)).ok();
}

// --- Surface -------------------------------------------------------------------

pub struct DomSurface {
    doc: Document,
    container: HtmlElement,
    player: HtmlElement,
    hats_layer: HtmlElement,
    obstacles_layer: HtmlElement,
    score: HtmlElement,
    time: HtmlElement,
    intro: HtmlElement,
    win: HtmlElement,
    game_over: HtmlElement,
    entities: HashMap<EntityId, HtmlElement>,
}

impl DomSurface {
    pub fn new(doc: &Document) -> Result<Self, GameError> {
        Ok(Self {
            doc: doc.clone(),
            container: element(doc, "game-container")?,
            player: element(doc, "player")?,
            hats_layer: element(doc, "hats-container")?,
            obstacles_layer: element(doc, "obstacles-container")?,
            score: element(doc, "score")?,
            time: element(doc, "time")?,
            intro: element(doc, "intro-screen")?,
            win: element(doc, "win-message")?,
            game_over: element(doc, "game-over")?,
            entities: HashMap::new(),
        })
    }

    fn create(&self, id: EntityId, class: &str, rect: Rect) -> Result<HtmlElement, GameError> {
        let el: HtmlElement = self.doc.create_element("div")?.unchecked_into();
        el.set_class_name(class);
        el.set_attribute("data-id", &id.0.to_string())?;
        place(&el, rect);
        Ok(el)
    }
}

impl Surface for DomSurface {
    fn arena_size(&self) -> Size {
        Size::new(self.container.offset_width(), self.container.offset_height())
    }

    fn spawn(&mut self, id: EntityId, kind: EntityKind, rect: Rect) {
        let (class, layer) = match kind {
            EntityKind::Player => {
                place(&self.player, rect);
                self.entities.insert(id, self.player.clone());
                return;
            }
            EntityKind::Hat => ("hat", &self.hats_layer),
            EntityKind::Obstacle => ("obstacle", &self.obstacles_layer),
        };
        let created = self
            .create(id, class, rect)
            .and_then(|el| layer.append_child(&el).map(|_| el).map_err(GameError::from));
        match created {
            Ok(el) => {
                self.entities.insert(id, el);
            }
            Err(e) => log::error!("could not create {class} {id:?}: {e}"),
        }
    }

    fn set_position(&mut self, id: EntityId, pos: Point) {
        if let Some(el) = self.entities.get(&id) {
            let style = el.style();
            style.set_property("left", &px(pos.x)).ok();
            style.set_property("top", &px(pos.y)).ok();
        }
    }

    fn set_flag(&mut self, id: EntityId, flag: Flag, on: bool) {
        let class = match flag {
            Flag::Moving => "moving",
            Flag::Collected => "collected",
        };
        if let Some(el) = self.entities.get(&id) {
            el.class_list().toggle_with_force(class, on).ok();
        }
    }

    fn despawn(&mut self, id: EntityId) {
        if let Some(el) = self.entities.remove(&id) {
            el.remove();
        }
    }

    fn set_text(&mut self, display: Display, text: &str) {
        let el = match display {
            Display::Score => &self.score,
            Display::Time => &self.time,
        };
        el.set_text_content(Some(text));
    }

    fn set_visible(&mut self, panel: Panel, visible: bool) {
        let (el, shown) = match panel {
            Panel::Intro => (&self.intro, "flex"),
            Panel::Win => (&self.win, "block"),
            Panel::GameOver => (&self.game_over, "block"),
        };
        el.style()
            .set_property("display", if visible { shown } else { "none" })
            .ok();
    }

    fn navigate(&mut self, page: &str) {
        let result = window()
            .ok_or(GameError::NoWindow)
            .and_then(|w| w.location().set_href(page).map_err(GameError::from));
        if let Err(e) = result {
            log::error!("navigation to {page} failed: {e}");
        }
    }
}

// --- Sounds --------------------------------------------------------------------

struct Channel {
    audio: HtmlAudioElement,
    // Autoplay rejections arrive asynchronously through the play() promise.
    on_reject: Closure<dyn FnMut(JsValue)>,
}

impl Channel {
    fn new(doc: &Document, id: &'static str, cue: Cue) -> Result<Self, GameError> {
        let audio = doc
            .get_element_by_id(id)
            .ok_or(GameError::MissingElement(id))?
            .dyn_into::<HtmlAudioElement>()
            .map_err(|_| GameError::MissingElement(id))?;
        let on_reject = Closure::wrap(Box::new(move |err: JsValue| {
            log::warn!("audio play failed for {cue:?}: {err:?}");
        }) as Box<dyn FnMut(JsValue)>);
        Ok(Self { audio, on_reject })
    }
}

pub struct DomSounds {
    ambient: Channel,
    chime: Channel,
    fanfare: Channel,
}

impl DomSounds {
    pub fn new(doc: &Document) -> Result<Self, GameError> {
        Ok(Self {
            ambient: Channel::new(doc, "bg-music", Cue::Ambient)?,
            chime: Channel::new(doc, "collect-sound", Cue::Chime)?,
            fanfare: Channel::new(doc, "win-sound", Cue::Fanfare)?,
        })
    }

    fn channel(&self, cue: Cue) -> &Channel {
        match cue {
            Cue::Ambient => &self.ambient,
            Cue::Chime => &self.chime,
            Cue::Fanfare => &self.fanfare,
        }
    }
}

impl Sounds for DomSounds {
    fn set_volume(&mut self, cue: Cue, volume: f64) {
        self.channel(cue).audio.set_volume(volume.clamp(0.0, 1.0));
    }

    fn play(&mut self, cue: Cue, restart: bool) -> Result<(), GameError> {
        let ch = self.channel(cue);
        if restart {
            ch.audio.set_current_time(0.0);
        }
        let promise = ch.audio.play().map_err(|e| GameError::Audio {
            cue,
            reason: format!("{e:?}"),
        })?;
        let _ = promise.catch(&ch.on_reject);
        Ok(())
    }
}

// --- Driver --------------------------------------------------------------------

pub type WebGame = Game<DomSurface, DomSounds>;

thread_local! {
    static GAME: RefCell<Option<WebGame>> = const { RefCell::new(None) };
    static FRAME: RefCell<Option<Closure<dyn FnMut(f64)>>> = const { RefCell::new(None) };
    static FRAME_ARMED: Cell<bool> = const { Cell::new(false) };
}

/// Runs `f` against the installed game, if any.
pub fn with_game<R>(f: impl FnOnce(&mut WebGame) -> R) -> Option<R> {
    GAME.with(|cell| cell.borrow_mut().as_mut().map(f))
}

const BUTTONS: [(&str, fn(&mut WebGame)); 3] = [
    ("start-btn", |g| {
        g.start();
    }),
    ("restart-btn", |g| {
        g.restart();
    }),
    ("next-level-btn", |g| {
        g.advance_level();
    }),
];

fn now_ms() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Builds the game for the current page. The first call also wires listeners
/// and the frame loop. Later calls tear the previous game off the page and
/// swap in the new level.
pub fn install(level: LevelDesc) -> Result<(), GameError> {
    let win = window().ok_or(GameError::NoWindow)?;
    let doc = win.document().ok_or(GameError::NoDocument)?;
    let game = Game::new(
        level,
        DomSurface::new(&doc)?,
        DomSounds::new(&doc)?,
        now_ms(),
    );
    // buttons are resolved per click, but the page must have them
    for id in BUTTONS.iter().map(|(id, _)| *id) {
        element(&doc, id)?;
    }
    with_game(|old| old.teardown());
    let replaced = GAME.with(|cell| cell.replace(Some(game)).is_some());
    if replaced {
        log::debug!("game replaced; listeners already installed");
        return Ok(());
    }

    // Buttons, delegated so a re-rendered page keeps working
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            let Some(target) = evt.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            for (id, action) in BUTTONS {
                if let Ok(Some(_)) = target.closest(&format!("#{id}")) {
                    with_game(action);
                    ensure_frame_loop();
                    return;
                }
            }
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Keyboard state
    {
        let down = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            with_game(|g| g.press(&evt.key(), &evt.code()));
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keydown", down.as_ref().unchecked_ref())?;
        down.forget();

        let up = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            with_game(|g| g.release(&evt.key(), &evt.code()));
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keyup", up.as_ref().unchecked_ref())?;
        up.forget();
    }
    // Arrow keys / space must not scroll the page
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            if suppresses_scroll(&evt.code()) {
                evt.prevent_default();
            }
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    // Timer pump
    {
        let closure = Closure::wrap(Box::new(move || {
            let now = now_ms();
            with_game(|g| {
            if !g.is_idle() {
                g.pump_to(now);
            }
        });
        }) as Box<dyn FnMut()>);
        win.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            PUMP_INTERVAL_MS,
        )?;
        closure.forget();
    }

    ensure_frame_loop();
    log::info!("suzu-hats installed");
    Ok(())
}

fn request_frame() {
    let requested = FRAME.with(|slot| match (window(), slot.borrow().as_ref()) {
        (Some(w), Some(cb)) => w.request_animation_frame(cb.as_ref().unchecked_ref()).is_ok(),
        _ => false,
    });
    FRAME_ARMED.with(|armed| armed.set(requested));
}

/// Arms the rAF loop unless a frame is already queued. The loop parks itself
/// once the game is idle; button actions call this to wake it again.
fn ensure_frame_loop() {
    if FRAME_ARMED.with(Cell::get) {
        return;
    }
    FRAME.with(|slot| {
        slot.borrow_mut().get_or_insert_with(|| {
            Closure::wrap(Box::new(move |ts: f64| {
                FRAME_ARMED.with(|armed| armed.set(false));
                let busy = with_game(|game| {
                    game.advance_to(ts);
                    !game.is_idle()
                });
                if busy.unwrap_or(false) {
                    request_frame();
                }
            }) as Box<dyn FnMut(f64)>)
        });
    });
    request_frame();
}
