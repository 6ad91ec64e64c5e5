//! Arena gameplay: Suzu walks around a bounded arena and picks up hats before
//! the countdown runs out.
//!
//! The controller here is renderer-agnostic. Everything visual goes through
//! [`Surface`], every sound through [`Sounds`], and all timing through the
//! virtual [`Scheduler`](clock::Scheduler), so a whole session can be played
//! in a unit test by feeding key presses and advancing time.
//!
//! Lifecycle: `Intro -> Running -> (Won | TimedOut)`. `TimedOut` only leaves
//! through [`Game::restart`], `Won` only through [`Game::advance_level`].

pub mod clock;
pub mod geometry;
pub mod input;
mod level1;

pub use level1::level1;

use crate::error::GameError;
use clock::{Scheduler, Task, TimerId};
use geometry::{Point, Rect, Size};
use input::InputState;

// --- Timings (milliseconds) --------------------------------------------------

pub const COUNTDOWN_PERIOD_MS: f64 = 1_000.0;
pub const MOVING_CLEAR_MS: f64 = 100.0;
pub const HAT_REMOVAL_MS: f64 = 500.0;
pub const WIN_REVEAL_MS: f64 = 1_000.0;
pub const GAME_OVER_REVEAL_MS: f64 = 500.0;

// --- Entities ------------------------------------------------------------------

/// Stable handle for anything the renderer draws. Never reused within a `Game`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Hat,
    Obstacle,
}

/// Transient visual states toggled on an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flag {
    Moving,
    Collected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Display {
    Score,
    Time,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Panel {
    Intro,
    Win,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Ambient,
    Chime,
    Fanfare,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hat {
    pub id: EntityId,
    pub rect: Rect,
    pub collected: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Obstacle {
    pub id: EntityId,
    pub rect: Rect,
}

// --- Boundaries ----------------------------------------------------------------

/// Rendering adapter. Implementations ignore ids they do not know.
pub trait Surface {
    fn arena_size(&self) -> Size;
    fn spawn(&mut self, id: EntityId, kind: EntityKind, rect: Rect);
    fn set_position(&mut self, id: EntityId, pos: Point);
    fn set_flag(&mut self, id: EntityId, flag: Flag, on: bool);
    fn despawn(&mut self, id: EntityId);
    fn set_text(&mut self, display: Display, text: &str);
    fn set_visible(&mut self, panel: Panel, visible: bool);
    fn navigate(&mut self, page: &str);
}

pub trait Sounds {
    fn set_volume(&mut self, cue: Cue, volume: f64);
    /// `restart` rewinds the cue to 0 before playing.
    fn play(&mut self, cue: Cue, restart: bool) -> Result<(), GameError>;
}

// --- Level ---------------------------------------------------------------------

/// What happens to a displacement that would push the player out of the arena.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgePolicy {
    /// Drop the step on that axis; the player stays put.
    #[default]
    Reject,
    /// Pin the player to the arena edge.
    Clamp,
}

/// Level descriptor (immutable once a session starts).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelDesc {
    pub name: String,
    pub player_start: Point,
    pub player_size: Size,
    pub player_speed: i32, // px per frame per held direction
    pub hat_size: Size,
    pub hats: Vec<Point>,
    pub obstacles: Vec<Rect>,
    pub time_limit_s: u32,
    pub hats_to_win: u32,
    pub ambient_volume: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub edge_policy: EdgePolicy,
    #[cfg_attr(feature = "serde", serde(default))]
    pub next_page: Option<String>,
}

impl LevelDesc {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.hats_to_win == 0 || self.hats_to_win as usize > self.hats.len() {
            return Err(GameError::Level(format!(
                "hats_to_win {} with {} hats",
                self.hats_to_win,
                self.hats.len()
            )));
        }
        if self.time_limit_s == 0 {
            return Err(GameError::Level("time_limit_s must be positive".into()));
        }
        let sizes = [("player_size", self.player_size), ("hat_size", self.hat_size)]
            .into_iter()
            .chain(self.obstacles.iter().map(|o| ("obstacle", o.size)));
        for (what, size) in sizes {
            if size.width <= 0 || size.height <= 0 {
                return Err(GameError::Level(format!("{what} must be positive, got {size:?}")));
            }
        }
        if self.player_speed <= 0 {
            return Err(GameError::Level("player_speed must be positive".into()));
        }
        Ok(())
    }

    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let level: LevelDesc =
            serde_json::from_str(json).map_err(|e| GameError::Level(e.to_string()))?;
        level.validate()?;
        Ok(level)
    }
}

// --- State ---------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    Intro,
    Running,
    Won,
    TimedOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameState {
    pub score: u32,
    pub time_remaining: u32,
    pub active: bool,
    pub player: Point,
}

/// Read-only view handed to the page (JSON under the `serde_json` feature).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    pub phase: Phase,
    pub score: u32,
    pub time_remaining: u32,
    pub active: bool,
    pub player: Point,
    pub hats_left: u32,
}

const PLAYER: EntityId = EntityId(0);

/// Game loop controller. Owns the session state and both adapters.
pub struct Game<S: Surface, A: Sounds> {
    level: LevelDesc,
    surface: S,
    sounds: A,
    phase: Phase,
    state: GameState,
    input: InputState,
    clock: Scheduler,
    countdown: Option<TimerId>,
    moving_clear: Option<TimerId>,
    hats: Vec<Hat>,
    obstacles: Vec<Obstacle>,
    next_entity: u32,
}

impl<S: Surface, A: Sounds> Game<S, A> {
    pub fn new(level: LevelDesc, surface: S, sounds: A, now_ms: f64) -> Self {
        let state = GameState {
            score: 0,
            time_remaining: level.time_limit_s,
            active: false,
            player: level.player_start,
        };
        Self {
            level,
            surface,
            sounds,
            phase: Phase::Intro,
            state,
            input: InputState::new(),
            clock: Scheduler::new(now_ms),
            countdown: None,
            moving_clear: None,
            hats: Vec::new(),
            obstacles: Vec::new(),
            next_entity: PLAYER.0 + 1,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn state(&self) -> &GameState {
        &self.state
    }
    pub fn hats(&self) -> &[Hat] {
        &self.hats
    }
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }
    pub fn surface(&self) -> &S {
        &self.surface
    }
    pub fn sounds(&self) -> &A {
        &self.sounds
    }
    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    pub fn player_rect(&self) -> Rect {
        Rect::at(self.state.player, self.level.player_size)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            score: self.state.score,
            time_remaining: self.state.time_remaining,
            active: self.state.active,
            player: self.state.player,
            hats_left: self.hats.iter().filter(|h| !h.collected).count() as u32,
        }
    }

    // --- Input -----------------------------------------------------------------

    pub fn press(&mut self, key: &str, code: &str) {
        self.input.press(key, code);
    }

    pub fn release(&mut self, key: &str, code: &str) {
        self.input.release(key, code);
    }

    // --- Lifecycle -------------------------------------------------------------

    /// Intro -> Running.
    pub fn start(&mut self) -> bool {
        if self.phase != Phase::Intro {
            log::debug!("start ignored in {:?}", self.phase);
            return false;
        }
        self.surface.set_visible(Panel::Intro, false);
        self.begin_session();
        true
    }

    /// TimedOut -> Running.
    pub fn restart(&mut self) -> bool {
        if self.phase != Phase::TimedOut {
            log::debug!("restart ignored in {:?}", self.phase);
            return false;
        }
        self.surface.set_visible(Panel::GameOver, false);
        self.begin_session();
        true
    }

    /// Won -> Intro, then hands off to the next page if the level names one.
    pub fn advance_level(&mut self) -> bool {
        if self.phase != Phase::Won {
            log::debug!("advance_level ignored in {:?}", self.phase);
            return false;
        }
        self.clock.clear();
        self.countdown = None;
        self.moving_clear = None;
        self.surface.set_visible(Panel::Win, false);
        self.surface.set_visible(Panel::Intro, true);
        self.phase = Phase::Intro;
        if let Some(page) = self.level.next_page.clone() {
            log::info!("advancing to {page}");
            self.surface.navigate(&page);
        }
        true
    }

    /// Nothing left to animate: the session is over and no deferred task
    /// is pending. The browser frame loop parks itself on this.
    pub fn is_idle(&self) -> bool {
        !self.state.active && self.clock.pending() == 0
    }

    /// Removes everything this game put on screen and returns the page to
    /// the intro panel. Used before another game takes over the surface.
    pub fn teardown(&mut self) {
        self.clock.clear();
        self.countdown = None;
        self.moving_clear = None;
        self.input.clear();
        for hat in self.hats.drain(..) {
            self.surface.despawn(hat.id);
        }
        for obstacle in self.obstacles.drain(..) {
            self.surface.despawn(obstacle.id);
        }
        self.surface.set_flag(PLAYER, Flag::Moving, false);
        self.surface.set_visible(Panel::Win, false);
        self.surface.set_visible(Panel::GameOver, false);
        self.surface.set_visible(Panel::Intro, true);
        self.state.active = false;
        self.phase = Phase::Intro;
    }

    fn begin_session(&mut self) {
        // Deferred work from a previous session must not leak into this one.
        self.clock.clear();
        self.countdown = None;
        self.moving_clear = None;
        for hat in self.hats.drain(..) {
            self.surface.despawn(hat.id);
        }
        for obstacle in self.obstacles.drain(..) {
            self.surface.despawn(obstacle.id);
        }

        self.state = GameState {
            score: 0,
            time_remaining: self.level.time_limit_s,
            active: true,
            player: self.level.player_start,
        };
        self.phase = Phase::Running;

        let player = self.player_rect();
        self.surface.spawn(PLAYER, EntityKind::Player, player);
        self.surface.set_flag(PLAYER, Flag::Moving, false);
        self.surface.set_text(Display::Score, &self.state.score.to_string());
        let time = self.state.time_remaining.to_string();
        self.surface.set_text(Display::Time, &time);

        for i in 0..self.level.hats.len() {
            let rect = Rect::at(self.level.hats[i], self.level.hat_size);
            let id = self.alloc_id();
            self.surface.spawn(id, EntityKind::Hat, rect);
            self.hats.push(Hat {
                id,
                rect,
                collected: false,
            });
        }
        for i in 0..self.level.obstacles.len() {
            let rect = self.level.obstacles[i];
            let id = self.alloc_id();
            self.surface.spawn(id, EntityKind::Obstacle, rect);
            self.obstacles.push(Obstacle { id, rect });
        }

        self.countdown = Some(self.clock.schedule_every(COUNTDOWN_PERIOD_MS, Task::Countdown));

        self.sounds.set_volume(Cue::Ambient, self.level.ambient_volume);
        self.cue(Cue::Ambient, false);
        log::info!(
            "session started: {} ({} hats, {}s)",
            self.level.name,
            self.hats.len(),
            self.state.time_remaining
        );
    }

    fn alloc_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }

    // --- Time ------------------------------------------------------------------

    /// Runs every deferred task due by `now_ms`, then one movement frame.
    pub fn advance_to(&mut self, now_ms: f64) {
        self.pump_to(now_ms);
        self.frame();
    }

    /// Runs due tasks only (countdown, reveals, removals).
    pub fn pump_to(&mut self, now_ms: f64) {
        while let Some(task) = self.clock.pop_due(now_ms) {
            self.run(task);
        }
    }

    pub fn advance_by(&mut self, ms: f64) {
        let target = self.clock.now_ms() + ms;
        self.advance_to(target);
    }

    fn run(&mut self, task: Task) {
        match task {
            Task::Countdown => self.countdown_tick(),
            Task::ClearMoving => {
                self.moving_clear = None;
                self.surface.set_flag(PLAYER, Flag::Moving, false);
            }
            Task::RemoveHat(id) => {
                self.hats.retain(|h| !(h.id == id && h.collected));
                self.surface.despawn(id);
            }
            Task::RevealWin => self.surface.set_visible(Panel::Win, true),
            Task::RevealGameOver => self.surface.set_visible(Panel::GameOver, true),
        }
    }

    /// One animation frame: apply held directions, then check hats against
    /// the updated position.
    pub fn frame(&mut self) {
        if !self.state.active {
            return;
        }
        let speed = self.level.player_speed;
        let held: Vec<_> = self.input.held().collect();
        for dir in held {
            let (ux, uy) = dir.unit();
            self.move_player(ux * speed, uy * speed);
        }
        self.check_hats();
    }

    pub fn move_player(&mut self, dx: i32, dy: i32) {
        if !self.state.active {
            return;
        }
        let arena = self.surface.arena_size();
        let size = self.level.player_size;
        let policy = self.level.edge_policy;
        let pos = self.state.player;
        self.state.player = Point::new(
            step_axis(pos.x, dx, arena.width.saturating_sub(size.width), policy),
            step_axis(pos.y, dy, arena.height.saturating_sub(size.height), policy),
        );
        self.surface.set_position(PLAYER, self.state.player);

        // debounce: each move pushes the clear back
        self.surface.set_flag(PLAYER, Flag::Moving, true);
        if let Some(pending) = self.moving_clear.take() {
            self.clock.cancel(pending);
        }
        self.moving_clear = Some(self.clock.schedule_once(MOVING_CLEAR_MS, Task::ClearMoving));
    }

    fn check_hats(&mut self) {
        let player = self.player_rect();
        let touching: Vec<EntityId> = self
            .hats
            .iter()
            .filter(|h| !h.collected && player.overlaps(&h.rect))
            .map(|h| h.id)
            .collect();
        for id in touching {
            self.collect(id);
        }
    }

    /// Returns true only when this call actually picked the hat up.
    pub fn collect(&mut self, id: EntityId) -> bool {
        if !self.state.active {
            return false;
        }
        let Some(hat) = self.hats.iter_mut().find(|h| h.id == id) else {
            return false;
        };
        if hat.collected {
            return false;
        }
        hat.collected = true;
        self.state.score += 1;
        log::debug!("hat {:?} collected, score {}", id, self.state.score);

        self.surface.set_text(Display::Score, &self.state.score.to_string());
        self.surface.set_flag(id, Flag::Collected, true);
        self.cue(Cue::Chime, true);
        self.clock.schedule_once(HAT_REMOVAL_MS, Task::RemoveHat(id));

        if self.state.score >= self.level.hats_to_win {
            self.win();
        }
        true
    }

    pub fn countdown_tick(&mut self) {
        if !self.state.active {
            return;
        }
        self.state.time_remaining = self.state.time_remaining.saturating_sub(1);
        let time = self.state.time_remaining.to_string();
        self.surface.set_text(Display::Time, &time);
        if self.state.time_remaining == 0 {
            self.lose();
        }
    }

    fn end_session(&mut self, phase: Phase) {
        self.state.active = false;
        self.phase = phase;
        if let Some(id) = self.countdown.take() {
            self.clock.cancel(id);
        }
    }

    fn win(&mut self) {
        self.end_session(Phase::Won);
        log::info!("won with {}s left", self.state.time_remaining);
        self.cue(Cue::Fanfare, false);
        self.clock.schedule_once(WIN_REVEAL_MS, Task::RevealWin);
    }

    fn lose(&mut self) {
        self.end_session(Phase::TimedOut);
        log::info!("timed out with score {}", self.state.score);
        self.clock.schedule_once(GAME_OVER_REVEAL_MS, Task::RevealGameOver);
    }

    fn cue(&mut self, cue: Cue, restart: bool) {
        if let Err(e) = self.sounds.play(cue, restart) {
            log::warn!("audio play failed: {e}");
        }
    }
}

fn step_axis(cur: i32, delta: i32, max: i32, policy: EdgePolicy) -> i32 {
    let next = cur.saturating_add(delta);
    match policy {
        EdgePolicy::Reject => {
            if (0..=max).contains(&next) {
                next
            } else {
                cur
            }
        }
        EdgePolicy::Clamp => next.clamp(0, max.max(0)),
    }
}
