//! Keyboard state as a plain value object.
//!
//! Browser listeners feed both `KeyboardEvent.key` and `KeyboardEvent.code`
//! into the same set, so bindings can name either form.
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Evaluation order within one frame.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step on each axis (-1/0/1).
    pub fn unit(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn bindings(self) -> &'static [&'static str] {
        match self {
            Direction::Up => &["ArrowUp", "KeyW"],
            Direction::Down => &["ArrowDown", "KeyS"],
            Direction::Left => &["ArrowLeft", "KeyA"],
            Direction::Right => &["ArrowRight", "KeyD"],
        }
    }
}

/// Codes whose default browser action (page scrolling) is suppressed.
pub const SCROLL_KEYS: [&str; 5] = ["Space", "ArrowUp", "ArrowDown", "ArrowLeft", "ArrowRight"];

pub fn suppresses_scroll(code: &str) -> bool {
    SCROLL_KEYS.contains(&code)
}

#[derive(Clone, Debug, Default)]
pub struct InputState {
    pressed: HashSet<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: &str, code: &str) {
        self.pressed.insert(key.to_owned());
        self.pressed.insert(code.to_owned());
    }

    pub fn release(&mut self, key: &str, code: &str) {
        self.pressed.remove(key);
        self.pressed.remove(code);
    }

    pub fn is_pressed(&self, ident: &str) -> bool {
        self.pressed.contains(ident)
    }

    pub fn is_held(&self, dir: Direction) -> bool {
        dir.bindings().iter().any(|b| self.is_pressed(b))
    }

    /// Held directions in frame evaluation order.
    pub fn held(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(|d| self.is_held(*d))
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_and_code_both_bind() {
        let mut input = InputState::new();
        input.press("w", "KeyW");
        assert!(input.is_held(Direction::Up));
        input.release("w", "KeyW");
        assert!(!input.is_held(Direction::Up));

        input.press("ArrowLeft", "ArrowLeft");
        assert!(input.is_held(Direction::Left));
        assert!(!input.is_held(Direction::Right));
    }

    #[test]
    fn test_held_preserves_frame_order() {
        let mut input = InputState::new();
        input.press("ArrowRight", "ArrowRight");
        input.press("ArrowUp", "ArrowUp");
        let held: Vec<_> = input.held().collect();
        assert_eq!(held, vec![Direction::Up, Direction::Right]);
    }

    #[test]
    fn test_unknown_keys_are_harmless() {
        let mut input = InputState::new();
        input.press("q", "KeyQ");
        assert_eq!(input.held().count(), 0);
        input.release("Nope", "Nope");
        assert!(input.is_pressed("KeyQ"));
    }

    #[test]
    fn test_scroll_filter() {
        assert!(suppresses_scroll("Space"));
        assert!(suppresses_scroll("ArrowDown"));
        assert!(!suppresses_scroll("KeyS"));
    }
}
