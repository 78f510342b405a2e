//! Keyboard input
//!
//! Presses are one-shot: a screen that reads a key consumes it, and whatever
//! nobody read is dropped at the end of the tick.

use std::collections::HashSet;

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Escape,
    Space,
    H,
    W,
    A,
    S,
    D,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

impl Key {
    /// Map a key name (as typed on a command line or sent by a host)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "enter" | "return" => Some(Key::Enter),
            "escape" | "esc" => Some(Key::Escape),
            "space" | " " => Some(Key::Space),
            "h" => Some(Key::H),
            "w" => Some(Key::W),
            "a" => Some(Key::A),
            "s" => Some(Key::S),
            "d" => Some(Key::D),
            "arrowup" | "up" => Some(Key::ArrowUp),
            "arrowdown" | "down" => Some(Key::ArrowDown),
            "arrowleft" | "left" => Some(Key::ArrowLeft),
            "arrowright" | "right" => Some(Key::ArrowRight),
            _ => None,
        }
    }
}

/// Keys pressed since the last tick
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pressed: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.pressed.insert(key);
    }

    /// True once per press: reading consumes it
    pub fn is_key_pressed(&mut self, key: Key) -> bool {
        self.pressed.remove(&key)
    }

    /// Consume whichever of `keys` was pressed
    pub fn any_pressed(&mut self, keys: &[Key]) -> bool {
        // No short-circuit: every alias is consumed
        keys.iter().fold(false, |hit, key| self.is_key_pressed(*key) || hit)
    }

    /// Drop unread presses (end of tick)
    pub fn clear(&mut self) {
        self.pressed.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_is_consumed() {
        let mut input = InputState::new();
        input.press(Key::Enter);
        assert!(input.is_key_pressed(Key::Enter));
        assert!(!input.is_key_pressed(Key::Enter));
    }

    #[test]
    fn test_any_pressed_consumes_aliases() {
        let mut input = InputState::new();
        input.press(Key::W);
        input.press(Key::ArrowUp);
        assert!(input.any_pressed(&[Key::W, Key::ArrowUp]));
        assert!(input.is_empty());
        assert!(!input.any_pressed(&[Key::W, Key::ArrowUp]));
    }

    #[test]
    fn test_clear_drops_unread() {
        let mut input = InputState::new();
        input.press(Key::Space);
        input.clear();
        assert!(!input.is_key_pressed(Key::Space));
    }

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("Esc"), Some(Key::Escape));
        assert_eq!(Key::from_name("left"), Some(Key::ArrowLeft));
        assert_eq!(Key::from_name("F13"), None);
    }
}
