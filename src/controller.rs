//! Controller input handling
//!
//! Host key events are folded into the 8-bit button mask the engine reads
//! for player one.

use std::collections::HashSet;

/// Standard controller buttons, valued by their bit in the mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Button {
    Right = 0x01,
    Left = 0x02,
    Down = 0x04,
    Up = 0x08,
    Start = 0x10,
    Select = 0x20,
    B = 0x40,
    A = 0x80,
}

impl Button {
    pub fn bit(self) -> u8 {
        self as u8
    }
}

/// Host keyboard key, independent of the windowing toolkit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Return,
    ShiftLeft,
    ShiftRight,
    Space,
    Escape,
    Tab,
    /// Printable key, lowercase
    Char(char),
}

/// Default player one bindings
pub const KEY_MAP: [(Key, Button); 8] = [
    (Key::Right, Button::Right),
    (Key::Left, Button::Left),
    (Key::Down, Button::Down),
    (Key::Up, Button::Up),
    (Key::Return, Button::Start),
    (Key::ShiftLeft, Button::Select),
    (Key::Char('x'), Button::B),
    (Key::Char('z'), Button::A),
];

/// Tracks held keys and the button mask derived from them
#[derive(Debug, Clone)]
pub struct Controller {
    map: &'static [(Key, Button)],
    held: HashSet<Key>,
    bitmask: u8,
}

impl Controller {
    pub fn new() -> Self {
        Self::with_map(&KEY_MAP)
    }

    /// Build a controller over a custom binding table. Each key should map to
    /// a distinct button.
    pub fn with_map(map: &'static [(Key, Button)]) -> Self {
        Self {
            map,
            held: HashSet::new(),
            bitmask: 0,
        }
    }

    /// Button bound to `key`, if any
    pub fn button_for(&self, key: Key) -> Option<Button> {
        self.map
            .iter()
            .find_map(|&(k, button)| (k == key).then_some(button))
    }

    /// Handle a key press. Returns true if the held set changed.
    pub fn key_down(&mut self, key: Key) -> bool {
        if self.button_for(key).is_none() || !self.held.insert(key) {
            return false;
        }
        self.update_bitmask();
        true
    }

    /// Handle a key release. Returns true if the held set changed.
    pub fn key_up(&mut self, key: Key) -> bool {
        if self.button_for(key).is_none() || !self.held.remove(&key) {
            return false;
        }
        self.update_bitmask();
        true
    }

    /// Mask of all held buttons
    pub fn bitmask(&self) -> u8 {
        self.bitmask
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    fn update_bitmask(&mut self) {
        self.bitmask = self
            .held
            .iter()
            .filter_map(|&key| self.button_for(key))
            .fold(0, |mask, button| mask | button.bit());
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}
