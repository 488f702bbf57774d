//! Keyboard state with level-triggered and edge-triggered queries.
//!
//! - **Held:** `is_held(key)` is true every frame the key is physically down.
//!   Walking uses it.
//!
//! - **Pressed:** `is_just_pressed(key)` is true only for the frame the press
//!   arrived. Jumps, whip attacks, menu confirms and debug toggles use it.
//!   Pressed keys are cleared by `end_frame()`, which the app loop calls only
//!   after at least one fixed step consumed them, so a press that lands on a
//!   frame with zero steps is not lost.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    Escape,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    C,
    G,
    H,
    J,
    K,
    L,
    O,
    P,
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Press and release inside one step. Used by scripted input.
    pub fn tap(&mut self, key: Key) {
        self.just_pressed.insert(key);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    /// -1 for left, +1 for right, 0 when neither or both are held.
    pub fn horizontal_axis(&self) -> i32 {
        let mut axis = 0;
        if self.is_held(Key::Left) {
            axis -= 1;
        }
        if self.is_held(Key::Right) {
            axis += 1;
        }
        axis
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
    }

    /// Drop everything, including held keys. Used when focus is lost.
    pub fn clear(&mut self) {
        self.held.clear();
        self.end_frame();
    }
}
