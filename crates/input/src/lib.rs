//! Keyboard input tracking and smoothed drone control axes.

pub mod processor;

pub use processor::*;

use std::collections::HashSet;

/// Manages input state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    /// Keys pressed this frame.
    keys_pressed: HashSet<KeyCode>,
    /// Keys released this frame.
    keys_released: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame state. Call at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_held.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
                self.keys_released.insert(key);
            }
        }
    }

    /// Shorthand for a key-down event.
    pub fn press(&mut self, key: KeyCode) {
        self.process_keyboard(key, ElementState::Pressed);
    }

    /// Shorthand for a key-up event.
    pub fn release(&mut self, key: KeyCode) {
        self.process_keyboard(key, ElementState::Released);
    }

    /// Release every held key (focus loss, respawn).
    pub fn release_all(&mut self) {
        let held: Vec<KeyCode> = self.keys_held.drain().collect();
        self.keys_released.extend(held);
    }

    // Query methods

    /// Check if a key is currently held.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if any of the given keys is held.
    pub fn is_any_held(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|k| self.keys_held.contains(k))
    }

    /// Check if a key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Check if a key was released this frame.
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }
}

// Re-export for convenience
pub use winit::event::ElementState;
pub use winit::keyboard::KeyCode;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_is_edge_triggered() {
        let mut input = InputState::new();
        input.press(KeyCode::KeyW);
        assert!(input.is_key_pressed(KeyCode::KeyW));
        assert!(input.is_key_held(KeyCode::KeyW));

        input.begin_frame();
        input.press(KeyCode::KeyW); // key repeat
        assert!(!input.is_key_pressed(KeyCode::KeyW));
        assert!(input.is_key_held(KeyCode::KeyW));
    }

    #[test]
    fn release_all_clears_held() {
        let mut input = InputState::new();
        input.press(KeyCode::KeyA);
        input.press(KeyCode::Space);
        input.release_all();
        assert!(!input.is_any_held(&[KeyCode::KeyA, KeyCode::Space]));
        assert!(input.is_key_released(KeyCode::Space));
    }
}
