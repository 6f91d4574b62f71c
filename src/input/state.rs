//! Input handling

use glam::Vec2;
use std::collections::HashSet;

/// Keyboard keys the toolkit reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Space,
    Escape,
    Tab,
    Up,
    Down,
    Left,
    Right,
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub(crate) const fn index(self) -> u8 {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Middle => 2,
        }
    }

    pub(crate) const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            2 => Some(Self::Middle),
            _ => None,
        }
    }
}

impl std::fmt::Display for MouseButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Middle => "Middle",
        })
    }
}

impl std::str::FromStr for MouseButton {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Left" => Ok(Self::Left),
            "Right" => Ok(Self::Right),
            "Middle" => Ok(Self::Middle),
            other => Err(format!("unknown mouse button '{other}'")),
        }
    }
}

/// Gamepad buttons (face buttons by position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadButton {
    South,
    East,
    West,
    North,
    Start,
}

/// Device that produced the most recent input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputDevice {
    #[default]
    Mouse,
    Keyboard,
    Gamepad,
}

/// Read-only view of the current frame's input.
///
/// Components query input through this trait during their update.
pub trait InputState {
    fn is_key_just_pressed(&self, key: Key) -> bool;
    fn is_mouse_just_pressed(&self, button: MouseButton) -> bool;
    fn is_mouse_down(&self, button: MouseButton) -> bool;
    fn is_gamepad_just_pressed(&self, button: GamepadButton) -> bool;
    /// Mouse position in world space
    fn mouse_position(&self) -> Vec2;
    /// Device that produced the most recent input
    fn last_device(&self) -> InputDevice;
}

/// Input state manager
#[derive(Debug, Default)]
pub struct Input {
    /// Currently pressed keys
    pressed_keys: HashSet<Key>,
    /// Keys that were just pressed this frame
    just_pressed_keys: HashSet<Key>,
    /// Currently pressed mouse buttons
    pressed_mouse_buttons: HashSet<MouseButton>,
    /// Mouse buttons just pressed this frame
    just_pressed_mouse_buttons: HashSet<MouseButton>,
    /// Gamepad buttons just pressed this frame
    just_pressed_gamepad: HashSet<GamepadButton>,
    /// Current mouse position
    mouse_position: Vec2,
    /// Most recently used device
    last_device: InputDevice,
}

impl Input {
    /// Create a new input manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the end of each frame to clear per-frame state
    pub fn update(&mut self) {
        self.just_pressed_keys.clear();
        self.just_pressed_mouse_buttons.clear();
        self.just_pressed_gamepad.clear();
    }

    /// Process a keyboard event
    pub fn process_keyboard(&mut self, key: Key, pressed: bool) {
        self.last_device = InputDevice::Keyboard;
        if pressed {
            if !self.pressed_keys.contains(&key) {
                self.just_pressed_keys.insert(key);
            }
            self.pressed_keys.insert(key);
        } else {
            self.pressed_keys.remove(&key);
        }
    }

    /// Process a mouse button event
    pub fn process_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        self.last_device = InputDevice::Mouse;
        if pressed {
            if !self.pressed_mouse_buttons.contains(&button) {
                self.just_pressed_mouse_buttons.insert(button);
            }
            self.pressed_mouse_buttons.insert(button);
        } else {
            self.pressed_mouse_buttons.remove(&button);
        }
    }

    /// Process mouse movement
    pub fn process_mouse_motion(&mut self, position: Vec2) {
        if position != self.mouse_position {
            self.last_device = InputDevice::Mouse;
        }
        self.mouse_position = position;
    }

    /// Process a gamepad button press
    pub fn process_gamepad_button(&mut self, button: GamepadButton) {
        self.last_device = InputDevice::Gamepad;
        self.just_pressed_gamepad.insert(button);
    }

    /// Check if a key is currently held
    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.pressed_keys.contains(&key)
    }
}

impl InputState for Input {
    fn is_key_just_pressed(&self, key: Key) -> bool {
        self.just_pressed_keys.contains(&key)
    }

    fn is_mouse_just_pressed(&self, button: MouseButton) -> bool {
        self.just_pressed_mouse_buttons.contains(&button)
    }

    fn is_mouse_down(&self, button: MouseButton) -> bool {
        self.pressed_mouse_buttons.contains(&button)
    }

    fn is_gamepad_just_pressed(&self, button: GamepadButton) -> bool {
        self.just_pressed_gamepad.contains(&button)
    }

    fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    fn last_device(&self) -> InputDevice {
        self.last_device
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_just_pressed_clears_on_update() {
        let mut input = Input::new();
        input.process_keyboard(Key::Enter, true);
        assert!(input.is_key_just_pressed(Key::Enter));
        assert!(input.is_key_pressed(Key::Enter));

        input.update();
        assert!(!input.is_key_just_pressed(Key::Enter));
        assert!(input.is_key_pressed(Key::Enter));
    }

    #[test]
    fn test_held_key_not_just_pressed_again() {
        let mut input = Input::new();
        input.process_keyboard(Key::Space, true);
        input.update();
        input.process_keyboard(Key::Space, true);
        assert!(!input.is_key_just_pressed(Key::Space));
    }

    #[test]
    fn test_last_device_tracking() {
        let mut input = Input::new();
        input.process_gamepad_button(GamepadButton::South);
        assert_eq!(input.last_device(), InputDevice::Gamepad);

        input.process_mouse_motion(Vec2::new(3.0, 4.0));
        assert_eq!(input.last_device(), InputDevice::Mouse);
        assert_eq!(input.mouse_position(), Vec2::new(3.0, 4.0));
    }
}
