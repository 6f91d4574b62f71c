//! Input state module
//!
//! Keyboard, mouse and gamepad state consumed by interactive components.

mod state;

pub use state::{GamepadButton, Input, InputDevice, InputState, Key, MouseButton};
