//! A 2D scene and UI toolkit built in Rust
//!
//! This crate provides:
//! - Entities with a parent/child tree and a closed set of components
//!   composed under required/incompatible rules
//! - Transforms with alignment, relative mode and propagation to children
//! - Sprite animation playback
//! - Clickable areas, buttons, fill bars and text labels
//! - A path-keyed asset cache
//! - Lossless binary and XML serialization of every stateful object
//!
//! Pixel rendering and window input are left to collaborators behind the
//! [`renderer::RenderTarget`] and [`input::InputState`] traits.

pub mod animation;
pub mod assets;
pub mod core;
pub mod ecs;
pub mod input;
pub mod renderer;
pub mod serial;
pub mod ui;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::animation::{Animation, AnimationSet, Animator, Frame, PlaybackState};
    pub use crate::assets::{AssetCache, AssetHandle, AssetServer};
    pub use crate::core::{ClickEvent, Event, HoverEvent, SceneConfig, SceneError, Stage};
    pub use crate::ecs::{Component, ComponentError, ComponentKind, CompositionMode, Transform, World};
    pub use crate::input::{Input, InputState, Key, MouseButton};
    pub use crate::renderer::{DrawList, RenderTarget};
    pub use crate::serial::{BinarySerialize, SerialError, XmlSerialize};
    pub use crate::ui::{
        Button, Clickable, Color, FillBar, FillDirection, IntRect, Origin, Sprite, TextBox, ValueRange,
        View,
    };
    pub use glam::Vec2;
    pub use hecs::Entity;
}
