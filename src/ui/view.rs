//! Active viewport rectangle

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::FloatRect;

/// 2D camera rectangle described by its center and size.
///
/// Relative transforms resolve their absolute position against
/// [`View::origin`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct View {
    /// Center of the view in world space
    pub center: Vec2,
    /// Visible extent in world units
    pub size: Vec2,
}

impl View {
    #[must_use]
    pub const fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    /// View whose top-left corner sits at the world origin
    #[must_use]
    pub fn from_size(size: Vec2) -> Self {
        Self::new(size * 0.5, size)
    }

    /// Top-left corner in world space
    #[must_use]
    pub fn origin(&self) -> Vec2 {
        self.center - self.size * 0.5
    }

    /// Visible area in world space
    #[must_use]
    pub fn viewport(&self) -> FloatRect {
        FloatRect::from_position_size(self.origin(), self.size)
    }

    /// Move the view by `delta`
    pub fn pan(&mut self, delta: Vec2) {
        self.center += delta;
    }
}

impl Default for View {
    fn default() -> Self {
        Self::from_size(Vec2::new(1280.0, 720.0))
    }
}
