//! Draw surface abstraction
//!
//! Components issue draw calls against a [`RenderTarget`]. Pixels are the
//! backend's business; [`DrawList`] records the calls for inspection.

use glam::Vec2;

use crate::ui::{Color, FloatRect, IntRect};

/// Anything that accepts sprite and text draw calls
pub trait RenderTarget {
    /// Draw the `source` region of `texture` stretched over `bounds`
    fn draw_sprite(&mut self, texture: &str, source: IntRect, bounds: FloatRect, color: Color);

    /// Draw `text` with its top-left corner at `position`
    fn draw_text(&mut self, text: &str, font: &str, character_size: u32, position: Vec2, color: Color);
}

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Sprite {
        texture: String,
        source: IntRect,
        bounds: FloatRect,
        color: Color,
    },
    Text {
        text: String,
        font: String,
        character_size: u32,
        position: Vec2,
        color: Color,
    },
}

/// Render target that records every call in order
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop recorded calls, e.g. at the start of a frame
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl RenderTarget for DrawList {
    fn draw_sprite(&mut self, texture: &str, source: IntRect, bounds: FloatRect, color: Color) {
        self.commands.push(DrawCommand::Sprite {
            texture: texture.to_string(),
            source,
            bounds,
            color,
        });
    }

    fn draw_text(&mut self, text: &str, font: &str, character_size: u32, position: Vec2, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            font: font.to_string(),
            character_size,
            position,
            color,
        });
    }
}
