//! Textured quad stretched over the entity's transform bounds

use crate::ecs::registry::ComponentKind;
use crate::ecs::{Component, ComponentBase, ComponentType, Components, Transform, impl_component_any};
use crate::renderer::RenderTarget;
use crate::serial::xml::{self, XmlElement, XmlNode};
use crate::serial::{BinaryReader, BinarySerialize, BinaryWriter, SerialError, XmlSerialize};

use super::rect::{Color, IntRect};
use super::view::View;

/// Draws a region of a texture
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sprite {
    base: ComponentBase,
    /// Asset path of the texture; empty draws nothing
    texture: String,
    texture_rect: IntRect,
    color: Color,
}

impl Sprite {
    #[must_use]
    pub fn new(texture: impl Into<String>) -> Self {
        Self {
            texture: texture.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_rect(mut self, rect: IntRect) -> Self {
        self.texture_rect = rect;
        self
    }

    #[must_use]
    pub fn texture(&self) -> &str {
        &self.texture
    }

    pub fn set_texture(&mut self, texture: impl Into<String>) {
        self.texture = texture.into();
    }

    /// Source region inside the texture
    #[must_use]
    pub const fn texture_rect(&self) -> IntRect {
        self.texture_rect
    }

    pub fn set_texture_rect(&mut self, rect: IntRect) {
        self.texture_rect = rect;
    }

    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn read_binary(reader: &mut BinaryReader<'_>) -> Result<Self, SerialError> {
        Ok(Self {
            base: ComponentBase::read(reader)?,
            texture: reader.read_string()?,
            texture_rect: IntRect::read(reader)?,
            color: Color::read(reader)?,
        })
    }

    fn read_xml(node: XmlNode<'_, '_>) -> Result<Self, SerialError> {
        xml::expect_tag(node, ComponentKind::Sprite.name())?;
        Ok(Self {
            base: ComponentBase::from_xml(node)?,
            texture: node.attribute("Texture").unwrap_or_default().to_string(),
            texture_rect: xml::optional_child(node, "TextureRect")
                .map(IntRect::from_xml)
                .transpose()?
                .unwrap_or_default(),
            color: xml::optional_child(node, "Color")
                .map(Color::from_xml)
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

impl BinarySerialize for Sprite {
    fn save_binary(&self, writer: &mut BinaryWriter<'_>) -> Result<(), SerialError> {
        self.base.write(writer)?;
        writer.write_string(&self.texture)?;
        self.texture_rect.write(writer)?;
        self.color.write(writer)
    }

    fn load_binary(&mut self, reader: &mut BinaryReader<'_>) -> Result<(), SerialError> {
        let mut loaded = Self::read_binary(reader)?;
        loaded.base.adopt_owner(&self.base);
        *self = loaded;
        Ok(())
    }
}

impl XmlSerialize for Sprite {
    fn to_xml(&self) -> XmlElement {
        self.base
            .xml_element(ComponentKind::Sprite)
            .attr("Texture", &self.texture)
            .child(self.texture_rect.to_xml_as("TextureRect"))
            .child(self.color.to_xml_as("Color"))
    }

    fn load_xml(&mut self, node: XmlNode<'_, '_>) -> Result<(), SerialError> {
        let mut loaded = Self::read_xml(node)?;
        loaded.base.adopt_owner(&self.base);
        *self = loaded;
        Ok(())
    }
}

impl Component for Sprite {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Sprite
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn draw(&self, target: &mut dyn RenderTarget, siblings: &Components, view: &View) {
        if self.texture.is_empty() {
            return;
        }
        if let Some(transform) = siblings.get::<Transform>() {
            target.draw_sprite(
                &self.texture,
                self.texture_rect,
                transform.global_bounds(view),
                self.color,
            );
        }
    }

    impl_component_any!();
}

impl ComponentType for Sprite {
    const KIND: ComponentKind = ComponentKind::Sprite;
}
