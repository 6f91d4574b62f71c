//! Text label placed inside the entity's transform bounds

use crate::ecs::registry::ComponentKind;
use crate::ecs::{Component, ComponentBase, ComponentType, Components, Transform, impl_component_any};
use crate::renderer::RenderTarget;
use crate::serial::xml::{self, XmlElement, XmlNode, parse_attr_or};
use crate::serial::{BinaryReader, BinarySerialize, BinaryWriter, SerialError, XmlSerialize};

use super::rect::{Color, Origin};
use super::view::View;

const DEFAULT_CHARACTER_SIZE: u32 = 24;

/// Single block of text
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    base: ComponentBase,
    text: String,
    /// Asset path of the font
    font: String,
    character_size: u32,
    color: Color,
    /// Point of the bounds the text is anchored to
    alignment: Origin,
}

impl TextBox {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    #[must_use]
    pub fn font(&self) -> &str {
        &self.font
    }

    pub fn set_font(&mut self, font: impl Into<String>) {
        self.font = font.into();
    }

    #[must_use]
    pub const fn character_size(&self) -> u32 {
        self.character_size
    }

    pub fn set_character_size(&mut self, size: u32) {
        self.character_size = size;
    }

    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    #[must_use]
    pub const fn alignment(&self) -> Origin {
        self.alignment
    }

    pub fn set_alignment(&mut self, alignment: Origin) {
        self.alignment = alignment;
    }

    fn read_binary(reader: &mut BinaryReader<'_>) -> Result<Self, SerialError> {
        Ok(Self {
            base: ComponentBase::read(reader)?,
            text: reader.read_string()?,
            font: reader.read_string()?,
            character_size: reader.read_u32()?,
            color: Color::read(reader)?,
            alignment: Origin::read(reader)?,
        })
    }

    fn read_xml(node: XmlNode<'_, '_>) -> Result<Self, SerialError> {
        xml::expect_tag(node, ComponentKind::TextBox.name())?;
        Ok(Self {
            base: ComponentBase::from_xml(node)?,
            text: node.attribute("Text").unwrap_or_default().to_string(),
            font: node.attribute("Font").unwrap_or_default().to_string(),
            character_size: parse_attr_or(node, "CharacterSize", DEFAULT_CHARACTER_SIZE)?,
            alignment: parse_attr_or(node, "Alignment", Origin::TopLeft)?,
            color: xml::optional_child(node, "Color")
                .map(Color::from_xml)
                .transpose()?
                .unwrap_or(Color::BLACK),
        })
    }
}

impl Default for TextBox {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            text: String::new(),
            font: String::new(),
            character_size: DEFAULT_CHARACTER_SIZE,
            color: Color::BLACK,
            alignment: Origin::TopLeft,
        }
    }
}

impl BinarySerialize for TextBox {
    fn save_binary(&self, writer: &mut BinaryWriter<'_>) -> Result<(), SerialError> {
        self.base.write(writer)?;
        writer.write_string(&self.text)?;
        writer.write_string(&self.font)?;
        writer.write_u32(self.character_size)?;
        self.color.write(writer)?;
        self.alignment.write(writer)
    }

    fn load_binary(&mut self, reader: &mut BinaryReader<'_>) -> Result<(), SerialError> {
        let mut loaded = Self::read_binary(reader)?;
        loaded.base.adopt_owner(&self.base);
        *self = loaded;
        Ok(())
    }
}

impl XmlSerialize for TextBox {
    fn to_xml(&self) -> XmlElement {
        self.base
            .xml_element(ComponentKind::TextBox)
            .attr("Text", &self.text)
            .attr("Font", &self.font)
            .attr("CharacterSize", self.character_size)
            .attr("Alignment", self.alignment)
            .child(self.color.to_xml_as("Color"))
    }

    fn load_xml(&mut self, node: XmlNode<'_, '_>) -> Result<(), SerialError> {
        let mut loaded = Self::read_xml(node)?;
        loaded.base.adopt_owner(&self.base);
        *self = loaded;
        Ok(())
    }
}

impl Component for TextBox {
    fn kind(&self) -> ComponentKind {
        ComponentKind::TextBox
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    /// Text is anchored at the alignment point of the transform bounds;
    /// glyph layout is left to the backend
    fn draw(&self, target: &mut dyn RenderTarget, siblings: &Components, view: &View) {
        if self.text.is_empty() {
            return;
        }
        if let Some(transform) = siblings.get::<Transform>() {
            let bounds = transform.global_bounds(view);
            let anchor = bounds.position() + self.alignment.offset(bounds.size());
            target.draw_text(&self.text, &self.font, self.character_size, anchor, self.color);
        }
    }

    impl_component_any!();
}

impl ComponentType for TextBox {
    const KIND: ComponentKind = ComponentKind::TextBox;
}
