//! Push button built from a clickable area, a sprite and a label

use crate::ecs::registry::ComponentKind;
use crate::ecs::{Component, ComponentBase, ComponentType, Components, UpdateContext, impl_component_any};
use crate::serial::xml::{self, XmlElement, XmlNode};
use crate::serial::{BinaryReader, BinarySerialize, BinaryWriter, SerialError, XmlSerialize};

use super::clickable::Clickable;
use super::rect::{IntRect, Origin};
use super::sprite::Sprite;
use super::text_box::TextBox;

/// Swaps its sprite region by pointer state
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Button {
    base: ComponentBase,
    normal: IntRect,
    hover: IntRect,
    pressed: IntRect,
}

impl Button {
    #[must_use]
    pub fn new(normal: IntRect, hover: IntRect, pressed: IntRect) -> Self {
        Self {
            normal,
            hover,
            pressed,
            ..Default::default()
        }
    }

    #[must_use]
    pub const fn normal_rect(&self) -> IntRect {
        self.normal
    }

    #[must_use]
    pub const fn hover_rect(&self) -> IntRect {
        self.hover
    }

    #[must_use]
    pub const fn pressed_rect(&self) -> IntRect {
        self.pressed
    }

    pub fn set_rects(&mut self, normal: IntRect, hover: IntRect, pressed: IntRect) {
        self.normal = normal;
        self.hover = hover;
        self.pressed = pressed;
    }

    /// Region for the clickable's current state
    fn rect_for(&self, clickable: Option<&Clickable>) -> IntRect {
        match clickable {
            Some(c) if c.is_pressed() => self.pressed,
            Some(c) if c.is_hovered() => self.hover,
            _ => self.normal,
        }
    }

    fn read_rect(node: XmlNode<'_, '_>, tag: &str) -> Result<IntRect, SerialError> {
        Ok(xml::optional_child(node, tag)
            .map(IntRect::from_xml)
            .transpose()?
            .unwrap_or_default())
    }
}

impl BinarySerialize for Button {
    fn save_binary(&self, writer: &mut BinaryWriter<'_>) -> Result<(), SerialError> {
        self.base.write(writer)?;
        self.normal.write(writer)?;
        self.hover.write(writer)?;
        self.pressed.write(writer)
    }

    fn load_binary(&mut self, reader: &mut BinaryReader<'_>) -> Result<(), SerialError> {
        let mut base = ComponentBase::read(reader)?;
        let normal = IntRect::read(reader)?;
        let hover = IntRect::read(reader)?;
        let pressed = IntRect::read(reader)?;
        base.adopt_owner(&self.base);
        *self = Self {
            base,
            normal,
            hover,
            pressed,
        };
        Ok(())
    }
}

impl XmlSerialize for Button {
    fn to_xml(&self) -> XmlElement {
        self.base
            .xml_element(ComponentKind::Button)
            .child(self.normal.to_xml_as("Normal"))
            .child(self.hover.to_xml_as("Hover"))
            .child(self.pressed.to_xml_as("Pressed"))
    }

    fn load_xml(&mut self, node: XmlNode<'_, '_>) -> Result<(), SerialError> {
        xml::expect_tag(node, ComponentKind::Button.name())?;
        let mut base = ComponentBase::from_xml(node)?;
        let normal = Self::read_rect(node, "Normal")?;
        let hover = Self::read_rect(node, "Hover")?;
        let pressed = Self::read_rect(node, "Pressed")?;
        base.adopt_owner(&self.base);
        *self = Self {
            base,
            normal,
            hover,
            pressed,
        };
        Ok(())
    }
}

impl Component for Button {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Button
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn on_added(&mut self, siblings: &mut Components) {
        if let Some(label) = siblings.get_mut::<TextBox>() {
            label.set_alignment(Origin::Center);
        }
        if let Some(sprite) = siblings.get_mut::<Sprite>() {
            sprite.set_texture_rect(self.normal);
        }
    }

    fn update(&mut self, _ctx: &UpdateContext<'_>, siblings: &mut Components) {
        let rect = self.rect_for(siblings.get::<Clickable>());
        if let Some(sprite) = siblings.get_mut::<Sprite>() {
            sprite.set_texture_rect(rect);
        }
    }

    impl_component_any!();
}

impl ComponentType for Button {
    const KIND: ComponentKind = ComponentKind::Button;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Transform, World};
    use crate::input::{Input, MouseButton};
    use crate::serial::{load_bytes, load_xml_str, to_bytes};
    use crate::ui::View;
    use glam::Vec2;
    use std::time::Duration;

    fn button() -> Button {
        Button::new(
            IntRect::new(0, 0, 100, 30),
            IntRect::new(0, 30, 100, 30),
            IntRect::new(0, 60, 100, 30),
        )
    }

    #[test]
    fn test_swaps_rect_by_pointer_state() {
        let mut world = World::new();
        let e = world.spawn("ok");
        world
            .add(e, Transform::new(Vec2::ZERO, Vec2::new(100.0, 30.0)))
            .unwrap();
        world.add(e, button()).unwrap();

        let texture_rect = |world: &World| world.with_component(e, Sprite::texture_rect).unwrap();
        assert_eq!(texture_rect(&world), IntRect::new(0, 0, 100, 30));

        let view = View::from_size(Vec2::new(800.0, 600.0));
        let mut input = Input::new();
        input.process_mouse_motion(Vec2::new(50.0, 15.0));
        let ctx = UpdateContext {
            dt: Duration::from_millis(16),
            input: &input,
            view: &view,
        };
        world.update(e, &ctx).unwrap();
        assert_eq!(texture_rect(&world), IntRect::new(0, 30, 100, 30));

        input.process_mouse_button(MouseButton::Left, true);
        let ctx = UpdateContext {
            dt: Duration::from_millis(16),
            input: &input,
            view: &view,
        };
        world.update(e, &ctx).unwrap();
        assert_eq!(texture_rect(&world), IntRect::new(0, 60, 100, 30));
    }

    #[test]
    fn test_round_trip() {
        let b = button();
        let mut from_binary = Button::default();
        load_bytes(&mut from_binary, &to_bytes(&b).unwrap()).unwrap();
        assert_eq!(from_binary, b);

        let mut from_xml = Button::default();
        load_xml_str(&mut from_xml, &b.save_xml()).unwrap();
        assert_eq!(from_xml, b);
    }
}
