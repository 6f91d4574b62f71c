//! Pointer hit-testing over the entity's transform bounds
//!
//! A [`Clickable`] tracks whether the pointer is over its entity and fires
//! observer events when that changes or when the entity is activated.

use crate::core::events::{ClickEvent, Event, HoverEvent};
use crate::ecs::registry::ComponentKind;
use crate::ecs::{
    Component, ComponentBase, ComponentType, Components, Transform, UpdateContext,
    impl_component_any,
};
use crate::input::{GamepadButton, InputDevice, InputState, Key, MouseButton};
use crate::serial::xml::{self, XmlElement, XmlNode, parse_attr_or};
use crate::serial::{BinaryReader, BinarySerialize, BinaryWriter, SerialError, XmlSerialize};

/// Clickable area
#[derive(Debug, Default)]
pub struct Clickable {
    base: ComponentBase,
    button: MouseButton,
    /// Focused for keyboard/gamepad activation
    selected: bool,
    hovered: bool,
    pressed: bool,
    /// Fired when the pointer enters or leaves the area
    pub on_hover: Event<HoverEvent>,
    /// Fired when the area is activated
    pub on_click: Event<ClickEvent>,
}

impl Clickable {
    #[must_use]
    pub fn new(button: MouseButton) -> Self {
        Self {
            button,
            ..Default::default()
        }
    }

    /// Mouse button that activates the area
    #[must_use]
    pub const fn button(&self) -> MouseButton {
        self.button
    }

    pub fn set_button(&mut self, button: MouseButton) {
        self.button = button;
    }

    #[must_use]
    pub const fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Pointer is over the area (as of the last update)
    #[must_use]
    pub const fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Activating button is held over the area (as of the last update)
    #[must_use]
    pub const fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Replace the persisted fields, keeping owner, runtime state and
    /// subscribers
    fn assign(&mut self, base: ComponentBase, button: MouseButton, selected: bool) {
        self.base.enabled = base.enabled;
        self.base.visible = base.visible;
        self.button = button;
        self.selected = selected;
    }
}

impl PartialEq for Clickable {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.button == other.button && self.selected == other.selected
    }
}

impl BinarySerialize for Clickable {
    fn save_binary(&self, writer: &mut BinaryWriter<'_>) -> Result<(), SerialError> {
        self.base.write(writer)?;
        writer.write_u8(self.button.index())?;
        writer.write_bool(self.selected)
    }

    fn load_binary(&mut self, reader: &mut BinaryReader<'_>) -> Result<(), SerialError> {
        let base = ComponentBase::read(reader)?;
        let raw = reader.read_u8()?;
        let button = MouseButton::from_index(raw)
            .ok_or_else(|| SerialError::InvalidData(format!("invalid mouse button {raw}")))?;
        let selected = reader.read_bool()?;
        self.assign(base, button, selected);
        Ok(())
    }
}

impl XmlSerialize for Clickable {
    fn to_xml(&self) -> XmlElement {
        self.base
            .xml_element(ComponentKind::Clickable)
            .attr("Button", self.button)
            .attr("Selected", self.selected)
    }

    fn load_xml(&mut self, node: XmlNode<'_, '_>) -> Result<(), SerialError> {
        xml::expect_tag(node, ComponentKind::Clickable.name())?;
        let base = ComponentBase::from_xml(node)?;
        let button = parse_attr_or(node, "Button", MouseButton::Left)?;
        let selected = parse_attr_or(node, "Selected", false)?;
        self.assign(base, button, selected);
        Ok(())
    }
}

impl Component for Clickable {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Clickable
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn update(&mut self, ctx: &UpdateContext<'_>, siblings: &mut Components) {
        let Some(transform) = siblings.get::<Transform>() else {
            return;
        };
        let input = ctx.input;
        let pointer = input.mouse_position();
        let inside = transform.global_bounds(ctx.view).contains(pointer);
        let entity = self.base.owner();

        if inside != self.hovered {
            self.hovered = inside;
            self.on_hover.emit(&HoverEvent {
                entity,
                hovered: inside,
            });
        }
        self.pressed = inside && input.is_mouse_down(self.button);

        if inside && input.is_mouse_just_pressed(self.button) {
            self.on_click.emit(&ClickEvent {
                entity,
                position: pointer,
                button: Some(self.button),
            });
        } else if self.selected
            && input.last_device() != InputDevice::Mouse
            && (input.is_key_just_pressed(Key::Enter)
                || input.is_gamepad_just_pressed(GamepadButton::South))
        {
            self.on_click.emit(&ClickEvent {
                entity,
                position: pointer,
                button: None,
            });
        }
    }

    impl_component_any!();
}

impl ComponentType for Clickable {
    const KIND: ComponentKind = ComponentKind::Clickable;
}
