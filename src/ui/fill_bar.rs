//! Progress/health style bar that crops its sprite to a fill fraction

use std::fmt;
use std::str::FromStr;

use crate::ecs::registry::ComponentKind;
use crate::ecs::{Component, ComponentBase, ComponentType, Components, UpdateContext, impl_component_any};
use crate::serial::xml::{self, XmlElement, XmlNode, parse_attr_or};
use crate::serial::{BinaryReader, BinarySerialize, BinaryWriter, SerialError, XmlSerialize};

use super::rect::{IntRect, ValueRange};
use super::sprite::Sprite;

/// Edge the bar grows from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillDirection {
    #[default]
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

impl FillDirection {
    const ALL: [FillDirection; 4] = [
        Self::LeftToRight,
        Self::RightToLeft,
        Self::TopToBottom,
        Self::BottomToTop,
    ];

    const fn name(self) -> &'static str {
        match self {
            Self::LeftToRight => "LeftToRight",
            Self::RightToLeft => "RightToLeft",
            Self::TopToBottom => "TopToBottom",
            Self::BottomToTop => "BottomToTop",
        }
    }

    /// Crop `full` to `fraction` of its extent along this direction
    #[must_use]
    pub fn crop(self, full: IntRect, fraction: f32) -> IntRect {
        let fraction = fraction.clamp(0.0, 1.0);
        let scaled = |extent: i32| (extent as f32 * fraction).round() as i32;
        match self {
            Self::LeftToRight => IntRect::new(full.left, full.top, scaled(full.width), full.height),
            Self::RightToLeft => {
                let width = scaled(full.width);
                IntRect::new(full.left + full.width - width, full.top, width, full.height)
            }
            Self::TopToBottom => IntRect::new(full.left, full.top, full.width, scaled(full.height)),
            Self::BottomToTop => {
                let height = scaled(full.height);
                IntRect::new(full.left, full.top + full.height - height, full.width, height)
            }
        }
    }
}

impl fmt::Display for FillDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FillDirection {
    type Err = SerialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| SerialError::InvalidData(format!("unknown fill direction '{s}'")))
    }
}

/// Bar showing a value inside a range
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FillBar {
    base: ComponentBase,
    range: ValueRange,
    direction: FillDirection,
    /// Texture region shown when the bar is full
    full_rect: IntRect,
}

impl FillBar {
    #[must_use]
    pub fn new(range: ValueRange, full_rect: IntRect) -> Self {
        Self {
            range,
            full_rect,
            ..Default::default()
        }
    }

    #[must_use]
    pub const fn range(&self) -> &ValueRange {
        &self.range
    }

    pub fn range_mut(&mut self) -> &mut ValueRange {
        &mut self.range
    }

    #[must_use]
    pub fn value(&self) -> f32 {
        self.range.value()
    }

    /// Set the value, clamped into the range
    pub fn set_value(&mut self, value: f32) {
        self.range.set_value(value);
    }

    #[must_use]
    pub const fn direction(&self) -> FillDirection {
        self.direction
    }

    pub fn set_direction(&mut self, direction: FillDirection) {
        self.direction = direction;
    }

    #[must_use]
    pub const fn full_rect(&self) -> IntRect {
        self.full_rect
    }

    pub fn set_full_rect(&mut self, rect: IntRect) {
        self.full_rect = rect;
    }

    /// Texture region for the current value
    #[must_use]
    pub fn visible_rect(&self) -> IntRect {
        self.direction.crop(self.full_rect, self.range.fraction())
    }

    fn apply(&self, siblings: &mut Components) {
        if let Some(sprite) = siblings.get_mut::<Sprite>() {
            sprite.set_texture_rect(self.visible_rect());
        }
    }

    fn read_binary(reader: &mut BinaryReader<'_>) -> Result<Self, SerialError> {
        let base = ComponentBase::read(reader)?;
        let min = reader.read_f32()?;
        let max = reader.read_f32()?;
        let value = reader.read_f32()?;
        if let Some(bad) = [min, max, value].into_iter().find(|v| !v.is_finite()) {
            return Err(SerialError::InvalidData(format!("non-finite fill bar bound {bad}")));
        }
        let raw = reader.read_u8()?;
        let direction = FillDirection::ALL
            .get(usize::from(raw))
            .copied()
            .ok_or_else(|| SerialError::InvalidData(format!("invalid fill direction {raw}")))?;
        let full_rect = IntRect::read(reader)?;
        Ok(Self {
            base,
            range: ValueRange::new(min, max, value),
            direction,
            full_rect,
        })
    }

    fn read_xml(node: XmlNode<'_, '_>) -> Result<Self, SerialError> {
        xml::expect_tag(node, ComponentKind::FillBar.name())?;
        let defaults = ValueRange::default();
        let min = finite_attr(node, "Min", defaults.min())?;
        let max = finite_attr(node, "Max", defaults.max())?;
        let value = finite_attr(node, "Value", defaults.value())?;
        Ok(Self {
            base: ComponentBase::from_xml(node)?,
            range: ValueRange::new(min, max, value),
            direction: parse_attr_or(node, "Direction", FillDirection::LeftToRight)?,
            full_rect: xml::optional_child(node, "FullRect")
                .map(IntRect::from_xml)
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

fn finite_attr(node: XmlNode<'_, '_>, name: &str, default: f32) -> Result<f32, SerialError> {
    let value: f32 = parse_attr_or(node, name, default)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SerialError::InvalidAttribute {
            element: node.tag_name().name().to_string(),
            attribute: name.to_string(),
            value: value.to_string(),
        })
    }
}

impl BinarySerialize for FillBar {
    fn save_binary(&self, writer: &mut BinaryWriter<'_>) -> Result<(), SerialError> {
        self.base.write(writer)?;
        writer.write_f32(self.range.min())?;
        writer.write_f32(self.range.max())?;
        writer.write_f32(self.range.value())?;
        writer.write_u8(self.direction as u8)?;
        self.full_rect.write(writer)
    }

    fn load_binary(&mut self, reader: &mut BinaryReader<'_>) -> Result<(), SerialError> {
        let mut loaded = Self::read_binary(reader)?;
        loaded.base.adopt_owner(&self.base);
        *self = loaded;
        Ok(())
    }
}

impl XmlSerialize for FillBar {
    fn to_xml(&self) -> XmlElement {
        self.base
            .xml_element(ComponentKind::FillBar)
            .attr("Min", self.range.min())
            .attr("Max", self.range.max())
            .attr("Value", self.range.value())
            .attr("Direction", self.direction)
            .child(self.full_rect.to_xml_as("FullRect"))
    }

    fn load_xml(&mut self, node: XmlNode<'_, '_>) -> Result<(), SerialError> {
        let mut loaded = Self::read_xml(node)?;
        loaded.base.adopt_owner(&self.base);
        *self = loaded;
        Ok(())
    }
}

impl Component for FillBar {
    fn kind(&self) -> ComponentKind {
        ComponentKind::FillBar
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    /// Adopts the sprite's current region as the full region when none
    /// was given
    fn on_added(&mut self, siblings: &mut Components) {
        if self.full_rect == IntRect::default()
            && let Some(sprite) = siblings.get::<Sprite>()
        {
            self.full_rect = sprite.texture_rect();
        }
        self.apply(siblings);
    }

    fn update(&mut self, _ctx: &UpdateContext<'_>, siblings: &mut Components) {
        self.apply(siblings);
    }

    impl_component_any!();
}

impl ComponentType for FillBar {
    const KIND: ComponentKind = ComponentKind::FillBar;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::{load_bytes, load_xml_str, to_bytes};

    const FULL: IntRect = IntRect::new(0, 0, 200, 20);

    #[test]
    fn test_crop_directions() {
        assert_eq!(FillDirection::LeftToRight.crop(FULL, 0.25), IntRect::new(0, 0, 50, 20));
        assert_eq!(FillDirection::RightToLeft.crop(FULL, 0.25), IntRect::new(150, 0, 50, 20));
        assert_eq!(FillDirection::TopToBottom.crop(FULL, 0.5), IntRect::new(0, 0, 200, 10));
        assert_eq!(FillDirection::BottomToTop.crop(FULL, 0.5), IntRect::new(0, 10, 200, 10));
        assert_eq!(FillDirection::LeftToRight.crop(FULL, 3.0), FULL);
    }

    #[test]
    fn test_value_clamped_into_range() {
        let mut bar = FillBar::new(ValueRange::new(0.0, 100.0, 50.0), FULL);
        assert_eq!(bar.visible_rect(), IntRect::new(0, 0, 100, 20));

        bar.set_value(250.0);
        assert_eq!(bar.value(), 100.0);
        bar.range_mut().set_min(150.0);
        assert_eq!(bar.range().max(), 150.0);
        assert_eq!(bar.value(), 150.0);
        // Empty span reports full
        assert_eq!(bar.visible_rect(), FULL);
    }

    #[test]
    fn test_on_added_adopts_sprite_rect() {
        let mut siblings = Components::new();
        siblings.push(Box::new(Sprite::new("bar.png").with_rect(FULL)));
        let mut bar = FillBar::default();
        bar.set_value(0.5);

        bar.on_added(&mut siblings);
        assert_eq!(bar.full_rect(), FULL);
        assert_eq!(
            siblings.get::<Sprite>().map(Sprite::texture_rect),
            Some(IntRect::new(0, 0, 100, 20))
        );
    }

    #[test]
    fn test_round_trip() {
        let mut bar = FillBar::new(ValueRange::new(-10.0, 10.0, 2.5), FULL);
        bar.set_direction(FillDirection::BottomToTop);

        let mut from_binary = FillBar::default();
        load_bytes(&mut from_binary, &to_bytes(&bar).unwrap()).unwrap();
        assert_eq!(from_binary, bar);

        let mut from_xml = FillBar::default();
        load_xml_str(&mut from_xml, &bar.save_xml()).unwrap();
        assert_eq!(from_xml, bar);
    }

    #[test]
    fn test_non_finite_bounds_rejected() {
        let mut bar = FillBar::new(ValueRange::new(0.0, 10.0, 4.0), FULL);
        let before = bar.clone();

        let err = load_xml_str(&mut bar, r#"<FillBar Min="NaN" Max="1" Value="0" />"#).unwrap_err();
        assert!(matches!(err, SerialError::InvalidAttribute { ref attribute, .. } if attribute == "Min"));
        assert!(load_xml_str(&mut bar, r#"<FillBar Min="0" Max="inf" Value="0" />"#).is_err());
        assert_eq!(bar, before);

        let mut nan_value = to_bytes(&before).unwrap();
        // base flags (2) + min (4) + max (4), then the value
        nan_value[10..14].copy_from_slice(&f32::NAN.to_le_bytes());
        assert!(matches!(
            load_bytes(&mut bar, &nan_value),
            Err(SerialError::InvalidData(_))
        ));
        assert_eq!(bar, before);
    }
}
