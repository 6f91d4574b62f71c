//! Entity name and the transform component

use glam::Vec2;

use super::component::{Component, ComponentBase, ComponentType, impl_component_any};
use super::registry::ComponentKind;
use crate::serial::xml::{self, XmlElement, XmlNode, parse_attr_or};
use crate::serial::{BinaryReader, BinarySerialize, BinaryWriter, SerialError, XmlSerialize};
use crate::ui::{FloatRect, Origin, View};

/// Entity identifier. Not required to be unique.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// 2D position/size/scale node with an alignment origin.
///
/// `position` refers to the point of the box selected by `origin`. When
/// `relative` is set, the stored position is an offset from the active
/// view's top-left corner.
///
/// Positions change only through
/// [`World::set_position`](crate::ecs::World::set_position), which carries
/// the move down to child entities.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    base: ComponentBase,
    position: Vec2,
    size: Vec2,
    scale: Vec2,
    origin: Origin,
    relative: bool,
}

/// Non-positive extents become their absolute value, zero becomes 1.0
fn clamp_extent(value: f32) -> f32 {
    if value == 0.0 || value.is_nan() {
        1.0
    } else {
        value.abs()
    }
}

impl Transform {
    /// Create a transform at a position with the given local size
    #[must_use]
    pub fn new(position: Vec2, size: Vec2) -> Self {
        let mut transform = Self {
            position,
            ..Default::default()
        };
        transform.set_size(size);
        transform
    }

    /// Set the alignment without moving the stored position
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Assign a new position to this transform alone; returns the delta if
    /// it changed
    pub(crate) fn set_position(&mut self, position: Vec2) -> Option<Vec2> {
        if position == self.position {
            return None;
        }
        let delta = position - self.position;
        self.position = position;
        Some(delta)
    }

    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Set the local size; each axis is forced strictly positive
    pub fn set_size(&mut self, size: Vec2) {
        self.size = Vec2::new(clamp_extent(size.x), clamp_extent(size.y));
    }

    #[must_use]
    pub const fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Set the scale; any non-positive axis resets the whole scale to (1, 1)
    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = if scale.x > 0.0 && scale.y > 0.0 {
            scale
        } else {
            Vec2::ONE
        };
    }

    /// Size after scaling
    #[must_use]
    pub fn scaled_size(&self) -> Vec2 {
        self.size * self.scale
    }

    #[must_use]
    pub const fn origin(&self) -> Origin {
        self.origin
    }

    /// Change the alignment while keeping the visible bounds in place.
    ///
    /// The stored position moves to the new reference point; children are
    /// not moved since nothing on screen changes.
    pub fn set_origin(&mut self, origin: Origin) {
        let size = self.scaled_size();
        self.position += origin.offset(size) - self.origin.offset(size);
        self.origin = origin;
    }

    #[must_use]
    pub const fn is_relative(&self) -> bool {
        self.relative
    }

    /// Switch between view-relative and absolute positioning, keeping the
    /// absolute position unchanged
    pub fn set_relative(&mut self, relative: bool, view: &View) {
        if relative == self.relative {
            return;
        }
        if relative {
            self.position -= view.origin();
        } else {
            self.position += view.origin();
        }
        self.relative = relative;
    }

    /// Position in world space
    #[must_use]
    pub fn absolute_position(&self, view: &View) -> Vec2 {
        if self.relative {
            view.origin() + self.position
        } else {
            self.position
        }
    }

    /// World-space box covered by this transform
    #[must_use]
    pub fn global_bounds(&self, view: &View) -> FloatRect {
        let size = self.scaled_size();
        let top_left = self.absolute_position(view) - self.origin.offset(size);
        FloatRect::from_position_size(top_left, size)
    }

    fn read_binary(reader: &mut BinaryReader<'_>) -> Result<Self, SerialError> {
        let base = ComponentBase::read(reader)?;
        let position = reader.read_vec2()?;
        let relative = reader.read_bool()?;
        let size = reader.read_vec2()?;
        let scale = reader.read_vec2()?;
        let origin = Origin::read(reader)?;

        let mut transform = Self {
            base,
            position,
            relative,
            origin,
            ..Default::default()
        };
        transform.set_size(size);
        transform.set_scale(scale);
        Ok(transform)
    }

    fn read_xml(node: XmlNode<'_, '_>) -> Result<Self, SerialError> {
        xml::expect_tag(node, ComponentKind::Transform.name())?;
        let base = ComponentBase::from_xml(node)?;
        let position = xml::parse_vec2(xml::required_child(node, "Position")?)?;
        let size = xml::parse_vec2(xml::required_child(node, "Size")?)?;
        let scale = match xml::optional_child(node, "Scale") {
            Some(child) => xml::parse_vec2(child)?,
            None => Vec2::ONE,
        };

        let mut transform = Self {
            base,
            position,
            origin: parse_attr_or(node, "Origin", Origin::TopLeft)?,
            relative: parse_attr_or(node, "Relative", false)?,
            ..Default::default()
        };
        transform.set_size(size);
        transform.set_scale(scale);
        Ok(transform)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            position: Vec2::ZERO,
            size: Vec2::ONE,
            scale: Vec2::ONE,
            origin: Origin::TopLeft,
            relative: false,
        }
    }
}

impl BinarySerialize for Transform {
    fn save_binary(&self, writer: &mut BinaryWriter<'_>) -> Result<(), SerialError> {
        self.base.write(writer)?;
        writer.write_vec2(self.position)?;
        writer.write_bool(self.relative)?;
        writer.write_vec2(self.size)?;
        writer.write_vec2(self.scale)?;
        self.origin.write(writer)
    }

    fn load_binary(&mut self, reader: &mut BinaryReader<'_>) -> Result<(), SerialError> {
        let mut loaded = Self::read_binary(reader)?;
        loaded.base.adopt_owner(&self.base);
        *self = loaded;
        Ok(())
    }
}

impl XmlSerialize for Transform {
    fn to_xml(&self) -> XmlElement {
        self.base
            .xml_element(ComponentKind::Transform)
            .attr("Origin", self.origin)
            .attr("Relative", self.relative)
            .child(xml::vec2_element("Position", self.position))
            .child(xml::vec2_element("Size", self.size))
            .child(xml::vec2_element("Scale", self.scale))
    }

    fn load_xml(&mut self, node: XmlNode<'_, '_>) -> Result<(), SerialError> {
        let mut loaded = Self::read_xml(node)?;
        loaded.base.adopt_owner(&self.base);
        *self = loaded;
        Ok(())
    }
}

impl Component for Transform {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Transform
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    impl_component_any!();
}

impl ComponentType for Transform {
    const KIND: ComponentKind = ComponentKind::Transform;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::{load_bytes, load_xml_str, to_bytes};

    fn view() -> View {
        View::new(Vec2::new(400.0, 300.0), Vec2::new(800.0, 600.0))
    }

    #[test]
    fn test_size_clamped_positive() {
        let mut t = Transform::default();
        t.set_size(Vec2::new(-5.0, 0.0));
        assert_eq!(t.size(), Vec2::new(5.0, 1.0));

        t.set_size(Vec2::new(0.0, -0.25));
        assert_eq!(t.size(), Vec2::new(1.0, 0.25));
    }

    #[test]
    fn test_non_positive_scale_resets() {
        let mut t = Transform::default();
        t.set_scale(Vec2::new(2.0, 3.0));
        assert_eq!(t.scale(), Vec2::new(2.0, 3.0));

        t.set_scale(Vec2::new(2.0, -1.0));
        assert_eq!(t.scale(), Vec2::ONE);
        t.set_scale(Vec2::new(0.0, 4.0));
        assert_eq!(t.scale(), Vec2::ONE);
    }

    #[test]
    fn test_set_position_reports_delta() {
        let mut t = Transform::new(Vec2::new(1.0, 1.0), Vec2::ONE);
        assert_eq!(t.set_position(Vec2::new(4.0, 0.0)), Some(Vec2::new(3.0, -1.0)));
        assert_eq!(t.set_position(Vec2::new(4.0, 0.0)), None);
    }

    #[test]
    fn test_global_bounds_by_origin() {
        let view = view();
        let mut t = Transform::new(Vec2::new(100.0, 100.0), Vec2::new(40.0, 20.0));
        t.set_scale(Vec2::new(2.0, 1.0));

        let cases = [
            (Origin::TopLeft, 100.0, 100.0),
            (Origin::TopCenter, 60.0, 100.0),
            (Origin::TopRight, 20.0, 100.0),
            (Origin::MiddleLeft, 100.0, 90.0),
            (Origin::Center, 60.0, 90.0),
            (Origin::MiddleRight, 20.0, 90.0),
            (Origin::BottomLeft, 100.0, 80.0),
            (Origin::BottomCenter, 60.0, 80.0),
            (Origin::BottomRight, 20.0, 80.0),
        ];
        for (origin, left, top) in cases {
            let bounds = t.clone().with_origin(origin).global_bounds(&view);
            assert!((bounds.left - left).abs() < 1e-4, "{origin}");
            assert!((bounds.top - top).abs() < 1e-4, "{origin}");
            assert_eq!(bounds.size(), Vec2::new(80.0, 20.0));
        }
    }

    #[test]
    fn test_set_origin_keeps_bounds() {
        let view = view();
        let mut t = Transform::new(Vec2::new(13.0, -7.5), Vec2::new(33.0, 12.0));
        t.set_scale(Vec2::new(1.5, 0.5));
        let before = t.global_bounds(&view);

        for origin in Origin::ALL {
            let old_position = t.position();
            t.set_origin(origin);
            let after = t.global_bounds(&view);
            assert!((after.left - before.left).abs() < 1e-4);
            assert!((after.top - before.top).abs() < 1e-4);
            if origin != Origin::TopLeft {
                assert_ne!(t.position(), old_position);
            }
        }
    }

    #[test]
    fn test_relative_switch_preserves_absolute() {
        let view = View::new(Vec2::new(500.0, 500.0), Vec2::new(200.0, 100.0));
        let mut t = Transform::new(Vec2::new(450.0, 470.0), Vec2::ONE);

        t.set_relative(true, &view);
        assert!(t.is_relative());
        assert_eq!(t.position(), Vec2::new(50.0, 20.0));
        assert_eq!(t.absolute_position(&view), Vec2::new(450.0, 470.0));

        t.set_relative(false, &view);
        assert_eq!(t.position(), Vec2::new(450.0, 470.0));
    }

    #[test]
    fn test_binary_round_trip() {
        let mut t = Transform::new(Vec2::new(-3.5, 8.25), Vec2::new(64.0, 32.0));
        t.set_scale(Vec2::new(0.5, 2.0));
        t.set_origin(Origin::BottomCenter);
        t.base_mut().visible = false;

        let bytes = to_bytes(&t).unwrap();
        let mut loaded = Transform::default();
        load_bytes(&mut loaded, &bytes).unwrap();
        assert_eq!(loaded, t);
    }

    #[test]
    fn test_xml_round_trip() {
        let mut t = Transform::new(Vec2::new(0.1, 1e-3), Vec2::new(3.0, 7.0));
        t.set_scale(Vec2::new(1.25, 1.0));
        t.set_relative(true, &View::default());

        let text = t.save_xml();
        let mut loaded = Transform::default();
        load_xml_str(&mut loaded, &text).unwrap();
        assert_eq!(loaded, t);
        assert_eq!(loaded.save_xml(), text);
    }

    #[test]
    fn test_xml_optional_defaults() {
        let text = r#"<Transform><Position X="1" Y="2" /><Size X="0" Y="-4" /><Extra /></Transform>"#;
        let mut t = Transform::default();
        load_xml_str(&mut t, text).unwrap();

        assert_eq!(t.position(), Vec2::new(1.0, 2.0));
        assert_eq!(t.size(), Vec2::new(1.0, 4.0));
        assert_eq!(t.scale(), Vec2::ONE);
        assert!(!t.is_relative());
        assert_eq!(t.origin(), Origin::TopLeft);
        assert!(t.base().enabled);
    }

    #[test]
    fn test_xml_missing_required_fails_without_change() {
        let mut t = Transform::new(Vec2::new(9.0, 9.0), Vec2::ONE);
        let result = load_xml_str(&mut t, r#"<Transform><Position X="1" Y="2" /></Transform>"#);

        assert!(matches!(result, Err(SerialError::MissingElement { .. })));
        assert_eq!(t.position(), Vec2::new(9.0, 9.0));
    }

    #[test]
    fn test_truncated_binary_fails_without_change() {
        let t = Transform::new(Vec2::new(5.0, 5.0), Vec2::ONE);
        let bytes = to_bytes(&t).unwrap();

        let mut target = Transform::default();
        assert!(load_bytes(&mut target, &bytes[..bytes.len() - 2]).is_err());
        assert_eq!(target, Transform::default());
    }
}
