//! Rectangle, alignment and color primitives

use std::fmt;
use std::str::FromStr;

use glam::Vec2;

use crate::serial::xml::{XmlElement, XmlNode, parse_attr, parse_attr_or};
use crate::serial::{BinaryReader, BinaryWriter, SerialError};

/// Which point of a bounding box a position refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Origin {
    /// Top-left corner
    #[default]
    TopLeft,
    /// Top edge midpoint
    TopCenter,
    /// Top-right corner
    TopRight,
    /// Left edge midpoint
    MiddleLeft,
    /// Center
    Center,
    /// Right edge midpoint
    MiddleRight,
    /// Bottom-left corner
    BottomLeft,
    /// Bottom edge midpoint
    BottomCenter,
    /// Bottom-right corner
    BottomRight,
}

impl Origin {
    /// All alignments in index order
    pub const ALL: [Origin; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::MiddleLeft,
        Self::Center,
        Self::MiddleRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    /// Normalized offset of the reference point inside the box (0.0 to 1.0)
    #[must_use]
    pub const fn factor(&self) -> Vec2 {
        match self {
            Self::TopLeft => Vec2::new(0.0, 0.0),
            Self::TopCenter => Vec2::new(0.5, 0.0),
            Self::TopRight => Vec2::new(1.0, 0.0),
            Self::MiddleLeft => Vec2::new(0.0, 0.5),
            Self::Center => Vec2::new(0.5, 0.5),
            Self::MiddleRight => Vec2::new(1.0, 0.5),
            Self::BottomLeft => Vec2::new(0.0, 1.0),
            Self::BottomCenter => Vec2::new(0.5, 1.0),
            Self::BottomRight => Vec2::new(1.0, 1.0),
        }
    }

    /// Offset from the box's top-left corner to the reference point
    #[must_use]
    pub fn offset(&self, size: Vec2) -> Vec2 {
        self.factor() * size
    }

    /// Stable index used by the binary format
    #[must_use]
    pub fn index(&self) -> i32 {
        Self::ALL.iter().position(|o| o == self).unwrap_or(0) as i32
    }

    /// Inverse of [`Origin::index`]
    #[must_use]
    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Name used by the XML format
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TopLeft => "TopLeft",
            Self::TopCenter => "TopCenter",
            Self::TopRight => "TopRight",
            Self::MiddleLeft => "MiddleLeft",
            Self::Center => "Center",
            Self::MiddleRight => "MiddleRight",
            Self::BottomLeft => "BottomLeft",
            Self::BottomCenter => "BottomCenter",
            Self::BottomRight => "BottomRight",
        }
    }

    pub(crate) fn write(&self, writer: &mut BinaryWriter<'_>) -> Result<(), SerialError> {
        writer.write_i32(self.index())
    }

    pub(crate) fn read(reader: &mut BinaryReader<'_>) -> Result<Self, SerialError> {
        let index = reader.read_i32()?;
        Self::from_index(index)
            .ok_or_else(|| SerialError::InvalidData(format!("origin index {index} out of range")))
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Origin {
    type Err = SerialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|o| o.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SerialError::InvalidData(format!("unknown origin '{s}'")))
    }
}

/// Axis-aligned rectangle in world units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FloatRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl FloatRect {
    #[must_use]
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Build from a top-left corner and a size
    #[must_use]
    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    /// Top-left corner
    #[must_use]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }

    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Check if a point lies inside (edges inclusive)
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left
            && point.x <= self.left + self.width
            && point.y >= self.top
            && point.y <= self.top + self.height
    }
}

/// Integer rectangle, typically a texture source region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct IntRect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl IntRect {
    #[must_use]
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub(crate) fn write(&self, writer: &mut BinaryWriter<'_>) -> Result<(), SerialError> {
        writer.write_i32(self.left)?;
        writer.write_i32(self.top)?;
        writer.write_i32(self.width)?;
        writer.write_i32(self.height)
    }

    pub(crate) fn read(reader: &mut BinaryReader<'_>) -> Result<Self, SerialError> {
        Ok(Self {
            left: reader.read_i32()?,
            top: reader.read_i32()?,
            width: reader.read_i32()?,
            height: reader.read_i32()?,
        })
    }

    /// Render as `<tag Left Top Width Height />`
    #[must_use]
    pub fn to_xml_as(&self, tag: &str) -> XmlElement {
        XmlElement::new(tag)
            .attr("Left", self.left)
            .attr("Top", self.top)
            .attr("Width", self.width)
            .attr("Height", self.height)
    }

    /// Parse an element written by [`IntRect::to_xml_as`]
    pub fn from_xml(node: XmlNode<'_, '_>) -> Result<Self, SerialError> {
        Ok(Self {
            left: parse_attr(node, "Left")?,
            top: parse_attr(node, "Top")?,
            width: parse_attr(node, "Width")?,
            height: parse_attr(node, "Height")?,
        })
    }
}

/// RGBA color, 8 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub(crate) fn write(&self, writer: &mut BinaryWriter<'_>) -> Result<(), SerialError> {
        for channel in [self.r, self.g, self.b, self.a] {
            writer.write_u8(channel)?;
        }
        Ok(())
    }

    pub(crate) fn read(reader: &mut BinaryReader<'_>) -> Result<Self, SerialError> {
        Ok(Self {
            r: reader.read_u8()?,
            g: reader.read_u8()?,
            b: reader.read_u8()?,
            a: reader.read_u8()?,
        })
    }

    /// Render as `<tag R G B A />`
    #[must_use]
    pub fn to_xml_as(&self, tag: &str) -> XmlElement {
        XmlElement::new(tag)
            .attr("R", self.r)
            .attr("G", self.g)
            .attr("B", self.b)
            .attr("A", self.a)
    }

    /// Parse an element written by [`Color::to_xml_as`]; alpha defaults to opaque
    pub fn from_xml(node: XmlNode<'_, '_>) -> Result<Self, SerialError> {
        Ok(Self {
            r: parse_attr(node, "R")?,
            g: parse_attr(node, "G")?,
            b: parse_attr(node, "B")?,
            a: parse_attr_or(node, "A", 255)?,
        })
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// A value clamped into a `[min, max]` range.
///
/// Bounds are never rejected: raising `min` above `max` drags `max` up to
/// it, lowering `max` below `min` drags `min` down to it. Either way the
/// range collapses to `min == max` at the bound just set. NaN inputs are
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    min: f32,
    max: f32,
    value: f32,
}

impl ValueRange {
    #[must_use]
    pub fn new(min: f32, max: f32, value: f32) -> Self {
        let mut range = Self {
            min: 0.0,
            max: 0.0,
            value: 0.0,
        };
        range.set_min(min);
        range.set_max(max);
        range.set_value(value);
        range
    }

    #[must_use]
    pub const fn min(&self) -> f32 {
        self.min
    }

    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// Set the lower bound; a bound above `max` moves `max` up to it
    pub fn set_min(&mut self, min: f32) {
        if min.is_nan() {
            return;
        }
        self.min = min;
        if self.min > self.max {
            self.max = self.min;
        }
        self.value = self.value.max(self.min).min(self.max);
    }

    /// Set the upper bound; a bound below `min` moves `min` down to it
    pub fn set_max(&mut self, max: f32) {
        if max.is_nan() {
            return;
        }
        self.max = max;
        if self.min > self.max {
            self.min = self.max;
        }
        self.value = self.value.max(self.min).min(self.max);
    }

    /// Set the value, clamped into the range
    pub fn set_value(&mut self, value: f32) {
        if value.is_nan() {
            return;
        }
        self.value = value.max(self.min).min(self.max);
    }

    /// Position of the value inside the range (0.0 to 1.0).
    ///
    /// An empty range reports full.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            1.0
        } else {
            (self.value - self.min) / span
        }
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains() {
        let rect = FloatRect::new(10.0, 10.0, 100.0, 50.0);

        assert!(rect.contains(Vec2::new(50.0, 30.0)));
        assert!(rect.contains(Vec2::new(110.0, 60.0)));
        assert!(!rect.contains(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn test_origin_offset_center() {
        let offset = Origin::Center.offset(Vec2::new(100.0, 50.0));
        assert!((offset.x - 50.0).abs() < 0.01);
        assert!((offset.y - 25.0).abs() < 0.01);
    }

    #[test]
    fn test_origin_index_and_name() {
        for origin in Origin::ALL {
            assert_eq!(Origin::from_index(origin.index()), Some(origin));
            assert_eq!(origin.name().parse::<Origin>().unwrap(), origin);
        }
        assert_eq!(Origin::from_index(9), None);
        assert_eq!("bottomright".parse::<Origin>().unwrap(), Origin::BottomRight);
    }

    #[test]
    fn test_value_range_clamps_value() {
        let mut range = ValueRange::new(0.0, 10.0, 5.0);
        range.set_value(15.0);
        assert_eq!(range.value(), 10.0);
        range.set_value(-1.0);
        assert_eq!(range.value(), 0.0);
    }

    #[test]
    fn test_value_range_min_above_max_coerces() {
        let mut range = ValueRange::new(0.0, 10.0, 5.0);
        range.set_min(20.0);
        assert_eq!(range.min(), 20.0);
        assert_eq!(range.max(), 20.0);
        assert_eq!(range.value(), 20.0);

        let range = ValueRange::new(8.0, 2.0, 5.0);
        assert_eq!(range.min(), 2.0);
        assert_eq!(range.max(), 2.0);
        assert_eq!(range.fraction(), 1.0);
    }

    #[test]
    fn test_value_range_ignores_nan() {
        let mut range = ValueRange::new(0.0, 10.0, 5.0);
        range.set_min(f32::NAN);
        range.set_max(f32::NAN);
        range.set_value(f32::NAN);
        assert_eq!(range, ValueRange::new(0.0, 10.0, 5.0));

        let range = ValueRange::new(f32::NAN, 4.0, f32::NAN);
        assert_eq!(range.min(), 0.0);
        assert_eq!(range.max(), 4.0);
        assert_eq!(range.value(), 0.0);
    }

    #[test]
    fn test_value_range_max_below_min_coerces() {
        let mut range = ValueRange::new(5.0, 10.0, 7.0);
        range.set_max(1.0);
        assert_eq!(range.min(), 1.0);
        assert_eq!(range.max(), 1.0);
        assert_eq!(range.value(), 1.0);
    }
}
