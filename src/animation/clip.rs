//! Animation frames and named animation sets
//!
//! An [`Animation`] is an ordered list of frames, each a texture source
//! region shown for a fixed duration. An [`AnimationSet`] maps
//! case-insensitive ids to animations.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::serial::xml::{self, XmlElement, XmlNode};
use crate::serial::{BinaryReader, BinarySerialize, BinaryWriter, SerialError, XmlSerialize};
use crate::ui::IntRect;

/// A single frame: source region and display time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Frame {
    /// Region of the texture to display
    pub rect: IntRect,
    /// How long the frame stays up at multiplier 1.0
    pub duration: Duration,
}

impl Frame {
    #[must_use]
    pub const fn new(rect: IntRect, duration: Duration) -> Self {
        Self { rect, duration }
    }

    fn write(&self, writer: &mut BinaryWriter<'_>) -> Result<(), SerialError> {
        self.rect.write(writer)?;
        writer.write_duration(self.duration)
    }

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self, SerialError> {
        let rect = IntRect::read(reader)?;
        let duration = reader.read_duration()?;
        Ok(Self { rect, duration })
    }

    /// `<Frame Duration=nanos Left Top Width Height />`
    fn to_xml(self) -> XmlElement {
        self.rect
            .to_xml_as("Frame")
            .attr("Duration", duration_nanos(self.duration))
    }

    fn from_xml(node: XmlNode<'_, '_>) -> Result<Self, SerialError> {
        xml::expect_tag(node, "Frame")?;
        Ok(Self {
            rect: IntRect::from_xml(node)?,
            duration: Duration::from_nanos(xml::parse_attr(node, "Duration")?),
        })
    }
}

fn duration_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// Ordered sequence of frames
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Animation {
    frames: Vec<Frame>,
}

impl Animation {
    #[must_use]
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    /// Build an animation from equally timed regions
    #[must_use]
    pub fn uniform(rects: impl IntoIterator<Item = IntRect>, duration: Duration) -> Self {
        Self::new(rects.into_iter().map(|r| Frame::new(r, duration)).collect())
    }

    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut Vec<Frame> {
        &mut self.frames
    }

    #[must_use]
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Sum of all frame durations
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.frames.iter().map(|f| f.duration).sum()
    }

    fn write(&self, writer: &mut BinaryWriter<'_>) -> Result<(), SerialError> {
        writer.write_len(self.frames.len())?;
        for frame in &self.frames {
            frame.write(writer)?;
        }
        Ok(())
    }

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self, SerialError> {
        let count = reader.read_len()?;
        let frames = (0..count)
            .map(|_| Frame::read(reader))
            .collect::<Result<_, _>>()?;
        Ok(Self { frames })
    }

    fn read_frames(node: XmlNode<'_, '_>) -> Result<Self, SerialError> {
        let frames = xml::element_children(node)
            .filter(|child| child.tag_name().name() == "Frame")
            .map(Frame::from_xml)
            .collect::<Result<_, _>>()?;
        Ok(Self { frames })
    }
}

impl BinarySerialize for Animation {
    fn save_binary(&self, writer: &mut BinaryWriter<'_>) -> Result<(), SerialError> {
        self.write(writer)
    }

    fn load_binary(&mut self, reader: &mut BinaryReader<'_>) -> Result<(), SerialError> {
        *self = Self::read(reader)?;
        Ok(())
    }
}

impl XmlSerialize for Animation {
    fn to_xml(&self) -> XmlElement {
        self.frames
            .iter()
            .fold(XmlElement::new("Animation"), |el, f| el.child(f.to_xml()))
    }

    fn load_xml(&mut self, node: XmlNode<'_, '_>) -> Result<(), SerialError> {
        xml::expect_tag(node, "Animation")?;
        *self = Self::read_frames(node)?;
        Ok(())
    }
}

/// Named animations, keyed case-insensitively.
///
/// Ids keep the spelling they were inserted with; iteration follows the
/// lowercased key order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnimationSet {
    entries: BTreeMap<String, (String, Animation)>,
}

impl AnimationSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(id: &str) -> String {
        id.to_lowercase()
    }

    /// Insert or replace an animation, returning the replaced one
    pub fn insert(&mut self, id: impl Into<String>, animation: Animation) -> Option<Animation> {
        let id = id.into();
        self.entries
            .insert(Self::key(&id), (id, animation))
            .map(|(_, old)| old)
    }

    pub fn remove(&mut self, id: &str) -> Option<Animation> {
        self.entries.remove(&Self::key(id)).map(|(_, a)| a)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Animation> {
        self.entries.get(&Self::key(id)).map(|(_, a)| a)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Animation> {
        self.entries.get_mut(&Self::key(id)).map(|(_, a)| a)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(&Self::key(id))
    }

    /// Stored spelling of `id`
    #[must_use]
    pub fn id_of(&self, id: &str) -> Option<&str> {
        self.entries.get(&Self::key(id)).map(|(stored, _)| stored.as_str())
    }

    /// First entry in iteration order
    #[must_use]
    pub fn first(&self) -> Option<(&str, &Animation)> {
        self.iter().next()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Animation)> {
        self.entries.values().map(|(id, a)| (id.as_str(), a))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn write(&self, writer: &mut BinaryWriter<'_>) -> Result<(), SerialError> {
        writer.write_len(self.entries.len())?;
        for (id, animation) in self.iter() {
            writer.write_string(id)?;
            animation.write(writer)?;
        }
        Ok(())
    }

    pub(crate) fn read(reader: &mut BinaryReader<'_>) -> Result<Self, SerialError> {
        let count = reader.read_len()?;
        let mut set = Self::new();
        for _ in 0..count {
            let id = reader.read_string()?;
            let animation = Animation::read(reader)?;
            set.insert(id, animation);
        }
        Ok(set)
    }

    pub(crate) fn read_xml(node: XmlNode<'_, '_>) -> Result<Self, SerialError> {
        xml::expect_tag(node, "AnimationSet")?;
        let mut set = Self::new();
        for child in xml::element_children(node).filter(|c| c.tag_name().name() == "Animation") {
            let id = xml::required_attr(child, "Id")?;
            set.insert(id, Animation::read_frames(child)?);
        }
        Ok(set)
    }
}

impl BinarySerialize for AnimationSet {
    fn save_binary(&self, writer: &mut BinaryWriter<'_>) -> Result<(), SerialError> {
        self.write(writer)
    }

    fn load_binary(&mut self, reader: &mut BinaryReader<'_>) -> Result<(), SerialError> {
        *self = Self::read(reader)?;
        Ok(())
    }
}

impl XmlSerialize for AnimationSet {
    fn to_xml(&self) -> XmlElement {
        self.iter()
            .fold(XmlElement::new("AnimationSet"), |el, (id, animation)| {
                el.child(animation.to_xml().attr("Id", id))
            })
    }

    fn load_xml(&mut self, node: XmlNode<'_, '_>) -> Result<(), SerialError> {
        *self = Self::read_xml(node)?;
        Ok(())
    }
}
