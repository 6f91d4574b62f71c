//! Animation playback control
//!
//! The [`Animator`] component steps through the frames of the selected
//! animation and pushes the current frame's source region into the
//! entity's [`Sprite`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::clip::{Animation, AnimationSet, Frame};
use crate::ecs::registry::ComponentKind;
use crate::ecs::{Component, ComponentBase, ComponentType, Components, UpdateContext, impl_component_any};
use crate::serial::xml::{self, XmlElement, XmlNode, parse_attr_or};
use crate::serial::{BinaryReader, BinarySerialize, BinaryWriter, SerialError, XmlSerialize};
use crate::ui::Sprite;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Animation is playing
    Playing,
    /// Animation is paused
    Paused,
    /// Animation has stopped
    #[default]
    Stopped,
}

impl PlaybackState {
    const fn to_u8(self) -> u8 {
        match self {
            Self::Stopped => 0,
            Self::Playing => 1,
            Self::Paused => 2,
        }
    }

    fn from_u8(value: u8) -> Result<Self, SerialError> {
        match value {
            0 => Ok(Self::Stopped),
            1 => Ok(Self::Playing),
            2 => Ok(Self::Paused),
            other => Err(SerialError::InvalidData(format!(
                "invalid playback state {other}"
            ))),
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
        })
    }
}

impl FromStr for PlaybackState {
    type Err = SerialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Playing" => Ok(Self::Playing),
            "Paused" => Ok(Self::Paused),
            "Stopped" => Ok(Self::Stopped),
            other => Err(SerialError::InvalidData(format!(
                "unknown playback state '{other}'"
            ))),
        }
    }
}

/// Frame-indexed player over a named set of animations
#[derive(Debug, Clone)]
pub struct Animator {
    base: ComponentBase,
    animations: AnimationSet,
    /// Id of the selected animation (may go stale if the set changes)
    selected: String,
    frame_index: usize,
    state: PlaybackState,
    looping: bool,
    multiplier: f32,
    /// Time spent on the current frame; not serialized
    elapsed: Duration,
}

impl Animator {
    /// Create an animator over `animations`, selecting the first entry
    #[must_use]
    pub fn new(animations: AnimationSet) -> Self {
        let selected = animations
            .first()
            .map(|(id, _)| id.to_string())
            .unwrap_or_default();
        Self {
            animations,
            selected,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn animations(&self) -> &AnimationSet {
        &self.animations
    }

    /// Mutable access to the set; a removed selection heals on next access
    pub fn animations_mut(&mut self) -> &mut AnimationSet {
        &mut self.animations
    }

    /// Stored selection id, as last chosen
    #[must_use]
    pub fn selected(&self) -> &str {
        &self.selected
    }

    #[must_use]
    pub const fn frame_index(&self) -> usize {
        self.frame_index
    }

    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    #[must_use]
    pub const fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    #[must_use]
    pub const fn multiplier(&self) -> f32 {
        self.multiplier
    }

    /// Set the speed multiplier; negative and non-finite values become 0
    pub fn set_multiplier(&mut self, multiplier: f32) {
        self.multiplier = if multiplier.is_finite() { multiplier.max(0.0) } else { 0.0 };
    }

    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Select an animation.
    ///
    /// An unknown id leaves the selection untouched, but the frame index and
    /// timer are reset either way.
    pub fn select(&mut self, id: &str) {
        if let Some(stored) = self.animations.id_of(id) {
            self.selected = stored.to_string();
        } else {
            log::debug!("Animation '{id}' not found; keeping '{}'", self.selected);
        }
        self.frame_index = 0;
        self.elapsed = Duration::ZERO;
    }

    /// Start playing, optionally switching animation first.
    ///
    /// Resuming from pause keeps the frame and timer.
    pub fn play(&mut self, id: Option<&str>) {
        match id {
            Some(id) => self.select(id),
            None if self.state == PlaybackState::Stopped => self.elapsed = Duration::ZERO,
            None => {}
        }
        self.state = PlaybackState::Playing;
    }

    /// Pause, keeping the frame and timer
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Stop and rewind to the first frame
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.frame_index = 0;
        self.elapsed = Duration::ZERO;
    }

    /// Re-select the first animation if the stored id is gone
    fn heal_selection(&mut self) -> bool {
        if self.animations.contains(&self.selected) {
            return true;
        }
        match self.animations.first() {
            Some((id, _)) => {
                self.selected = id.to_string();
                self.frame_index = 0;
                self.elapsed = Duration::ZERO;
                true
            }
            None => false,
        }
    }

    /// Selected animation, falling back to the first entry when the stored
    /// selection no longer exists
    pub fn current_animation(&mut self) -> Option<&Animation> {
        if !self.heal_selection() {
            return None;
        }
        self.animations.get(&self.selected)
    }

    /// Current frame of the selected animation
    pub fn current_frame(&mut self) -> Option<Frame> {
        if !self.heal_selection() {
            return None;
        }
        let len = self.animations.get(&self.selected).map_or(0, Animation::len);
        if self.frame_index >= len {
            self.frame_index = 0;
        }
        self.animations
            .get(&self.selected)
            .and_then(|a| a.frame(self.frame_index))
            .copied()
    }

    /// Advance playback by `dt`
    pub fn advance(&mut self, dt: Duration) {
        if self.animations.is_empty() || !self.is_playing() || self.multiplier == 0.0 {
            return;
        }
        if !self.heal_selection() {
            return;
        }
        let Some(animation) = self.animations.get(&self.selected) else {
            return;
        };
        let count = animation.len();
        if count <= 1 {
            self.frame_index = 0;
            return;
        }
        if self.frame_index >= count {
            self.frame_index = 0;
        }

        // A threshold too large for Duration is never reached
        let scaled = animation.frames()[self.frame_index].duration.as_secs_f64()
            * f64::from(self.multiplier);
        let threshold = Duration::try_from_secs_f64(scaled).unwrap_or(Duration::MAX);
        self.elapsed += dt;
        if self.elapsed >= threshold {
            self.elapsed = Duration::ZERO;
            self.frame_index += 1;
            if self.frame_index >= count {
                self.frame_index = 0;
                if !self.looping {
                    self.state = PlaybackState::Stopped;
                }
            }
        }
    }

    fn apply_frame(&mut self, siblings: &mut Components) {
        if let Some(frame) = self.current_frame()
            && let Some(sprite) = siblings.get_mut::<Sprite>()
        {
            sprite.set_texture_rect(frame.rect);
        }
    }

    fn read_binary(reader: &mut BinaryReader<'_>) -> Result<Self, SerialError> {
        let base = ComponentBase::read(reader)?;
        let animations = AnimationSet::read(reader)?;
        let selected = reader.read_string()?;
        let frame_index = reader.read_len()?;
        let state = PlaybackState::from_u8(reader.read_u8()?)?;
        let looping = reader.read_bool()?;
        let multiplier = reader.read_f32()?;

        let mut animator = Self {
            base,
            animations,
            selected,
            frame_index,
            state,
            looping,
            ..Default::default()
        };
        animator.set_multiplier(multiplier);
        Ok(animator)
    }

    fn read_xml(node: XmlNode<'_, '_>) -> Result<Self, SerialError> {
        xml::expect_tag(node, ComponentKind::Animator.name())?;
        let base = ComponentBase::from_xml(node)?;
        let animations = match xml::optional_child(node, "AnimationSet") {
            Some(child) => AnimationSet::read_xml(child)?,
            None => AnimationSet::new(),
        };

        let mut animator = Self {
            base,
            animations,
            selected: node.attribute("Selected").unwrap_or_default().to_string(),
            frame_index: parse_attr_or(node, "Frame", 0)?,
            state: parse_attr_or(node, "State", PlaybackState::Stopped)?,
            looping: parse_attr_or(node, "Loop", true)?,
            ..Default::default()
        };
        animator.set_multiplier(parse_attr_or(node, "Multiplier", 1.0)?);
        Ok(animator)
    }
}

impl Default for Animator {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            animations: AnimationSet::new(),
            selected: String::new(),
            frame_index: 0,
            state: PlaybackState::Stopped,
            looping: true,
            multiplier: 1.0,
            elapsed: Duration::ZERO,
        }
    }
}

impl PartialEq for Animator {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
            && self.animations == other.animations
            && self.selected == other.selected
            && self.frame_index == other.frame_index
            && self.state == other.state
            && self.looping == other.looping
            && self.multiplier == other.multiplier
    }
}

impl BinarySerialize for Animator {
    fn save_binary(&self, writer: &mut BinaryWriter<'_>) -> Result<(), SerialError> {
        self.base.write(writer)?;
        self.animations.write(writer)?;
        writer.write_string(&self.selected)?;
        writer.write_len(self.frame_index)?;
        writer.write_u8(self.state.to_u8())?;
        writer.write_bool(self.looping)?;
        writer.write_f32(self.multiplier)
    }

    fn load_binary(&mut self, reader: &mut BinaryReader<'_>) -> Result<(), SerialError> {
        let mut loaded = Self::read_binary(reader)?;
        loaded.base.adopt_owner(&self.base);
        *self = loaded;
        Ok(())
    }
}

impl XmlSerialize for Animator {
    fn to_xml(&self) -> XmlElement {
        self.base
            .xml_element(ComponentKind::Animator)
            .attr("Selected", &self.selected)
            .attr("Frame", self.frame_index)
            .attr("State", self.state)
            .attr("Loop", self.looping)
            .attr("Multiplier", self.multiplier)
            .child(self.animations.to_xml())
    }

    fn load_xml(&mut self, node: XmlNode<'_, '_>) -> Result<(), SerialError> {
        let mut loaded = Self::read_xml(node)?;
        loaded.base.adopt_owner(&self.base);
        *self = loaded;
        Ok(())
    }
}

impl Component for Animator {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Animator
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn on_added(&mut self, siblings: &mut Components) {
        self.apply_frame(siblings);
    }

    fn update(&mut self, ctx: &UpdateContext<'_>, siblings: &mut Components) {
        self.advance(ctx.dt);
        self.apply_frame(siblings);
    }

    impl_component_any!();
}

impl ComponentType for Animator {
    const KIND: ComponentKind = ComponentKind::Animator;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::{load_bytes, load_xml_str, to_bytes};
    use crate::ui::IntRect;

    const MS: Duration = Duration::from_millis(1);

    fn three_frames() -> Animation {
        Animation::uniform(
            (0..3).map(|i| IntRect::new(i * 10, 0, 10, 10)),
            Duration::from_millis(100),
        )
    }

    fn animator() -> Animator {
        let mut set = AnimationSet::new();
        set.insert("walk", three_frames());
        set.insert("idle", Animation::uniform([IntRect::new(0, 10, 10, 10)], 100 * MS));
        let mut animator = Animator::new(set);
        animator.select("walk");
        animator
    }

    fn step(animator: &mut Animator, dt: Duration, times: usize) {
        for _ in 0..times {
            animator.advance(dt);
        }
    }

    #[test]
    fn test_advances_on_frame_boundaries() {
        let mut a = animator();
        a.play(None);
        step(&mut a, 50 * MS, 5);
        // 250ms: advanced at 100 and 200, third frame not done yet
        assert_eq!(a.frame_index(), 2);
        assert!(a.is_playing());
    }

    #[test]
    fn test_loop_wraps_to_first_frame() {
        let mut a = animator();
        a.play(None);
        step(&mut a, 50 * MS, 6);
        assert_eq!(a.frame_index(), 0);
        assert!(a.is_playing());
    }

    #[test]
    fn test_no_loop_stops_at_end() {
        let mut a = animator();
        a.set_looping(false);
        a.play(None);
        step(&mut a, 50 * MS, 6);
        assert_eq!(a.frame_index(), 0);
        assert_eq!(a.state(), PlaybackState::Stopped);

        step(&mut a, 50 * MS, 4);
        assert_eq!(a.frame_index(), 0);
    }

    #[test]
    fn test_multiplier_scales_threshold() {
        let mut a = animator();
        a.set_multiplier(2.0);
        a.play(None);
        step(&mut a, 100 * MS, 1);
        assert_eq!(a.frame_index(), 0);
        step(&mut a, 100 * MS, 1);
        assert_eq!(a.frame_index(), 1);

        a.set_multiplier(-3.0);
        assert_eq!(a.multiplier(), 0.0);
        step(&mut a, 500 * MS, 4);
        assert_eq!(a.frame_index(), 1);
    }

    #[test]
    fn test_extreme_multipliers_do_not_panic() {
        let mut a = animator();
        a.play(None);
        a.set_multiplier(f32::INFINITY);
        assert_eq!(a.multiplier(), 0.0);
        step(&mut a, 16 * MS, 3);
        assert_eq!(a.frame_index(), 0);

        a.set_multiplier(f32::MAX);
        assert_eq!(a.multiplier(), f32::MAX);
        step(&mut a, 16 * MS, 3);
        assert_eq!(a.frame_index(), 0);
        assert!(a.is_playing());

        let mut bytes = to_bytes(&a).unwrap();
        let tail = bytes.len() - 4;
        bytes[tail..].copy_from_slice(&f32::INFINITY.to_le_bytes());
        let mut loaded = Animator::default();
        load_bytes(&mut loaded, &bytes).unwrap();
        assert_eq!(loaded.multiplier(), 0.0);
        step(&mut loaded, 16 * MS, 3);
        assert_eq!(loaded.frame_index(), 0);

        a.set_multiplier(2.0);
        let xml = a.save_xml().replace(r#"Multiplier="2""#, r#"Multiplier="inf""#);
        assert!(xml.contains(r#"Multiplier="inf""#));
        load_xml_str(&mut loaded, &xml).unwrap();
        assert_eq!(loaded.multiplier(), 0.0);
        assert!(loaded.is_playing());
        step(&mut loaded, 16 * MS, 3);
    }

    #[test]
    fn test_single_frame_holds() {
        let mut a = animator();
        a.play(Some("idle"));
        step(&mut a, 150 * MS, 10);
        assert_eq!(a.frame_index(), 0);
        assert!(a.is_playing());
    }

    #[test]
    fn test_update_requires_playing() {
        let mut a = animator();
        step(&mut a, 150 * MS, 3);
        assert_eq!(a.frame_index(), 0);

        a.play(None);
        step(&mut a, 100 * MS, 1);
        a.pause();
        step(&mut a, 100 * MS, 3);
        assert_eq!(a.frame_index(), 1);
        assert_eq!(a.state(), PlaybackState::Paused);

        a.play(None);
        assert_eq!(a.frame_index(), 1);
        a.stop();
        assert_eq!(a.frame_index(), 0);
        assert_eq!(a.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_invalid_select_still_resets_position() {
        let mut a = animator();
        a.play(None);
        step(&mut a, 60 * MS, 3);
        assert_eq!(a.frame_index(), 1);
        assert!(a.elapsed() > Duration::ZERO);

        a.play(Some("missing"));
        assert_eq!(a.selected(), "walk");
        assert_eq!(a.frame_index(), 0);
        assert_eq!(a.elapsed(), Duration::ZERO);
        assert!(a.is_playing());
    }

    #[test]
    fn test_select_is_case_insensitive() {
        let mut a = animator();
        a.select("IDLE");
        assert_eq!(a.selected(), "idle");
    }

    #[test]
    fn test_stale_selection_heals() {
        let mut a = animator();
        a.play(None);
        step(&mut a, 100 * MS, 1);
        a.animations_mut().remove("walk");

        assert_eq!(a.current_animation().map(Animation::len), Some(1));
        assert_eq!(a.selected(), "idle");
        assert_eq!(a.frame_index(), 0);

        a.animations_mut().clear();
        assert!(a.current_frame().is_none());
    }

    #[test]
    fn test_writes_frame_into_sprite() {
        let mut a = animator();
        a.play(None);
        let mut siblings = Components::new();
        siblings.push(Box::new(Sprite::default()));

        a.apply_frame(&mut siblings);
        assert_eq!(siblings.get::<Sprite>().map(Sprite::texture_rect), Some(IntRect::new(0, 0, 10, 10)));

        a.advance(100 * MS);
        a.apply_frame(&mut siblings);
        assert_eq!(siblings.get::<Sprite>().map(Sprite::texture_rect), Some(IntRect::new(10, 0, 10, 10)));
    }

    #[test]
    fn test_round_trip_ignores_elapsed() {
        let mut a = animator();
        a.set_looping(false);
        a.set_multiplier(1.5);
        a.play(None);
        step(&mut a, 80 * MS, 3);
        a.pause();

        let bytes = to_bytes(&a).unwrap();
        let mut from_binary = Animator::default();
        load_bytes(&mut from_binary, &bytes).unwrap();
        assert_eq!(from_binary, a);
        assert_eq!(from_binary.elapsed(), Duration::ZERO);

        let mut from_xml = Animator::default();
        load_xml_str(&mut from_xml, &a.save_xml()).unwrap();
        assert_eq!(from_xml, a);
    }

    #[test]
    fn test_xml_defaults() {
        let mut a = animator();
        load_xml_str(&mut a, "<Animator />").unwrap();
        assert_eq!(a, Animator::default());
    }

    #[test]
    fn test_truncated_binary_leaves_state() {
        let a = animator();
        let bytes = to_bytes(&a).unwrap();
        let mut target = animator();
        target.set_looping(false);
        let before = target.clone();
        assert!(load_bytes(&mut target, &bytes[..bytes.len() - 2]).is_err());
        assert_eq!(target, before);
    }
}
