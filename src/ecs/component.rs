//! Component base contract and per-entity component storage

use std::any::Any;
use std::fmt;
use std::time::Duration;

use hecs::Entity;
use smallvec::SmallVec;

use super::registry::ComponentKind;
use crate::input::InputState;
use crate::renderer::RenderTarget;
use crate::serial::xml::{XmlElement, XmlNode, parse_attr_or};
use crate::serial::{BinaryReader, BinarySerialize, BinaryWriter, SerialError, XmlSerialize};
use crate::ui::View;

/// Per-frame data handed to component updates
pub struct UpdateContext<'a> {
    /// Time elapsed since the previous frame
    pub dt: Duration,
    /// Input state for this frame
    pub input: &'a dyn InputState,
    /// Active view, for resolving relative transforms
    pub view: &'a View,
}

/// A typed behavior/data unit attached to at most one entity.
///
/// All component types share this one interface: an update hook, draw
/// hook, the on-added hook and the binary/XML contracts. Sibling components
/// are reachable through the `siblings` argument; the component being
/// called is temporarily absent from that set.
pub trait Component: BinarySerialize + XmlSerialize + Any + Send + Sync + fmt::Debug {
    /// Stable type tag
    fn kind(&self) -> ComponentKind;

    /// Shared flags and owner handle
    fn base(&self) -> &ComponentBase;

    /// Shared flags and owner handle (mutable)
    fn base_mut(&mut self) -> &mut ComponentBase;

    /// One-time setup after the component is registered on its entity
    fn on_added(&mut self, _siblings: &mut Components) {}

    /// Advance one frame
    fn update(&mut self, _ctx: &UpdateContext<'_>, _siblings: &mut Components) {}

    /// Issue draw calls
    fn draw(&self, _target: &mut dyn RenderTarget, _siblings: &Components, _view: &View) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Statically known component types
pub trait ComponentType: Component + Default {
    const KIND: ComponentKind;
}

/// State every component carries.
///
/// Equality ignores the owner: two components with the same data compare
/// equal wherever they are attached.
#[derive(Debug, Clone, Copy)]
pub struct ComponentBase {
    owner: Option<Entity>,
    /// Whether the component takes part in updates
    pub enabled: bool,
    /// Whether the component takes part in drawing
    pub visible: bool,
}

impl ComponentBase {
    /// Entity the component is attached to
    #[must_use]
    pub const fn owner(&self) -> Option<Entity> {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: Option<Entity>) {
        self.owner = owner;
    }

    /// Carry the owner over from the state being replaced
    pub(crate) fn adopt_owner(&mut self, previous: &ComponentBase) {
        self.owner = previous.owner;
    }

    pub(crate) fn write(&self, writer: &mut BinaryWriter<'_>) -> Result<(), SerialError> {
        writer.write_bool(self.enabled)?;
        writer.write_bool(self.visible)
    }

    pub(crate) fn read(reader: &mut BinaryReader<'_>) -> Result<Self, SerialError> {
        Ok(Self {
            owner: None,
            enabled: reader.read_bool()?,
            visible: reader.read_bool()?,
        })
    }

    /// Start an element for `kind` carrying the shared attributes
    pub(crate) fn xml_element(&self, kind: ComponentKind) -> XmlElement {
        XmlElement::new(kind.name())
            .attr("Enabled", self.enabled)
            .attr("Visible", self.visible)
    }

    pub(crate) fn from_xml(node: XmlNode<'_, '_>) -> Result<Self, SerialError> {
        Ok(Self {
            owner: None,
            enabled: parse_attr_or(node, "Enabled", true)?,
            visible: parse_attr_or(node, "Visible", true)?,
        })
    }
}

impl Default for ComponentBase {
    fn default() -> Self {
        Self {
            owner: None,
            enabled: true,
            visible: true,
        }
    }
}

impl PartialEq for ComponentBase {
    fn eq(&self, other: &Self) -> bool {
        self.enabled == other.enabled && self.visible == other.visible
    }
}

/// Ordered set of components owned by one entity, at most one per kind.
///
/// Iteration follows attach order, which is also the update order.
#[derive(Debug, Default)]
pub struct Components {
    items: SmallVec<[Box<dyn Component>; 4]>,
}

impl Components {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, kind: ComponentKind) -> bool {
        self.items.iter().any(|c| c.kind() == kind)
    }

    /// Kinds present, in attach order
    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.items.iter().map(|c| c.kind())
    }

    pub fn iter(&self) -> impl Iterator<Item = &(dyn Component + 'static)> {
        self.items.iter().map(|c| c.as_ref())
    }

    #[must_use]
    pub fn get<T: ComponentType>(&self) -> Option<&T> {
        self.get_dyn(T::KIND)?.as_any().downcast_ref::<T>()
    }

    pub fn get_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.get_dyn_mut(T::KIND)?.as_any_mut().downcast_mut::<T>()
    }

    #[must_use]
    pub fn get_dyn(&self, kind: ComponentKind) -> Option<&(dyn Component + 'static)> {
        let index = self.index_of(kind)?;
        Some(self.items[index].as_ref())
    }

    pub fn get_dyn_mut(&mut self, kind: ComponentKind) -> Option<&mut (dyn Component + 'static)> {
        let index = self.index_of(kind)?;
        Some(self.items[index].as_mut())
    }

    pub(crate) fn push(&mut self, component: Box<dyn Component>) {
        self.items.push(component);
    }

    pub(crate) fn remove(&mut self, kind: ComponentKind) -> Option<Box<dyn Component>> {
        let index = self.items.iter().position(|c| c.kind() == kind)?;
        Some(self.items.remove(index))
    }

    /// Run `f` on the component at `index` with the rest of the set as its
    /// siblings, then put it back in place.
    pub(crate) fn with_detached<R>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut dyn Component, &mut Components) -> R,
    ) -> Option<R> {
        if index >= self.items.len() {
            return None;
        }
        let mut component = self.items.remove(index);
        let result = f(component.as_mut(), self);
        self.items.insert(index, component);
        Some(result)
    }

    /// Index of a kind in attach order
    pub(crate) fn index_of(&self, kind: ComponentKind) -> Option<usize> {
        self.items.iter().position(|c| c.kind() == kind)
    }
}

/// Implements the `Any` accessors of [`Component`] for a concrete type
macro_rules! impl_component_any {
    () => {
        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }
    };
}

pub(crate) use impl_component_any;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Transform;
    use crate::ui::Sprite;

    #[test]
    fn test_typed_lookup() {
        let mut set = Components::new();
        set.push(Box::new(Transform::default()));
        set.push(Box::new(Sprite::default()));

        assert!(set.get::<Transform>().is_some());
        assert!(set.get::<Sprite>().is_some());
        assert!(set.contains(ComponentKind::Sprite));
        assert!(!set.contains(ComponentKind::Animator));
        assert_eq!(
            set.kinds().collect::<Vec<_>>(),
            vec![ComponentKind::Transform, ComponentKind::Sprite]
        );
    }

    #[test]
    fn test_with_detached_restores_order() {
        let mut set = Components::new();
        set.push(Box::new(Transform::default()));
        set.push(Box::new(Sprite::default()));

        let seen = set.with_detached(0, |component, siblings| {
            assert_eq!(component.kind(), ComponentKind::Transform);
            assert!(!siblings.contains(ComponentKind::Transform));
            siblings.len()
        });

        assert_eq!(seen, Some(1));
        assert_eq!(set.index_of(ComponentKind::Transform), Some(0));
        assert!(set.with_detached(5, |_, _| ()).is_none());
    }

    #[test]
    fn test_base_equality_ignores_owner() {
        let mut world = hecs::World::new();
        let entity = world.spawn(());

        let mut a = ComponentBase::default();
        a.set_owner(Some(entity));
        assert_eq!(a, ComponentBase::default());
    }
}
