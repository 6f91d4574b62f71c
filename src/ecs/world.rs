//! World wrapper around hecs
//!
//! Each entity is a hecs entity carrying a [`Name`], its [`Components`] set,
//! a [`Children`] list and, when it is not a root, a [`Parent`] link. The
//! world enforces the composition rules from [`super::registry`] on every
//! attach and remove.

use glam::Vec2;
use hecs::Entity;
use smallvec::SmallVec;

use super::component::{Component, ComponentType, Components, UpdateContext};
use super::components::{Name, Transform};
use super::error::ComponentError;
use super::hierarchy::{Children, Parent};
use super::registry::{ComponentKind, CompositionMode, check_removal, plan_attach};
use crate::renderer::RenderTarget;
use crate::ui::{Origin, View};

type KindList = SmallVec<[ComponentKind; 8]>;

/// Scene world containing all entities and components
pub struct World {
    /// The underlying hecs world
    inner: hecs::World,
    /// Entities without a parent, in spawn order
    roots: Vec<Entity>,
    /// Policy for missing required components
    mode: CompositionMode,
}

impl World {
    /// Create a new empty world (permissive composition)
    pub fn new() -> Self {
        Self::with_mode(CompositionMode::default())
    }

    /// Create a new empty world with the given composition policy
    pub fn with_mode(mode: CompositionMode) -> Self {
        Self {
            inner: hecs::World::new(),
            roots: Vec::new(),
            mode,
        }
    }

    pub fn mode(&self) -> CompositionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CompositionMode) {
        self.mode = mode;
    }

    // ── Entities ─────────────────────────────────────────────────────

    /// Spawn an empty root entity
    pub fn spawn(&mut self, name: impl Into<String>) -> Entity {
        let entity = self
            .inner
            .spawn((Name::new(name), Components::new(), Children::new()));
        self.roots.push(entity);
        log::debug!("Spawned entity {entity:?}");
        entity
    }

    /// Spawn an empty entity as the last child of `parent`
    pub fn spawn_child(
        &mut self,
        parent: Entity,
        name: impl Into<String>,
    ) -> Result<Entity, ComponentError> {
        if !self.contains(parent) {
            return Err(ComponentError::NoSuchEntity);
        }
        let child = self.spawn(name);
        self.add_child(parent, child)?;
        Ok(child)
    }

    /// Despawn an entity and, depth-first, every descendant
    pub fn despawn(&mut self, entity: Entity) -> Result<(), ComponentError> {
        if !self.contains(entity) {
            return Err(ComponentError::NoSuchEntity);
        }
        self.unlink(entity);
        self.despawn_tree(entity);
        Ok(())
    }

    fn despawn_tree(&mut self, entity: Entity) {
        for child in self.children(entity) {
            self.despawn_tree(child);
        }
        if self.inner.despawn(entity).is_ok() {
            log::debug!("Despawned entity {entity:?}");
        }
    }

    /// Check if an entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Get the number of entities
    pub fn len(&self) -> u32 {
        self.inner.len()
    }

    /// Check if the world is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Clear all entities from the world
    pub fn clear(&mut self) {
        self.inner.clear();
        self.roots.clear();
    }

    /// Entity identifier
    pub fn name(&self, entity: Entity) -> Option<String> {
        self.inner.get::<&Name>(entity).ok().map(|n| n.0.clone())
    }

    pub fn set_name(&mut self, entity: Entity, name: impl Into<String>) -> Result<(), ComponentError> {
        let slot = self
            .inner
            .query_one_mut::<&mut Name>(entity)
            .map_err(|_| ComponentError::NoSuchEntity)?;
        slot.0 = name.into();
        Ok(())
    }

    // ── Hierarchy ────────────────────────────────────────────────────

    /// Entities without a parent, in the order they became roots
    pub fn roots(&self) -> &[Entity] {
        &self.roots
    }

    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.inner.get::<&Parent>(entity).ok().map(|p| p.entity())
    }

    /// Direct children in order
    pub fn children(&self, entity: Entity) -> Vec<Entity> {
        self.inner
            .get::<&Children>(entity)
            .map(|c| c.as_slice().to_vec())
            .unwrap_or_default()
    }

    /// Make `child` the last child of `parent`, detaching it from any
    /// previous parent
    pub fn add_child(&mut self, parent: Entity, child: Entity) -> Result<(), ComponentError> {
        if !self.contains(parent) || !self.contains(child) {
            return Err(ComponentError::NoSuchEntity);
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(ComponentError::HierarchyCycle);
        }

        self.unlink(child);
        self.inner
            .insert_one(child, Parent::new(parent))
            .map_err(|_| ComponentError::NoSuchEntity)?;
        if let Ok(children) = self.inner.query_one_mut::<&mut Children>(parent) {
            children.add(child);
        }
        Ok(())
    }

    /// Turn `child` into a root entity
    pub fn detach_child(&mut self, child: Entity) -> Result<(), ComponentError> {
        if !self.contains(child) {
            return Err(ComponentError::NoSuchEntity);
        }
        if self.parent(child).is_some() {
            self.unlink(child);
            self.roots.push(child);
        }
        Ok(())
    }

    /// True if `ancestor` appears on the parent chain of `entity`
    pub fn is_ancestor(&self, ancestor: Entity, entity: Entity) -> bool {
        let mut current = self.parent(entity);
        while let Some(e) = current {
            if e == ancestor {
                return true;
            }
            current = self.parent(e);
        }
        false
    }

    /// Remove `entity` from its parent's child list (or from the roots)
    fn unlink(&mut self, entity: Entity) {
        match self.parent(entity) {
            Some(parent) => {
                if let Ok(children) = self.inner.query_one_mut::<&mut Children>(parent) {
                    children.remove(entity);
                }
                let _ = self.inner.remove_one::<Parent>(entity);
            }
            None => self.roots.retain(|&r| r != entity),
        }
    }

    // ── Components ───────────────────────────────────────────────────

    /// Read access to an entity's component set
    pub fn components(&self, entity: Entity) -> Option<hecs::Ref<'_, Components>> {
        self.inner.get::<&Components>(entity).ok()
    }

    /// Write access to an entity's component set.
    ///
    /// Components can be mutated freely; adding or removing them goes
    /// through [`World::attach`] and [`World::remove_component`].
    pub fn components_mut(&mut self, entity: Entity) -> Option<&mut Components> {
        self.inner.query_one_mut::<&mut Components>(entity).ok()
    }

    /// Check if the entity owns a component of `kind`
    pub fn has(&self, entity: Entity, kind: ComponentKind) -> bool {
        self.components(entity).is_some_and(|c| c.contains(kind))
    }

    /// Run `f` against a typed component
    pub fn with_component<T: ComponentType, R>(
        &self,
        entity: Entity,
        f: impl FnOnce(&T) -> R,
    ) -> Option<R> {
        let components = self.components(entity)?;
        components.get::<T>().map(f)
    }

    /// Run `f` against a typed component (mutable)
    pub fn with_component_mut<T: ComponentType, R>(
        &mut self,
        entity: Entity,
        f: impl FnOnce(&mut T) -> R,
    ) -> Option<R> {
        self.components_mut(entity)?.get_mut::<T>().map(f)
    }

    /// Attach a typed component using the world's composition mode
    pub fn add<T: ComponentType>(&mut self, entity: Entity, component: T) -> Result<(), ComponentError> {
        self.attach(entity, Box::new(component))
    }

    /// Attach a component using the world's composition mode
    pub fn attach(
        &mut self,
        entity: Entity,
        component: Box<dyn Component>,
    ) -> Result<(), ComponentError> {
        self.attach_with_mode(entity, component, self.mode)
    }

    /// Attach a component.
    ///
    /// Fails if the entity already owns this kind, if a required kind is
    /// missing in strict mode, or if any kind involved conflicts with one
    /// already present. In permissive mode missing requirements are
    /// instantiated first, recursively. On failure nothing is changed.
    pub fn attach_with_mode(
        &mut self,
        entity: Entity,
        component: Box<dyn Component>,
        mode: CompositionMode,
    ) -> Result<(), ComponentError> {
        let kind = component.kind();
        if component.base().owner().is_some_and(|owner| owner != entity) {
            log::warn!("Refusing to attach {kind}: already owned by another entity");
            return Err(ComponentError::OwnedByOther);
        }

        let components = self
            .components_mut(entity)
            .ok_or(ComponentError::NoSuchEntity)?;
        let present: KindList = components.kinds().collect();
        let planned = plan_attach(kind, &present, mode)
            .inspect_err(|e| log::warn!("Cannot attach {kind} to {entity:?}: {e}"))?;

        for required in planned {
            log::debug!("Auto-adding {required} to {entity:?} for {kind}");
            register(components, entity, required.create(), true);
        }
        register(components, entity, component, true);
        Ok(())
    }

    /// Attach restored state: strict rules, no on-added hook
    pub(crate) fn attach_restored(
        &mut self,
        entity: Entity,
        component: Box<dyn Component>,
    ) -> Result<(), ComponentError> {
        let kind = component.kind();
        let components = self
            .components_mut(entity)
            .ok_or(ComponentError::NoSuchEntity)?;
        let present: KindList = components.kinds().collect();
        plan_attach(kind, &present, CompositionMode::Strict)?;
        register(components, entity, component, false);
        Ok(())
    }

    /// Detach and return a component.
    ///
    /// Fails while another component on the entity still requires it.
    pub fn remove_component(
        &mut self,
        entity: Entity,
        kind: ComponentKind,
    ) -> Result<Box<dyn Component>, ComponentError> {
        let components = self
            .components_mut(entity)
            .ok_or(ComponentError::NoSuchEntity)?;
        let present: KindList = components.kinds().collect();
        check_removal(kind, &present)
            .inspect_err(|e| log::warn!("Cannot remove {kind} from {entity:?}: {e}"))?;

        let mut removed = components
            .remove(kind)
            .ok_or(ComponentError::NotPresent(kind))?;
        removed.base_mut().set_owner(None);
        Ok(removed)
    }

    // ── Transform hierarchy ──────────────────────────────────────────

    fn transform_mut(&mut self, entity: Entity) -> Result<&mut Transform, ComponentError> {
        self.components_mut(entity)
            .ok_or(ComponentError::NoSuchEntity)?
            .get_mut::<Transform>()
            .ok_or(ComponentError::NotPresent(ComponentKind::Transform))
    }

    /// Move an entity's transform and carry the delta to every child that
    /// owns a transform (each child repeats this for its own children).
    pub fn set_position(&mut self, entity: Entity, position: Vec2) -> Result<(), ComponentError> {
        let Some(delta) = self.transform_mut(entity)?.set_position(position) else {
            return Ok(());
        };
        for child in self.children(entity) {
            let target = match self.transform_mut(child) {
                Ok(t) => t.position() + delta,
                Err(_) => continue,
            };
            self.set_position(child, target)?;
        }
        Ok(())
    }

    /// Move an entity (and its children) by `delta`
    pub fn translate(&mut self, entity: Entity, delta: Vec2) -> Result<(), ComponentError> {
        let target = self.transform_mut(entity)?.position() + delta;
        self.set_position(entity, target)
    }

    /// Change an entity's alignment without moving it on screen
    pub fn set_origin(&mut self, entity: Entity, origin: Origin) -> Result<(), ComponentError> {
        self.transform_mut(entity)?.set_origin(origin);
        Ok(())
    }

    // ── Frame dispatch ───────────────────────────────────────────────

    /// Update an entity's enabled components in attach order, then its
    /// children in order
    pub fn update(&mut self, entity: Entity, ctx: &UpdateContext<'_>) -> Result<(), ComponentError> {
        let components = self
            .components_mut(entity)
            .ok_or(ComponentError::NoSuchEntity)?;
        for index in 0..components.len() {
            components.with_detached(index, |component, siblings| {
                if component.base().enabled {
                    component.update(ctx, siblings);
                }
            });
        }
        for child in self.children(entity) {
            self.update(child, ctx)?;
        }
        Ok(())
    }

    /// Update every entity tree
    pub fn update_all(&mut self, ctx: &UpdateContext<'_>) {
        for root in self.roots.clone() {
            if let Err(e) = self.update(root, ctx) {
                log::warn!("Skipping update of {root:?}: {e}");
            }
        }
    }

    /// Draw an entity's visible components, then its children
    pub fn draw(&self, entity: Entity, target: &mut dyn RenderTarget, view: &View) {
        if let Some(components) = self.components(entity) {
            for component in components.iter().filter(|c| c.base().visible) {
                component.draw(target, &components, view);
            }
        }
        for child in self.children(entity) {
            self.draw(child, target, view);
        }
    }

    /// Draw every entity tree
    pub fn draw_all(&self, target: &mut dyn RenderTarget, view: &View) {
        for &root in &self.roots {
            self.draw(root, target, view);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Register a component on `entity` and optionally run its on-added hook
fn register(
    components: &mut Components,
    entity: Entity,
    mut component: Box<dyn Component>,
    run_hook: bool,
) {
    component.base_mut().set_owner(Some(entity));
    let index = components.len();
    components.push(component);
    if run_hook {
        components.with_detached(index, |component, siblings| component.on_added(siblings));
    }
}
