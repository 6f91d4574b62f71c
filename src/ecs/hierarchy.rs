//! Entity hierarchy components
//!
//! Provides parent-child relationships between entities. A parent owns its
//! children: despawning the parent despawns them too.

use hecs::Entity;
use smallvec::SmallVec;

/// Parent component - weak back-reference to the owning entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub Entity);

impl Parent {
    /// Create a new parent reference
    #[must_use]
    pub const fn new(entity: Entity) -> Self {
        Self(entity)
    }

    /// Get the parent entity
    #[must_use]
    pub const fn entity(&self) -> Entity {
        self.0
    }
}

/// Children component - ordered list of owned child entities
#[derive(Debug, Clone, Default)]
pub struct Children(pub SmallVec<[Entity; 8]>);

impl Children {
    /// Create an empty children list
    #[must_use]
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Append a child (ignored if already present)
    pub fn add(&mut self, child: Entity) {
        if !self.0.contains(&child) {
            self.0.push(child);
        }
    }

    /// Remove a child
    pub fn remove(&mut self, child: Entity) -> bool {
        if let Some(pos) = self.0.iter().position(|&e| e == child) {
            self.0.remove(pos);
            true
        } else {
            false
        }
    }

    /// Check if this entity has children
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of children
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over children in order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.0.iter()
    }

    /// Children as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[Entity] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_add_remove() {
        let mut world = hecs::World::new();
        let entity1 = world.spawn(());
        let entity2 = world.spawn(());

        let mut children = Children::new();

        children.add(entity1);
        children.add(entity2);
        assert_eq!(children.len(), 2);
        assert_eq!(children.as_slice(), &[entity1, entity2]);

        // No duplicates
        children.add(entity1);
        assert_eq!(children.len(), 2);

        assert!(children.remove(entity1));
        assert!(!children.remove(entity1));
        assert_eq!(children.len(), 1);
    }
}
