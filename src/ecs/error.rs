//! Composition and lifecycle errors

use std::fmt;

use super::registry::ComponentKind;

/// Errors raised by component attach/remove and hierarchy edits.
///
/// Every operation that returns one of these leaves the entity unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentError {
    /// The entity handle is stale or was never spawned
    NoSuchEntity,
    /// The entity already owns a component of this kind
    AlreadyPresent(ComponentKind),
    /// A required sibling is absent and auto-adding is disabled
    MissingRequired {
        component: ComponentKind,
        required: ComponentKind,
    },
    /// An incompatible sibling is present
    Incompatible {
        component: ComponentKind,
        conflicting: ComponentKind,
    },
    /// Another component on the entity still requires this one
    RequiredBy {
        component: ComponentKind,
        dependent: ComponentKind,
    },
    /// The entity has no component of this kind
    NotPresent(ComponentKind),
    /// The component is already attached to a different entity
    OwnedByOther,
    /// The requested parent is the entity itself or one of its descendants
    HierarchyCycle,
}

impl fmt::Display for ComponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSuchEntity => write!(f, "entity does not exist"),
            Self::AlreadyPresent(kind) => write!(f, "entity already has a {kind} component"),
            Self::MissingRequired {
                component,
                required,
            } => write!(f, "{component} requires a {required} component"),
            Self::Incompatible {
                component,
                conflicting,
            } => write!(f, "{component} cannot coexist with {conflicting}"),
            Self::RequiredBy {
                component,
                dependent,
            } => write!(f, "{component} is still required by {dependent}"),
            Self::NotPresent(kind) => write!(f, "entity has no {kind} component"),
            Self::OwnedByOther => write!(f, "component is attached to another entity"),
            Self::HierarchyCycle => write!(f, "entity cannot become its own descendant"),
        }
    }
}

impl std::error::Error for ComponentError {}
