//! Entity Component System module
//!
//! Built on top of the hecs ECS library. Entities live in a hecs world;
//! each one owns an ordered, rule-checked set of boxed components and an
//! ordered list of child entities.

mod component;
mod components;
mod error;
mod hierarchy;
pub mod registry;
mod world;

pub use component::{Component, ComponentBase, ComponentType, Components, UpdateContext};
pub(crate) use component::impl_component_any;
pub use components::{Name, Transform};
pub use error::ComponentError;
pub use hierarchy::{Children, Parent};
pub use registry::{ComponentKind, CompositionMode};
pub use world::World;
