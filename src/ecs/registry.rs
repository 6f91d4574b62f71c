//! Closed component registry
//!
//! Maps every component kind to its factory and to the sibling kinds it
//! requires or cannot coexist with. The attach planner in this module is a
//! pure function over kind lists; [`crate::ecs::World`] applies its result.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::component::Component;
use super::components::Transform;
use super::error::ComponentError;
use crate::animation::Animator;
use crate::serial::SerialError;
use crate::ui::{Button, Clickable, FillBar, Sprite, TextBox};

/// Type tag of every component the toolkit knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    Transform,
    Sprite,
    Animator,
    Clickable,
    TextBox,
    FillBar,
    Button,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 7] = [
        Self::Transform,
        Self::Sprite,
        Self::Animator,
        Self::Clickable,
        Self::TextBox,
        Self::FillBar,
        Self::Button,
    ];

    /// Type name, also used as the XML tag
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Transform => "Transform",
            Self::Sprite => "Sprite",
            Self::Animator => "Animator",
            Self::Clickable => "Clickable",
            Self::TextBox => "TextBox",
            Self::FillBar => "FillBar",
            Self::Button => "Button",
        }
    }

    /// Kinds that must be present before this one
    #[must_use]
    pub const fn required(self) -> &'static [ComponentKind] {
        match self {
            Self::Transform => &[],
            Self::Sprite | Self::Clickable | Self::TextBox => &[Self::Transform],
            Self::Animator | Self::FillBar => &[Self::Sprite],
            Self::Button => &[Self::Clickable, Self::Sprite, Self::TextBox],
        }
    }

    /// Kinds that must never be present together with this one
    #[must_use]
    pub const fn incompatible(self) -> &'static [ComponentKind] {
        match self {
            Self::FillBar => &[Self::Button],
            Self::Button => &[Self::FillBar],
            _ => &[],
        }
    }

    /// True if either kind declares the other incompatible
    #[must_use]
    pub fn conflicts_with(self, other: ComponentKind) -> bool {
        self.incompatible().contains(&other) || other.incompatible().contains(&self)
    }

    /// Create a default instance
    #[must_use]
    pub fn create(self) -> Box<dyn Component> {
        match self {
            Self::Transform => Box::new(Transform::default()),
            Self::Sprite => Box::new(Sprite::default()),
            Self::Animator => Box::new(Animator::default()),
            Self::Clickable => Box::new(Clickable::default()),
            Self::TextBox => Box::new(TextBox::default()),
            Self::FillBar => Box::new(FillBar::default()),
            Self::Button => Box::new(Button::default()),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ComponentKind {
    type Err = SerialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| SerialError::UnknownComponent(s.to_string()))
    }
}

/// How attach treats missing required siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompositionMode {
    /// Fail the attach
    Strict,
    /// Instantiate defaults for the missing kinds first
    #[default]
    Permissive,
}

/// Work out which kinds must be auto-added before `kind` can be attached to
/// an entity that currently owns `present`.
///
/// The returned list is in insertion order (dependencies first). Nothing is
/// mutated; a failure means the attach must not happen at all.
pub fn plan_attach(
    kind: ComponentKind,
    present: &[ComponentKind],
    mode: CompositionMode,
) -> Result<Vec<ComponentKind>, ComponentError> {
    if present.contains(&kind) {
        return Err(ComponentError::AlreadyPresent(kind));
    }

    let mut planned = Vec::new();
    collect_required(kind, present, mode, &mut planned, &mut vec![kind])?;

    let mut after = present.to_vec();
    for &adding in planned.iter().chain(std::iter::once(&kind)) {
        if let Some(&conflicting) = after.iter().find(|&&k| adding.conflicts_with(k)) {
            return Err(ComponentError::Incompatible {
                component: adding,
                conflicting,
            });
        }
        after.push(adding);
    }

    Ok(planned)
}

fn collect_required(
    kind: ComponentKind,
    present: &[ComponentKind],
    mode: CompositionMode,
    planned: &mut Vec<ComponentKind>,
    visiting: &mut Vec<ComponentKind>,
) -> Result<(), ComponentError> {
    for &required in kind.required() {
        if present.contains(&required) || planned.contains(&required) {
            continue;
        }
        if mode == CompositionMode::Strict {
            return Err(ComponentError::MissingRequired {
                component: kind,
                required,
            });
        }
        if visiting.contains(&required) {
            continue;
        }
        visiting.push(required);
        collect_required(required, present, mode, planned, visiting)?;
        visiting.pop();
        planned.push(required);
    }
    Ok(())
}

/// Check that `kind` can leave an entity that owns `present`
pub fn check_removal(kind: ComponentKind, present: &[ComponentKind]) -> Result<(), ComponentError> {
    if !present.contains(&kind) {
        return Err(ComponentError::NotPresent(kind));
    }
    match present
        .iter()
        .find(|&&other| other != kind && other.required().contains(&kind))
    {
        Some(&dependent) => Err(ComponentError::RequiredBy {
            component: kind,
            dependent,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ComponentKind as K;

    #[test]
    fn test_requirements_are_acyclic() {
        fn depth(kind: ComponentKind, seen: &mut Vec<ComponentKind>) {
            assert!(!seen.contains(&kind), "cycle through {kind}");
            seen.push(kind);
            for &r in kind.required() {
                depth(r, seen);
            }
            seen.pop();
        }
        for kind in ComponentKind::ALL {
            depth(kind, &mut Vec::new());
        }
    }

    #[test]
    fn test_factory_kind_matches() {
        for kind in ComponentKind::ALL {
            assert_eq!(kind.create().kind(), kind);
            assert_eq!(kind.name().parse::<ComponentKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_strict_missing_required() {
        let result = plan_attach(K::Sprite, &[], CompositionMode::Strict);
        assert_eq!(
            result,
            Err(ComponentError::MissingRequired {
                component: K::Sprite,
                required: K::Transform
            })
        );
        assert_eq!(plan_attach(K::Sprite, &[K::Transform], CompositionMode::Strict), Ok(vec![]));
    }

    #[test]
    fn test_permissive_plans_transitively() {
        let planned = plan_attach(K::Animator, &[], CompositionMode::Permissive).unwrap();
        assert_eq!(planned, vec![K::Transform, K::Sprite]);

        let planned = plan_attach(K::Button, &[K::Transform], CompositionMode::Permissive).unwrap();
        assert_eq!(planned, vec![K::Clickable, K::Sprite, K::TextBox]);
    }

    #[test]
    fn test_duplicate_rejected_first() {
        assert_eq!(
            plan_attach(K::Transform, &[K::Transform], CompositionMode::Permissive),
            Err(ComponentError::AlreadyPresent(K::Transform))
        );
    }

    #[test]
    fn test_incompatible_rejected_in_both_directions() {
        let present = [K::Transform, K::Sprite, K::FillBar];
        assert!(matches!(
            plan_attach(K::Button, &present, CompositionMode::Permissive),
            Err(ComponentError::Incompatible { .. })
        ));

        let present = [K::Transform, K::Clickable, K::Sprite, K::TextBox, K::Button];
        assert_eq!(
            plan_attach(K::FillBar, &present, CompositionMode::Strict),
            Err(ComponentError::Incompatible {
                component: K::FillBar,
                conflicting: K::Button
            })
        );
    }

    #[test]
    fn test_removal_blocked_by_dependent() {
        let present = [K::Transform, K::Sprite];
        assert_eq!(
            check_removal(K::Transform, &present),
            Err(ComponentError::RequiredBy {
                component: K::Transform,
                dependent: K::Sprite
            })
        );
        assert_eq!(check_removal(K::Sprite, &present), Ok(()));
        assert_eq!(
            check_removal(K::Animator, &present),
            Err(ComponentError::NotPresent(K::Animator))
        );
    }
}
