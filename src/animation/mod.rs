//! Sprite animation
//!
//! Frame lists, named animation sets and the [`Animator`] component.

mod clip;
mod player;

pub use clip::{Animation, AnimationSet, Frame};
pub use player::{Animator, PlaybackState};
