//! Core scene module
//!
//! Configuration, the frame driver, observer events and entity tree
//! persistence.

mod config;
pub mod events;
pub mod scene;
mod stage;
mod stats;

pub use config::SceneConfig;
pub use events::{ClickEvent, Event, HandlerId, HoverEvent};
pub use scene::SceneError;
pub use stage::Stage;
pub use stats::FrameStats;
