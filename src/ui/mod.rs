//! Widgets and 2D primitives
//!
//! Geometry types shared by every component, the active [`View`], and the
//! widget components: sprites, labels, clickable areas, fill bars and
//! buttons.

mod button;
mod clickable;
mod fill_bar;
mod rect;
mod sprite;
mod text_box;
mod view;

pub use button::Button;
pub use clickable::Clickable;
pub use fill_bar::{FillBar, FillDirection};
pub use rect::{Color, FloatRect, IntRect, Origin, ValueRange};
pub use sprite::Sprite;
pub use text_box::TextBox;
pub use view::View;
