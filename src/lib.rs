//! Native text input overlay for scene-graph renderers.
//!
//! A [`TextInput`] keeps one platform text-entry element pixel-aligned with a
//! transformed scene node, draws a per-state background box, and can substitute
//! the element's own text rendering with an in-scene text node.

mod config;
mod error;
pub mod platform;
pub mod style;
pub mod ui;
pub mod view;

pub use config::*;
pub use error::*;
pub use style::*;
pub use ui::*;
pub use view::*;
