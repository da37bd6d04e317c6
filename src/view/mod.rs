mod box_cache;
mod geometry;
mod graphics;
mod overlay;
mod surrogate;
mod text_input;
mod text_measure;

pub use box_cache::*;
pub use geometry::*;
pub use graphics::{Cursor, DrawCommand, Graphics, Shape, Stroke};
pub use overlay::*;
pub use surrogate::*;
pub use text_input::*;
pub use text_measure::*;
