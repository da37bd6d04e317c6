mod color;
mod input_style;
mod text_style;

pub use color::*;
pub use input_style::*;
pub use text_style::*;
