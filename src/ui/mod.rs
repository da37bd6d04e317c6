mod event;
mod restriction;
mod state;

pub use event::*;
pub use restriction::*;
pub use state::*;
