//! Capabilities the text input composes against: the scene node it tracks, the
//! surface it is drawn on, and the native text-entry element it overlays.

use glam::{Affine2, Vec2};
use std::time::Duration;

use crate::view::{Bounds, Size};

mod headless;
#[cfg(target_arch = "wasm32")]
mod web;

pub use headless::*;
#[cfg(target_arch = "wasm32")]
pub use web::*;

/// Delay before the single focus retry issued from the surrogate hit region.
pub const FOCUS_RETRY_DELAY: Duration = Duration::from_millis(10);

/// A node in the host scene graph.
pub trait SceneNode {
    fn world_transform(&self) -> Affine2;
    fn world_alpha(&self) -> f32;
    fn world_visible(&self) -> bool;
}

/// The surface the scene is rendered onto.
pub trait RenderSurface {
    /// Device pixel resolution the renderer draws at.
    fn resolution(&self) -> f32;
    /// Viewport rectangle of the surface as laid out by the host page.
    fn client_rect(&self) -> Bounds;
    fn scroll_offset(&self) -> Vec2;
    /// Size of the render target in physical pixels.
    fn render_size(&self) -> Size;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeInputKind {
    SingleLine,
    MultiLine,
}

impl NativeInputKind {
    pub const fn from_multiline(multiline: bool) -> Self {
        if multiline {
            NativeInputKind::MultiLine
        } else {
            NativeInputKind::SingleLine
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionRange {
    pub start: usize,
    pub end: usize,
}

impl SelectionRange {
    pub const fn caret(at: usize) -> Self {
        Self { start: at, end: at }
    }
}

/// Events a native element queues for the widget to drain.
///
/// Key and input events carry what the element looked like when the platform
/// fired them, so draining late still sees the pre-edit selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeEvent {
    KeyDown {
        key_code: u32,
        selection: SelectionRange,
    },
    KeyUp {
        key_code: u32,
    },
    Input {
        value: String,
    },
    Focus,
    Blur,
}

/// The platform text-entry element kept aligned over the scene node.
pub trait NativeInput {
    fn kind(&self) -> NativeInputKind;

    fn set_style_property(&mut self, name: &str, value: &str);
    /// Current inline value of a style property, empty when unset.
    fn style_property(&self, name: &str) -> String;
    fn bounding_rect(&self) -> Bounds;

    fn attach(&mut self);
    fn detach(&mut self);
    fn is_attached(&self) -> bool;

    fn focus(&mut self);
    fn blur(&mut self);
    fn select_all(&mut self);
    fn has_focus(&self) -> bool;
    /// Schedules one more focus attempt after `delay` unless focus has landed by
    /// then. Failures are silent.
    fn focus_later(&mut self, delay: Duration);

    fn value(&self) -> String;
    /// Replaces the value without queuing an input event.
    fn set_value(&mut self, value: &str);
    fn selection(&self) -> SelectionRange;
    fn set_selection(&mut self, range: SelectionRange);

    fn set_disabled(&mut self, disabled: bool);
    fn set_placeholder(&mut self, placeholder: &str);
    fn set_max_length(&mut self, max_length: Option<&str>);
    fn set_secret(&mut self, secret: bool);
    fn is_secret(&self) -> bool;

    fn poll_event(&mut self) -> Option<NativeEvent>;
}
