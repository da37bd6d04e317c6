use glam::Affine2;
use tracing::trace;

use crate::platform::{NativeInput, RenderSurface, SceneNode};
use crate::view::{Bounds, Size, css_matrix, overlay_transform};

/// Everything one render pass reads from the scene node and the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub world_transform: Affine2,
    pub world_alpha: f32,
    pub world_visible: bool,
    pub resolution: f32,
    /// Surface rectangle in page coordinates (client rect plus scroll).
    pub canvas_bounds: Bounds,
    pub render_size: Size,
}

impl FrameState {
    pub fn capture(node: &dyn SceneNode, surface: &dyn RenderSurface) -> Self {
        Self {
            world_transform: node.world_transform(),
            world_alpha: node.world_alpha(),
            world_visible: node.world_visible(),
            resolution: surface.resolution(),
            canvas_bounds: surface.client_rect().offset(surface.scroll_offset()),
            render_size: surface.render_size(),
        }
    }

    pub fn snapshot(&self) -> OverlaySnapshot {
        OverlaySnapshot {
            world_transform: self.world_transform,
            canvas_bounds: self.canvas_bounds,
            world_alpha: self.world_alpha,
            world_visible: self.world_visible,
        }
    }

    pub fn overlay_transform(&self) -> Affine2 {
        overlay_transform(
            &self.world_transform,
            self.resolution,
            self.canvas_bounds.size(),
            self.render_size,
        )
    }
}

/// The fields whose change forces the overlay to be repositioned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySnapshot {
    pub world_transform: Affine2,
    pub canvas_bounds: Bounds,
    pub world_alpha: f32,
    pub world_visible: bool,
}

impl OverlaySnapshot {
    /// Exact comparison per field. No previous snapshot counts as a change.
    pub fn changed_since(&self, previous: Option<&OverlaySnapshot>) -> bool {
        previous != Some(self)
    }
}

/// Writes position, transform, opacity and display onto the native element.
pub fn apply_overlay(native: &mut dyn NativeInput, frame: &FrameState, dom_visible: bool) {
    let transform = css_matrix(&frame.overlay_transform());
    native.set_style_property("top", &format!("{}px", frame.canvas_bounds.top));
    native.set_style_property("left", &format!("{}px", frame.canvas_bounds.left));
    native.set_style_property("transform", &transform);
    native.set_style_property("opacity", &frame.world_alpha.to_string());
    let display_value = if frame.world_visible && dom_visible {
        "block"
    } else {
        "none"
    };
    native.set_style_property("display", display_value);
    trace!(
        transform = %transform,
        display = display_value,
        "repositioned text input overlay"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{HeadlessInput, HeadlessSurface, StaticNode};
    use glam::Vec2;

    #[test]
    fn missing_previous_snapshot_is_a_change() {
        let frame = FrameState::capture(&StaticNode::default(), &HeadlessSurface::default());
        let snapshot = frame.snapshot();
        assert!(snapshot.changed_since(None));
        assert!(!snapshot.changed_since(Some(&snapshot)));
    }

    #[test]
    fn any_single_field_change_is_detected() {
        let base = FrameState::capture(&StaticNode::default(), &HeadlessSurface::default())
            .snapshot();

        let moved = OverlaySnapshot {
            world_transform: Affine2::from_translation(Vec2::new(1.0, 0.0)),
            ..base
        };
        let faded = OverlaySnapshot {
            world_alpha: 0.5,
            ..base
        };
        let hidden = OverlaySnapshot {
            world_visible: false,
            ..base
        };
        let scrolled = OverlaySnapshot {
            canvas_bounds: base.canvas_bounds.offset(Vec2::new(0.0, 10.0)),
            ..base
        };
        for changed in [moved, faded, hidden, scrolled] {
            assert!(changed.changed_since(Some(&base)));
        }
    }

    #[test]
    fn canvas_bounds_include_scroll_offset() {
        let mut surface = HeadlessSurface::new(400.0, 300.0);
        surface.client_rect = Bounds::new(20.0, 30.0, 400.0, 300.0);
        surface.scroll_offset = Vec2::new(0.0, 100.0);
        let frame = FrameState::capture(&StaticNode::default(), &surface);
        assert_eq!(frame.canvas_bounds, Bounds::new(20.0, 130.0, 400.0, 300.0));
    }

    #[test]
    fn apply_writes_position_transform_opacity_and_display() {
        let mut input = HeadlessInput::single_line();
        let node = StaticNode {
            world_alpha: 0.25,
            ..StaticNode::at(10.0, 5.0)
        };
        let frame = FrameState::capture(&node, &HeadlessSurface::default());

        apply_overlay(&mut input, &frame, true);
        assert_eq!(input.style("top").as_deref(), Some("0px"));
        assert_eq!(input.style("transform").as_deref(), Some("matrix(1,0,0,1,10,5)"));
        assert_eq!(input.style("opacity").as_deref(), Some("0.25"));
        assert_eq!(input.style("display").as_deref(), Some("block"));

        apply_overlay(&mut input, &frame, false);
        assert_eq!(input.style("display").as_deref(), Some("none"));
    }
}
