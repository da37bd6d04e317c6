use std::sync::atomic::{AtomicU64, Ordering};

use crate::style::Color;

pub(crate) fn next_node_id() -> u64 {
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
    Text,
    NotAllowed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f32,
    pub color: Color,
    pub alpha: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    RoundedRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub shape: Shape,
    pub fill: Option<Color>,
    pub stroke: Option<Stroke>,
}

/// Retained vector graphics handed to the host renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Graphics {
    id: u64,
    commands: Vec<DrawCommand>,
    pub alpha: f32,
    pub interactive: bool,
    pub cursor: Cursor,
    pending_fill: Option<Color>,
    pending_stroke: Option<Stroke>,
}

impl Default for Graphics {
    fn default() -> Self {
        Self::new()
    }
}

impl Graphics {
    pub fn new() -> Self {
        Self {
            id: next_node_id(),
            commands: Vec::new(),
            alpha: 1.0,
            interactive: false,
            cursor: Cursor::Default,
            pending_fill: None,
            pending_stroke: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn begin_fill(&mut self, color: Color) -> &mut Self {
        self.pending_fill = Some(color);
        self
    }

    pub fn line_style(&mut self, stroke: Stroke) -> &mut Self {
        self.pending_stroke = Some(stroke);
        self
    }

    pub fn draw_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        self.push(Shape::Rect {
            x,
            y,
            width,
            height,
        })
    }

    pub fn draw_rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
    ) -> &mut Self {
        self.push(Shape::RoundedRect {
            x,
            y,
            width,
            height,
            radius: radius.max(0.0).min(width.min(height) * 0.5),
        })
    }

    pub fn end_fill(&mut self) -> &mut Self {
        self.pending_fill = None;
        self.pending_stroke = None;
        self
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.pending_fill = None;
        self.pending_stroke = None;
    }

    fn push(&mut self, shape: Shape) -> &mut Self {
        self.commands.push(DrawCommand {
            shape,
            fill: self.pending_fill,
            stroke: self.pending_stroke,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_capture_fill_and_stroke_at_draw_time() {
        let mut graphics = Graphics::new();
        graphics
            .line_style(Stroke {
                width: 1.0,
                color: Color::black(),
                alpha: 1.0,
            })
            .begin_fill(Color::from_rgb_u32(0xcccccc))
            .draw_rounded_rect(0.0, 0.0, 100.0, 20.0, 40.0)
            .end_fill()
            .draw_rect(0.0, 0.0, 1.0, 1.0);

        let commands = graphics.commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].fill, Some(Color::from_rgb_u32(0xcccccc)));
        assert!(matches!(
            commands[0].shape,
            Shape::RoundedRect { radius, .. } if radius == 10.0
        ));
        assert_eq!(commands[1].fill, None);
        assert_eq!(commands[1].stroke, None);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(Graphics::new().id(), Graphics::new().id());
    }
}
