use glam::Vec2;

use crate::style::{Color, SurrogatePadding, SurrogateTextStyle, TextAlign};
use crate::view::graphics::next_node_id;
use crate::view::{Cursor, Graphics, Shape, Size};

/// Glyph shown once per character of a secret value.
pub const MASK_GLYPH: char = '\u{2022}';
pub const PLACEHOLDER_COLOR: Color = Color::from_rgb_u32(0xa9a9a9);

/// What the surrogate text node displays for a given value.
pub fn surrogate_text(value: &str, placeholder: &str, secret: bool) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else if secret {
        std::iter::repeat_n(MASK_GLYPH, value.chars().count()).collect()
    } else {
        value.to_string()
    }
}

/// Top-left of the surrogate text inside the field.
pub fn text_origin(
    align: TextAlign,
    field: Size,
    text: Size,
    padding: SurrogatePadding,
    multiline: bool,
) -> Vec2 {
    let x = match align {
        TextAlign::Left => padding.left,
        TextAlign::Center => field.width / 2.0 - text.width / 2.0,
        TextAlign::Right => field.width - padding.right - text.width,
    };
    let y = if multiline {
        padding.top
    } else {
        (field.height - text.height) / 2.0
    };
    Vec2::new(x, y)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    id: u64,
    pub text: String,
    pub style: SurrogateTextStyle,
    pub position: Vec2,
    /// Measured size of the laid out text.
    pub size: Size,
    pub visible: bool,
    /// Id of the graphics clipping this node.
    pub mask: Option<u64>,
}

impl TextNode {
    pub fn new() -> Self {
        Self {
            id: next_node_id(),
            text: String::new(),
            style: SurrogateTextStyle::default(),
            position: Vec2::ZERO,
            size: Size::default(),
            visible: true,
            mask: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Default for TextNode {
    fn default() -> Self {
        Self::new()
    }
}

/// In-scene stand-in for the native element: a transparent hit region, the
/// text node, and the mask clipping the text to the padded content area.
#[derive(Debug, Clone, PartialEq)]
pub struct Surrogate {
    pub hit_region: Graphics,
    pub mask: Graphics,
    pub text: TextNode,
}

impl Default for Surrogate {
    fn default() -> Self {
        Self::new()
    }
}

impl Surrogate {
    pub fn new() -> Self {
        let mut hit_region = Graphics::new();
        hit_region.alpha = 0.0;
        hit_region.interactive = true;
        hit_region.cursor = Cursor::Text;

        let mask = Graphics::new();
        let mut text = TextNode::new();
        text.mask = Some(mask.id());

        Self {
            hit_region,
            mask,
            text,
        }
    }

    pub fn update_hit_region(&mut self, field: Size, disabled: bool) {
        self.hit_region.clear();
        self.hit_region
            .begin_fill(Color::black())
            .draw_rect(0.0, 0.0, field.width, field.height)
            .end_fill();
        self.hit_region.interactive = !disabled;
    }

    pub fn update_mask(&mut self, field: Size, padding: SurrogatePadding) {
        self.mask.clear();
        self.mask
            .begin_fill(Color::black())
            .draw_rect(
                padding.left,
                0.0,
                (field.width - padding.left - padding.right).max(0.0),
                field.height,
            )
            .end_fill();
    }

    /// Lays the text node out inside `field`. `measured` is the text's own size.
    pub fn update_text(
        &mut self,
        text: String,
        mut style: SurrogateTextStyle,
        measured: Size,
        field: Size,
        padding: SurrogatePadding,
        multiline: bool,
    ) {
        style.padding = padding.max();
        self.text.position = text_origin(style.align, field, measured, padding, multiline);
        self.text.text = text;
        self.text.style = style;
        self.text.size = measured;
    }

    pub fn contains(&self, local: Vec2) -> bool {
        self.hit_region.commands().iter().any(|command| match command.shape {
            Shape::Rect {
                x,
                y,
                width,
                height,
            }
            | Shape::RoundedRect {
                x,
                y,
                width,
                height,
                ..
            } => local.x >= x && local.y >= y && local.x <= x + width && local.y <= y + height,
        })
    }
}
