use smol_str::SmolStr;

use crate::style::color::Color;
use crate::style::input_style::{InputStyle, InputStyleKey};

pub const DEFAULT_FONT_FAMILY: &str = "Arial";
pub const DEFAULT_FONT_SIZE: &str = "16px";

/// Leading-number parse with CSS `parseFloat` semantics: `"12.5px"` is `12.5`,
/// `"px"` is `None`.
pub fn parse_css_number(raw: &str) -> Option<f32> {
    let raw = raw.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (index, ch) in raw.char_indices() {
        match ch {
            '+' | '-' if index == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = index + ch.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    raw[..end].parse::<f32>().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn from_css(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "center" => TextAlign::Center,
            "right" | "end" => TextAlign::Right,
            _ => TextAlign::Left,
        }
    }
}

/// Content padding of the field as `top, right, bottom, left`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurrogatePadding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl SurrogatePadding {
    pub const fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Resolves the `padding` shorthand plus `text-indent`.
    ///
    /// One component is uniform, two are `vertical horizontal`, four are
    /// `top right bottom left`. Any other count leaves the padding at zero.
    /// The indent only ever adds to the left side.
    pub fn from_shorthand(padding: Option<&str>, text_indent: Option<&str>) -> Self {
        let indent = text_indent.and_then(parse_css_number).unwrap_or(0.0);
        let components: Vec<f32> = padding
            .unwrap_or_default()
            .split_whitespace()
            .map(|component| parse_css_number(component).unwrap_or(0.0))
            .collect();

        let mut resolved = match components.as_slice() {
            [all] => Self::uniform(*all),
            [vertical, horizontal] => Self {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            },
            [top, right, bottom, left] => Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            },
            _ => Self::default(),
        };
        resolved.left += indent;
        resolved
    }

    pub fn from_style(style: &InputStyle) -> Self {
        Self::from_shorthand(
            style.get(InputStyleKey::Padding),
            style.get(InputStyleKey::TextIndent),
        )
    }

    pub const fn to_array(self) -> [f32; 4] {
        [self.top, self.right, self.bottom, self.left]
    }

    pub fn max(self) -> f32 {
        self.top.max(self.right).max(self.bottom).max(self.left)
    }
}

/// Style of the in-scene text node that stands in for the native element.
#[derive(Debug, Clone, PartialEq)]
pub struct SurrogateTextStyle {
    pub fill: Color,
    pub font_family: SmolStr,
    pub font_size: SmolStr,
    pub font_weight: SmolStr,
    pub font_variant: SmolStr,
    pub font_style: SmolStr,
    pub letter_spacing: f32,
    pub align: TextAlign,
    pub line_height: Option<f32>,
    pub word_wrap: bool,
    pub word_wrap_width: f32,
    pub padding: f32,
}

impl Default for SurrogateTextStyle {
    fn default() -> Self {
        Self {
            fill: Color::black(),
            font_family: SmolStr::new_static(DEFAULT_FONT_FAMILY),
            font_size: SmolStr::new_static(DEFAULT_FONT_SIZE),
            font_weight: SmolStr::new_static("normal"),
            font_variant: SmolStr::new_static("normal"),
            font_style: SmolStr::new_static("normal"),
            letter_spacing: 0.0,
            align: TextAlign::Left,
            line_height: None,
            word_wrap: false,
            word_wrap_width: 0.0,
            padding: 0.0,
        }
    }
}

impl SurrogateTextStyle {
    /// Maps the input style onto a text style. `field_width` is the untransformed
    /// width of the native element, used as the wrap width in multiline mode.
    pub fn derive(
        style: &InputStyle,
        multiline: bool,
        field_width: f32,
        value_is_empty: bool,
        placeholder_color: Color,
    ) -> Self {
        let mut derived = Self::default();
        for (key, value) in style.iter() {
            match key {
                InputStyleKey::Color => {
                    if let Some(fill) = Color::parse_css(value) {
                        derived.fill = fill;
                    }
                }
                InputStyleKey::FontFamily => derived.font_family = value.into(),
                InputStyleKey::FontSize => derived.font_size = value.into(),
                InputStyleKey::FontWeight => derived.font_weight = value.into(),
                InputStyleKey::FontVariant => derived.font_variant = value.into(),
                InputStyleKey::FontStyle => derived.font_style = value.into(),
                InputStyleKey::LetterSpacing => {
                    derived.letter_spacing = parse_css_number(value).unwrap_or(0.0)
                }
                InputStyleKey::TextAlign => derived.align = TextAlign::from_css(value),
                _ => {}
            }
        }

        if multiline {
            derived.line_height = Some(derived.font_size_px());
            derived.word_wrap = true;
            derived.word_wrap_width = field_width;
        }
        if value_is_empty {
            derived.fill = placeholder_color;
        }
        derived
    }

    pub fn font_size_px(&self) -> f32 {
        parse_css_number(&self.font_size).unwrap_or(16.0)
    }

    pub fn line_height_px(&self) -> f32 {
        self.line_height
            .unwrap_or_else(|| self.font_size_px() * 1.25)
            .max(1.0)
    }

    /// Font families in priority order, unquoted.
    pub fn font_families(&self) -> Vec<&str> {
        self.font_family
            .split(',')
            .map(|family| family.trim().trim_matches(|c| c == '"' || c == '\''))
            .filter(|family| !family.is_empty())
            .collect()
    }

    /// CSS `font` shorthand, used as the key for font-metric measurement.
    pub fn to_font_string(&self) -> String {
        let families = self
            .font_families()
            .into_iter()
            .map(|family| {
                if is_generic_family(family) {
                    family.to_string()
                } else {
                    format!("\"{family}\"")
                }
            })
            .collect::<Vec<_>>()
            .join(",");
        let size = match self.font_size.trim() {
            raw if raw.chars().all(|c| c.is_ascii_digit() || c == '.') => format!("{raw}px"),
            raw => raw.to_string(),
        };
        format!(
            "{} {} {} {} {}",
            self.font_style, self.font_variant, self.font_weight, size, families
        )
    }
}

fn is_generic_family(family: &str) -> bool {
    matches!(
        family,
        "serif" | "sans-serif" | "monospace" | "cursive" | "fantasy" | "system-ui"
    )
}
