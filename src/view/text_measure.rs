use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Style, Weight, Wrap};
use rustc_hash::FxHashMap;
use std::cell::RefCell;

use crate::style::SurrogateTextStyle;
use crate::view::Size;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub font_size: f32,
}

/// Text layout backend for the surrogate text node.
pub trait TextMeasure {
    /// Size of `text` laid out with `style`, including wrapping.
    fn measure_text(&mut self, text: &str, style: &SurrogateTextStyle) -> Size;
    fn measure_font(&mut self, style: &SurrogateTextStyle) -> FontMetrics;
}

/// Deterministic per-character width estimate. Needs no fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedTextMeasure;

fn estimate_char_width_px(ch: char, font_size: f32) -> f32 {
    if ch == '\t' {
        return font_size * 2.0;
    }
    if ch.is_whitespace() {
        return font_size * 0.33;
    }
    if ch.is_ascii() {
        return font_size * 0.56;
    }
    font_size
}

impl EstimatedTextMeasure {
    fn wrapped_line_widths(line: &str, style: &SurrogateTextStyle) -> Vec<f32> {
        let font_size = style.font_size_px();
        let wrap_width = if style.word_wrap && style.word_wrap_width > 0.0 {
            Some(style.word_wrap_width)
        } else {
            None
        };

        let mut widths = Vec::new();
        let mut current = 0.0f32;
        let mut has_glyph = false;
        for ch in line.chars() {
            let advance = estimate_char_width_px(ch, font_size) + style.letter_spacing;
            if has_glyph && wrap_width.is_some_and(|limit| current + advance > limit) {
                widths.push(current);
                current = 0.0;
            }
            current += advance;
            has_glyph = true;
        }
        widths.push(current);
        widths
    }
}

impl TextMeasure for EstimatedTextMeasure {
    fn measure_text(&mut self, text: &str, style: &SurrogateTextStyle) -> Size {
        let widths: Vec<f32> = text
            .split('\n')
            .flat_map(|line| Self::wrapped_line_widths(line, style))
            .collect();
        let width = widths.iter().copied().fold(0.0, f32::max);
        Size::new(width, widths.len() as f32 * style.line_height_px())
    }

    fn measure_font(&mut self, style: &SurrogateTextStyle) -> FontMetrics {
        let font_size = style.font_size_px();
        FontMetrics {
            ascent: font_size * 0.8,
            descent: font_size * 0.2,
            font_size,
        }
    }
}

thread_local! {
    static SHARED_MEASURE_FONT_SYSTEM: RefCell<FontSystem> = RefCell::new(FontSystem::new());
}

/// Shaped measurement through cosmic-text, sharing one font system per thread.
#[derive(Debug, Default)]
pub struct CosmicTextMeasure {
    font_metrics: FxHashMap<String, FontMetrics>,
}

impl CosmicTextMeasure {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_shared_font_system<R>(f: impl FnOnce(&mut FontSystem) -> R) -> R {
        SHARED_MEASURE_FONT_SYSTEM.with(|slot| f(&mut slot.borrow_mut()))
    }

    fn shape(font_system: &mut FontSystem, text: &str, style: &SurrogateTextStyle) -> Buffer {
        let font_size = style.font_size_px().max(1.0);
        let mut buffer = Buffer::new(font_system, Metrics::new(font_size, style.line_height_px()));
        if style.word_wrap && style.word_wrap_width > 0.0 {
            buffer.set_wrap(font_system, Wrap::WordOrGlyph);
            buffer.set_size(font_system, Some(style.word_wrap_width), None);
        } else {
            buffer.set_wrap(font_system, Wrap::None);
            buffer.set_size(font_system, None, None);
        }

        let families = style.font_families();
        let attrs = Attrs::new()
            .family(
                families
                    .first()
                    .map(|family| css_family(family))
                    .unwrap_or(Family::SansSerif),
            )
            .weight(css_weight(&style.font_weight))
            .style(css_style(&style.font_style));
        buffer.set_text(font_system, text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(font_system, false);
        buffer
    }
}

impl TextMeasure for CosmicTextMeasure {
    fn measure_text(&mut self, text: &str, style: &SurrogateTextStyle) -> Size {
        Self::with_shared_font_system(|font_system| {
            let buffer = Self::shape(font_system, text, style);
            let mut width = 0.0f32;
            let mut height = 0.0f32;
            for run in buffer.layout_runs() {
                let spacing = style.letter_spacing * run.glyphs.len() as f32;
                width = width.max(run.line_w + spacing);
                height = height.max(run.line_top + run.line_height);
            }
            Size::new(width, height.max(style.line_height_px()))
        })
    }

    fn measure_font(&mut self, style: &SurrogateTextStyle) -> FontMetrics {
        let key = style.to_font_string();
        if let Some(metrics) = self.font_metrics.get(&key) {
            return *metrics;
        }

        let font_size = style.font_size_px();
        let metrics = Self::with_shared_font_system(|font_system| {
            let buffer = Self::shape(font_system, "M", style);
            buffer
                .layout_runs()
                .next()
                .map(|run| FontMetrics {
                    ascent: run.line_y - run.line_top,
                    descent: run.line_top + run.line_height - run.line_y,
                    font_size,
                })
                .unwrap_or(FontMetrics {
                    ascent: font_size * 0.8,
                    descent: font_size * 0.2,
                    font_size,
                })
        });
        self.font_metrics.insert(key, metrics);
        metrics
    }
}

fn css_family(family: &str) -> Family<'_> {
    match family {
        "serif" => Family::Serif,
        "sans-serif" | "system-ui" => Family::SansSerif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        name => Family::Name(name),
    }
}

fn css_weight(raw: &str) -> Weight {
    match raw.trim() {
        "bold" | "bolder" => Weight::BOLD,
        "lighter" => Weight::LIGHT,
        "normal" | "" => Weight::NORMAL,
        numeric => numeric
            .parse::<u16>()
            .map(|value| Weight(value.clamp(1, 1000)))
            .unwrap_or(Weight::NORMAL),
    }
}

fn css_style(raw: &str) -> Style {
    match raw.trim() {
        "italic" => Style::Italic,
        "oblique" => Style::Oblique,
        _ => Style::Normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Color, InputStyle, InputStyleKey};

    fn style(font_size: &str) -> SurrogateTextStyle {
        let input = InputStyle::new().with(InputStyleKey::FontSize, font_size);
        SurrogateTextStyle::derive(&input, false, 0.0, false, Color::black())
    }

    #[test]
    fn estimate_scales_with_font_size() {
        let mut measure = EstimatedTextMeasure;
        let small = measure.measure_text("abcd", &style("10px"));
        let large = measure.measure_text("abcd", &style("20px"));
        assert!((small.width - 22.4).abs() < 1e-4);
        assert!((large.width - small.width * 2.0).abs() < 1e-4);
        assert_eq!(small.height, 12.5);
    }

    #[test]
    fn empty_text_keeps_one_line_of_height() {
        let mut measure = EstimatedTextMeasure;
        let size = measure.measure_text("", &style("16px"));
        assert_eq!(size.width, 0.0);
        assert_eq!(size.height, 20.0);
    }

    #[test]
    fn estimate_wraps_at_wrap_width() {
        let input = InputStyle::new().with(InputStyleKey::FontSize, "10px");
        let wrapped = SurrogateTextStyle::derive(&input, true, 12.0, false, Color::black());
        let mut measure = EstimatedTextMeasure;
        let size = measure.measure_text("abcd", &wrapped);
        assert!((size.width - 11.2).abs() < 1e-4);
        assert_eq!(size.height, 20.0);
    }

    #[test]
    fn css_font_keywords_map_to_cosmic_attributes() {
        assert_eq!(css_weight("bold"), Weight::BOLD);
        assert_eq!(css_weight("600"), Weight(600));
        assert_eq!(css_weight("heavy"), Weight::NORMAL);
        assert_eq!(css_style("italic"), Style::Italic);
        assert_eq!(css_family("monospace"), Family::Monospace);
        assert_eq!(css_family("Roboto"), Family::Name("Roboto"));
    }
}
