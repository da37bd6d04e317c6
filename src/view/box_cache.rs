use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::style::Color;
use crate::ui::InteractionState;
use crate::view::{Graphics, Size, Stroke};

const DEFAULT_BOX_FILL: Color = Color::from_rgb_u32(0xcccccc);

/// Produces the background visual for one interaction state.
pub trait BoxGenerator {
    fn generate(&mut self, width: f32, height: f32, state: InteractionState) -> Graphics;
}

impl<F> BoxGenerator for F
where
    F: FnMut(f32, f32, InteractionState) -> Graphics,
{
    fn generate(&mut self, width: f32, height: f32, state: InteractionState) -> Graphics {
        self(width, height, state)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoxStroke {
    pub width: f32,
    pub color: Color,
    #[serde(default = "opaque")]
    pub alpha: f32,
}

fn opaque() -> f32 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoxStyle {
    pub fill: Option<Color>,
    pub stroke: Option<BoxStroke>,
    /// Corner radius; square corners when absent.
    pub rounded: Option<f32>,
}

impl BoxStyle {
    pub const fn filled(fill: Color) -> Self {
        Self {
            fill: Some(fill),
            stroke: None,
            rounded: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerStateBoxStyle {
    pub default: Option<BoxStyle>,
    pub focused: Option<BoxStyle>,
    pub disabled: Option<BoxStyle>,
}

/// Box style shorthand: either keyed by state name, or one style for all states.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoxStyleConfig {
    PerState(PerStateBoxStyle),
    Single(BoxStyle),
}

/// Resolved box style for every state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStyleSet {
    pub default: BoxStyle,
    pub focused: BoxStyle,
    pub disabled: BoxStyle,
}

impl Default for BoxStyleSet {
    fn default() -> Self {
        let style = BoxStyle::filled(DEFAULT_BOX_FILL);
        Self {
            default: style,
            focused: style,
            disabled: style,
        }
    }
}

impl From<BoxStyleConfig> for BoxStyleSet {
    fn from(config: BoxStyleConfig) -> Self {
        match config {
            BoxStyleConfig::Single(style) => Self {
                default: style,
                focused: style,
                disabled: style,
            },
            BoxStyleConfig::PerState(per_state) => {
                let default = per_state
                    .default
                    .unwrap_or(BoxStyle::filled(DEFAULT_BOX_FILL));
                Self {
                    default,
                    focused: per_state.focused.unwrap_or(default),
                    disabled: per_state.disabled.unwrap_or(default),
                }
            }
        }
    }
}

impl BoxStyleSet {
    pub fn get(&self, state: InteractionState) -> &BoxStyle {
        match state {
            InteractionState::Default => &self.default,
            InteractionState::Focused => &self.focused,
            InteractionState::Disabled => &self.disabled,
        }
    }
}

/// Draws a filled rectangle per state, rounded and stroked when configured.
#[derive(Debug, Clone, Default)]
pub struct DefaultBoxGenerator {
    styles: BoxStyleSet,
}

impl DefaultBoxGenerator {
    pub fn new(styles: impl Into<BoxStyleSet>) -> Self {
        Self {
            styles: styles.into(),
        }
    }
}

impl BoxGenerator for DefaultBoxGenerator {
    fn generate(&mut self, width: f32, height: f32, state: InteractionState) -> Graphics {
        let style = self.styles.get(state);
        let mut graphics = Graphics::new();
        if let Some(fill) = style.fill {
            graphics.begin_fill(fill);
        }
        if let Some(stroke) = style.stroke {
            graphics.line_style(Stroke {
                width: stroke.width,
                color: stroke.color,
                alpha: stroke.alpha,
            });
        }
        match style.rounded {
            Some(radius) => graphics.draw_rounded_rect(0.0, 0.0, width, height, radius),
            None => graphics.draw_rect(0.0, 0.0, width, height),
        };
        graphics.end_fill();
        graphics
    }
}

/// One background visual per interaction state, all built for the same size.
pub struct BoxCache {
    generator: Box<dyn BoxGenerator>,
    boxes: FxHashMap<InteractionState, Graphics>,
    built_for: Option<Size>,
}

impl fmt::Debug for BoxCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxCache")
            .field("built_for", &self.built_for)
            .field("boxes", &self.boxes.len())
            .finish()
    }
}

impl BoxCache {
    pub fn new(generator: impl BoxGenerator + 'static) -> Self {
        Self::from_boxed(Box::new(generator))
    }

    pub fn from_boxed(generator: Box<dyn BoxGenerator>) -> Self {
        Self {
            generator,
            boxes: FxHashMap::default(),
            built_for: None,
        }
    }

    pub fn built_for(&self) -> Option<Size> {
        self.built_for
    }

    pub fn needs_rebuild(&self, measured: Size) -> bool {
        self.built_for != Some(measured) || self.boxes.is_empty()
    }

    /// Rebuilds every state's visual when `measured` differs from the last
    /// build. Returns whether a rebuild happened.
    pub fn ensure(&mut self, measured: Size) -> bool {
        if !self.needs_rebuild(measured) {
            return false;
        }
        self.boxes.clear();
        for state in InteractionState::ALL {
            let graphics = self
                .generator
                .generate(measured.width, measured.height, state);
            self.boxes.insert(state, graphics);
        }
        debug!(
            width = measured.width,
            height = measured.height,
            "rebuilt text input boxes"
        );
        self.built_for = Some(measured);
        true
    }

    pub fn get(&self, state: InteractionState) -> Option<&Graphics> {
        self.boxes.get(&state)
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
        self.built_for = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_cache() -> (BoxCache, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let cache = BoxCache::new(move |width: f32, height: f32, _state: InteractionState| {
            counter.set(counter.get() + 1);
            let mut graphics = Graphics::new();
            graphics.draw_rect(0.0, 0.0, width, height);
            graphics
        });
        (cache, calls)
    }

    #[test]
    fn build_is_idempotent_for_same_size() {
        let (mut cache, calls) = counting_cache();
        assert!(cache.ensure(Size::new(100.0, 20.0)));
        assert_eq!(calls.get(), 3);
        assert!(!cache.ensure(Size::new(100.0, 20.0)));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn size_change_rebuilds_every_state() {
        let (mut cache, calls) = counting_cache();
        cache.ensure(Size::new(100.0, 20.0));
        let before = cache.get(InteractionState::Focused).map(Graphics::id);
        assert!(cache.ensure(Size::new(100.0, 24.0)));
        assert_eq!(calls.get(), 6);
        assert_ne!(cache.get(InteractionState::Focused).map(Graphics::id), before);
        assert_eq!(cache.built_for(), Some(Size::new(100.0, 24.0)));
    }

    #[test]
    fn cleared_cache_rebuilds() {
        let (mut cache, calls) = counting_cache();
        cache.ensure(Size::new(10.0, 10.0));
        cache.clear();
        assert!(cache.get(InteractionState::Default).is_none());
        assert!(cache.ensure(Size::new(10.0, 10.0)));
        assert_eq!(calls.get(), 6);
    }

    #[test]
    fn focused_and_disabled_fall_back_to_default() {
        let default = BoxStyle::filled(Color::from_rgb_u32(0xffffff));
        let focused = BoxStyle {
            rounded: Some(4.0),
            ..BoxStyle::filled(Color::from_rgb_u32(0xeeeeff))
        };
        let set = BoxStyleSet::from(BoxStyleConfig::PerState(PerStateBoxStyle {
            default: Some(default),
            focused: Some(focused),
            disabled: None,
        }));
        assert_eq!(set.get(InteractionState::Focused), &focused);
        assert_eq!(set.get(InteractionState::Disabled), &default);
    }

    #[test]
    fn default_generator_draws_configured_shape() {
        let mut generator = DefaultBoxGenerator::new(BoxStyleConfig::Single(BoxStyle {
            fill: Some(Color::from_rgb_u32(0x123456)),
            stroke: Some(BoxStroke {
                width: 2.0,
                color: Color::black(),
                alpha: 0.5,
            }),
            rounded: Some(3.0),
        }));
        let graphics = generator.generate(80.0, 24.0, InteractionState::Disabled);
        let [command] = graphics.commands() else {
            panic!("expected one command");
        };
        assert_eq!(command.fill, Some(Color::from_rgb_u32(0x123456)));
        assert_eq!(command.stroke.map(|stroke| stroke.width), Some(2.0));
        assert!(matches!(
            command.shape,
            crate::view::Shape::RoundedRect { width, height, radius, .. }
                if width == 80.0 && height == 24.0 && radius == 3.0
        ));
    }
}
