use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::TextInputError;

bitflags! {
    /// Derived state a style key invalidates when it changes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StyleEffect: u8 {
        /// Forwarded verbatim to the native element's inline style.
        const NATIVE = 1 << 0;
        const FONT_METRICS = 1 << 1;
        const SURROGATE = 1 << 2;
    }
}

/// Presentational keys an input style may carry.
///
/// The set is closed: unknown keys are rejected when the style is configured,
/// not when it is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum InputStyleKey {
    Position,
    Background,
    Border,
    Outline,
    TransformOrigin,
    LineHeight,
    Width,
    Height,
    Color,
    FontFamily,
    FontSize,
    FontWeight,
    FontVariant,
    FontStyle,
    LetterSpacing,
    TextAlign,
    Padding,
    TextIndent,
}

impl InputStyleKey {
    pub const ALL: [InputStyleKey; 18] = [
        InputStyleKey::Position,
        InputStyleKey::Background,
        InputStyleKey::Border,
        InputStyleKey::Outline,
        InputStyleKey::TransformOrigin,
        InputStyleKey::LineHeight,
        InputStyleKey::Width,
        InputStyleKey::Height,
        InputStyleKey::Color,
        InputStyleKey::FontFamily,
        InputStyleKey::FontSize,
        InputStyleKey::FontWeight,
        InputStyleKey::FontVariant,
        InputStyleKey::FontStyle,
        InputStyleKey::LetterSpacing,
        InputStyleKey::TextAlign,
        InputStyleKey::Padding,
        InputStyleKey::TextIndent,
    ];

    /// CSS property name, as written to the native element.
    pub const fn css_name(self) -> &'static str {
        match self {
            InputStyleKey::Position => "position",
            InputStyleKey::Background => "background",
            InputStyleKey::Border => "border",
            InputStyleKey::Outline => "outline",
            InputStyleKey::TransformOrigin => "transform-origin",
            InputStyleKey::LineHeight => "line-height",
            InputStyleKey::Width => "width",
            InputStyleKey::Height => "height",
            InputStyleKey::Color => "color",
            InputStyleKey::FontFamily => "font-family",
            InputStyleKey::FontSize => "font-size",
            InputStyleKey::FontWeight => "font-weight",
            InputStyleKey::FontVariant => "font-variant",
            InputStyleKey::FontStyle => "font-style",
            InputStyleKey::LetterSpacing => "letter-spacing",
            InputStyleKey::TextAlign => "text-align",
            InputStyleKey::Padding => "padding",
            InputStyleKey::TextIndent => "text-indent",
        }
    }

    pub const fn camel_name(self) -> &'static str {
        match self {
            InputStyleKey::Position => "position",
            InputStyleKey::Background => "background",
            InputStyleKey::Border => "border",
            InputStyleKey::Outline => "outline",
            InputStyleKey::TransformOrigin => "transformOrigin",
            InputStyleKey::LineHeight => "lineHeight",
            InputStyleKey::Width => "width",
            InputStyleKey::Height => "height",
            InputStyleKey::Color => "color",
            InputStyleKey::FontFamily => "fontFamily",
            InputStyleKey::FontSize => "fontSize",
            InputStyleKey::FontWeight => "fontWeight",
            InputStyleKey::FontVariant => "fontVariant",
            InputStyleKey::FontStyle => "fontStyle",
            InputStyleKey::LetterSpacing => "letterSpacing",
            InputStyleKey::TextAlign => "textAlign",
            InputStyleKey::Padding => "padding",
            InputStyleKey::TextIndent => "textIndent",
        }
    }

    pub const fn effect(self) -> StyleEffect {
        match self {
            InputStyleKey::FontFamily
            | InputStyleKey::FontSize
            | InputStyleKey::FontWeight
            | InputStyleKey::FontVariant
            | InputStyleKey::FontStyle => StyleEffect::NATIVE
                .union(StyleEffect::FONT_METRICS)
                .union(StyleEffect::SURROGATE),
            InputStyleKey::Color
            | InputStyleKey::LetterSpacing
            | InputStyleKey::TextAlign
            | InputStyleKey::Padding
            | InputStyleKey::TextIndent
            | InputStyleKey::Width
            | InputStyleKey::Height
            | InputStyleKey::LineHeight
            | InputStyleKey::Border => StyleEffect::NATIVE.union(StyleEffect::SURROGATE),
            InputStyleKey::Position
            | InputStyleKey::Background
            | InputStyleKey::Outline
            | InputStyleKey::TransformOrigin => StyleEffect::NATIVE,
        }
    }
}

impl fmt::Display for InputStyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_name())
    }
}

impl FromStr for InputStyleKey {
    type Err = TextInputError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        InputStyleKey::ALL
            .into_iter()
            .find(|key| key.css_name() == trimmed || key.camel_name() == trimmed)
            .ok_or_else(|| TextInputError::UnknownStyleKey(trimmed.to_string()))
    }
}

impl TryFrom<String> for InputStyleKey {
    type Error = TextInputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InputStyleKey> for String {
    fn from(value: InputStyleKey) -> Self {
        value.css_name().to_string()
    }
}

/// Inline style of the native element, keyed by [`InputStyleKey`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputStyle {
    values: BTreeMap<InputStyleKey, SmolStr>,
}

impl InputStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base style every overlay element starts from: absolutely positioned,
    /// chrome-less, transformed around its top-left corner.
    pub fn overlay_defaults() -> Self {
        Self::new()
            .with(InputStyleKey::Position, "absolute")
            .with(InputStyleKey::Background, "none")
            .with(InputStyleKey::Border, "none")
            .with(InputStyleKey::Outline, "none")
            .with(InputStyleKey::TransformOrigin, "0 0")
            .with(InputStyleKey::LineHeight, "1")
    }

    /// Builds a style from loosely keyed entries, rejecting unknown keys.
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self, TextInputError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<SmolStr>,
    {
        let mut style = Self::new();
        for (key, value) in entries {
            let key: InputStyleKey = key.as_ref().parse()?;
            style.set(key, value);
        }
        Ok(style)
    }

    pub fn get(&self, key: InputStyleKey) -> Option<&str> {
        self.values.get(&key).map(SmolStr::as_str)
    }

    pub fn set(&mut self, key: InputStyleKey, value: impl Into<SmolStr>) -> StyleEffect {
        self.values.insert(key, value.into());
        key.effect()
    }

    pub fn with(mut self, key: InputStyleKey, value: impl Into<SmolStr>) -> Self {
        self.set(key, value);
        self
    }

    pub fn remove(&mut self, key: InputStyleKey) -> Option<SmolStr> {
        self.values.remove(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (InputStyleKey, &str)> {
        self.values.iter().map(|(key, value)| (*key, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn merge(self, rhs: Self) -> Self {
        let mut merged = self;
        merged.values.extend(rhs.values);
        merged
    }
}
