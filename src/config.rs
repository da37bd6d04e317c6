//! Declarative text input configuration, loadable from TOML.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::platform::NativeInput;
use crate::style::{Color, InputStyle};
use crate::ui::Restriction;
use crate::view::{BoxStyleConfig, TextInput, TextInputBuilder};

/// Everything a [`TextInput`] can be constructed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextInputConfig {
    /// Inline style of the native element, layered over the overlay defaults
    pub input: InputStyle,
    /// Use a multiline element (textarea) instead of a single-line one
    pub multiline: bool,
    /// Background box styling, keyed by state or shared by all states
    #[serde(rename = "box")]
    pub box_style: Option<BoxStyleConfig>,
    pub placeholder: String,
    pub placeholder_color: Option<Color>,
    /// Draw the text in the scene instead of letting the native element render it
    pub substitute_text: bool,
    /// Native `maxlength`, as a number or a string
    #[serde(deserialize_with = "max_length_from_number_or_string")]
    pub max_length: Option<String>,
    /// Character class body, or a full pattern written as `/.../`
    pub restrict: Option<Restriction>,
    pub secret: bool,
    pub disabled: bool,
}

impl Default for TextInputConfig {
    fn default() -> Self {
        Self {
            input: InputStyle::new(),
            multiline: false,
            box_style: None,
            placeholder: String::new(),
            placeholder_color: None,
            substitute_text: true,
            max_length: None,
            restrict: None,
            secret: false,
            disabled: false,
        }
    }
}

impl TextInputConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn builder(self) -> TextInputBuilder {
        let mut builder = TextInput::builder()
            .input_style(self.input)
            .multiline(self.multiline)
            .placeholder(self.placeholder)
            .substitute_text(self.substitute_text)
            .secret(self.secret)
            .disabled(self.disabled);
        if let Some(box_style) = self.box_style {
            builder = builder.box_style(box_style);
        }
        if let Some(color) = self.placeholder_color {
            builder = builder.placeholder_color(color);
        }
        if let Some(max_length) = self.max_length {
            builder = builder.max_length(max_length);
        }
        if let Some(restrict) = self.restrict {
            builder = builder.restrict(restrict);
        }
        builder
    }
}

impl TextInput {
    pub fn from_config(
        config: TextInputConfig,
        native: impl NativeInput + 'static,
    ) -> Result<Self> {
        config.builder().build(native)
    }
}

fn max_length_from_number_or_string<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaxLength {
        Number(u64),
        Text(String),
    }

    Ok(Option::<MaxLength>::deserialize(deserializer)?.map(|value| match value {
        MaxLength::Number(number) => number.to_string(),
        MaxLength::Text(text) => text,
    }))
}
