use thiserror::Error;

use crate::platform::NativeInputKind;

pub type Result<T> = std::result::Result<T, TextInputError>;

#[derive(Error, Debug)]
pub enum TextInputError {
    #[error("unknown input style key `{0}`")]
    UnknownStyleKey(String),

    #[error("invalid restriction pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("invalid text input config: {0}")]
    Config(#[from] toml::de::Error),

    /// The native element was created for a different line mode than the widget.
    #[error("native input is {found:?} but the widget was configured as {expected:?}")]
    NativeKindMismatch {
        expected: NativeInputKind,
        found: NativeInputKind,
    },

    #[error("platform error: {0}")]
    Platform(String),
}
