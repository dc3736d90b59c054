use shadefx_core::{EffectId, EffectIdError};
use thiserror::Error;

/// Load-time failures. Per-pixel evaluation never fails.
#[derive(Debug, Error)]
pub enum EffectError {
    #[error("Effect {0} is not registered")]
    NotRegistered(EffectId),

    #[error("No registered effect matches {0:?}")]
    UnknownEffect(String),

    #[error("Invalid effect id: {0}")]
    InvalidEffectId(#[from] EffectIdError),

    #[error("Parameter block for {effect} must be {expected} bytes, got {actual}")]
    ParamBlockSize {
        effect: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Properties of {effect} cover {declared} bytes but the struct is {actual} bytes")]
    LayoutMismatch {
        effect: &'static str,
        declared: usize,
        actual: usize,
    },

    #[error("Effect has no input image")]
    MissingInput,

    #[error("Pixel buffer of length {len} does not match a {width}x{height} image")]
    ImageSize { width: u32, height: u32, len: usize },
}

pub type Result<T> = std::result::Result<T, EffectError>;
