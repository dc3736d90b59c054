//! Per-pixel image effects: a box blur and a refractive liquid glass lens,
//! plus the metadata, registry and reference CPU host needed to run them.
//!
//! ```ignore
//! use shadefx::gfx::effects::{EffectInstance, EffectRegistry, builtins::LiquidGlassEffect};
//!
//! let registry = EffectRegistry::with_builtins()?;
//! let mut glass = EffectInstance::<LiquidGlassEffect>::create(&registry)?;
//! glass.set_input(image);
//! let output = glass.output()?;
//! ```

// Lets `#[pixel_effect]` expand to `::shadefx::...` paths inside this crate.
extern crate self as shadefx;

pub mod error;
pub mod gfx;
pub mod math;

pub use error::{EffectError, Result};
pub use shadefx_core::{EffectId, EffectIdError, PropertyType};
pub use shadefx_proc_macro::pixel_effect;
