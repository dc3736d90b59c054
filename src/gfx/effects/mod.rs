//! Per-pixel image effects.
//!
//! An effect is a `#[repr(C)]` parameter struct plus a kernel function that
//! runs once per output pixel. The host hands the kernel a
//! [`PixelInvocation`] and a [`Texture`] to sample; the kernel returns the
//! output [`Color`](crate::gfx::Color).
//!
//! # Overview
//!
//! To create a custom effect:
//!
//! 1. Write a kernel `fn(&MyEffect, &PixelInvocation, &dyn Texture) -> Color`
//! 2. Annotate the parameter struct with `#[pixel_effect(...)]`
//! 3. Register the effect with [`EffectRegistry::register`]
//! 4. Create instances with [`EffectInstance::create`]
//!
//! # Example
//!
//! ```ignore
//! fn grayscale(effect: &GrayscaleEffect, inv: &PixelInvocation, input: &dyn Texture) -> Color {
//!     let c = input.sample(inv.input_coord);
//!     c.lerp(Color::gray(c.relative_luminance()).scale_alpha(c.a), effect.intensity)
//! }
//!
//! #[pixel_effect(
//!     id = "A1B2C3D4-E5F6-7890-ABCD-EF1234567890",
//!     name = "Grayscale",
//!     category = "Color",
//!     kernel = "grayscale",
//! )]
//! #[repr(C)]
//! #[derive(Debug, Clone, Copy, Pod, Zeroable)]
//! pub struct GrayscaleEffect {
//!     #[property(min = 0.0, max = 1.0, default = 1.0)]
//!     pub intensity: f32,
//! }
//!
//! // Register once at startup
//! registry.register::<GrayscaleEffect>()?;
//!
//! // Render an image
//! let mut instance = EffectInstance::<GrayscaleEffect>::create(&registry)?;
//! instance.set_input(image);
//! instance.update(&GrayscaleEffect { intensity: 1.0 });
//! let output = instance.output()?;
//! ```

mod box_blur;
pub mod builtins;
pub mod dispatch;
mod instance;
mod liquid_glass;
mod registration;
mod sampling;
mod traits;

pub use instance::EffectInstance;
pub use registration::{EffectRegistry, RegisteredEffect};
pub use sampling::{PixelInvocation, RawPixelInput, Texture};
pub use shadefx_core::PropertyType;
pub use traits::{
    DynPixelEffect, EffectMetadata, EffectProperty, PixelEffect, PropertyDefault,
    PropertyMetadata,
};
