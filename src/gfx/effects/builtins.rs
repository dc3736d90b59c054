//! Built-in effects.
//!
//! Both effects are registered by [`EffectRegistry::with_builtins`] and can
//! also be registered individually.
//!
//! # Example
//!
//! ```ignore
//! let registry = EffectRegistry::with_builtins()?;
//! let mut blur = EffectInstance::<BoxBlurEffect>::create(&registry)?;
//! blur.set_input(image);
//! blur.update(&BoxBlurEffect { radius: 4.0, intensity: 0.8 });
//! let blurred = blur.output()?;
//! ```
//!
//! [`EffectRegistry::with_builtins`]: super::EffectRegistry::with_builtins

use bytemuck::{Pod, Zeroable};
use shadefx_proc_macro::pixel_effect;

/// Applies a box blur effect to an image.
///
/// # Properties
///
/// * `radius` - Blur radius in pixels (1-8, higher = more blur)
/// * `intensity` - Blend factor between original (0.0) and blurred (1.0)
///
/// # Kernel
///
/// Samples a square grid of pixels and averages them with uniform weights.
/// The kernel size is (2*radius+1) x (2*radius+1) with the radius truncated
/// and clamped to 1..=8; radii below 0.5 pass the input through.
#[pixel_effect(
    id = "1793FB86-6351-43D8-B857-C8DC02C4EB7A",
    name = "BoxBlur",
    author = "shadefx",
    category = "Blur",
    description = "Box blur with adjustable radius and intensity",
    kernel = "super::box_blur::evaluate",
    input_padding = "self.radius"
)]
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BoxBlurEffect {
    /// Blur radius in pixels: 1-8, higher values create a stronger blur
    #[property(min = 0.0, max = 8.0, default = 3.0)]
    pub radius: f32,
    /// Blend factor: 0.0 = original image, 1.0 = full blur effect
    #[property(min = 0.0, max = 1.0, default = 1.0)]
    pub intensity: f32,
}

impl Default for BoxBlurEffect {
    fn default() -> Self {
        Self {
            radius: 3.0,
            intensity: 1.0,
        }
    }
}

/// Applies a liquid glass distortion effect.
///
/// Warps the input inside a centered superellipse as if seen through a thick
/// glass lens, with an antialiased rim, film grain and a directional glow.
///
/// # Properties
///
/// * `refraction` - Refraction power controlling distortion strength (1.0-5.0)
/// * `glow` - Glow intensity around the rim (0.0-1.0)
/// * `noise` - Amount of noise/grain to add (0.0-0.2)
/// * `size` - Size of the lens as a fraction of the image (0.1-1.0)
#[pixel_effect(
    id = "2A8C1690-CC5C-4A26-BB5A-94FA9D8C5C51",
    name = "LiquidGlass",
    author = "shadefx",
    category = "Distortion",
    description = "Liquid glass distortion effect with glow",
    kernel = "super::liquid_glass::evaluate"
)]
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LiquidGlassEffect {
    /// Refraction power: 1.0 = subtle, 5.0 = extreme distortion
    #[property(min = 1.0, max = 5.0, default = 3.0)]
    pub refraction: f32,
    /// Glow intensity: 0.0 = no glow, 1.0 = strong glow
    #[property(min = 0.0, max = 1.0, default = 0.35)]
    pub glow: f32,
    /// Noise amount: 0.0 = clean, 0.2 = grainy
    #[property(min = 0.0, max = 0.2, default = 0.06)]
    pub noise: f32,
    /// Lens size as a fraction of the image: 0.1 = small, 1.0 = fills it
    #[property(min = 0.1, max = 1.0, default = 0.5)]
    pub size: f32,
}

impl Default for LiquidGlassEffect {
    fn default() -> Self {
        Self {
            refraction: 3.0,
            glow: 0.35,
            noise: 0.06,
            size: 0.5,
        }
    }
}
