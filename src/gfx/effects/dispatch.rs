//! Reference CPU host: evaluates an effect once per output pixel.
//!
//! Rows are shaded on the rayon thread pool when the `parallel` feature is
//! enabled. Every pixel is independent, so the result does not depend on
//! scheduling.

use glam::{Vec2, Vec4};
use log::{trace, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{DynPixelEffect, PixelInvocation, Texture};
use crate::gfx::{AddressMode, Color, Image};

/// Builds the invocation for pixel `(x, y)` of a `width` x `height` target.
pub fn invocation_for(x: u32, y: u32, width: u32, height: u32) -> PixelInvocation {
    let size = Vec2::new(width as f32, height as f32);
    let center = Vec2::new(x as f32, y as f32) + 0.5;
    let uv = center / size;
    PixelInvocation {
        clip_position: Vec4::new(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0, 0.0, 1.0),
        scene_position: Vec4::new(center.x, center.y, 0.0, 1.0),
        input_coord: uv,
        texel_size: size.recip(),
    }
}

/// Renders `input` through `effect` at the input's resolution.
///
/// The output keeps the input's address mode.
pub fn render(effect: &dyn DynPixelEffect, input: &Image) -> Image {
    let padding = effect.input_padding();
    if padding > 0.0 && input.address_mode() == AddressMode::Border {
        warn!(
            "{} reads {} pixels past each output pixel; border addressing darkens the edges",
            effect.metadata().name,
            padding
        );
    }
    render_to(effect, input, input.width(), input.height()).with_address_mode(input.address_mode())
}

/// Renders `effect` into a new `width` x `height` image, sampling `input`.
pub fn render_to(effect: &dyn DynPixelEffect, input: &dyn Texture, width: u32, height: u32) -> Image {
    trace!("Dispatching {} over {}x{}", effect.metadata().name, width, height);

    let mut output = Image::new(width, height, Color::TRANSPARENT);
    if output.is_empty() {
        return output;
    }

    let shade_row = |(y, row): (usize, &mut [Color])| {
        for (x, pixel) in row.iter_mut().enumerate() {
            let invocation = invocation_for(x as u32, y as u32, width, height);
            *pixel = effect.evaluate(&invocation, input);
        }
    };

    #[cfg(feature = "parallel")]
    output
        .pixels_mut()
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(shade_row);

    #[cfg(not(feature = "parallel"))]
    output
        .pixels_mut()
        .chunks_mut(width as usize)
        .enumerate()
        .for_each(shade_row);

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::effects::builtins::{BoxBlurEffect, LiquidGlassEffect};
    use crate::gfx::effects::{RawPixelInput, Texture};

    #[test]
    fn test_invocation_for() {
        let inv = invocation_for(0, 3, 4, 4);
        assert_eq!(inv.input_coord, Vec2::new(0.125, 0.875));
        assert_eq!(inv.texel_size, Vec2::splat(0.25));
        assert_eq!(inv.scene_position, Vec4::new(0.5, 3.5, 0.0, 1.0));
        assert_eq!(inv.clip_position, Vec4::new(-0.75, -0.75, 0.0, 1.0));

        let raw = RawPixelInput::from(&inv);
        assert_eq!(raw.input_coord, [0.125, 0.875, 0.25, 0.25]);
    }

    #[test]
    fn test_render_matches_per_pixel_evaluation() {
        let input = Image::from_fn(23, 17, |x, y| {
            Color::from_rgba(x as f32 / 22.0, y as f32 / 16.0, ((x * y) % 5) as f32 / 4.0, 1.0)
        });
        let effects: [&dyn DynPixelEffect; 2] = [
            &BoxBlurEffect {
                radius: 2.0,
                intensity: 0.7,
            },
            &LiquidGlassEffect {
                size: 0.8,
                ..LiquidGlassEffect::default()
            },
        ];
        for effect in effects {
            let output = render(effect, &input);
            for y in 0..input.height() {
                for x in 0..input.width() {
                    let expected = effect.evaluate(&invocation_for(x, y, 23, 17), &input);
                    assert_eq!(output.pixel(x, y), expected, "({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn test_render_to_procedural_texture() {
        let stripes = |coord: Vec2| Color::gray(if coord.x < 0.5 { 0.0 } else { 1.0 });
        let identity = BoxBlurEffect {
            radius: 0.0,
            intensity: 1.0,
        };
        let output = render_to(&identity, &stripes, 6, 2);
        assert_eq!(output.width(), 6);
        assert_eq!(output.pixel(2, 1), stripes.sample(Vec2::new(2.5 / 6.0, 0.75)));
        assert_eq!(output.pixel(3, 0), Color::WHITE);
    }

    #[test]
    fn test_render_empty() {
        let output = render(&BoxBlurEffect::default(), &Image::new(0, 5, Color::WHITE));
        assert!(output.is_empty());
        assert_eq!(output.height(), 5);
    }

    #[test]
    fn test_render_keeps_address_mode() {
        let input = Image::new(3, 3, Color::WHITE).with_address_mode(AddressMode::Border);
        let output = render(&BoxBlurEffect::default(), &input);
        assert_eq!(output.address_mode(), AddressMode::Border);
        // Every tap of the corner pixel outside the image is transparent.
        assert!(output.pixel(0, 0).a < 1.0);
    }
}
