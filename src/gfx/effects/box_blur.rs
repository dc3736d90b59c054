//! Box blur kernel.

use glam::Vec4;

use super::builtins::BoxBlurEffect;
use super::{PixelInvocation, Texture};
use crate::gfx::Color;

/// Radii below this pass the input through untouched.
const BYPASS_RADIUS: f32 = 0.5;
/// Largest sample radius; bounds the kernel at 17x17 taps.
const MAX_SAMPLE_RADIUS: i32 = 8;

/// Integer sample radius for a requested blur radius.
fn sample_radius(radius: f32) -> i32 {
    (radius as i32).clamp(1, MAX_SAMPLE_RADIUS)
}

pub(super) fn evaluate(effect: &BoxBlurEffect, invocation: &PixelInvocation, input: &dyn Texture) -> Color {
    let original = input.sample(invocation.input_coord);
    if effect.radius < BYPASS_RADIUS {
        return original;
    }

    let r = sample_radius(effect.radius);
    let mut sum = Vec4::ZERO;
    for y in -r..=r {
        for x in -r..=r {
            sum += Vec4::from(input.sample(invocation.tap(x, y)));
        }
    }

    let taps = ((2 * r + 1) * (2 * r + 1)) as f32;
    let blurred = Color::from(sum / taps);

    original.lerp(blurred, effect.intensity)
}
