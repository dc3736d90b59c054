//! Liquid glass kernel.
//!
//! The lens is a superellipse centered on the image. Inside it the input is
//! resampled towards the center with a falloff that grows steeply near the
//! rim, then grain and a directional glow are applied. The rim is
//! antialiased over a band of 1.5 output pixels.

use glam::Vec2;
use trig_const::pow;

use super::builtins::LiquidGlassEffect;
use super::{PixelInvocation, Texture};
use crate::gfx::Color;
use crate::math::{fract, smoothstep};

const CENTER: Vec2 = Vec2::splat(0.5);

// Superellipse |x|^n + |y|^n = r^n
const SHAPE_EXPONENT: f32 = 3.0;
const SHAPE_RADIUS: f32 = 1.0;
const SHAPE_RADIUS_POW: f32 = pow(SHAPE_RADIUS as f64, SHAPE_EXPONENT as f64) as f32;
const SHAPE_EPSILON: f32 = 1e-5;

/// Width of the antialiased rim on each side of the boundary, in pixels.
const AA_BAND_PIXELS: f32 = 1.5;

// Distortion falloff f(x) = 1 - B * (C * e)^(-D * x - A)
const FALLOFF_A: f32 = 0.7;
const FALLOFF_B: f32 = 2.3;
const FALLOFF_BASE: f32 = 5.2 * std::f32::consts::E;
const FALLOFF_D: f32 = 6.9;
const MIN_FALLOFF: f32 = 0.001;
const MIN_DEPTH: f32 = 0.001;

const NOISE_SCALE: f32 = 1000.0;

const GLOW_PHASE: f32 = 0.5;
const GLOW_RADIAL_INNER: f32 = 0.2;
const GLOW_RADIAL_OUTER: f32 = 0.5;
const GLOW_BAND_WIDTH: f32 = 0.3;

fn pow2(v: Vec2, e: f32) -> Vec2 {
    Vec2::new(v.x.powf(e), v.y.powf(e))
}

/// Approximate signed distance to the superellipse: negative inside.
fn sd_superellipse(p: Vec2) -> f32 {
    let n = SHAPE_EXPONENT;
    let a = p.abs();
    let numerator = a.x.powf(n) + a.y.powf(n) - SHAPE_RADIUS_POW;
    let denominator = n * (a.x.powf(2.0 * n - 2.0) + a.y.powf(2.0 * n - 2.0)).sqrt() + SHAPE_EPSILON;
    numerator / denominator
}

/// Analytic gradient of [`sd_superellipse`] with respect to `p`.
fn sd_superellipse_gradient(p: Vec2) -> Vec2 {
    let n = SHAPE_EXPONENT;
    let a = p.abs();
    let sign = Vec2::new(p.x.signum(), p.y.signum());

    let numerator = a.x.powf(n) + a.y.powf(n) - SHAPE_RADIUS_POW;
    let root = (a.x.powf(2.0 * n - 2.0) + a.y.powf(2.0 * n - 2.0)).sqrt();
    let denominator = n * root + SHAPE_EPSILON;

    let d_numerator = n * pow2(a, n - 1.0) * sign;
    // The root is only zero at the origin, where its gradient vanishes too.
    let d_denominator = if root > 0.0 {
        n * (n - 1.0) * pow2(a, 2.0 * n - 3.0) * sign / root
    } else {
        Vec2::ZERO
    };

    (d_numerator * denominator - numerator * d_denominator) / (denominator * denominator)
}

/// Distance field value and edge coverage for the lens-space point `p`.
///
/// `pixel_step` is the lens-space size of one output pixel.
fn edge_blend(p: Vec2, pixel_step: Vec2) -> (f32, f32) {
    let d = sd_superellipse(p);
    let aa_width = (sd_superellipse_gradient(p) * pixel_step).length() * AA_BAND_PIXELS;
    (d, 1.0 - smoothstep(-aa_width, aa_width, d))
}

fn falloff(x: f32) -> f32 {
    (1.0 - FALLOFF_B * FALLOFF_BASE.powf(-FALLOFF_D * x - FALLOFF_A)).max(MIN_FALLOFF)
}

fn hash(q: Vec2) -> f32 {
    fract(q.dot(Vec2::new(12.9898, 78.233)).sin() * 43758.5453)
}

/// Signed directional glow in lens-local `[0, 1]` coordinates.
fn glow(local_uv: Vec2) -> f32 {
    let rel = local_uv - CENTER;
    let angle = rel.y.atan2(rel.x);
    smoothstep(GLOW_RADIAL_INNER, GLOW_RADIAL_OUTER, rel.length()) * (angle - GLOW_PHASE).sin()
}

/// Fades the glow in towards the rim.
fn glow_band(dist: f32) -> f32 {
    1.0 - smoothstep(0.0, GLOW_BAND_WIDTH, dist)
}

fn outside_unit_square(uv: Vec2) -> bool {
    uv.x < 0.0 || uv.x > 1.0 || uv.y < 0.0 || uv.y > 1.0
}

pub(super) fn evaluate(effect: &LiquidGlassEffect, invocation: &PixelInvocation, input: &dyn Texture) -> Color {
    let base = invocation.input_coord;
    let original = input.sample(base);

    let scale = 2.0 / effect.size;
    let p = (base - CENTER) * scale;
    let (d, coverage) = edge_blend(p, invocation.texel_size * scale);
    if coverage <= 0.0 {
        return original;
    }

    let dist = (-d).max(MIN_DEPTH);
    let sample_p = p * falloff(dist).powf(effect.refraction);
    let target = sample_p * (effect.size * 0.5) + CENTER;

    let processed = if outside_unit_square(target) {
        original
    } else {
        let grain = (hash(base * NOISE_SCALE) - 0.5) * effect.noise;
        let local_uv = (base - CENTER) / effect.size + 0.5;
        let brightness = 1.0 + glow(local_uv) * effect.glow * glow_band(dist);
        input.sample(target).offset_rgb(grain).scale_rgb(brightness)
    };

    original.lerp(processed, coverage).clamp_rgb()
}
