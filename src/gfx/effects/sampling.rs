//! The per-pixel contract between a host and an effect kernel.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec4};

use crate::gfx::Color;

/// A read-only texture an effect kernel can sample.
///
/// Lookups are pure and synchronous. Coordinates are normalized to
/// `[0, 1] x [0, 1]`; what happens outside that range is up to the
/// implementation (see [`AddressMode`](crate::gfx::AddressMode)).
pub trait Texture: Sync {
    fn sample(&self, coord: Vec2) -> Color;
}

/// Procedural textures: any `Fn(Vec2) -> Color`.
impl<F> Texture for F
where
    F: Fn(Vec2) -> Color + Sync,
{
    fn sample(&self, coord: Vec2) -> Color {
        self(coord)
    }
}

/// Inputs for a single evaluation of an effect kernel.
///
/// The host builds one of these per output pixel and discards it after the
/// kernel returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelInvocation {
    pub clip_position: Vec4,
    pub scene_position: Vec4,
    /// Normalized coordinate of this pixel in the input image
    pub input_coord: Vec2,
    /// Size of one input texel in normalized coordinates
    pub texel_size: Vec2,
}

impl PixelInvocation {
    /// Creates an invocation with only the sampling inputs set; positions are
    /// left at the origin.
    pub fn new(input_coord: Vec2, texel_size: Vec2) -> Self {
        Self {
            clip_position: Vec4::W,
            scene_position: Vec4::W,
            input_coord,
            texel_size,
        }
    }

    /// Coordinate of the texel `(dx, dy)` pixels away from this one.
    pub fn tap(&self, dx: i32, dy: i32) -> Vec2 {
        self.input_coord + Vec2::new(dx as f32, dy as f32) * self.texel_size
    }
}

/// Wire form of [`PixelInvocation`]: three `float4` registers.
///
/// `input_coord.xy` carries the sample coordinate and `input_coord.zw` the
/// texel size.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RawPixelInput {
    pub clip_position: [f32; 4],
    pub scene_position: [f32; 4],
    pub input_coord: [f32; 4],
}

impl From<RawPixelInput> for PixelInvocation {
    fn from(raw: RawPixelInput) -> Self {
        let [u, v, tw, th] = raw.input_coord;
        Self {
            clip_position: Vec4::from_array(raw.clip_position),
            scene_position: Vec4::from_array(raw.scene_position),
            input_coord: Vec2::new(u, v),
            texel_size: Vec2::new(tw, th),
        }
    }
}

impl From<&PixelInvocation> for RawPixelInput {
    fn from(invocation: &PixelInvocation) -> Self {
        Self {
            clip_position: invocation.clip_position.to_array(),
            scene_position: invocation.scene_position.to_array(),
            input_coord: [
                invocation.input_coord.x,
                invocation.input_coord.y,
                invocation.texel_size.x,
                invocation.texel_size.y,
            ],
        }
    }
}
