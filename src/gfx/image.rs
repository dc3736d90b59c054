//! In-memory RGBA images used as effect inputs and outputs.

use glam::Vec2;

use super::Color;
use super::effects::Texture;
use crate::error::{EffectError, Result};

/// How lookups outside `[0, 1]` resolve to a texel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressMode {
    /// Repeat the nearest edge texel.
    #[default]
    Clamp,
    /// Anything outside the image is transparent black.
    Border,
    /// Tile the image.
    Wrap,
}

/// A row-major grid of [`Color`] samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
    address_mode: AddressMode,
}

impl Image {
    /// Creates an image filled with a single color.
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
            address_mode: AddressMode::default(),
        }
    }

    /// Creates an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Color) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
            address_mode: AddressMode::default(),
        }
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> Result<Self> {
        if pixels.len() != width as usize * height as usize {
            return Err(EffectError::ImageSize {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            address_mode: AddressMode::default(),
        })
    }

    /// Decodes tightly packed 8-bit RGBA data.
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != width as usize * height as usize * 4 {
            return Err(EffectError::ImageSize {
                width,
                height,
                len: bytes.len(),
            });
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|px| Color::from_rgba8([px[0], px[1], px[2], px[3]]))
            .collect();
        Self::from_pixels(width, height, pixels)
    }

    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_rgba8()).collect()
    }

    pub fn with_address_mode(mut self, address_mode: AddressMode) -> Self {
        self.address_mode = address_mode;
        self
    }

    pub fn address_mode(&self) -> AddressMode {
        self.address_mode
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Row-major pixel storage, `width` pixels per row.
    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Size of one texel in normalized coordinates.
    pub fn texel_size(&self) -> Vec2 {
        Vec2::new(1.0 / self.width as f32, 1.0 / self.height as f32)
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the image.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        self.pixels[y as usize * self.width as usize + x as usize] = color;
    }

    /// Resolves a possibly out-of-range texel index through the address mode.
    fn texel(&self, x: i64, y: i64) -> Color {
        let (w, h) = (self.width as i64, self.height as i64);
        let (x, y) = match self.address_mode {
            AddressMode::Clamp => (x.clamp(0, w - 1), y.clamp(0, h - 1)),
            AddressMode::Wrap => (x.rem_euclid(w), y.rem_euclid(h)),
            AddressMode::Border => {
                if x < 0 || y < 0 || x >= w || y >= h {
                    return Color::TRANSPARENT;
                }
                (x, y)
            }
        };
        self.pixels[(y * w + x) as usize]
    }
}

impl Texture for Image {
    /// Nearest-texel lookup.
    fn sample(&self, coord: Vec2) -> Color {
        if self.is_empty() {
            return Color::TRANSPARENT;
        }
        let x = (coord.x * self.width as f32).floor() as i64;
        let y = (coord.y * self.height as f32).floor() as i64;
        self.texel(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Image {
        Image::from_fn(4, 2, |x, y| Color::gray((x + 4 * y) as f32 / 8.0))
    }

    #[test]
    fn test_sample_texel_centers() {
        let image = ramp();
        let texel = image.texel_size();
        for y in 0..2 {
            for x in 0..4 {
                let center = (Vec2::new(x as f32, y as f32) + 0.5) * texel;
                assert_eq!(image.sample(center), image.pixel(x, y));
            }
        }
    }

    #[test]
    fn test_address_modes() {
        let outside = Vec2::new(-0.1, 0.25);

        let clamp = ramp();
        assert_eq!(clamp.sample(outside), clamp.pixel(0, 0));

        let border = ramp().with_address_mode(AddressMode::Border);
        assert_eq!(border.sample(outside), Color::TRANSPARENT);

        let wrap = ramp().with_address_mode(AddressMode::Wrap);
        assert_eq!(wrap.sample(outside), wrap.pixel(3, 0));
    }

    #[test]
    fn test_from_pixels_rejects_wrong_length() {
        let err = Image::from_pixels(2, 2, vec![Color::BLACK; 3]).unwrap_err();
        assert!(matches!(err, EffectError::ImageSize { width: 2, height: 2, len: 3 }));
        assert!(Image::from_rgba8(1, 1, &[0, 0, 0]).is_err());
    }

    #[test]
    fn test_rgba8_round_trip_preserves_bytes() {
        let bytes = [10, 20, 30, 40, 250, 128, 0, 255];
        let image = Image::from_rgba8(2, 1, &bytes).unwrap();
        assert_eq!(image.to_rgba8(), bytes);
    }

    #[test]
    fn test_empty_image_samples_transparent() {
        let image = Image::new(0, 0, Color::WHITE);
        assert_eq!(image.sample(Vec2::splat(0.5)), Color::TRANSPARENT);
    }
}
