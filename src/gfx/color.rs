/*

Copyright 2019 Héctor Ramón, Iced contributors

Permission is hereby granted, free of charge, to any person obtaining a copy of
this software and associated documentation files (the "Software"), to deal in
the Software without restriction, including without limitation the rights to
use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
the Software, and to permit persons to whom the Software is furnished to do so,
subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

*/

use glam::Vec4;

/// An RGBA sample with floating point channels.
///
/// Channels are conceptually in `[0, 1]`, but intermediate values produced
/// while filtering may leave that range until they are clamped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Color::TRANSPARENT
    }
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: (0xFF & (hex >> 24)) as f32 / 255.0,
            g: (0xFF & (hex >> 16)) as f32 / 255.0,
            b: (0xFF & (hex >> 8)) as f32 / 255.0,
            a: (0xFF & hex) as f32 / 255.0,
        }
    }

    pub const fn from_rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn gray(level: f32) -> Self {
        Self::from_rgba(level, level, level, 1.0)
    }

    pub const fn from_rgba8(rgba: [u8; 4]) -> Self {
        Self {
            r: rgba[0] as f32 / 255.0,
            g: rgba[1] as f32 / 255.0,
            b: rgba[2] as f32 / 255.0,
            a: rgba[3] as f32 / 255.0,
        }
    }

    /// Quantizes to 8 bits per channel, clamping out-of-range values.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Linear interpolation towards `other`, alpha included.
    ///
    /// Exact at both ends: `t = 0` yields `self` and `t = 1` yields `other`.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        Color::from(Vec4::from(self) * (1.0 - t) + Vec4::from(other) * t)
    }

    /// Clamps the color channels to `[0, 1]`, leaving alpha untouched.
    pub fn clamp_rgb(self) -> Color {
        Color {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a,
        }
    }

    /// Adds `amount` to each color channel.
    pub const fn offset_rgb(self, amount: f32) -> Color {
        Color {
            r: self.r + amount,
            g: self.g + amount,
            b: self.b + amount,
            a: self.a,
        }
    }

    /// Multiplies each color channel by `factor`.
    pub const fn scale_rgb(self, factor: f32) -> Color {
        Color {
            r: self.r * factor,
            g: self.g * factor,
            b: self.b * factor,
            a: self.a,
        }
    }

    /// Scales the alpha channel of the [`Color`] by the given factor.
    pub const fn scale_alpha(self, factor: f32) -> Color {
        Self {
            a: self.a * factor,
            ..self
        }
    }

    /// Returns the relative luminance, treating the channels as linear.
    /// <https://www.w3.org/TR/WCAG21/#dfn-relative-luminance>
    pub fn relative_luminance(self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }
}

impl From<u32> for Color {
    fn from(color: u32) -> Self {
        Color::from_hex(color)
    }
}

impl From<Color> for Vec4 {
    fn from(c: Color) -> Self {
        Vec4::new(c.r, c.g, c.b, c.a)
    }
}

impl From<Vec4> for Color {
    fn from(v: Vec4) -> Self {
        Color::from_rgba(v.x, v.y, v.z, v.w)
    }
}
