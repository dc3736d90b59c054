// Shader-style interpolation helpers used by the pixel kernels.

/// Hermite interpolation between `edge0` and `edge1`, as in HLSL/GLSL.
///
/// Values at or below `edge0` map to 0 and values at or above `edge1` map
/// to 1, so a degenerate band (`edge0 == edge1`) behaves like a step.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if x <= edge0 {
        return 0.0;
    }
    if x >= edge1 {
        return 1.0;
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    // 3t^2 - 2t^3
    t * t * (3.0 - 2.0 * t)
}

/// Fractional part with HLSL semantics: `x - floor(x)`.
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}
