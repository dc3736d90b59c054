pub mod easing;

pub use easing::{fract, smoothstep};
