pub mod color;
pub mod effects;
pub mod image;

pub use color::Color;
pub use image::{AddressMode, Image};
