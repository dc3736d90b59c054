//! Effect instance creation and management.

use std::sync::Arc;

use log::debug;

use super::{EffectRegistry, PixelEffect, dispatch};
use crate::error::{EffectError, Result};
use crate::gfx::Image;

/// A created instance of a registered effect.
///
/// Holds the current parameters and input image of one effect.
///
/// # Example
///
/// ```ignore
/// let mut instance = EffectInstance::<MyEffect>::create(&registry)?;
/// instance.set_input(input_image);
/// instance.update(&MyEffect { intensity: 0.5 });
/// let output = instance.output()?;
/// ```
#[derive(Debug, Clone)]
pub struct EffectInstance<E: PixelEffect> {
    effect: E,
    input: Option<Arc<Image>>,
}

impl<E: PixelEffect> EffectInstance<E> {
    /// Creates a new instance with every property at its declared default.
    ///
    /// The effect type must have been registered via
    /// [`EffectRegistry::register`] before calling this.
    pub fn create(registry: &EffectRegistry) -> Result<Self> {
        let registered = registry.get(E::ID)?;
        let effect = E::from_param_block(&registered.default_block())?;
        Ok(Self {
            effect,
            input: None,
        })
    }

    /// Sets the input image for the effect.
    pub fn set_input(&mut self, image: impl Into<Arc<Image>>) {
        self.input = Some(image.into());
    }

    pub fn input(&self) -> Option<&Image> {
        self.input.as_deref()
    }

    /// Updates the effect with new property values.
    pub fn update(&mut self, effect_data: &E) {
        let metadata = <E as PixelEffect>::metadata();
        let before = PixelEffect::properties(&self.effect);
        let after = PixelEffect::properties(effect_data);
        for ((old, new), prop) in before.iter().zip(&after).zip(metadata.properties) {
            if old != new {
                debug!("{}.{} -> {:?}", metadata.name, prop.name, new);
            }
        }
        self.effect = *effect_data;
    }

    /// Returns the current parameters.
    pub fn effect(&self) -> &E {
        &self.effect
    }

    /// Renders the input image through the effect.
    pub fn output(&self) -> Result<Image> {
        let input = self.input.as_deref().ok_or(EffectError::MissingInput)?;
        Ok(dispatch::render(&self.effect, input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::Color;
    use crate::gfx::effects::builtins::{BoxBlurEffect, LiquidGlassEffect};

    #[test]
    fn test_create_requires_registration() {
        let registry = EffectRegistry::new();
        assert!(matches!(
            EffectInstance::<BoxBlurEffect>::create(&registry),
            Err(EffectError::NotRegistered(id)) if id == BoxBlurEffect::ID
        ));
    }

    #[test]
    fn test_create_starts_from_defaults() {
        let registry = EffectRegistry::with_builtins().unwrap();
        let blur = EffectInstance::<BoxBlurEffect>::create(&registry).unwrap();
        assert_eq!(*blur.effect(), BoxBlurEffect::default());
        let glass = EffectInstance::<LiquidGlassEffect>::create(&registry).unwrap();
        assert_eq!(*glass.effect(), LiquidGlassEffect::default());
        assert!(glass.input().is_none());
    }

    #[test]
    fn test_output_without_input_fails() {
        let registry = EffectRegistry::with_builtins().unwrap();
        let blur = EffectInstance::<BoxBlurEffect>::create(&registry).unwrap();
        assert!(matches!(blur.output(), Err(EffectError::MissingInput)));
    }

    #[test]
    fn test_update_then_output() {
        let registry = EffectRegistry::with_builtins().unwrap();
        let mut blur = EffectInstance::<BoxBlurEffect>::create(&registry).unwrap();
        let input = Image::from_fn(8, 8, |x, y| Color::gray(((x + y) % 2) as f32));
        blur.set_input(input.clone());

        blur.update(&BoxBlurEffect {
            radius: 0.0,
            intensity: 1.0,
        });
        assert_eq!(blur.effect().radius, 0.0);
        assert_eq!(blur.output().unwrap(), input);

        blur.update(&BoxBlurEffect {
            radius: 1.0,
            intensity: 1.0,
        });
        let output = blur.output().unwrap();
        // Interior 3x3 windows of a checkerboard hold four or five white texels.
        let center = output.pixel(4, 4);
        assert!((center.r - 4.0 / 9.0).abs() < 1e-6 || (center.r - 5.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_shared_input() {
        let registry = EffectRegistry::with_builtins().unwrap();
        let input = Arc::new(Image::new(4, 4, Color::gray(0.25)));
        let mut a = EffectInstance::<BoxBlurEffect>::create(&registry).unwrap();
        let mut b = EffectInstance::<LiquidGlassEffect>::create(&registry).unwrap();
        a.set_input(Arc::clone(&input));
        b.set_input(Arc::clone(&input));
        assert_eq!(Arc::strong_count(&input), 3);
        assert_eq!(a.output().unwrap().width(), 4);
        assert_eq!(b.output().unwrap().height(), 4);
    }
}
