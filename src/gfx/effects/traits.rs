//! Trait definitions for pixel effects.

use bytemuck::Pod;
use shadefx_core::{EffectId, PropertyType};

use super::{PixelInvocation, Texture};
use crate::error::{EffectError, Result};
use crate::gfx::Color;

/// Metadata describing an effect for registration with a host.
#[derive(Debug, Clone)]
pub struct EffectMetadata {
    /// Human-readable name of the effect
    pub name: &'static str,
    /// Author of the effect
    pub author: &'static str,
    /// Category for organization (e.g., "Color", "Blur", "Distortion")
    pub category: &'static str,
    /// Description of what the effect does
    pub description: &'static str,
    /// Property definitions, in parameter block order
    pub properties: &'static [PropertyMetadata],
}

impl EffectMetadata {
    /// Total number of parameter block bytes the properties describe.
    pub fn declared_block_size(&self) -> usize {
        self.properties
            .iter()
            .map(|p| p.property_type.size_bytes())
            .sum()
    }

    pub fn property(&self, name: &str) -> Option<(usize, &PropertyMetadata)> {
        self.properties
            .iter()
            .enumerate()
            .find(|(_, p)| p.name == name)
    }
}

/// Metadata describing a single effect property.
#[derive(Debug, Clone, Copy)]
pub struct PropertyMetadata {
    /// Property name as the host sees it
    pub name: &'static str,
    /// Human-readable display name
    pub display_name: &'static str,
    pub property_type: PropertyType,
    /// Byte offset inside the parameter block
    pub offset: usize,
    pub default: PropertyDefault,
    /// Optional minimum value
    pub min: Option<PropertyDefault>,
    /// Optional maximum value
    pub max: Option<PropertyDefault>,
}

/// Default/min/max values for property metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyDefault {
    Float(f32),
    Int(i32),
    UInt(u32),
    Vector2([f32; 2]),
    Vector3([f32; 3]),
    Vector4([f32; 4]),
}

impl PropertyDefault {
    /// Formats the value for an effect descriptor.
    pub fn to_schema_value(&self) -> String {
        match self {
            PropertyDefault::Float(v) => format!("{}", v),
            PropertyDefault::Int(v) => format!("{}", v),
            PropertyDefault::UInt(v) => format!("{}", v),
            PropertyDefault::Vector2([x, y]) => format!("({}, {})", x, y),
            PropertyDefault::Vector3([x, y, z]) => format!("({}, {}, {})", x, y, z),
            PropertyDefault::Vector4([x, y, z, w]) => format!("({}, {}, {}, {})", x, y, z, w),
        }
    }
}

/// The current value of one effect property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectProperty {
    /// Single floating-point value
    Float { index: u32, value: f32 },
    /// Two-component float vector
    Float2 { index: u32, value: [f32; 2] },
    /// Three-component float vector
    Float3 { index: u32, value: [f32; 3] },
    /// Four-component float vector (e.g., color)
    Float4 { index: u32, value: [f32; 4] },
    /// Integer value
    Int { index: u32, value: i32 },
    /// Unsigned integer value
    UInt { index: u32, value: u32 },
}

impl EffectProperty {
    pub fn index(&self) -> u32 {
        match *self {
            EffectProperty::Float { index, .. }
            | EffectProperty::Float2 { index, .. }
            | EffectProperty::Float3 { index, .. }
            | EffectProperty::Float4 { index, .. }
            | EffectProperty::Int { index, .. }
            | EffectProperty::UInt { index, .. } => index,
        }
    }

    /// Returns the value if this is a scalar float property.
    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            EffectProperty::Float { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Object-safe trait for pixel effects that can be used with `dyn`.
///
/// This trait provides runtime access to effect properties and evaluation and
/// is automatically implemented for all types implementing [`PixelEffect`].
pub trait DynPixelEffect: Send + Sync {
    /// Returns the id of this effect type.
    fn id(&self) -> EffectId;

    /// Returns the effect's metadata.
    fn metadata(&self) -> EffectMetadata;

    /// Returns the current property values.
    fn properties(&self) -> Vec<EffectProperty>;

    /// Looks up a property value by its host-facing name.
    fn property(&self, name: &str) -> Option<EffectProperty> {
        let (index, _) = self.metadata().property(name)?;
        self.properties().get(index).copied()
    }

    /// Returns the amount of padding (in pixels) the effect reads around
    /// each output pixel.
    fn input_padding(&self) -> f32;

    /// Evaluates the effect for one output pixel.
    fn evaluate(&self, invocation: &PixelInvocation, input: &dyn Texture) -> Color;

    /// Returns the flat parameter block the host uploads for this effect.
    fn param_block(&self) -> Vec<u8>;
}

/// Trait for defining pixel effects.
///
/// Usually implemented through the `#[pixel_effect]` attribute, which fills
/// in everything except the kernel itself.
///
/// The implementing struct is the effect's parameter block: it is
/// `#[repr(C)]`, made of 32-bit lanes, and read-only for the duration of a
/// draw.
pub trait PixelEffect: Pod + Send + Sync + 'static {
    /// Unique identifier for this effect type.
    const ID: EffectId;

    /// Returns metadata describing this effect for registration.
    fn metadata() -> EffectMetadata
    where
        Self: Sized;

    /// Returns the current property values, indexed in declaration order.
    fn properties(&self) -> Vec<EffectProperty>;

    /// Returns the amount of padding (in pixels) needed around the input image.
    ///
    /// Override this for effects that sample neighboring pixels (like blur).
    /// The default implementation returns 0.0 (no padding needed).
    fn input_padding(&self) -> f32 {
        0.0
    }

    /// Evaluates the effect for one output pixel. Must be a pure function of
    /// its arguments.
    fn evaluate(&self, invocation: &PixelInvocation, input: &dyn Texture) -> Color;

    /// Byte image of the parameter block.
    fn param_block(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Rebuilds the parameters from a host parameter block.
    fn from_param_block(bytes: &[u8]) -> Result<Self>
    where
        Self: Sized,
    {
        bytemuck::try_pod_read_unaligned(bytes).map_err(|_| EffectError::ParamBlockSize {
            effect: <Self as PixelEffect>::metadata().name,
            expected: std::mem::size_of::<Self>(),
            actual: bytes.len(),
        })
    }
}

/// Blanket implementation of DynPixelEffect for all PixelEffect types.
impl<T: PixelEffect> DynPixelEffect for T {
    fn id(&self) -> EffectId {
        T::ID
    }

    fn metadata(&self) -> EffectMetadata {
        <T as PixelEffect>::metadata()
    }

    fn properties(&self) -> Vec<EffectProperty> {
        PixelEffect::properties(self)
    }

    fn input_padding(&self) -> f32 {
        PixelEffect::input_padding(self)
    }

    fn evaluate(&self, invocation: &PixelInvocation, input: &dyn Texture) -> Color {
        PixelEffect::evaluate(self, invocation, input)
    }

    fn param_block(&self) -> Vec<u8> {
        PixelEffect::param_block(self).to_vec()
    }
}
