//! Types shared between the shadefx runtime and the `#[pixel_effect]` macro.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Property types that may appear in an effect's parameter block.
///
/// Every type is made of 32-bit lanes, so a `#[repr(C)]` parameter struct
/// built from them never contains padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Float,
    Int,
    UInt,
    Vector2,
    Vector3,
    Vector4,
}

impl PropertyType {
    /// Returns the host-facing type name used in effect descriptors.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Float => "float32",
            PropertyType::Int => "int32",
            PropertyType::UInt => "uint32",
            PropertyType::Vector2 => "float32x2",
            PropertyType::Vector3 => "float32x3",
            PropertyType::Vector4 => "float32x4",
        }
    }

    /// Size of the property inside a parameter block, in bytes.
    pub const fn size_bytes(&self) -> usize {
        match self {
            PropertyType::Float | PropertyType::Int | PropertyType::UInt => 4,
            PropertyType::Vector2 => 8,
            PropertyType::Vector3 => 12,
            PropertyType::Vector4 => 16,
        }
    }

    /// Maps the textual form of a Rust field type onto a property type.
    ///
    /// Whitespace is ignored, so both `[f32; 2]` and the token-stream
    /// rendering `[f32 ; 2]` are accepted.
    pub fn from_rust_type(ty: &str) -> Option<Self> {
        let compact: String = ty.chars().filter(|c| !c.is_whitespace()).collect();
        match compact.as_str() {
            "f32" => Some(PropertyType::Float),
            "i32" => Some(PropertyType::Int),
            "u32" => Some(PropertyType::UInt),
            "[f32;2]" => Some(PropertyType::Vector2),
            "[f32;3]" => Some(PropertyType::Vector3),
            "[f32;4]" => Some(PropertyType::Vector4),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EffectIdError {
    #[error("expected 32 hex digits, found {0}")]
    Length(usize),

    #[error("unexpected character {0:?} in effect id")]
    InvalidCharacter(char),
}

/// Globally unique identifier of an effect type.
///
/// Displayed in the usual GUID grouping, e.g.
/// `1793FB86-6351-43D8-B857-C8DC02C4EB7A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(u128);

impl EffectId {
    pub const fn from_u128(value: u128) -> Self {
        Self(value)
    }

    pub const fn as_u128(self) -> u128 {
        self.0
    }

    /// Parses the GUID text form. Hyphens and one pair of surrounding braces
    /// are optional; case is ignored.
    pub fn parse(text: &str) -> Result<Self, EffectIdError> {
        let trimmed = text.trim();
        let trimmed = trimmed
            .strip_prefix('{')
            .and_then(|t| t.strip_suffix('}'))
            .unwrap_or(trimmed);

        let mut value = 0u128;
        let mut digits = 0usize;
        for ch in trimmed.chars() {
            if ch == '-' {
                continue;
            }
            let nibble = ch.to_digit(16).ok_or(EffectIdError::InvalidCharacter(ch))?;
            digits += 1;
            if digits <= 32 {
                value = (value << 4) | nibble as u128;
            }
        }

        if digits != 32 {
            return Err(EffectIdError::Length(digits));
        }
        Ok(Self(value))
    }
}

impl FromStr for EffectId {
    type Err = EffectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        write!(
            f,
            "{:08X}-{:04X}-{:04X}-{:04X}-{:012X}",
            (v >> 96) as u32,
            (v >> 80) as u16,
            (v >> 64) as u16,
            (v >> 48) as u16,
            v & 0xFFFF_FFFF_FFFF,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_effect_id() {
        let id = EffectId::parse("1793FB86-6351-43D8-B857-C8DC02C4EB7A").unwrap();
        assert_eq!(id.as_u128(), 0x1793FB86_6351_43D8_B857_C8DC02C4EB7A);
        assert_eq!(id.to_string(), "1793FB86-6351-43D8-B857-C8DC02C4EB7A");

        let braced: EffectId = "{1793fb86-6351-43d8-b857-c8dc02c4eb7a}".parse().unwrap();
        assert_eq!(braced, id);
    }

    #[test]
    fn test_parse_effect_id_errors() {
        assert_eq!(EffectId::parse("1234"), Err(EffectIdError::Length(4)));
        assert_eq!(
            EffectId::parse("1793FB86-6351-43D8-B857-C8DC02C4EB7Z"),
            Err(EffectIdError::InvalidCharacter('Z'))
        );
        assert_eq!(
            EffectId::parse("1793FB86-6351-43D8-B857-C8DC02C4EB7A00"),
            Err(EffectIdError::Length(34))
        );
    }

    #[test]
    fn test_property_type_from_rust_type() {
        assert_eq!(PropertyType::from_rust_type("f32"), Some(PropertyType::Float));
        assert_eq!(PropertyType::from_rust_type("[f32 ; 3]"), Some(PropertyType::Vector3));
        assert_eq!(PropertyType::from_rust_type("[f32; 4]"), Some(PropertyType::Vector4));
        assert_eq!(PropertyType::from_rust_type("bool"), None);
        assert_eq!(PropertyType::Vector3.size_bytes(), 12);
        assert_eq!(PropertyType::Vector2.to_string(), "float32x2");
    }
}
