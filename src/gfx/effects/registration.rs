//! Effect registration.

use std::collections::HashMap;
use std::fmt;

use log::debug;
use shadefx_core::EffectId;

use super::builtins::{BoxBlurEffect, LiquidGlassEffect};
use super::{DynPixelEffect, EffectMetadata, PixelEffect, PropertyDefault, PropertyMetadata};
use crate::error::{EffectError, Result};

type Constructor = fn(&[u8]) -> Result<Box<dyn DynPixelEffect>>;

fn construct<E: PixelEffect>(block: &[u8]) -> Result<Box<dyn DynPixelEffect>> {
    Ok(Box::new(E::from_param_block(block)?))
}

/// Everything the registry knows about one effect type.
#[derive(Clone)]
pub struct RegisteredEffect {
    pub id: EffectId,
    pub metadata: EffectMetadata,
    /// Exact size of the effect's parameter block in bytes
    pub param_block_size: usize,
    constructor: Constructor,
}

impl RegisteredEffect {
    /// Instantiates the effect from a raw parameter block.
    pub fn instantiate(&self, block: &[u8]) -> Result<Box<dyn DynPixelEffect>> {
        (self.constructor)(block)
    }

    /// Parameter block holding every property's declared default.
    pub fn default_block(&self) -> Vec<u8> {
        let mut block = vec![0u8; self.param_block_size];
        for prop in self.metadata.properties {
            let bytes = default_bytes(&prop.default);
            block[prop.offset..prop.offset + bytes.len()].copy_from_slice(&bytes);
        }
        block
    }
}

impl fmt::Debug for RegisteredEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredEffect")
            .field("id", &self.id)
            .field("name", &self.metadata.name)
            .field("param_block_size", &self.param_block_size)
            .finish_non_exhaustive()
    }
}

fn default_bytes(value: &PropertyDefault) -> Vec<u8> {
    match value {
        PropertyDefault::Float(v) => v.to_ne_bytes().to_vec(),
        PropertyDefault::Int(v) => v.to_ne_bytes().to_vec(),
        PropertyDefault::UInt(v) => v.to_ne_bytes().to_vec(),
        PropertyDefault::Vector2(v) => bytemuck::cast_slice::<f32, u8>(v).to_vec(),
        PropertyDefault::Vector3(v) => bytemuck::cast_slice::<f32, u8>(v).to_vec(),
        PropertyDefault::Vector4(v) => bytemuck::cast_slice::<f32, u8>(v).to_vec(),
    }
}

/// Registry of effect types.
///
/// Tracks which effects have been registered, checks their parameter block
/// layout once at registration, and instantiates them from raw blocks.
#[derive(Default)]
pub struct EffectRegistry {
    registered: HashMap<EffectId, RegisteredEffect>,
}

impl EffectRegistry {
    /// Creates a new empty effect registry.
    pub fn new() -> Self {
        Self {
            registered: HashMap::new(),
        }
    }

    /// Creates a registry with [`BoxBlurEffect`] and [`LiquidGlassEffect`]
    /// already registered.
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        registry.register::<BoxBlurEffect>()?;
        registry.register::<LiquidGlassEffect>()?;
        Ok(registry)
    }

    /// Registers an effect type.
    ///
    /// Multiple calls with the same effect type are ignored. Fails with
    /// [`EffectError::LayoutMismatch`] if the declared properties do not tile
    /// the parameter struct exactly.
    ///
    /// # Example
    ///
    /// ```ignore
    /// registry.register::<GrayscaleEffect>()?;
    /// ```
    pub fn register<E: PixelEffect>(&mut self) -> Result<()> {
        if self.registered.contains_key(&E::ID) {
            return Ok(());
        }

        let metadata = <E as PixelEffect>::metadata();
        let actual = std::mem::size_of::<E>();
        if !tiles_block(metadata.properties, actual) {
            return Err(EffectError::LayoutMismatch {
                effect: metadata.name,
                declared: metadata.declared_block_size(),
                actual,
            });
        }

        debug!(
            "Registered effect {} ({}) with {} properties",
            metadata.name,
            E::ID,
            metadata.properties.len()
        );

        self.registered.insert(
            E::ID,
            RegisteredEffect {
                id: E::ID,
                metadata,
                param_block_size: actual,
                constructor: construct::<E>,
            },
        );
        Ok(())
    }

    /// Checks if an effect type has been registered.
    pub fn is_registered<E: PixelEffect>(&self) -> bool {
        self.registered.contains_key(&E::ID)
    }

    /// Unregisters an effect type. Unknown types are ignored.
    pub fn unregister<E: PixelEffect>(&mut self) {
        if self.registered.remove(&E::ID).is_some() {
            debug!("Unregistered effect {}", E::ID);
        }
    }

    pub fn clear(&mut self) {
        self.registered.clear();
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    pub fn get(&self, id: EffectId) -> Result<&RegisteredEffect> {
        self.registered.get(&id).ok_or(EffectError::NotRegistered(id))
    }

    /// Registered effects, sorted by name.
    pub fn effects(&self) -> Vec<&RegisteredEffect> {
        let mut effects: Vec<_> = self.registered.values().collect();
        effects.sort_by_key(|e| e.metadata.name);
        effects
    }

    /// Resolves an effect by name (case-insensitive) or by GUID text.
    pub fn lookup(&self, key: &str) -> Result<&RegisteredEffect> {
        if let Some(found) = self
            .registered
            .values()
            .find(|e| e.metadata.name.eq_ignore_ascii_case(key.trim()))
        {
            return Ok(found);
        }

        match EffectId::parse(key) {
            Ok(id) => self.get(id),
            Err(_) => Err(EffectError::UnknownEffect(key.to_owned())),
        }
    }

    /// Instantiates a registered effect from a raw parameter block.
    pub fn create(&self, id: EffectId, block: &[u8]) -> Result<Box<dyn DynPixelEffect>> {
        self.get(id)?.instantiate(block)
    }

    /// Renders the XML schema a host loads to describe the effect.
    pub fn descriptor(&self, id: EffectId) -> Result<String> {
        Ok(build_effect_xml(&self.get(id)?.metadata))
    }
}

/// Whether the properties sit back to back from offset 0 and end exactly at
/// `size`.
fn tiles_block(properties: &[PropertyMetadata], size: usize) -> bool {
    let end = properties.iter().try_fold(0, |offset, prop| {
        (prop.offset == offset).then(|| offset + prop.property_type.size_bytes())
    });
    end == Some(size)
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Builds the XML registration string for an effect.
fn build_effect_xml(metadata: &EffectMetadata) -> String {
    let properties = metadata
        .properties
        .iter()
        .map(build_property_xml)
        .collect::<Vec<_>>()
        .join("\n    ");

    format!(
        r#"<?xml version='1.0'?>
<Effect>
    <Property name='DisplayName' type='string' value='{name}'/>
    <Property name='Author' type='string' value='{author}'/>
    <Property name='Category' type='string' value='{category}'/>
    <Property name='Description' type='string' value='{description}'/>
    <Inputs>
        <Input name='Source'/>
    </Inputs>
    {properties}
</Effect>"#,
        name = escape_xml(metadata.name),
        author = escape_xml(metadata.author),
        category = escape_xml(metadata.category),
        description = escape_xml(metadata.description),
        properties = properties,
    )
}

/// Builds XML for a single property definition.
fn build_property_xml(prop: &PropertyMetadata) -> String {
    let ty = prop.property_type.as_str();
    let mut xml = format!(
        "<Property name='{}' type='{}' offset='{}'>",
        escape_xml(prop.name),
        ty,
        prop.offset
    );

    xml.push_str(&format!(
        "\n        <Property name='DisplayName' type='string' value='{}'/>",
        escape_xml(prop.display_name)
    ));

    xml.push_str(&format!(
        "\n        <Property name='Default' type='{}' value='{}'/>",
        ty,
        prop.default.to_schema_value()
    ));

    if let Some(min) = &prop.min {
        xml.push_str(&format!(
            "\n        <Property name='Min' type='{}' value='{}'/>",
            ty,
            min.to_schema_value()
        ));
    }

    if let Some(max) = &prop.max {
        xml.push_str(&format!(
            "\n        <Property name='Max' type='{}' value='{}'/>",
            ty,
            max.to_schema_value()
        ));
    }

    xml.push_str("\n    </Property>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::Color;
    use crate::gfx::effects::{EffectProperty, PixelInvocation, PropertyType, Texture};
    use bytemuck::{Pod, Zeroable};

    /// Two floats in the struct but only one declared.
    #[repr(C)]
    #[derive(Debug, Clone, Copy, Pod, Zeroable)]
    struct Lopsided {
        gain: f32,
        hidden: f32,
    }

    impl PixelEffect for Lopsided {
        const ID: EffectId = EffectId::from_u128(0x0BAD_0000_0000_0000_0000_0000_0000_0001);

        fn metadata() -> EffectMetadata {
            const PROPERTIES: &[PropertyMetadata] = &[PropertyMetadata {
                name: "Gain",
                display_name: "Gain",
                property_type: PropertyType::Float,
                offset: 0,
                default: PropertyDefault::Float(1.0),
                min: None,
                max: None,
            }];
            EffectMetadata {
                name: "Lopsided",
                author: "tests",
                category: "Test",
                description: "Declares fewer bytes than it occupies",
                properties: PROPERTIES,
            }
        }

        fn properties(&self) -> Vec<EffectProperty> {
            vec![EffectProperty::Float {
                index: 0,
                value: self.gain,
            }]
        }

        fn evaluate(&self, invocation: &PixelInvocation, input: &dyn Texture) -> Color {
            input.sample(invocation.input_coord).scale_rgb(self.gain + self.hidden)
        }
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = EffectRegistry::new();
        assert!(!registry.is_registered::<BoxBlurEffect>());
        registry.register::<BoxBlurEffect>().unwrap();
        registry.register::<BoxBlurEffect>().unwrap();
        assert!(registry.is_registered::<BoxBlurEffect>());
        assert_eq!(registry.len(), 1);

        registry.unregister::<BoxBlurEffect>();
        registry.unregister::<BoxBlurEffect>();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_layout_mismatch_is_rejected() {
        let mut registry = EffectRegistry::new();
        match registry.register::<Lopsided>() {
            Err(EffectError::LayoutMismatch {
                effect,
                declared,
                actual,
            }) => {
                assert_eq!(effect, "Lopsided");
                assert_eq!(declared, 4);
                assert_eq!(actual, 8);
            }
            other => panic!("expected a layout mismatch, got {other:?}"),
        }
        assert!(!registry.is_registered::<Lopsided>());
    }

    #[test]
    fn test_lookup_by_name_and_id() {
        let registry = EffectRegistry::with_builtins().unwrap();
        assert_eq!(registry.lookup("BoxBlur").unwrap().id, BoxBlurEffect::ID);
        assert_eq!(registry.lookup("liquidglass").unwrap().id, LiquidGlassEffect::ID);
        assert_eq!(
            registry
                .lookup("{2a8c1690-cc5c-4a26-bb5a-94fa9d8c5c51}")
                .unwrap()
                .metadata
                .name,
            "LiquidGlass"
        );

        assert!(matches!(
            registry.lookup("Sharpen"),
            Err(EffectError::UnknownEffect(name)) if name == "Sharpen"
        ));
        assert!(matches!(
            registry.lookup("00000000-0000-0000-0000-000000000001"),
            Err(EffectError::NotRegistered(_))
        ));
    }

    #[test]
    fn test_effects_sorted_by_name() {
        let registry = EffectRegistry::with_builtins().unwrap();
        let names: Vec<_> = registry.effects().iter().map(|e| e.metadata.name).collect();
        assert_eq!(names, ["BoxBlur", "LiquidGlass"]);
    }

    #[test]
    fn test_create_from_block() {
        let registry = EffectRegistry::with_builtins().unwrap();
        let params = LiquidGlassEffect {
            refraction: 4.0,
            glow: 0.1,
            noise: 0.0,
            size: 0.9,
        };
        let effect = registry
            .create(LiquidGlassEffect::ID, PixelEffect::param_block(&params))
            .unwrap();
        assert_eq!(effect.id(), LiquidGlassEffect::ID);
        assert_eq!(
            effect.property("Size"),
            Some(EffectProperty::Float {
                index: 3,
                value: 0.9
            })
        );
        assert_eq!(effect.param_block(), PixelEffect::param_block(&params));

        assert!(matches!(
            registry.create(BoxBlurEffect::ID, &[0u8; 4]),
            Err(EffectError::ParamBlockSize {
                expected: 8,
                actual: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_default_block_matches_default_impl() {
        let registry = EffectRegistry::with_builtins().unwrap();
        let block = registry.get(LiquidGlassEffect::ID).unwrap().default_block();
        assert_eq!(
            LiquidGlassEffect::from_param_block(&block).unwrap(),
            LiquidGlassEffect::default()
        );
    }

    #[test]
    fn test_descriptor() {
        let registry = EffectRegistry::with_builtins().unwrap();
        let xml = registry.descriptor(BoxBlurEffect::ID).unwrap();
        assert!(xml.starts_with("<?xml version='1.0'?>"));
        assert!(xml.contains("<Property name='DisplayName' type='string' value='BoxBlur'/>"));
        assert!(xml.contains("<Input name='Source'/>"));
        assert!(xml.contains("<Property name='Radius' type='float32' offset='0'>"));
        assert!(xml.contains("<Property name='Intensity' type='float32' offset='4'>"));
        assert!(xml.contains("<Property name='Default' type='float32' value='3'/>"));
        assert!(xml.contains("<Property name='Max' type='float32' value='8'/>"));

        let missing = EffectId::from_u128(7);
        assert!(matches!(
            registry.descriptor(missing),
            Err(EffectError::NotRegistered(id)) if id == missing
        ));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b & 'c'"), "a &lt; b &amp; &apos;c&apos;");
    }
}
