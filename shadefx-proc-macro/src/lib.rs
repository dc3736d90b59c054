use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use shadefx_core::{EffectId, PropertyType};
use syn::parse::{Parse, ParseStream};
use syn::{Fields, Ident, ItemStruct, LitFloat, LitStr, Token, Type, parse_macro_input};

/// Parsed effect-level attributes
struct EffectAttrs {
    id: LitStr,
    name: String,
    author: String,
    category: String,
    description: String,
    /// Path of the per-pixel function, `fn(&Self, &PixelInvocation, &dyn Texture) -> Color`
    kernel: syn::Path,
    /// Optional expression (over `self`) giving the input padding in pixels
    input_padding: Option<syn::Expr>,
}

impl Parse for EffectAttrs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut id = None;
        let mut name = None;
        let mut author = None;
        let mut category = None;
        let mut description = None;
        let mut kernel = None;
        let mut input_padding = None;

        while !input.is_empty() {
            let key: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            let value: LitStr = input.parse()?;

            match key.to_string().as_str() {
                "id" => id = Some(value),
                "name" => name = Some(value.value()),
                "author" => author = Some(value.value()),
                "category" => category = Some(value.value()),
                "description" => description = Some(value.value()),
                "kernel" => kernel = Some(value.parse::<syn::Path>()?),
                "input_padding" => input_padding = Some(value.parse::<syn::Expr>()?),
                _ => {
                    return Err(syn::Error::new(
                        key.span(),
                        format!("Unknown attribute: {}", key),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(EffectAttrs {
            id: id.ok_or_else(|| input.error("Missing required attribute: id"))?,
            name: name.ok_or_else(|| input.error("Missing required attribute: name"))?,
            author: author.unwrap_or_else(|| "Unknown".to_string()),
            category: category.unwrap_or_else(|| "Custom".to_string()),
            description: description.unwrap_or_default(),
            kernel: kernel.ok_or_else(|| input.error("Missing required attribute: kernel"))?,
            input_padding,
        })
    }
}

/// Parsed property attributes from #[property(...)]
#[derive(Default)]
struct PropertyAttrs {
    name: Option<String>,
    min: Option<f64>,
    max: Option<f64>,
    default: Option<f64>,
}

impl PropertyAttrs {
    fn parse_from_attrs(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut result = PropertyAttrs::default();

        for attr in attrs.iter().filter(|a| a.path().is_ident("property")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    result.name = Some(value.value());
                } else if meta.path.is_ident("min") {
                    let value: LitFloat = meta.value()?.parse()?;
                    result.min = Some(value.base10_parse()?);
                } else if meta.path.is_ident("max") {
                    let value: LitFloat = meta.value()?.parse()?;
                    result.max = Some(value.base10_parse()?);
                } else if meta.path.is_ident("default") {
                    let value: LitFloat = meta.value()?.parse()?;
                    result.default = Some(value.base10_parse()?);
                } else {
                    return Err(meta.error("expected `name`, `min`, `max` or `default`"));
                }
                Ok(())
            })?;
        }

        Ok(result)
    }
}

/// Property info extracted from a struct field
struct PropertyInfo {
    field_name: Ident,
    prop_name: String,
    property_type: PropertyType,
    offset: usize,
    min: Option<f64>,
    max: Option<f64>,
    default: f64,
}

impl PropertyInfo {
    fn from_field(field: &syn::Field, offset: usize) -> syn::Result<Self> {
        let field_name = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new_spanned(field, "effect properties must be named"))?;
        let attrs = PropertyAttrs::parse_from_attrs(&field.attrs)?;

        let field_type: &Type = &field.ty;
        let type_str = quote!(#field_type).to_string();
        let property_type = PropertyType::from_rust_type(&type_str).ok_or_else(|| {
            syn::Error::new_spanned(
                field_type,
                format!("Unsupported property type `{type_str}`: expected f32, i32, u32 or [f32; 2..=4]"),
            )
        })?;

        let prop_name = attrs
            .name
            .unwrap_or_else(|| to_pascal_case(&field_name.to_string()));

        Ok(PropertyInfo {
            field_name,
            prop_name,
            property_type,
            offset,
            min: attrs.min,
            max: attrs.max,
            default: attrs.default.unwrap_or(0.0),
        })
    }
}

fn to_pascal_case(snake: &str) -> String {
    snake
        .split('_')
        .map(|s| {
            let mut c = s.chars();
            match c.next() {
                None => String::new(),
                Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
            }
        })
        .collect()
}

fn property_type_tokens(ty: PropertyType) -> TokenStream2 {
    match ty {
        PropertyType::Float => quote!(::shadefx::gfx::effects::PropertyType::Float),
        PropertyType::Int => quote!(::shadefx::gfx::effects::PropertyType::Int),
        PropertyType::UInt => quote!(::shadefx::gfx::effects::PropertyType::UInt),
        PropertyType::Vector2 => quote!(::shadefx::gfx::effects::PropertyType::Vector2),
        PropertyType::Vector3 => quote!(::shadefx::gfx::effects::PropertyType::Vector3),
        PropertyType::Vector4 => quote!(::shadefx::gfx::effects::PropertyType::Vector4),
    }
}

/// Builds a `PropertyDefault` expression of the right shape for `ty`.
fn property_default_tokens(ty: PropertyType, value: f64) -> TokenStream2 {
    let v = value as f32;
    match ty {
        PropertyType::Float => quote!(::shadefx::gfx::effects::PropertyDefault::Float(#v)),
        PropertyType::Int => {
            let v = value as i32;
            quote!(::shadefx::gfx::effects::PropertyDefault::Int(#v))
        }
        PropertyType::UInt => {
            let v = value as u32;
            quote!(::shadefx::gfx::effects::PropertyDefault::UInt(#v))
        }
        PropertyType::Vector2 => quote!(::shadefx::gfx::effects::PropertyDefault::Vector2([#v; 2])),
        PropertyType::Vector3 => quote!(::shadefx::gfx::effects::PropertyDefault::Vector3([#v; 3])),
        PropertyType::Vector4 => quote!(::shadefx::gfx::effects::PropertyDefault::Vector4([#v; 4])),
    }
}

/// Generate the PixelEffect trait implementation
fn generate_trait_impl(name: &Ident, attrs: &EffectAttrs, properties: &[PropertyInfo]) -> syn::Result<TokenStream2> {
    let id = EffectId::parse(&attrs.id.value())
        .map_err(|e| syn::Error::new_spanned(&attrs.id, format!("Invalid effect id: {e}")))?;
    let id_lit = syn::LitInt::new(&format!("0x{:032X}", id.as_u128()), attrs.id.span());

    let effect_name = &attrs.name;
    let effect_author = &attrs.author;
    let effect_category = &attrs.category;
    let effect_description = &attrs.description;
    let kernel = &attrs.kernel;

    let property_metadata = properties.iter().map(|p| {
        let prop_name = &p.prop_name;
        let property_type = property_type_tokens(p.property_type);
        let offset = p.offset;
        let default_expr = property_default_tokens(p.property_type, p.default);

        let min_expr = match p.min {
            Some(min) => {
                let min = property_default_tokens(p.property_type, min);
                quote!(Some(#min))
            }
            None => quote!(None),
        };
        let max_expr = match p.max {
            Some(max) => {
                let max = property_default_tokens(p.property_type, max);
                quote!(Some(#max))
            }
            None => quote!(None),
        };

        quote! {
            ::shadefx::gfx::effects::PropertyMetadata {
                name: #prop_name,
                display_name: #prop_name,
                property_type: #property_type,
                offset: #offset,
                default: #default_expr,
                min: #min_expr,
                max: #max_expr,
            }
        }
    });

    let property_values = properties.iter().enumerate().map(|(i, p)| {
        let field_name = &p.field_name;
        let idx = i as u32;

        match p.property_type {
            PropertyType::Float => quote! {
                ::shadefx::gfx::effects::EffectProperty::Float { index: #idx, value: self.#field_name }
            },
            PropertyType::Int => quote! {
                ::shadefx::gfx::effects::EffectProperty::Int { index: #idx, value: self.#field_name }
            },
            PropertyType::UInt => quote! {
                ::shadefx::gfx::effects::EffectProperty::UInt { index: #idx, value: self.#field_name }
            },
            PropertyType::Vector2 => quote! {
                ::shadefx::gfx::effects::EffectProperty::Float2 { index: #idx, value: self.#field_name }
            },
            PropertyType::Vector3 => quote! {
                ::shadefx::gfx::effects::EffectProperty::Float3 { index: #idx, value: self.#field_name }
            },
            PropertyType::Vector4 => quote! {
                ::shadefx::gfx::effects::EffectProperty::Float4 { index: #idx, value: self.#field_name }
            },
        }
    });

    let input_padding_impl = match &attrs.input_padding {
        Some(expr) => quote! {
            fn input_padding(&self) -> f32 {
                #expr
            }
        },
        None => quote! {},
    };

    Ok(quote! {
        impl ::shadefx::gfx::effects::PixelEffect for #name {
            const ID: ::shadefx::EffectId = ::shadefx::EffectId::from_u128(#id_lit);

            fn metadata() -> ::shadefx::gfx::effects::EffectMetadata {
                const PROPERTIES: &[::shadefx::gfx::effects::PropertyMetadata] = &[
                    #(#property_metadata),*
                ];

                ::shadefx::gfx::effects::EffectMetadata {
                    name: #effect_name,
                    author: #effect_author,
                    category: #effect_category,
                    description: #effect_description,
                    properties: PROPERTIES,
                }
            }

            fn properties(&self) -> ::std::vec::Vec<::shadefx::gfx::effects::EffectProperty> {
                ::std::vec![ #(#property_values),* ]
            }

            fn evaluate(
                &self,
                invocation: &::shadefx::gfx::effects::PixelInvocation,
                input: &dyn ::shadefx::gfx::effects::Texture,
            ) -> ::shadefx::gfx::Color {
                #kernel(self, invocation, input)
            }

            #input_padding_impl
        }
    })
}

fn expand(attrs: EffectAttrs, input: ItemStruct) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    let fields = match &input.fields {
        Fields::Named(fields) => fields,
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "pixel_effect requires a struct with named fields",
            ));
        }
    };

    // Offsets follow declaration order; the runtime checks them against the
    // real struct size when the effect is registered.
    let mut properties = Vec::with_capacity(fields.named.len());
    let mut offset = 0usize;
    for field in &fields.named {
        let info = PropertyInfo::from_field(field, offset)?;
        offset += info.property_type.size_bytes();
        properties.push(info);
    }

    // Filter out #[property] attributes from the struct definition
    let mut clean_input = input.clone();
    if let Fields::Named(ref mut fields) = clean_input.fields {
        for field in fields.named.iter_mut() {
            field.attrs.retain(|attr| !attr.path().is_ident("property"));
        }
    }

    let trait_impl = generate_trait_impl(name, &attrs, &properties)?;

    Ok(quote! {
        #clean_input

        #trait_impl
    })
}

/// Attribute macro turning a parameter struct into a pixel effect.
///
/// The struct must be `#[repr(C)]` and derive `bytemuck::Pod`; its fields
/// become the effect's parameter block in declaration order.
///
/// # Example
///
/// ```ignore
/// #[pixel_effect(
///     id = "A1B2C3D4-E5F6-7890-ABCD-EF1234567890",
///     name = "Grayscale",
///     author = "shadefx",
///     category = "Color",
///     description = "Converts image to grayscale",
///     kernel = "grayscale",
/// )]
/// #[repr(C)]
/// #[derive(Debug, Clone, Copy, Pod, Zeroable)]
/// pub struct GrayscaleEffect {
///     #[property(min = 0.0, max = 1.0, default = 1.0)]
///     pub intensity: f32,
/// }
/// ```
#[proc_macro_attribute]
pub fn pixel_effect(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attrs = parse_macro_input!(attr as EffectAttrs);
    let input = parse_macro_input!(item as ItemStruct);

    match expand(attrs, input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}
