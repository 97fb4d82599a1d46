use quote::ToTokens;
use syn::{
    Field, GenericArgument, Ident, LitStr, PathArguments, Type, TypePath, parse::ParseBuffer,
};

pub(crate) struct FieldMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    /// Column name.
    pub(crate) name: String,
    pub(crate) primary_key: bool,
    pub(crate) nullable: bool,
    pub(crate) scalar: bool,
    /// Table named by `#[keel(references = "..")]`.
    pub(crate) references: Option<String>,
    /// Entity type of a `Reference<T>` field.
    pub(crate) reference: Option<Type>,
}

/// Generic argument of `ty` when its last path segment is `wrapper`.
fn unwrap_generic<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(TypePath { qself: None, path }) = ty else {
        return None;
    };
    let segment = path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|v| match v {
        GenericArgument::Type(t) => Some(t),
        _ => None,
    })
}

pub fn decode_field(field: &Field) -> FieldMetadata {
    let ident = field
        .ident
        .clone()
        .expect("Entity fields are expected to have a name");
    let mut name = ident.to_string();
    if name.starts_with("r#") {
        name.drain(..2);
    }
    let reference = unwrap_generic(&field.ty, "Reference").cloned();
    let mut metadata = FieldMetadata {
        ident,
        ty: field.ty.clone(),
        name,
        primary_key: false,
        nullable: reference.is_some() || unwrap_generic(&field.ty, "Option").is_some(),
        scalar: false,
        references: None,
        reference,
    };
    for attr in &field.attrs {
        let meta = &attr.meta;
        if meta.path().is_ident("keel") {
            let Ok(list) = meta.require_list() else {
                panic!(
                    "Error while parsing `keel`, use it like: `#[keel(attribute = value, ...)]`",
                );
            };
            let _ = list.parse_nested_meta(|arg| {
                if arg.path.is_ident("name") {
                    let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                        panic!("Error while parsing `name`, use it like: `#[keel(name = \"my_column\")]`");
                    };
                    metadata.name = v.value();
                } else if arg.path.is_ident("primary_key") {
                    let Err(..) = arg.value() else {
                        // value() is Err for Meta::Path
                        panic!(
                            "Error while parsing `primary_key`, use it like: `#[keel(primary_key)]`"
                        );
                    };
                    metadata.primary_key = true;
                } else if arg.path.is_ident("scalar") {
                    let Err(..) = arg.value() else {
                        panic!("Error while parsing `scalar`, use it like: `#[keel(scalar)]`");
                    };
                    metadata.scalar = true;
                } else if arg.path.is_ident("references") {
                    let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                        panic!("Error while parsing `references`, use it like: `#[keel(references = \"customer\")]`");
                    };
                    metadata.references = Some(v.value());
                } else {
                    panic!(
                        "Unknown attribute `{}` inside keel macro",
                        arg.path.to_token_stream().to_string()
                    );
                }
                Ok(())
            });
        }
    }
    if metadata.scalar && (metadata.references.is_some() || metadata.reference.is_some()) {
        panic!(
            "Field `{}` cannot be `scalar` and reference another entity at the same time",
            metadata.ident
        );
    }
    if metadata.references.is_some() && metadata.reference.is_some() {
        panic!(
            "Field `{}` is a `Reference<T>` already, remove `references`",
            metadata.ident
        );
    }
    metadata
}
