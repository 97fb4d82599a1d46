use crate::decode_field::{FieldMetadata, decode_field};
use quote::ToTokens;
use syn::{Fields, ItemStruct, LitStr, parse::ParseBuffer};

pub(crate) struct TableMetadata {
    pub(crate) fields: Vec<FieldMetadata>,
    /// Class name.
    pub(crate) class: String,
    pub(crate) name: String,
    pub(crate) schema: String,
}

pub fn decode_table(item: &ItemStruct) -> TableMetadata {
    if !item.generics.params.is_empty() {
        panic!("Entity `{}` cannot be generic", item.ident);
    }
    let Fields::Named(..) = item.fields else {
        panic!("Entity `{}` must be a struct with named fields", item.ident);
    };
    let fields: Vec<_> = item.fields.iter().map(decode_field).collect();
    let class = item.ident.to_string();
    let mut name = class.to_lowercase();
    let mut schema = String::new();
    for attr in &item.attrs {
        let meta = &attr.meta;
        if meta.path().is_ident("keel") {
            let Ok(list) = meta.require_list() else {
                panic!("Error while parsing `keel`, use it like: `#[keel(attribute = value, ..)]`",);
            };
            let _ = list.parse_nested_meta(|arg| {
                if arg.path.is_ident("name") {
                    let Ok(value) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                        panic!(
                            "Error while parsing `name`, use it like: `#[keel(name = \"my_table\")]`"
                        );
                    };
                    name = value.value();
                } else if arg.path.is_ident("schema") {
                    let Ok(value) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                        panic!(
                            "Error while parsing `schema`, use it like: `#[keel(schema = \"my_schema\")]`"
                        );
                    };
                    schema = value.value();
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
    TableMetadata {
        fields,
        class,
        name,
        schema,
    }
}
