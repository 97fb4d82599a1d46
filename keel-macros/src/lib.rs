mod decode_field;
mod decode_table;

use decode_table::decode_table;
use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemStruct, parse_macro_input};

/// Implements `Record` and `Entity`, the field descriptor table comes from the struct fields.
///
/// The table is the lower case struct name unless `#[keel(name = "..")]` says otherwise.
/// The primary key is the field marked `#[keel(primary_key)]`, or the field `id`.
/// `Reference<T>` fields are foreign keys to `T`, `#[keel(references = "table")]`
/// and `#[keel(scalar)]` override the naming convention for the other fields.
#[proc_macro_derive(Entity, attributes(keel))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    let ident = &item.ident;
    let mut table = decode_table(&item);
    let declared = table.fields.iter().filter(|f| f.primary_key).count();
    if declared > 1 {
        panic!(
            "Entity `{}` declares more than one primary key, composite keys are not supported",
            ident
        );
    }
    if declared == 0 {
        if let Some(id) = table.fields.iter_mut().find(|f| f.name == "id") {
            id.primary_key = true;
        }
    }
    let class = &table.class;
    let name = &table.name;
    let schema = &table.schema;
    let field_defs = table.fields.iter().map(|f| {
        let column = &f.name;
        let ty = &f.ty;
        let value = if f.reference.is_some() {
            quote!(::keel::Value::Null)
        } else {
            quote!(<#ty as ::keel::AsValue>::as_empty_value())
        };
        let mut def = quote!(::keel::FieldDef::new(#column, #value));
        if f.primary_key {
            def = quote!(#def.primary_key());
        }
        if f.nullable {
            def = quote!(#def.nullable());
        }
        if f.scalar {
            def = quote!(#def.scalar());
        }
        if let Some(target) = &f.references {
            def = quote!(#def.references_table(#target));
        }
        if let Some(target) = &f.reference {
            def = quote!(#def.references(<#target as ::keel::Entity>::entity_def));
        }
        def
    });
    let get_arms = table.fields.iter().map(|f| {
        let column = &f.name;
        let field = &f.ident;
        if f.reference.is_some() {
            quote!(#column => Ok(self.#field.field_value()))
        } else {
            quote!(#column => Ok(::keel::FieldValue::Value(::keel::AsValue::as_value(
                ::std::clone::Clone::clone(&self.#field)
            ))))
        }
    });
    let set_arms = table.fields.iter().map(|f| {
        let column = &f.name;
        let field = &f.ident;
        let ty = &f.ty;
        if f.reference.is_some() {
            quote!(#column => self.#field.set_value(value))
        } else {
            quote!(#column => self.#field = <#ty as ::keel::AsValue>::try_from_value(value)?)
        }
    });
    let set_related_arms = table
        .fields
        .iter()
        .filter(|f| f.reference.is_some())
        .map(|f| {
            let column = &f.name;
            let field = &f.ident;
            quote!(#column => self.#field.set_record(record))
        });
    quote! {
        impl ::keel::Record for #ident {
            fn definition(&self) -> &::keel::EntityDef {
                <Self as ::keel::Entity>::entity_def()
            }

            fn get(&self, field: &str) -> ::keel::Result<::keel::FieldValue<'_>> {
                match field {
                    #(#get_arms,)*
                    _ => Err(<Self as ::keel::Entity>::entity_def().unknown_field(field)),
                }
            }

            fn set(&mut self, field: &str, value: ::keel::Value) -> ::keel::Result<()> {
                match field {
                    #(#set_arms,)*
                    _ => return Err(<Self as ::keel::Entity>::entity_def().unknown_field(field)),
                }
                Ok(())
            }

            fn set_related(
                &mut self,
                field: &str,
                record: ::std::boxed::Box<dyn ::keel::Record>,
            ) -> ::keel::Result<()> {
                match field {
                    #(#set_related_arms,)*
                    _ => {
                        let key = ::keel::primary_key_value(record.as_ref())?;
                        ::keel::Record::set(self, field, key)
                    }
                }
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> {
                self
            }
        }

        impl ::keel::Entity for #ident {
            fn entity_def() -> &'static ::keel::EntityDef {
                static DEFINITION: ::std::sync::LazyLock<::keel::EntityDef> =
                    ::std::sync::LazyLock::new(|| ::keel::EntityDef {
                        name: ::std::borrow::Cow::Borrowed(#class),
                        table: ::keel::TableRef::new(#name).with_schema(#schema),
                        fields: vec![#(#field_defs),*],
                        factory: ::keel::Factory::Typed(|| {
                            ::std::boxed::Box::new(<#ident as ::std::default::Default>::default())
                        }),
                    });
                &DEFINITION
            }
        }
    }
    .into()
}
