use crate::{DynamicRecord, Error, ErrorKind, FieldDef, Result, TableRef, Value};
use std::{
    any::{self, Any},
    borrow::Cow,
    fmt::Debug,
    sync::Arc,
};

/// Creates fresh instances of an entity while materializing rows.
#[derive(Debug, Clone, Copy)]
pub enum Factory {
    /// Default value of a concrete type.
    Typed(fn() -> Box<dyn Record>),
    /// A [`DynamicRecord`] over the definition itself.
    Dynamic,
}

/// Field descriptor table of an entity.
///
/// Generated by `#[derive(Entity)]` for concrete types, or assembled at runtime
/// with [`EntityDef::builder`] for dynamic ones.
#[derive(Debug, Clone)]
pub struct EntityDef {
    /// Class name.
    pub name: Cow<'static, str>,
    pub table: TableRef,
    /// Fields in declaration order.
    pub fields: Vec<FieldDef>,
    pub factory: Factory,
}

impl EntityDef {
    pub fn builder(name: impl Into<Cow<'static, str>>) -> EntityDefBuilder {
        let name = name.into();
        EntityDefBuilder {
            def: EntityDef {
                table: TableRef {
                    name: Cow::Owned(name.to_lowercase()),
                    ..Default::default()
                },
                name,
                fields: Vec::new(),
                factory: Factory::Dynamic,
            },
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table.name
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn primary_key(&self) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.primary_key)
    }

    pub(crate) fn require_primary_key(&self) -> Result<&FieldDef> {
        self.primary_key().ok_or_else(|| {
            Error::msg(format!(
                "Entity `{}` does not declare a primary key",
                self.name
            ))
        })
    }

    /// `UnknownField` error for `field` of this entity.
    pub fn unknown_field(&self, field: &str) -> Error {
        Error::new(ErrorKind::UnknownField {
            entity: self.name.to_string(),
            field: field.to_owned(),
        })
    }

    pub fn instantiate(self: &Arc<Self>) -> Box<dyn Record> {
        match self.factory {
            Factory::Typed(create) => create(),
            Factory::Dynamic => Box::new(DynamicRecord::new(self.clone())),
        }
    }
}

pub struct EntityDefBuilder {
    def: EntityDef,
}

impl EntityDefBuilder {
    pub fn table(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.def.table.name = name.into();
        self
    }

    pub fn schema(mut self, schema: impl Into<Cow<'static, str>>) -> Self {
        self.def.table.schema = schema.into();
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.def.fields.push(field);
        self
    }

    /// Finish the definition, the field named `id` becomes the primary key unless one was declared.
    pub fn build(mut self) -> Arc<EntityDef> {
        if self.def.primary_key().is_none() {
            if let Some(id) = self.def.fields.iter_mut().find(|f| f.name == "id") {
                id.primary_key = true;
            }
        }
        Arc::new(self.def)
    }
}

/// Value of a field read through [`Record::get`].
#[derive(Debug)]
pub enum FieldValue<'a> {
    Value(Value),
    /// A nested record held by a relation field.
    Record(&'a dyn Record),
}

/// Object safe access to an entity instance by field name.
pub trait Record: Send + Sync + Debug + Any {
    fn definition(&self) -> &EntityDef;
    fn get(&self, field: &str) -> Result<FieldValue<'_>>;
    fn set(&mut self, field: &str, value: Value) -> Result<()>;
    /// Assign a related record materialized from the same row.
    ///
    /// Fields that cannot hold a record keep its primary key instead.
    fn set_related(&mut self, field: &str, record: Box<dyn Record>) -> Result<()>;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Statically defined entity, implemented by `#[derive(Entity)]`.
pub trait Entity: Record + Default + Sized {
    fn entity_def() -> &'static EntityDef;
}

/// Current value of the primary key of `record`.
pub fn primary_key_value(record: &dyn Record) -> Result<Value> {
    let definition = record.definition();
    let pk = definition.require_primary_key()?;
    match record.get(&pk.name)? {
        FieldValue::Value(v) => Ok(v),
        FieldValue::Record(nested) => primary_key_value(nested),
    }
}

/// Convert a materialized record back into its concrete type.
pub fn downcast<E: Entity>(record: Box<dyn Record>) -> Result<E> {
    let name = record.definition().name.to_string();
    record.into_any().downcast::<E>().map(|v| *v).map_err(|_| {
        Error::msg(format!(
            "Record of entity `{}` is not a {}",
            name,
            any::type_name::<E>()
        ))
    })
}
