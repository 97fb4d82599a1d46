use crate::{Entity, Error, FieldValue, Record, Result, Value, primary_key_value};
use std::any;

/// Foreign key field holding either the referenced key or the referenced entity.
///
/// Inserting a record whose reference holds an entity inserts the entity first
/// and resolves the key with a lookup on its fields. Joined selects fill the
/// entity, plain selects only the key.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Reference<T: Entity> {
    #[default]
    Null,
    Key(Value),
    Entity(Box<T>),
}

impl<T: Entity> Reference<T> {
    pub fn key(value: impl Into<Value>) -> Self {
        let value = value.into();
        if value.is_null() {
            Reference::Null
        } else {
            Reference::Key(value)
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Reference::Null)
    }

    pub fn entity(&self) -> Option<&T> {
        match self {
            Reference::Entity(v) => Some(v),
            _ => None,
        }
    }

    pub fn entity_mut(&mut self) -> Option<&mut T> {
        match self {
            Reference::Entity(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_entity(self) -> Option<T> {
        match self {
            Reference::Entity(v) => Some(*v),
            _ => None,
        }
    }

    /// Referenced key, read from the entity when one is held.
    pub fn key_value(&self) -> Result<Value> {
        match self {
            Reference::Null => Ok(Value::Null),
            Reference::Key(v) => Ok(v.clone()),
            Reference::Entity(v) => primary_key_value(v.as_ref()),
        }
    }

    pub fn field_value(&self) -> FieldValue<'_> {
        match self {
            Reference::Null => FieldValue::Value(Value::Null),
            Reference::Key(v) => FieldValue::Value(v.clone()),
            Reference::Entity(v) => FieldValue::Record(v.as_ref()),
        }
    }

    pub fn set_value(&mut self, value: Value) {
        *self = Reference::key(value);
    }

    pub fn set_record(&mut self, record: Box<dyn Record>) -> Result<()> {
        let name = record.definition().name.to_string();
        let entity = record.into_any().downcast::<T>().map_err(|_| {
            Error::msg(format!(
                "Cannot assign a record of entity `{}` to a reference of {}",
                name,
                any::type_name::<T>()
            ))
        })?;
        *self = Reference::Entity(entity);
        Ok(())
    }
}

impl<T: Entity> From<T> for Reference<T> {
    fn from(value: T) -> Self {
        Reference::Entity(Box::new(value))
    }
}
