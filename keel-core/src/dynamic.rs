use crate::{EntityDef, FieldValue, Record, Result, Value};
use std::{any::Any, sync::Arc};

#[derive(Debug)]
enum Slot {
    Value(Value),
    Record(Box<dyn Record>),
}

/// Record over a definition assembled at runtime.
///
/// Fields without an explicit relation are classified by the registry convention,
/// a field like `customer_id` can hold either a key or a nested record.
#[derive(Debug)]
pub struct DynamicRecord {
    definition: Arc<EntityDef>,
    slots: Vec<Slot>,
}

impl DynamicRecord {
    pub fn new(definition: Arc<EntityDef>) -> Self {
        let slots = definition
            .fields
            .iter()
            .map(|f| Slot::Value(f.value.as_null()))
            .collect();
        Self { definition, slots }
    }

    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Result<Self> {
        self.set(field, value.into())?;
        Ok(self)
    }

    pub fn with_related(mut self, field: &str, record: impl Record) -> Result<Self> {
        self.set_related(field, Box::new(record))?;
        Ok(self)
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        match self.slots.get(self.definition.field_index(field)?)? {
            Slot::Value(v) => Some(v),
            Slot::Record(..) => None,
        }
    }

    pub fn related(&self, field: &str) -> Option<&dyn Record> {
        match self.slots.get(self.definition.field_index(field)?)? {
            Slot::Record(v) => Some(v.as_ref()),
            Slot::Value(..) => None,
        }
    }

    fn slot_mut(&mut self, field: &str) -> Result<&mut Slot> {
        let Some(index) = self.definition.field_index(field) else {
            return Err(self.definition.unknown_field(field));
        };
        Ok(&mut self.slots[index])
    }
}

impl Record for DynamicRecord {
    fn definition(&self) -> &EntityDef {
        &self.definition
    }

    fn get(&self, field: &str) -> Result<FieldValue<'_>> {
        let Some(index) = self.definition.field_index(field) else {
            return Err(self.definition.unknown_field(field));
        };
        Ok(match &self.slots[index] {
            Slot::Value(v) => FieldValue::Value(v.clone()),
            Slot::Record(v) => FieldValue::Record(v.as_ref()),
        })
    }

    fn set(&mut self, field: &str, value: Value) -> Result<()> {
        *self.slot_mut(field)? = Slot::Value(value);
        Ok(())
    }

    fn set_related(&mut self, field: &str, record: Box<dyn Record>) -> Result<()> {
        *self.slot_mut(field)? = Slot::Record(record);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
