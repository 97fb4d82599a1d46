use crate::{EntityDef, FieldDef, FieldRole, FieldValue, Record, Registry, Result};

pub struct FieldEntry<'a> {
    pub field: &'a FieldDef,
    pub value: FieldValue<'a>,
    pub role: FieldRole,
}

/// Fields of one record in declaration order, with their current value and role.
pub struct EntityDescriptor<'a> {
    pub definition: &'a EntityDef,
    pub entries: Vec<FieldEntry<'a>>,
}

impl<'a> EntityDescriptor<'a> {
    /// Entries written by an insert, the database assigns the primary key.
    pub fn insertable(&self) -> impl Iterator<Item = &FieldEntry<'a>> {
        self.entries.iter().filter(|e| !e.field.primary_key)
    }

    pub fn primary_key(&self) -> Option<&FieldEntry<'a>> {
        self.entries.iter().find(|e| e.field.primary_key)
    }
}

/// Introspect `record`, its entity must be registered.
pub fn describe<'a>(record: &'a dyn Record, registry: &Registry) -> Result<EntityDescriptor<'a>> {
    let definition = record.definition();
    registry.get(definition.table_name())?;
    let entries = definition
        .fields
        .iter()
        .map(|field| {
            Ok(FieldEntry {
                field,
                value: record.get(&field.name)?,
                role: registry.resolve_role(definition, field)?,
            })
        })
        .collect::<Result<_>>()?;
    Ok(EntityDescriptor {
        definition,
        entries,
    })
}
