use crate::{
    Convention, DefaultConvention, Entity, EntityDef, Error, ErrorKind, FieldDef, Relation, Result,
};
use std::{collections::BTreeMap, sync::Arc};

/// Role of a field inside an entity.
#[derive(Debug, Clone)]
pub enum FieldRole {
    Scalar,
    ForeignKey(Arc<EntityDef>),
}

impl FieldRole {
    pub fn is_foreign_key(&self) -> bool {
        matches!(self, FieldRole::ForeignKey(..))
    }
}

/// Entity definitions known to a session, keyed by table name.
#[derive(Debug, Clone)]
pub struct Registry {
    entities: BTreeMap<String, Arc<EntityDef>>,
    convention: Arc<dyn Convention>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::with_convention(DefaultConvention::default())
    }

    pub fn with_convention(convention: impl Convention + 'static) -> Self {
        Self {
            entities: BTreeMap::new(),
            convention: Arc::new(convention),
        }
    }

    pub fn convention(&self) -> &dyn Convention {
        self.convention.as_ref()
    }

    /// Register `E` and every entity it references through typed relations.
    pub fn register<E: Entity>(&mut self) -> &mut Self {
        self.register_static(E::entity_def());
        self
    }

    fn register_static(&mut self, def: &'static EntityDef) {
        if self.entities.contains_key(def.table_name()) {
            return;
        }
        self.register_def(def.clone());
        for field in &def.fields {
            if let Relation::References(target) = field.relation {
                self.register_static(target());
            }
        }
    }

    /// Register a definition, replacing any previous one with the same table name.
    ///
    /// A definition without a primary key gets the field named after the
    /// convention primary key, when present.
    pub fn register_def(&mut self, def: impl Into<Arc<EntityDef>>) -> &mut Self {
        let mut def = def.into();
        if def.primary_key().is_none() {
            let pk = self.convention.primary_key_name().to_owned();
            if let Some(i) = def.field_index(&pk) {
                Arc::make_mut(&mut def).fields[i].primary_key = true;
            }
        }
        log::debug!("Registering entity `{}` as `{}`", def.name, def.table);
        self.entities.insert(def.table_name().to_owned(), def);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Arc<EntityDef>> {
        self.entities.values()
    }

    fn lookup(&self, name: &str) -> Option<&Arc<EntityDef>> {
        self.entities
            .get(name)
            .or_else(|| self.entities.get(&name.to_lowercase()))
            .or_else(|| self.entities.get(&self.convention.table_name_of(name)))
    }

    /// Definition registered for a table or class name.
    pub fn get(&self, name: &str) -> Result<Arc<EntityDef>> {
        self.lookup(name)
            .cloned()
            .ok_or_else(|| Error::new(ErrorKind::UnknownEntity(name.to_owned())))
    }

    /// Declared relations win, the convention is the fallback.
    pub fn resolve_role(&self, def: &EntityDef, field: &FieldDef) -> Result<FieldRole> {
        if field.primary_key {
            return Ok(FieldRole::Scalar);
        }
        let target = match &field.relation {
            Relation::Scalar => return Ok(FieldRole::Scalar),
            Relation::References(target) => {
                let target = target();
                return Ok(FieldRole::ForeignKey(
                    self.lookup(target.table_name())
                        .cloned()
                        .unwrap_or_else(|| Arc::new(target.clone())),
                ));
            }
            Relation::ReferencesTable(table) => table.to_string(),
            Relation::Inferred => match self.convention.target_table_of(&field.name) {
                Some(target) => target,
                None => return Ok(FieldRole::Scalar),
            },
        };
        self.get(&target).map(FieldRole::ForeignKey).map_err(|e| {
            e.context(format!(
                "While resolving the relation of field `{}` in entity `{}`",
                field.name, def.name
            ))
        })
    }
}
