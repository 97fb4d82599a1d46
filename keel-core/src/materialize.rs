use crate::{
    Entity, EntityDef, Error, ErrorKind, FieldRole, Record, Registry, Result, RowLabeled, alias_of,
    downcast, planner::JoinWalk,
};
use std::sync::Arc;

/// Layout of the rows being materialized.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Aliased columns of a joined select, `<table>_<column>`, nested records are rebuilt.
    #[default]
    Joined,
    /// Columns named after the fields of a single table, foreign keys stay keys.
    Shallow,
}

#[derive(Debug, Clone, Copy)]
pub struct MaterializeOptions {
    /// When false the primary key of every record is left untouched.
    pub assign_primary_key: bool,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self {
            assign_primary_key: true,
        }
    }
}

/// Rebuilds records from result rows.
pub struct Materializer<'r> {
    registry: &'r Registry,
    options: MaterializeOptions,
}

impl<'r> Materializer<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            options: Default::default(),
        }
    }

    pub fn with_options(mut self, options: MaterializeOptions) -> Self {
        self.options = options;
        self
    }

    /// Record built from the first row, an empty row set is an error.
    pub fn materialize(
        &self,
        def: &Arc<EntityDef>,
        shape: Shape,
        rows: &[RowLabeled],
    ) -> Result<Box<dyn Record>> {
        let Some(row) = rows.first() else {
            return Err(Error::new(ErrorKind::EmptyResult {
                table: def.table_name().to_owned(),
            }));
        };
        self.materialize_row(def, shape, row)
    }

    pub fn materialize_all(
        &self,
        def: &Arc<EntityDef>,
        shape: Shape,
        rows: &[RowLabeled],
    ) -> Result<Vec<Box<dyn Record>>> {
        rows.iter()
            .map(|row| self.materialize_row(def, shape, row))
            .collect()
    }

    pub fn materialize_entity<E: Entity>(&self, shape: Shape, rows: &[RowLabeled]) -> Result<E> {
        let def = self.registry.get(E::entity_def().table_name())?;
        downcast(self.materialize(&def, shape, rows)?)
    }

    pub fn materialize_row(
        &self,
        def: &Arc<EntityDef>,
        shape: Shape,
        row: &RowLabeled,
    ) -> Result<Box<dyn Record>> {
        let mut record = def.instantiate();
        match shape {
            Shape::Joined => {
                self.fill_joined(def, row, record.as_mut(), &mut JoinWalk::default())?
            }
            Shape::Shallow => self.fill_shallow(def, row, record.as_mut())?,
        }
        Ok(record)
    }

    fn fill_joined(
        &self,
        def: &Arc<EntityDef>,
        row: &RowLabeled,
        record: &mut dyn Record,
        walk: &mut JoinWalk,
    ) -> Result<()> {
        let name = walk.enter(def)?;
        for field in &def.fields {
            if field.primary_key && !self.options.assign_primary_key {
                continue;
            }
            match self.registry.resolve_role(def, field)? {
                FieldRole::ForeignKey(target) => {
                    let mut nested = target.instantiate();
                    self.fill_joined(&target, row, nested.as_mut(), walk)?;
                    record.set_related(&field.name, nested)?;
                }
                FieldRole::Scalar => {
                    let alias = alias_of(&name, &field.name);
                    let Some(value) = row.get_column(&alias) else {
                        return Err(missing_column(def, &alias));
                    };
                    record.set(&field.name, value.clone())?;
                }
            }
        }
        walk.leave();
        Ok(())
    }

    fn fill_shallow(
        &self,
        def: &EntityDef,
        row: &RowLabeled,
        record: &mut dyn Record,
    ) -> Result<()> {
        for field in &def.fields {
            if field.primary_key && !self.options.assign_primary_key {
                continue;
            }
            let Some(value) = row.get_column(&field.name) else {
                return Err(missing_column(def, &field.name));
            };
            record.set(&field.name, value.clone())?;
        }
        Ok(())
    }
}

fn missing_column(def: &EntityDef, column: &str) -> Error {
    Error::msg(format!(
        "Column `{}` of entity `{}` is missing from the result row",
        column, def.name
    ))
}
