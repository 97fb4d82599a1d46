use crate::{
    Condition, Delete, EntityDef, Error, ErrorKind, FieldRole, FieldValue, Insert, InsertPlan,
    Join, Lookup, Operand, Projection, Record, Registry, Result, Select, SelectColumn, TableRef,
    Value, alias_of, describe,
};
use std::{borrow::Cow, collections::HashMap};

/// Builds statement trees from entity definitions and records.
///
/// The planner never touches the database, rendering the statements is up to
/// a [`SqlWriter`](crate::SqlWriter).
pub struct Planner<'r> {
    registry: &'r Registry,
    schema: String,
}

impl<'r> Planner<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            schema: String::new(),
        }
    }

    /// Schema used for tables that do not declare one.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn registry(&self) -> &Registry {
        self.registry
    }

    pub fn table_of(&self, def: &EntityDef) -> TableRef {
        def.table.or_schema(&self.schema)
    }

    /// Insert `record` and every record nested in its foreign keys.
    ///
    /// Nested records are planned depth first, before the record referencing
    /// them. The referencing insert resolves the foreign key with a lookup on
    /// the nested record fields, so the nested row does not need a known key.
    pub fn plan_insert(&self, record: &dyn Record) -> Result<InsertPlan> {
        let mut plan = InsertPlan::default();
        self.visit_insert(record, &mut plan)?;
        Ok(plan)
    }

    fn visit_insert(&self, record: &dyn Record, plan: &mut InsertPlan) -> Result<()> {
        let descriptor = describe(record, self.registry)?;
        let mut insert = Insert {
            table: self.table_of(descriptor.definition),
            ignore: true,
            values: Vec::with_capacity(descriptor.entries.len()),
        };
        for entry in descriptor.insertable() {
            let value = match (&entry.role, &entry.value) {
                (FieldRole::ForeignKey(..), FieldValue::Record(nested)) => {
                    self.visit_insert(*nested, plan)?;
                    Operand::Lookup(Box::new(self.lookup(*nested)?))
                }
                (FieldRole::Scalar, FieldValue::Record(..)) => {
                    return Err(Error::msg(format!(
                        "Field `{}` of entity `{}` holds a record but it is not a relation",
                        entry.field.name, descriptor.definition.name
                    )));
                }
                (_, FieldValue::Value(v)) => Operand::Value(v.clone()),
            };
            insert.values.push((entry.field.name.clone(), value));
        }
        plan.statements.push(insert);
        Ok(())
    }

    /// Lookup selecting the primary key of the row matching every non empty field of `record`.
    pub fn lookup(&self, record: &dyn Record) -> Result<Lookup> {
        let descriptor = describe(record, self.registry)?;
        let definition = descriptor.definition;
        let table = self.table_of(definition);
        let pk = definition.require_primary_key()?;
        let mut filter = Vec::new();
        for entry in descriptor.insertable() {
            let value = match &entry.value {
                FieldValue::Value(v) if v.is_empty() => continue,
                FieldValue::Value(v) => Operand::Value(v.clone()),
                FieldValue::Record(nested) => Operand::Lookup(Box::new(self.lookup(*nested)?)),
            };
            filter.push(Condition {
                column: table.column(entry.field.name.clone()),
                value,
            });
        }
        if filter.is_empty() {
            return Err(Error::msg(format!(
                "Cannot look up a row of `{}`, every field of the record is empty",
                definition.name
            )));
        }
        Ok(Lookup {
            column: table.column(pk.name.clone()),
            table,
            filter,
        })
    }

    /// Columns of `def`, foreign keys replaced by the columns of their target.
    ///
    /// When `aliased` every column is labeled `<table>_<column>`. A table reached a
    /// second time is aliased `<table>_2` and its columns labeled after the alias.
    pub fn select_columns(&self, def: &EntityDef, aliased: bool) -> Result<Vec<SelectColumn>> {
        let mut columns = Vec::new();
        self.collect(
            def,
            aliased,
            &mut JoinWalk::default(),
            &mut columns,
            &mut Vec::new(),
        )?;
        Ok(columns)
    }

    /// One inner join per foreign key, following the relations of the joined tables too.
    pub fn inner_joins(&self, def: &EntityDef) -> Result<Vec<Join>> {
        let mut joins = Vec::new();
        self.collect(
            def,
            false,
            &mut JoinWalk::default(),
            &mut Vec::new(),
            &mut joins,
        )?;
        Ok(joins)
    }

    /// Aliased columns and joins of `def` in one walk.
    fn joined(&self, def: &EntityDef) -> Result<(Vec<SelectColumn>, Vec<Join>)> {
        let mut columns = Vec::new();
        let mut joins = Vec::new();
        self.collect(
            def,
            true,
            &mut JoinWalk::default(),
            &mut columns,
            &mut joins,
        )?;
        Ok((columns, joins))
    }

    fn collect(
        &self,
        def: &EntityDef,
        aliased: bool,
        walk: &mut JoinWalk,
        columns: &mut Vec<SelectColumn>,
        joins: &mut Vec<Join>,
    ) -> Result<TableRef> {
        let name = walk.enter(def)?;
        let mut table = self.table_of(def);
        if name != def.table_name() {
            table.alias = Cow::Owned(name.clone());
        }
        for field in &def.fields {
            match self.registry.resolve_role(def, field)? {
                FieldRole::ForeignKey(target) => {
                    let pk = target.require_primary_key()?;
                    let position = joins.len();
                    let target_table = self.collect(&target, aliased, walk, columns, joins)?;
                    joins.insert(
                        position,
                        Join {
                            lhs: target_table.column(pk.name.clone()),
                            rhs: table.column(field.name.clone()),
                            table: target_table,
                        },
                    );
                }
                FieldRole::Scalar => columns.push(SelectColumn {
                    column: table.column(field.name.clone()),
                    alias: aliased.then(|| alias_of(&name, &field.name)),
                }),
            }
        }
        walk.leave();
        Ok(table)
    }

    /// Aliased select of the row with primary key `id`, joined with every referenced row.
    pub fn select_by_id(&self, def: &EntityDef, id: Value) -> Result<Select> {
        let pk = def.require_primary_key()?;
        let table = self.table_of(def);
        let (columns, joins) = self.joined(def)?;
        Ok(Select {
            projection: Projection::Columns(columns),
            joins,
            filter: vec![Condition::new(table.column(pk.name.clone()), id)],
            from: table,
            limit: Some(1),
        })
    }

    /// Rows of `def` whose `column` equals `value`.
    ///
    /// A `simple` select reads the table alone with `SELECT *`, foreign keys
    /// stay keys. Otherwise the select is aliased and joined like [`Planner::select_by_id`].
    pub fn select_by_property(
        &self,
        def: &EntityDef,
        column: &str,
        value: Value,
        simple: bool,
    ) -> Result<Select> {
        let Some(field) = def.field(column) else {
            return Err(def.unknown_field(column));
        };
        let table = self.table_of(def);
        let filter = vec![Condition::new(table.column(field.name.clone()), value)];
        Ok(if simple {
            Select {
                projection: Projection::Asterisk,
                from: table,
                joins: Vec::new(),
                filter,
                limit: None,
            }
        } else {
            let (columns, joins) = self.joined(def)?;
            Select {
                projection: Projection::Columns(columns),
                joins,
                from: table,
                filter,
                limit: None,
            }
        })
    }

    pub fn select_all(&self, def: &EntityDef) -> Select {
        Select {
            projection: Projection::Asterisk,
            from: self.table_of(def),
            joins: Vec::new(),
            filter: Vec::new(),
            limit: None,
        }
    }

    pub fn delete_by_id(&self, def: &EntityDef, id: Value) -> Result<Delete> {
        let pk = def.require_primary_key()?;
        let table = self.table_of(def);
        Ok(Delete {
            filter: vec![Condition::new(table.column(pk.name.clone()), id)],
            table,
        })
    }
}

/// Walk over the tables of a joined select, shared by the planner and the
/// materializer so that both name every table occurrence the same way.
///
/// The first occurrence of a table is named after it, the following ones
/// `<table>_2`, `<table>_3` and so on, in depth first field order. A table
/// reached again while still inside it is a cycle.
#[derive(Default, Debug)]
pub(crate) struct JoinWalk {
    path: Vec<String>,
    seen: HashMap<String, usize>,
}

impl JoinWalk {
    pub(crate) fn enter(&mut self, def: &EntityDef) -> Result<String> {
        let table = def.table_name();
        if self.path.iter().any(|v| v == table) {
            let mut cycle = self.path.join(" -> ");
            cycle.push_str(" -> ");
            cycle.push_str(table);
            return Err(Error::new(ErrorKind::CyclicRelation(cycle)));
        }
        self.path.push(table.to_owned());
        let count = self.seen.entry(table.to_owned()).or_default();
        *count += 1;
        Ok(if *count == 1 {
            table.to_owned()
        } else {
            format!("{}_{}", table, count)
        })
    }

    pub(crate) fn leave(&mut self) {
        self.path.pop();
    }
}
