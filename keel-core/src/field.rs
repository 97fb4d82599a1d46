use crate::{EntityDef, Value};
use std::borrow::Cow;

/// How a field relates to other entities.
#[derive(Default, Debug, Clone)]
pub enum Relation {
    /// The naming convention decides.
    #[default]
    Inferred,
    /// Never a foreign key, whatever its name.
    Scalar,
    /// Foreign key to a statically defined entity.
    References(fn() -> &'static EntityDef),
    /// Foreign key to the entity registered under this table name.
    ReferencesTable(Cow<'static, str>),
}

/// Static description of one entity field.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: Cow<'static, str>,
    /// `NULL` value of the field type.
    pub value: Value,
    pub nullable: bool,
    pub primary_key: bool,
    pub relation: Relation,
}

impl FieldDef {
    pub fn new(name: impl Into<Cow<'static, str>>, value: Value) -> Self {
        Self {
            name: name.into(),
            value: value.as_null(),
            nullable: false,
            primary_key: false,
            relation: Relation::Inferred,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn scalar(mut self) -> Self {
        self.relation = Relation::Scalar;
        self
    }

    pub fn references(mut self, target: fn() -> &'static EntityDef) -> Self {
        self.relation = Relation::References(target);
        self
    }

    pub fn references_table(mut self, table: impl Into<Cow<'static, str>>) -> Self {
        self.relation = Relation::ReferencesTable(table.into());
        self
    }
}
