use crate::{ColumnRef, TableRef, Value};
use std::borrow::Cow;

/// Right hand side of an assignment or comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Value),
    /// Key of a row found through its other fields.
    Lookup(Box<Lookup>),
}

/// `(SELECT <column> FROM <table> WHERE <filter>)`
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    pub column: ColumnRef,
    pub table: TableRef,
    pub filter: Vec<Condition>,
}

/// Equality between a column and an operand, conditions in a list are joined by `AND`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: ColumnRef,
    pub value: Operand,
}

impl Condition {
    pub fn new(column: ColumnRef, value: Value) -> Self {
        Self {
            column,
            value: Operand::Value(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: TableRef,
    /// Skip the row when it collides with an existing one.
    pub ignore: bool,
    pub values: Vec<(Cow<'static, str>, Operand)>,
}

/// Inserts ordered so that every referenced row precedes the rows referencing it.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct InsertPlan {
    pub statements: Vec<Insert>,
}

impl InsertPlan {
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    pub column: ColumnRef,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Asterisk,
    Columns(Vec<SelectColumn>),
}

/// `INNER JOIN <table> ON <lhs> = <rhs>`
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: TableRef,
    pub lhs: ColumnRef,
    pub rhs: ColumnRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub projection: Projection,
    pub from: TableRef,
    pub joins: Vec<Join>,
    pub filter: Vec<Condition>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: TableRef,
    pub filter: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Insert(Insert),
    Select(Select),
    Delete(Delete),
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Self {
        Statement::Insert(value)
    }
}

impl From<Select> for Statement {
    fn from(value: Select) -> Self {
        Statement::Select(value)
    }
}

impl From<Delete> for Statement {
    fn from(value: Delete) -> Self {
        Statement::Delete(value)
    }
}
