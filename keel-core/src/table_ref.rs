use std::{
    borrow::Cow,
    fmt::{self, Display},
};

/// Schema qualified table name.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: Cow<'static, str>,
    pub schema: Cow<'static, str>,
    pub alias: Cow<'static, str>,
}

impl TableRef {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            schema: Cow::Borrowed(""),
            alias: Cow::Borrowed(""),
        }
    }

    pub fn with_schema(mut self, schema: impl Into<Cow<'static, str>>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Use `schema` unless the table already declares one.
    pub fn or_schema(&self, schema: &str) -> Self {
        let mut result = self.clone();
        if result.schema.is_empty() {
            result.schema = Cow::Owned(schema.to_owned());
        }
        result
    }

    /// Column of this table, qualified by the alias when the table has one.
    pub fn column(&self, name: impl Into<Cow<'static, str>>) -> ColumnRef {
        if self.alias.is_empty() {
            ColumnRef {
                name: name.into(),
                table: self.name.clone(),
                schema: self.schema.clone(),
            }
        } else {
            ColumnRef {
                name: name.into(),
                table: self.alias.clone(),
                schema: Cow::Borrowed(""),
            }
        }
    }

    pub fn full_name(&self) -> String {
        let mut result = String::new();
        if !self.alias.is_empty() {
            result.push_str(&self.alias);
        } else {
            if !self.schema.is_empty() {
                result.push_str(&self.schema);
                result.push('.');
            }
            result.push_str(&self.name);
        }
        result
    }
}

impl Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Column, optionally qualified by its table and schema.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub name: Cow<'static, str>,
    pub table: Cow<'static, str>,
    pub schema: Cow<'static, str>,
}

impl ColumnRef {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn table(&self) -> TableRef {
        TableRef {
            name: self.table.clone(),
            schema: self.schema.clone(),
            ..Default::default()
        }
    }
}
