use crate::{
    Binding, ColumnRef, Condition, Context, Delete, Insert, InsertPlan, Join, Lookup,
    Operand, Projection, Query, Select, SelectColumn, Statement, TableRef, Value, separated_by,
};
use std::fmt::Write;
use time::{Date, PrimitiveDateTime, Time, macros::format_description};

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}

/// Dialect printer turning statement trees into SQL text.
///
/// Every method has a default rendering close to standard SQL, dialects
/// override the pieces they spell differently.
pub trait SqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter;

    /// Escape occurrences of `search` char with `replace` while copying into buffer.
    fn write_escaped(
        &self,
        _context: &mut Context,
        out: &mut String,
        value: &str,
        search: char,
        replace: &str,
    ) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    /// Quote identifiers ("name") doubling inner quotes.
    fn write_identifier_quoted(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(context, out, value, '"', "\"\"");
        out.push('"');
    }

    fn write_table_ref(&self, context: &mut Context, out: &mut String, value: &TableRef) {
        if !value.schema.is_empty() {
            self.write_identifier_quoted(context, out, &value.schema);
            out.push('.');
        }
        self.write_identifier_quoted(context, out, &value.name);
        if !value.alias.is_empty() {
            out.push(' ');
            self.write_identifier_quoted(context, out, &value.alias);
        }
    }

    /// Render a column reference, qualified with its table when the context asks for it.
    fn write_column_ref(&self, context: &mut Context, out: &mut String, value: &ColumnRef) {
        if context.qualify_columns && !value.table.is_empty() {
            if !value.schema.is_empty() {
                self.write_identifier_quoted(context, out, &value.schema);
                out.push('.');
            }
            self.write_identifier_quoted(context, out, &value.table);
            out.push('.');
        }
        self.write_identifier_quoted(context, out, &value.name);
    }

    /// Render a value as a placeholder or as a literal, depending on the context binding.
    fn write_value(&self, context: &mut Context, out: &mut String, value: &Value) {
        match context.binding {
            Binding::Parameters => {
                self.write_placeholder(context, out);
                context.params.push(value.clone());
            }
            Binding::Inline => self.write_value_inline(context, out, value),
        }
    }

    fn write_placeholder(&self, _context: &mut Context, out: &mut String) {
        out.push('?');
    }

    /// Render a literal, numbers and booleans bare, everything else quoted.
    fn write_value_inline(&self, context: &mut Context, out: &mut String, value: &Value) {
        match value {
            v if v.is_null() => self.write_value_none(context, out),
            Value::Boolean(Some(v)) => self.write_value_bool(context, out, *v),
            Value::Int8(Some(v)) => write_integer!(out, *v),
            Value::Int16(Some(v)) => write_integer!(out, *v),
            Value::Int32(Some(v)) => write_integer!(out, *v),
            Value::Int64(Some(v)) => write_integer!(out, *v),
            Value::UInt8(Some(v)) => write_integer!(out, *v),
            Value::UInt16(Some(v)) => write_integer!(out, *v),
            Value::UInt32(Some(v)) => write_integer!(out, *v),
            Value::UInt64(Some(v)) => write_integer!(out, *v),
            Value::Float32(Some(v)) => self.write_value_float(context, out, *v as f64),
            Value::Float64(Some(v)) => self.write_value_float(context, out, *v),
            Value::Decimal(Some(v)) => drop(write!(out, "{}", v)),
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => {
                self.write_value_string(context, out, v)
            }
            Value::Blob(Some(v)) => self.write_value_blob(context, out, v),
            Value::Date(Some(v)) => self.write_value_date(context, out, v),
            Value::Time(Some(v)) => self.write_value_time(context, out, v),
            Value::Timestamp(Some(v)) => self.write_value_timestamp(context, out, v),
            Value::Uuid(Some(v)) => self.write_value_string(context, out, &v.to_string()),
            _ => log::error!("Cannot write {:?}", value),
        }
    }

    fn write_value_none(&self, _context: &mut Context, out: &mut String) {
        out.push_str("NULL");
    }

    fn write_value_bool(&self, _context: &mut Context, out: &mut String, value: bool) {
        out.push_str(["false", "true"][value as usize]);
    }

    fn write_value_float(&self, context: &mut Context, out: &mut String, value: f64) {
        if value.is_finite() {
            let mut buffer = ryu::Buffer::new();
            out.push_str(buffer.format(value));
        } else {
            // No literal for NaN and infinities
            self.write_placeholder(context, out);
            context.params.push(Value::Float64(Some(value)));
        }
    }

    /// Render and escape a string literal using single quotes.
    fn write_value_string(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('\'');
        self.write_escaped(context, out, value, '\'', "''");
        out.push('\'');
    }

    fn write_value_blob(&self, _context: &mut Context, out: &mut String, value: &[u8]) {
        out.push_str("X'");
        for b in value {
            let _ = write!(out, "{:02X}", b);
        }
        out.push('\'');
    }

    fn write_value_date(&self, context: &mut Context, out: &mut String, value: &Date) {
        match value.format(format_description!("[year]-[month]-[day]")) {
            Ok(v) => self.write_value_string(context, out, &v),
            Err(e) => log::error!("Cannot write the date {}: {}", value, e),
        }
    }

    fn write_value_time(&self, context: &mut Context, out: &mut String, value: &Time) {
        let formatted = if value.nanosecond() == 0 {
            value.format(format_description!("[hour]:[minute]:[second]"))
        } else {
            value.format(format_description!("[hour]:[minute]:[second].[subsecond]"))
        };
        match formatted {
            Ok(v) => self.write_value_string(context, out, &v),
            Err(e) => log::error!("Cannot write the time {}: {}", value, e),
        }
    }

    fn write_value_timestamp(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &PrimitiveDateTime,
    ) {
        let formatted = if value.nanosecond() == 0 {
            value.format(format_description!(
                "[year]-[month]-[day] [hour]:[minute]:[second]"
            ))
        } else {
            value.format(format_description!(
                "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"
            ))
        };
        match formatted {
            Ok(v) => self.write_value_string(context, out, &v),
            Err(e) => log::error!("Cannot write the timestamp {}: {}", value, e),
        }
    }

    fn write_operand(&self, context: &mut Context, out: &mut String, value: &Operand) {
        match value {
            Operand::Value(v) => self.write_value(context, out, v),
            Operand::Lookup(v) => self.write_lookup(context, out, v),
        }
    }

    /// Render a lookup subquery, its columns are never qualified.
    fn write_lookup(&self, context: &mut Context, out: &mut String, value: &Lookup) {
        let mut context = context.qualify(false);
        out.push_str("(SELECT ");
        self.write_column_ref(&mut context, out, &value.column);
        out.push_str(" FROM ");
        self.write_table_ref(&mut context, out, &value.table);
        out.push_str(" WHERE ");
        self.write_conditions(&mut context, out, &value.filter);
        out.push(')');
    }

    fn write_conditions(&self, context: &mut Context, out: &mut String, value: &[Condition]) {
        separated_by(
            out,
            value,
            |out, v| self.write_condition(context, out, v),
            " AND ",
        );
    }

    fn write_condition(&self, context: &mut Context, out: &mut String, value: &Condition) {
        self.write_column_ref(context, out, &value.column);
        match &value.value {
            Operand::Value(v) if v.is_null() => out.push_str(" IS NULL"),
            v => {
                out.push_str(" = ");
                self.write_operand(context, out, v);
            }
        }
    }

    /// Emit the insert keyword(s).
    fn write_insert_into(&self, _context: &mut Context, out: &mut String, _ignore: bool) {
        out.push_str("INSERT INTO ");
    }

    /// Emit what follows the values of an insert skipping duplicates.
    fn write_insert_ignore_suffix(&self, _context: &mut Context, out: &mut String) {
        out.push_str(" ON CONFLICT DO NOTHING");
    }

    fn write_insert(&self, context: &mut Context, out: &mut String, value: &Insert) {
        out.reserve(64 + value.values.len() * 32);
        if !out.is_empty() {
            out.push('\n');
        }
        let mut context = context.qualify(false);
        self.write_insert_into(&mut context, out, value.ignore);
        self.write_table_ref(&mut context, out, &value.table);
        out.push_str(" (");
        separated_by(
            out,
            &value.values,
            |out, (name, _)| self.write_identifier_quoted(&mut context, out, name),
            ", ",
        );
        out.push_str(") VALUES (");
        separated_by(
            out,
            &value.values,
            |out, (_, v)| self.write_operand(&mut context, out, v),
            ", ",
        );
        out.push(')');
        if value.ignore {
            self.write_insert_ignore_suffix(&mut context, out);
        }
        out.push(';');
    }

    fn write_select_column(&self, context: &mut Context, out: &mut String, value: &SelectColumn) {
        self.write_column_ref(context, out, &value.column);
        if let Some(alias) = &value.alias {
            out.push_str(" AS ");
            self.write_identifier_quoted(context, out, alias);
        }
    }

    /// Emit SELECT statement (projection, FROM, JOIN, WHERE, LIMIT).
    fn write_select(&self, context: &mut Context, out: &mut String, value: &Select) {
        out.reserve(128);
        if !out.is_empty() {
            out.push('\n');
        }
        let mut context = context.qualify(matches!(value.projection, Projection::Columns(..)));
        out.push_str("SELECT ");
        match &value.projection {
            Projection::Asterisk => out.push('*'),
            Projection::Columns(columns) => separated_by(
                out,
                columns,
                |out, v| self.write_select_column(&mut context, out, v),
                ", ",
            ),
        }
        out.push_str("\nFROM ");
        self.write_table_ref(&mut context, out, &value.from);
        for join in &value.joins {
            out.push('\n');
            self.write_join(&mut context, out, join);
        }
        if !value.filter.is_empty() {
            out.push_str("\nWHERE ");
            self.write_conditions(&mut context, out, &value.filter);
        }
        if let Some(limit) = value.limit {
            let _ = write!(out, "\nLIMIT {}", limit);
        }
        out.push(';');
    }

    fn write_join(&self, context: &mut Context, out: &mut String, value: &Join) {
        let mut context = context.qualify(true);
        out.push_str("INNER JOIN ");
        self.write_table_ref(&mut context, out, &value.table);
        out.push_str(" ON ");
        self.write_column_ref(&mut context, out, &value.lhs);
        out.push_str(" = ");
        self.write_column_ref(&mut context, out, &value.rhs);
    }

    /// Emit DELETE statement with WHERE clause.
    fn write_delete(&self, context: &mut Context, out: &mut String, value: &Delete) {
        out.reserve(64);
        if !out.is_empty() {
            out.push('\n');
        }
        let mut context = context.qualify(false);
        out.push_str("DELETE FROM ");
        self.write_table_ref(&mut context, out, &value.table);
        if !value.filter.is_empty() {
            out.push_str("\nWHERE ");
            self.write_conditions(&mut context, out, &value.filter);
        }
        out.push(';');
    }

    fn write_statement(&self, context: &mut Context, out: &mut String, value: &Statement) {
        match value {
            Statement::Insert(v) => self.write_insert(context, out, v),
            Statement::Select(v) => self.write_select(context, out, v),
            Statement::Delete(v) => self.write_delete(context, out, v),
        }
    }

    /// Render one statement into a query ready to be executed.
    fn render(&self, statement: &Statement, binding: Binding) -> Query {
        let mut context = Context::new(true, binding);
        let mut sql = String::new();
        self.write_statement(&mut context, &mut sql, statement);
        Query::new(sql, context.params)
    }

    /// Render every insert of the plan into its own query, in plan order.
    fn render_plan(&self, plan: &InsertPlan, binding: Binding) -> Vec<Query> {
        plan.statements
            .iter()
            .map(|v| {
                let mut context = Context::new(true, binding);
                let mut sql = String::new();
                self.write_insert(&mut context, &mut sql, v);
                Query::new(sql, context.params)
            })
            .collect()
    }
}

/// Fallback writer with standard SQL quoting.
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSqlWriter;

impl GenericSqlWriter {
    pub const fn new() -> Self {
        Self
    }
}

impl SqlWriter for GenericSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }
}
