use crate::{Value, truncate_long};
use std::{
    fmt::{self, Display},
    sync::Arc,
};

/// Rendered SQL with the values bound to its placeholders, in order.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Query {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Query {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn is_bound(&self) -> bool {
        !self.params.is_empty()
    }
}

impl From<String> for Query {
    fn from(value: String) -> Self {
        Self {
            sql: value,
            params: Vec::new(),
        }
    }
}

impl From<&str> for Query {
    fn from(value: &str) -> Self {
        value.to_owned().into()
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.sql))?;
        if !self.params.is_empty() {
            f.write_str(" [")?;
            for (i, v) in self.params.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", v)?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

/// Metadata about modify operations (INSERT/DELETE).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    pub rows_affected: u64,
    /// Last inserted identifier when the backend reports one.
    pub last_affected_id: Option<i64>,
}

/// Shared column name list.
pub type RowNames = Arc<[String]>;
/// Values aligned by index with `RowNames`.
pub type Row = Box<[Value]>;

/// A result row with its column labels.
#[derive(Debug, Clone)]
pub struct RowLabeled {
    pub labels: RowNames,
    pub values: Row,
}

impl RowLabeled {
    pub fn new(labels: RowNames, values: Row) -> Self {
        Self { labels, values }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .and_then(|i| self.values.get(i))
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for RowLabeled {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let (labels, values): (Vec<String>, Vec<Value>) = iter
            .into_iter()
            .map(|(n, v)| (n.into(), v.into()))
            .unzip();
        Self {
            labels: labels.into(),
            values: values.into(),
        }
    }
}

/// Items produced by `Executor::run`: rows and modify results.
#[derive(Debug)]
pub enum QueryResult {
    Row(RowLabeled),
    Affected(RowsAffected),
}

impl Extend<RowsAffected> for RowsAffected {
    fn extend<T: IntoIterator<Item = RowsAffected>>(&mut self, iter: T) {
        for elem in iter {
            self.rows_affected += elem.rows_affected;
            if elem.last_affected_id.is_some() {
                self.last_affected_id = elem.last_affected_id;
            }
        }
    }
}

impl From<RowLabeled> for QueryResult {
    fn from(value: RowLabeled) -> Self {
        QueryResult::Row(value)
    }
}

impl From<RowsAffected> for QueryResult {
    fn from(value: RowsAffected) -> Self {
        QueryResult::Affected(value)
    }
}
