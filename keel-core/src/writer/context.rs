use crate::{Error, Value};
use std::{
    ops::{Deref, DerefMut},
    str::FromStr,
};

/// How values reach the database.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Values are written as `?` placeholders and collected in order.
    #[default]
    Parameters,
    /// Values are written as literals inside the statement text.
    Inline,
}

impl FromStr for Binding {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "parameters" | "bound" => Ok(Binding::Parameters),
            "inline" => Ok(Binding::Inline),
            _ => Err(Error::msg(format!(
                "Unknown binding `{}`, expected `parameters` or `inline`",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    /// Columns are written as `table.column`.
    pub qualify_columns: bool,
    pub binding: Binding,
    /// Values bound so far, in placeholder order.
    pub params: Vec<Value>,
}

impl Context {
    pub fn new(qualify_columns: bool, binding: Binding) -> Self {
        Self {
            qualify_columns,
            binding,
            params: Vec::new(),
        }
    }

    /// Set column qualification until the returned guard is dropped.
    pub fn qualify(&mut self, qualify_columns: bool) -> ContextUpdater<'_> {
        let previous = self.qualify_columns;
        self.qualify_columns = qualify_columns;
        ContextUpdater {
            previous,
            current: self,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new(true, Binding::default())
    }
}

pub struct ContextUpdater<'a> {
    previous: bool,
    current: &'a mut Context,
}

impl Deref for ContextUpdater<'_> {
    type Target = Context;
    fn deref(&self) -> &Self::Target {
        self.current
    }
}

impl DerefMut for ContextUpdater<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.current
    }
}

impl Drop for ContextUpdater<'_> {
    fn drop(&mut self) {
        self.current.qualify_columns = self.previous;
    }
}
