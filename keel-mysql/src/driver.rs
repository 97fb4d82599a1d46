use crate::{MySqlConnection, MySqlSqlWriter, MySqlTransaction};
use keel_core::{Dialect, Driver};

#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDriver;
impl MySqlDriver {
    pub const fn new() -> Self {
        Self
    }
}

impl Driver for MySqlDriver {
    type Connection = MySqlConnection;
    type SqlWriter = MySqlSqlWriter;
    type Transaction<'c> = MySqlTransaction<'c>;

    const NAME: &'static str = "mysql";
    const DIALECT: Dialect = Dialect::MySql;

    fn sql_writer(&self) -> Self::SqlWriter {
        MySqlSqlWriter::default()
    }
}
