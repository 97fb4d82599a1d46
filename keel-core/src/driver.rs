use crate::{Connection, Dialect, SqlWriter, Transaction};

pub trait Driver: Send + Sync {
    type Connection: Connection<Driver = Self>;
    type SqlWriter: SqlWriter;
    type Transaction<'c>: Transaction<Driver = Self> + 'c;

    /// URL scheme accepted by the driver.
    const NAME: &'static str;
    const DIALECT: Dialect;

    fn sql_writer(&self) -> Self::SqlWriter;
}
