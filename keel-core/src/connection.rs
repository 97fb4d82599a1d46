use crate::{ConnectOptions, Driver, Executor, Result};
use std::future::Future;

/// One owned connection to a database.
///
/// Connections are created explicitly with [`Connection::connect`] and are never
/// reopened behind the caller's back.
pub trait Connection: Executor {
    /// Open a connection using the options parsed from a database URL.
    fn connect(options: &ConnectOptions) -> impl Future<Output = Result<Self>> + Send;

    /// Start a transaction that borrows the connection until committed or rolled back.
    fn begin(
        &mut self,
    ) -> impl Future<Output = Result<<Self::Driver as Driver>::Transaction<'_>>> + Send;

    fn disconnect(self) -> impl Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }
}
