use crate::{MySqlConnection, MySqlDriver, MySqlQueryable};
use keel_core::{Executor, Query, QueryResult, Result, Transaction, stream::Stream};
use mysql_async::TxOpts;

pub struct MySqlTransaction<'c> {
    pub(crate) transaction: MySqlQueryable<mysql_async::Transaction<'c>>,
}

impl<'c> MySqlTransaction<'c> {
    pub async fn new(connection: &'c mut MySqlConnection) -> Result<Self> {
        Ok(Self {
            transaction: MySqlQueryable {
                executor: connection
                    .conn
                    .executor
                    .start_transaction(TxOpts::new())
                    .await
                    .map_err(|e| {
                        log::error!("{:#}", e);
                        e
                    })?,
            },
        })
    }
}

impl<'c> Executor for MySqlTransaction<'c> {
    type Driver = MySqlDriver;

    fn driver(&self) -> &Self::Driver {
        &MySqlDriver {}
    }

    fn run(&mut self, query: Query) -> impl Stream<Item = Result<QueryResult>> + Send {
        self.transaction.run(query)
    }
}

impl<'c> Transaction for MySqlTransaction<'c> {
    async fn commit(self) -> Result<()> {
        self.transaction
            .executor
            .commit()
            .await
            .map_err(Into::into)
    }

    async fn rollback(self) -> Result<()> {
        self.transaction
            .executor
            .rollback()
            .await
            .map_err(Into::into)
    }
}
