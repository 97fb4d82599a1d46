use crate::{
    Connection, Error, ErrorKind, Executor, Query, Result, RowsAffected, fatal, log_error,
};
use std::{future::Future, time::Duration};

/// Unit of work borrowing its connection, ended by [`commit`](Transaction::commit) or
/// [`rollback`](Transaction::rollback).
pub trait Transaction: Executor {
    fn commit(self) -> impl Future<Output = Result<()>> + Send;
    fn rollback(self) -> impl Future<Output = Result<()>> + Send;
}

/// Execute `queries` in order inside one transaction.
///
/// Either every query is committed or none is: the first failure (or a query
/// running longer than `timeout`) rolls the transaction back and the returned
/// error has kind [`ErrorKind::TransactionFailed`] with the cause as its source.
pub async fn run_in_transaction<C: Connection>(
    connection: &mut C,
    queries: Vec<Query>,
    timeout: Option<Duration>,
) -> Result<RowsAffected> {
    let mut transaction = match connection.begin().await {
        Ok(v) => v,
        Err(e) => return Err(failed(e)),
    };
    let mut total = RowsAffected::default();
    for query in queries {
        log::debug!("Executing: {}", query);
        let result = match timeout {
            Some(limit) => tokio::time::timeout(limit, transaction.execute(query))
                .await
                .unwrap_or_else(|_| Err(Error::new(ErrorKind::Timeout(limit)))),
            None => transaction.execute(query).await,
        };
        match result {
            Ok(v) => total.extend([v]),
            Err(e) => {
                if let Err(rollback) = transaction.rollback().await {
                    fatal!("{:#}", rollback.context("While rolling back"));
                }
                return Err(failed(e));
            }
        }
    }
    transaction.commit().await.map_err(failed)?;
    Ok(total)
}

fn failed(error: Error) -> Error {
    log_error!(error.context(ErrorKind::TransactionFailed))
}
