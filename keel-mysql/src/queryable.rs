use crate::{MySqlDriver, RowWrap, ValueWrap};
use async_stream::try_stream;
use keel_core::{
    Error, Executor, Query, QueryResult, Result, RowsAffected, log_error,
    stream::{Stream, StreamExt, TryStreamExt},
};
use mysql_async::{
    Params,
    prelude::{Protocol, Queryable},
};
use std::sync::Arc;

/// Anything `mysql_async` can run queries on: a connection or a transaction.
pub(crate) struct MySqlQueryable<T: Queryable + Send> {
    pub(crate) executor: T,
}

impl<T: Queryable + Send> Executor for MySqlQueryable<T> {
    type Driver = MySqlDriver;

    fn driver(&self) -> &Self::Driver {
        &MySqlDriver {}
    }

    fn run(&mut self, query: Query) -> impl Stream<Item = Result<QueryResult>> + Send {
        let context = Arc::new(format!("While running the query:\n{}", query));
        try_stream! {
            let Query { sql, params } = query;
            let mut results = if params.is_empty() {
                drain(self.executor.query_iter(sql).await?).boxed()
            } else {
                let params = params
                    .into_iter()
                    .map(|v| mysql_async::Value::try_from(ValueWrap(v)))
                    .collect::<Result<Vec<_>>>()?;
                drain(
                    self.executor
                        .exec_iter(sql, Params::Positional(params))
                        .await?,
                )
                .boxed()
            };
            while let Some(result) = results.next().await {
                yield result?
            }
        }
        .map_err(move |e: Error| log_error!(e.context(context.clone())))
    }
}

/// Rows of every result set, or the affected count when the statement returned none.
fn drain<'a, P: Protocol + Unpin>(
    mut result: mysql_async::QueryResult<'a, 'static, P>,
) -> impl Stream<Item = Result<QueryResult>> + Send + 'a {
    try_stream! {
        let mut rows = 0;
        while let Some(mut stream) = result.stream::<RowWrap>().await? {
            while let Some(row) = stream.next().await.transpose()? {
                rows += 1;
                yield QueryResult::Row(row.0)
            }
        }
        if rows == 0 {
            yield QueryResult::Affected(RowsAffected {
                rows_affected: result.affected_rows(),
                last_affected_id: result.last_insert_id().map(|v| v as _),
            });
        }
    }
}
