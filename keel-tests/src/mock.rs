use keel::{
    ConnectOptions, Connection, Dialect, Driver, Error, Executor, GenericSqlWriter, Query,
    QueryResult, Result, RowLabeled, RowsAffected, Transaction,
    stream::{self, Stream, StreamExt},
};
use std::{collections::VecDeque, time::Duration};

/// In memory driver recording the queries it receives, used to test sessions
/// without a database.
#[derive(Default, Debug, Clone, Copy)]
pub struct MockDriver;

impl Driver for MockDriver {
    type Connection = MockConnection;
    type SqlWriter = GenericSqlWriter;
    type Transaction<'c> = MockTransaction<'c>;

    const NAME: &'static str = "mock";
    const DIALECT: Dialect = Dialect::MySql;

    fn sql_writer(&self) -> GenericSqlWriter {
        GenericSqlWriter::new()
    }
}

/// Scripted connection.
///
/// Selects pop the next entry of `rows`, every other statement affects
/// `affected` rows. A statement containing `fail_on` fails, every statement
/// waits `delay` before answering.
#[derive(Debug)]
pub struct MockConnection {
    /// Every statement received, in order.
    pub executed: Vec<Query>,
    /// Statements of the transactions committed.
    pub committed: Vec<Query>,
    pub rollbacks: usize,
    pub rows: VecDeque<Vec<RowLabeled>>,
    pub affected: u64,
    pub fail_on: Option<String>,
    pub delay: Option<Duration>,
}

impl Default for MockConnection {
    fn default() -> Self {
        Self {
            executed: Vec::new(),
            committed: Vec::new(),
            rollbacks: 0,
            rows: VecDeque::new(),
            affected: 1,
            fail_on: None,
            delay: None,
        }
    }
}

impl MockConnection {
    pub fn with_rows(mut self, rows: Vec<RowLabeled>) -> Self {
        self.rows.push_back(rows);
        self
    }

    pub fn failing_on(mut self, pattern: impl Into<String>) -> Self {
        self.fail_on = Some(pattern.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn respond(&mut self, query: Query) -> Vec<Result<QueryResult>> {
        self.executed.push(query.clone());
        if let Some(pattern) = &self.fail_on {
            if query.sql.contains(pattern.as_str()) {
                return vec![Err(Error::msg(format!(
                    "Mock failure while executing `{}`",
                    query.sql
                )))];
            }
        }
        if query.sql.trim_start().starts_with("SELECT") {
            self.rows
                .pop_front()
                .unwrap_or_default()
                .into_iter()
                .map(|v| Ok(QueryResult::Row(v)))
                .collect()
        } else {
            vec![Ok(QueryResult::Affected(RowsAffected {
                rows_affected: self.affected,
                last_affected_id: None,
            }))]
        }
    }
}

impl Executor for MockConnection {
    type Driver = MockDriver;

    fn driver(&self) -> &Self::Driver {
        &MockDriver {}
    }

    fn run(&mut self, query: Query) -> impl Stream<Item = Result<QueryResult>> + Send {
        let delay = self.delay;
        let results = self.respond(query);
        stream::once(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            stream::iter(results)
        })
        .flatten()
    }
}

impl Connection for MockConnection {
    async fn connect(options: &ConnectOptions) -> Result<Self> {
        log::debug!("Mock connection to {}", options.url);
        Ok(Self::default())
    }

    async fn begin(&mut self) -> Result<MockTransaction<'_>> {
        Ok(MockTransaction {
            connection: self,
            pending: Vec::new(),
        })
    }
}

pub struct MockTransaction<'c> {
    connection: &'c mut MockConnection,
    pending: Vec<Query>,
}

impl<'c> Executor for MockTransaction<'c> {
    type Driver = MockDriver;

    fn driver(&self) -> &Self::Driver {
        &MockDriver {}
    }

    fn run(&mut self, query: Query) -> impl Stream<Item = Result<QueryResult>> + Send {
        self.pending.push(query.clone());
        self.connection.run(query)
    }
}

impl<'c> Transaction for MockTransaction<'c> {
    async fn commit(self) -> Result<()> {
        self.connection.committed.extend(self.pending);
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.connection.rollbacks += 1;
        Ok(())
    }
}
