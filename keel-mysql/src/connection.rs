use crate::{MySqlDriver, MySqlQueryable, MySqlTransaction};
use keel_core::{
    ConnectOptions, Connection, Driver, Error, ErrorContext, ErrorKind, Executor, Query,
    QueryResult, Result, log_error, stream::Stream, truncate_long,
};
use mysql_async::{Conn, Opts, prelude::Queryable};

pub struct MySqlConnection {
    pub(crate) conn: MySqlQueryable<Conn>,
}

impl Executor for MySqlConnection {
    type Driver = MySqlDriver;

    fn driver(&self) -> &Self::Driver {
        &MySqlDriver {}
    }

    fn run(&mut self, query: Query) -> impl Stream<Item = Result<QueryResult>> + Send {
        self.conn.run(query)
    }
}

impl Connection for MySqlConnection {
    async fn connect(options: &ConnectOptions) -> Result<MySqlConnection> {
        let mut shown = options.url.clone();
        let _ = shown.set_password(None);
        let shown = shown.as_str();
        let context = || format!("While trying to connect to `{}`", truncate_long!(shown));
        if options.dialect != <Self::Driver as Driver>::DIALECT {
            return Err(log_error!(
                Error::new(ErrorKind::UnsupportedDialect(
                    options.dialect.name().to_owned(),
                ))
                .context(context())
            ));
        }
        let url = options.driver_url().with_context(context)?;
        let config = Opts::from_url(url.as_str()).with_context(context)?;
        let mut connection = Conn::new(config).await.with_context(context)?;
        connection
            .query_drop("SET NAMES utf8mb4")
            .await
            .with_context(context)?;
        log::debug!("Connected to `{}`", shown);
        Ok(MySqlConnection {
            conn: MySqlQueryable {
                executor: connection,
            },
        })
    }

    async fn begin(&mut self) -> Result<MySqlTransaction<'_>> {
        MySqlTransaction::new(self).await
    }

    async fn disconnect(self) -> Result<()> {
        self.conn
            .executor
            .disconnect()
            .await
            .map_err(|e| log_error!(Error::new(e).context("While disconnecting")))
    }
}
