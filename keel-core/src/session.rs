use crate::{
    Binding, ConnectOptions, Connection, Driver, Entity, Error, ErrorKind, FileLogger,
    LoggerConfig, MaterializeOptions, Materializer, Planner, Query, Record, Registry, Result,
    RowLabeled, RowsAffected, Shape, SqlWriter, Statement, Value, downcast, log_error,
    run_in_transaction,
    stream::TryStreamExt,
};
use std::{sync::Arc, time::Duration};

/// Session shared between tasks, one operation at a time.
pub type SharedSession<C> = Arc<tokio::sync::Mutex<Session<C>>>;

/// Access object owning one connection.
///
/// Writes run inside a transaction, reads return records rebuilt from the rows.
/// Tables are referred to by the names the registry knows them by.
pub struct Session<C: Connection> {
    connection: C,
    registry: Registry,
    schema: String,
    binding: Binding,
    statement_timeout: Option<Duration>,
    materialize: MaterializeOptions,
}

impl<C: Connection> Session<C> {
    pub fn new(connection: C, registry: Registry) -> Self {
        Self {
            connection,
            registry,
            schema: String::new(),
            binding: Binding::default(),
            statement_timeout: None,
            materialize: MaterializeOptions::default(),
        }
    }

    /// Connect and configure the session from `options`, the database becomes the schema.
    ///
    /// When the options name a log directory the file logger is installed, unless
    /// another logger already is.
    pub async fn connect(options: &ConnectOptions, registry: Registry) -> Result<Self> {
        if let Some(directory) = &options.log_dir {
            if let Err(e) = FileLogger::init(LoggerConfig {
                directory: directory.clone(),
                ..Default::default()
            }) {
                log::debug!("{:#}", e);
            }
        }
        let connection = C::connect(options).await?;
        Ok(Self::new(connection, registry)
            .with_schema(options.database.clone().unwrap_or_default())
            .with_binding(options.binding)
            .with_statement_timeout(options.statement_timeout))
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = binding;
        self
    }

    pub fn with_statement_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.statement_timeout = timeout;
        self
    }

    pub fn with_materialize_options(mut self, options: MaterializeOptions) -> Self {
        self.materialize = options;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn connection(&mut self) -> &mut C {
        &mut self.connection
    }

    pub fn planner(&self) -> Planner<'_> {
        Planner::new(&self.registry).with_schema(self.schema.clone())
    }

    pub fn materializer(&self) -> Materializer<'_> {
        Materializer::new(&self.registry).with_options(self.materialize)
    }

    /// Render a statement with the driver's writer and the session binding.
    pub fn render(&self, statement: &Statement) -> Query {
        self.connection
            .driver()
            .sql_writer()
            .render(statement, self.binding)
    }

    /// Insert `record` and every record nested in its relations, in one transaction.
    ///
    /// Rows already present are skipped, nested rows are found again by their values.
    pub async fn insert(&mut self, record: &dyn Record) -> Result<RowsAffected> {
        let plan = self.planner().plan_insert(record)?;
        let queries = self
            .connection
            .driver()
            .sql_writer()
            .render_plan(&plan, self.binding);
        run_in_transaction(&mut self.connection, queries, self.statement_timeout).await
    }

    /// Register `E` if needed and insert `entity`.
    pub async fn insert_entity<E: Entity>(&mut self, entity: &E) -> Result<RowsAffected> {
        self.registry.register::<E>();
        self.insert(entity).await
    }

    /// Row of `table` with primary key `id`, joined with the rows it references.
    pub async fn select_by_id(
        &mut self,
        table: &str,
        id: impl Into<Value>,
    ) -> Result<Box<dyn Record>> {
        let def = self.registry.get(table)?;
        let select = self.planner().select_by_id(&def, id.into())?;
        let rows = self.fetch_rows(&select.into()).await?;
        self.materializer().materialize(&def, Shape::Joined, &rows)
    }

    pub async fn find_by_id<E: Entity>(&mut self, id: impl Into<Value>) -> Result<E> {
        self.registry.register::<E>();
        downcast(self.select_by_id(E::entity_def().table_name(), id).await?)
    }

    /// Rows of `table` whose `column` equals `value`.
    ///
    /// A `simple` fetch reads the table alone and keeps foreign keys as keys,
    /// otherwise the referenced rows are joined and rebuilt too.
    pub async fn select_by_property(
        &mut self,
        table: &str,
        column: &str,
        value: impl Into<Value>,
        simple: bool,
    ) -> Result<Vec<Box<dyn Record>>> {
        let def = self.registry.get(table)?;
        let select = self
            .planner()
            .select_by_property(&def, column, value.into(), simple)?;
        let rows = self.fetch_rows(&select.into()).await?;
        let shape = if simple { Shape::Shallow } else { Shape::Joined };
        self.materializer().materialize_all(&def, shape, &rows)
    }

    pub async fn select_all(&mut self, table: &str) -> Result<Vec<Box<dyn Record>>> {
        let def = self.registry.get(table)?;
        let select = self.planner().select_all(&def);
        let rows = self.fetch_rows(&select.into()).await?;
        self.materializer()
            .materialize_all(&def, Shape::Shallow, &rows)
    }

    pub async fn delete_by_id(&mut self, table: &str, id: impl Into<Value>) -> Result<RowsAffected> {
        let def = self.registry.get(table)?;
        let delete = self.planner().delete_by_id(&def, id.into())?;
        let query = self.render(&delete.into());
        run_in_transaction(&mut self.connection, vec![query], self.statement_timeout).await
    }

    async fn fetch_rows(&mut self, statement: &Statement) -> Result<Vec<RowLabeled>> {
        let query = self.render(statement);
        log::debug!("Fetching: {}", query);
        let rows = self.connection.fetch(query).try_collect::<Vec<_>>();
        match self.statement_timeout {
            Some(limit) => tokio::time::timeout(limit, rows)
                .await
                .unwrap_or_else(|_| Err(log_error!(Error::new(ErrorKind::Timeout(limit))))),
            None => rows.await,
        }
    }

    /// Give the connection back, the session is gone.
    pub fn release(self) -> C {
        self.connection
    }

    pub async fn close(self) -> Result<()> {
        self.connection.disconnect().await
    }

    pub fn into_shared(self) -> SharedSession<C> {
        Arc::new(tokio::sync::Mutex::new(self))
    }
}
