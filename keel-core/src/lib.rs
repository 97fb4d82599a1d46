mod as_value;
mod config;
mod connection;
mod convention;
mod descriptor;
mod driver;
mod dynamic;
mod entity;
mod error;
mod executor;
mod field;
mod logging;
mod materialize;
mod planner;
mod query;
mod reference;
mod registry;
mod session;
mod statement;
mod table_ref;
mod transaction;
mod util;
mod value;
mod writer;

pub use ::anyhow::Context as ErrorContext;
pub use as_value::*;
pub use config::*;
pub use connection::*;
pub use convention::*;
pub use descriptor::*;
pub use driver::*;
pub use dynamic::*;
pub use entity::*;
pub use error::*;
pub use executor::*;
pub use field::*;
pub use logging::*;
pub use materialize::*;
pub use planner::*;
pub use query::*;
pub use reference::*;
pub use registry::*;
pub use session::*;
pub use statement::*;
pub use table_ref::*;
pub use transaction::*;
pub use util::*;
pub use value::*;
pub use writer::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;
pub use ::indoc;
pub use ::log;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
