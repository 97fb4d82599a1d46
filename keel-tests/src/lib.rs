mod entities;
mod mock;
mod shop;

pub use entities::*;
pub use mock::*;
use keel::{Connection, Registry, Session};
use log::LevelFilter;
pub use shop::shop;
use std::env;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Run the whole suite on `connection`, closing it at the end.
pub async fn execute_tests<C: Connection>(connection: C) {
    let mut registry = Registry::new();
    registry.register::<Order>();
    let mut session = Session::new(connection, registry);
    shop(&mut session).await;
    session
        .close()
        .await
        .expect("Could not close the connection");
}
