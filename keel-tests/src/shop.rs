use crate::{Account, Customer, Order};
use indoc::indoc;
use keel::{Connection, ErrorKind, Query, Record, Reference, Session, downcast};
use rust_decimal::Decimal;
use std::sync::LazyLock;
use tokio::sync::Mutex;

const SCHEMA: [&str; 6] = [
    "DROP TABLE IF EXISTS `order`",
    "DROP TABLE IF EXISTS account",
    "DROP TABLE IF EXISTS customer",
    indoc! {"
        CREATE TABLE customer (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            name VARCHAR(64) NOT NULL UNIQUE,
            email VARCHAR(128)
        )
    "},
    indoc! {"
        CREATE TABLE account (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            number VARCHAR(32) NOT NULL UNIQUE,
            customer_id BIGINT NOT NULL,
            FOREIGN KEY (customer_id) REFERENCES customer(id)
        )
    "},
    indoc! {"
        CREATE TABLE `order` (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            total DECIMAL(10, 2) NOT NULL,
            account_id BIGINT NOT NULL,
            FOREIGN KEY (account_id) REFERENCES account(id)
        )
    "},
];

fn single<E: keel::Entity>(records: Vec<Box<dyn Record>>) -> E {
    assert_eq!(records.len(), 1, "Expected exactly one record");
    let record = records
        .into_iter()
        .next()
        .expect("The record was just counted");
    downcast::<E>(record).expect("The record has the wrong type")
}

pub async fn shop<C: Connection>(session: &mut Session<C>) {
    static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    let _lock = MUTEX.lock().await;

    // Setup
    for statement in SCHEMA {
        session
            .connection()
            .execute(Query::from(statement))
            .await
            .expect("Failed to prepare the shop tables");
    }

    // Insert the order with its account and customer
    let ada = Customer::new("Ada", Some("ada@example.com"));
    let order = Order::new(Decimal::new(1250, 2), Account::new("ACC-1", ada.clone()));
    let affected = session
        .insert_entity(&order)
        .await
        .expect("Failed to insert the order");
    assert_eq!(affected.rows_affected, 3);

    // Existing rows are skipped
    let affected = session
        .insert_entity(&Account::new("ACC-1", ada.clone()))
        .await
        .expect("Failed to insert the account again");
    assert_eq!(affected.rows_affected, 0);

    // Simple fetch keeps the keys
    let customer: Customer = single(
        session
            .select_by_property("customer", "name", "Ada", true)
            .await
            .expect("Failed to query the customer"),
    );
    assert_eq!(customer.name, "Ada");
    assert_eq!(customer.email.as_deref(), Some("ada@example.com"));
    let account: Account = single(
        session
            .select_by_property("account", "number", "ACC-1", true)
            .await
            .expect("Failed to query the account"),
    );
    assert_eq!(account.customer_id, Reference::key(customer.id));

    // Joined fetch rebuilds the nested entities
    let account = session
        .find_by_id::<Account>(account.id)
        .await
        .expect("Failed to find the account by id");
    assert_eq!(account.number, "ACC-1");
    assert_eq!(account.customer_id.entity(), Some(&customer));
    let order: Order = single(
        session
            .select_by_property("order", "total", Decimal::new(1250, 2), false)
            .await
            .expect("Failed to query the order"),
    );
    assert_eq!(order.total, Decimal::new(1250, 2));
    assert_eq!(order.account_id.entity(), Some(&account));

    // Failures
    let error = session
        .select_by_id("widget", 5)
        .await
        .expect_err("There is no widget entity");
    assert_eq!(
        ErrorKind::of(&error),
        Some(&ErrorKind::UnknownEntity("widget".into()))
    );
    let error = session
        .find_by_id::<Customer>(i64::MAX)
        .await
        .expect_err("The customer does not exist");
    assert!(matches!(
        ErrorKind::of(&error),
        Some(ErrorKind::EmptyResult { .. })
    ));

    // Delete
    let affected = session
        .delete_by_id("order", order.id)
        .await
        .expect("Failed to delete the order");
    assert_eq!(affected.rows_affected, 1);
    let orders = session
        .select_all("order")
        .await
        .expect("Failed to query the orders");
    assert!(orders.is_empty());
}
