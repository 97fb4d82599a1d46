#[cfg(test)]
mod tests {
    use keel::{Binding, ConnectOptions, Connection, Entity, ErrorKind, Planner, Registry, SqlWriter};
    use keel_mysql::{MySqlConnection, MySqlSqlWriter};
    use keel_tests::{Account, Customer, Order, execute_tests, init_logs};
    use rust_decimal::Decimal;
    use std::{env, sync::Mutex};

    static MUTEX: Mutex<()> = Mutex::new(());

    #[tokio::test]
    async fn mysql() {
        init_logs();
        let Ok(url) = env::var("KEEL_MYSQL_TEST") else {
            log::warn!("KEEL_MYSQL_TEST is not set, skipping the MySQL suite");
            return;
        };
        let _guard = MUTEX.lock().unwrap();
        let options = ConnectOptions::from_url(&url).expect("Invalid KEEL_MYSQL_TEST url");
        let connection = MySqlConnection::connect(&options)
            .await
            .expect("Could not open the database");
        execute_tests(connection).await;
    }

    #[tokio::test]
    async fn wrong_dialect() {
        init_logs();
        let error = ConnectOptions::from_url("oracle://user@localhost/db")
            .expect_err("Oracle has no driver");
        assert_eq!(
            ErrorKind::root_of(&error),
            Some(&ErrorKind::NotImplemented("oracle".into()))
        );
    }

    #[test]
    fn rendering() {
        let mut registry = Registry::new();
        registry.register::<Order>();
        let planner = Planner::new(&registry);
        let writer = MySqlSqlWriter::new();
        let order = Order::new(
            Decimal::new(1250, 2),
            Account::new("ACC-1", Customer::new("O'Hara", None)),
        );
        let plan = planner.plan_insert(&order).expect("Could not plan the insert");
        let queries: Vec<_> = writer
            .render_plan(&plan, Binding::Inline)
            .into_iter()
            .map(|v| v.sql)
            .collect();
        assert_eq!(
            queries,
            [
                "INSERT IGNORE INTO `customer` (`name`, `email`) VALUES ('O''Hara', NULL);",
                "INSERT IGNORE INTO `account` (`number`, `customer_id`) VALUES ('ACC-1', (SELECT `id` FROM `customer` WHERE `name` = 'O''Hara'));",
                "INSERT IGNORE INTO `order` (`total`, `account_id`) VALUES (12.50, (SELECT `id` FROM `account` WHERE `number` = 'ACC-1' AND `customer_id` = (SELECT `id` FROM `customer` WHERE `name` = 'O''Hara')));",
            ]
        );
        let select = planner
            .select_by_id(Account::entity_def(), 7i64.into())
            .expect("Could not plan the select");
        let query = writer.render(&select.into(), Binding::Parameters);
        assert_eq!(
            query.sql,
            indoc::indoc! {"
                SELECT `account`.`id` AS `account_id`, `account`.`number` AS `account_number`, `customer`.`id` AS `customer_id`, `customer`.`name` AS `customer_name`, `customer`.`email` AS `customer_email`
                FROM `account`
                INNER JOIN `customer` ON `customer`.`id` = `account`.`customer_id`
                WHERE `account`.`id` = ?
                LIMIT 1;
            "}
            .trim()
        );
        assert_eq!(query.params.len(), 1);
    }
}
