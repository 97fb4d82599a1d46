#[cfg(test)]
mod tests {
    use keel_core::{
        DynamicRecord, EntityDef, ErrorKind, FieldDef, FieldValue, MaterializeOptions,
        Materializer, Planner, Record, Registry, RowLabeled, Shape, Value,
    };
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn registry() -> (Registry, Arc<EntityDef>, Arc<EntityDef>) {
        let customer = EntityDef::builder("Customer")
            .field(FieldDef::new("id", Value::Int64(None)))
            .field(FieldDef::new("name", Value::Varchar(None)))
            .build();
        let account = EntityDef::builder("Account")
            .field(FieldDef::new("id", Value::Int64(None)))
            .field(FieldDef::new("number", Value::Varchar(None)))
            .field(FieldDef::new("customer_id", Value::Int64(None)))
            .build();
        let order = EntityDef::builder("Order")
            .field(FieldDef::new("id", Value::Int64(None)))
            .field(FieldDef::new("total", Value::Decimal(None)))
            .field(FieldDef::new("account_id", Value::Int64(None)))
            .build();
        let mut registry = Registry::new();
        registry
            .register_def(customer)
            .register_def(account.clone())
            .register_def(order.clone());
        (registry, account, order)
    }

    fn joined_row() -> RowLabeled {
        RowLabeled::from_iter([
            ("order_id", Value::Int64(Some(7))),
            ("order_total", Value::Decimal(Some(Decimal::new(1250, 2)))),
            ("account_id", Value::Int64(Some(3))),
            ("account_number", Value::Varchar(Some("ACC-1".into()))),
            ("customer_id", Value::Int64(Some(1))),
            ("customer_name", Value::Varchar(Some("Ada".into()))),
        ])
    }

    fn dynamic(record: &dyn Record) -> &DynamicRecord {
        record
            .as_any()
            .downcast_ref::<DynamicRecord>()
            .expect("Expected a dynamic record")
    }

    #[test]
    fn order_with_account() {
        let (registry, _, order) = registry();
        let record = Materializer::new(&registry)
            .materialize(&order, Shape::Joined, &[joined_row()])
            .expect("Could not materialize the order");
        assert_eq!(record.definition().name, "Order");
        let order = dynamic(record.as_ref());
        assert_eq!(order.value("id"), Some(&Value::Int64(Some(7))));
        assert_eq!(
            order.value("total"),
            Some(&Value::Decimal(Some(Decimal::new(1250, 2))))
        );
        let account = dynamic(order.related("account_id").expect("Account is nested"));
        assert_eq!(account.definition().name, "Account");
        assert_eq!(account.value("id"), Some(&Value::Int64(Some(3))));
        assert_eq!(
            account.value("number"),
            Some(&Value::Varchar(Some("ACC-1".into())))
        );
        let customer = account.related("customer_id").expect("Customer is nested");
        assert!(matches!(
            customer.get("name"),
            Ok(FieldValue::Value(Value::Varchar(Some(ref v)))) if v == "Ada"
        ));
    }

    #[test]
    fn first_row_wins() {
        let (registry, _, order) = registry();
        let mut second = joined_row();
        second.values[0] = Value::Int64(Some(8));
        let record = Materializer::new(&registry)
            .materialize(&order, Shape::Joined, &[joined_row(), second.clone()])
            .unwrap();
        assert_eq!(
            dynamic(record.as_ref()).value("id"),
            Some(&Value::Int64(Some(7)))
        );
        let all = Materializer::new(&registry)
            .materialize_all(&order, Shape::Joined, &[joined_row(), second])
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(
            dynamic(all[1].as_ref()).value("id"),
            Some(&Value::Int64(Some(8)))
        );
    }

    #[test]
    fn empty_result() {
        let (registry, _, order) = registry();
        let error = Materializer::new(&registry)
            .materialize(&order, Shape::Joined, &[])
            .expect_err("There is no row");
        assert_eq!(
            ErrorKind::of(&error),
            Some(&ErrorKind::EmptyResult {
                table: "order".into()
            })
        );
        let all = Materializer::new(&registry)
            .materialize_all(&order, Shape::Joined, &[])
            .unwrap();
        assert!(all.is_empty());
    }

    #[test]
    fn shallow_keeps_keys() {
        let (registry, account, _) = registry();
        let row = RowLabeled::from_iter([
            ("id", Value::Int64(Some(3))),
            ("number", Value::Varchar(Some("ACC-1".into()))),
            ("customer_id", Value::Int64(Some(1))),
        ]);
        let record = Materializer::new(&registry)
            .materialize(&account, Shape::Shallow, &[row])
            .unwrap();
        let account = dynamic(record.as_ref());
        assert_eq!(account.value("customer_id"), Some(&Value::Int64(Some(1))));
        assert!(account.related("customer_id").is_none());
    }

    #[test]
    fn primary_key_not_assigned() {
        let (registry, _, order) = registry();
        let record = Materializer::new(&registry)
            .with_options(MaterializeOptions {
                assign_primary_key: false,
            })
            .materialize(&order, Shape::Joined, &[joined_row()])
            .unwrap();
        let order = dynamic(record.as_ref());
        assert_eq!(order.value("id"), Some(&Value::Int64(None)));
        let account = dynamic(order.related("account_id").unwrap());
        assert_eq!(account.value("id"), Some(&Value::Int64(None)));
    }

    #[test]
    fn missing_column() {
        let (registry, account, _) = registry();
        let row = RowLabeled::from_iter([("account_id", Value::Int64(Some(3)))]);
        let error = Materializer::new(&registry)
            .materialize(&account, Shape::Joined, &[row])
            .expect_err("The number is missing");
        assert!(format!("{:#}", error).contains("`account_number`"));
    }

    #[test]
    fn unknown_field() {
        let (_, account, _) = registry();
        let mut record = DynamicRecord::new(account);
        let error = record
            .set("balance", Value::Int32(Some(1)))
            .expect_err("Account has no balance");
        assert_eq!(
            ErrorKind::of(&error),
            Some(&ErrorKind::UnknownField {
                entity: "Account".into(),
                field: "balance".into(),
            })
        );
        assert!(record.get("balance").is_err());
    }

    /// Scalar values of `record` and of its nested records, in field order.
    fn flatten(record: &dyn Record, out: &mut Vec<Value>) {
        for field in &record.definition().fields {
            match record.get(&field.name).expect("Field is readable") {
                FieldValue::Value(v) => out.push(v),
                FieldValue::Record(nested) => flatten(nested, out),
            }
        }
    }

    #[test]
    fn planned_labels_read_back() {
        let (registry, account, order) = registry();
        let customer = DynamicRecord::new(registry.get("Customer").unwrap())
            .with("id", 1_i64)
            .unwrap()
            .with("name", "Ada")
            .unwrap();
        let account = DynamicRecord::new(account)
            .with("id", 3_i64)
            .unwrap()
            .with("number", "ACC-1")
            .unwrap()
            .with_related("customer_id", customer)
            .unwrap();
        let source = DynamicRecord::new(order.clone())
            .with("id", 7_i64)
            .unwrap()
            .with("total", Decimal::new(1250, 2))
            .unwrap()
            .with_related("account_id", account)
            .unwrap();
        let mut values = Vec::new();
        flatten(&source, &mut values);
        let columns = Planner::new(&registry)
            .select_columns(&order, true)
            .unwrap();
        assert_eq!(columns.len(), values.len());
        let row = RowLabeled::from_iter(
            columns
                .into_iter()
                .map(|v| v.alias.expect("Aliased column"))
                .zip(values.iter().cloned()),
        );
        let record = Materializer::new(&registry)
            .materialize(&order, Shape::Joined, &[row])
            .expect("Could not materialize the order");
        let mut read = Vec::new();
        flatten(record.as_ref(), &mut read);
        assert_eq!(read, values);
    }

    #[test]
    fn table_reached_twice() {
        let customer = EntityDef::builder("Customer")
            .field(FieldDef::new("id", Value::Int64(None)))
            .field(FieldDef::new("name", Value::Varchar(None)))
            .build();
        let account = EntityDef::builder("Account")
            .field(FieldDef::new("id", Value::Int64(None)))
            .field(FieldDef::new("customer_id", Value::Int64(None)))
            .build();
        let order = EntityDef::builder("Order")
            .field(FieldDef::new("id", Value::Int64(None)))
            .field(FieldDef::new("account_id", Value::Int64(None)))
            .field(FieldDef::new("customer_id", Value::Int64(None)))
            .build();
        let mut registry = Registry::new();
        registry
            .register_def(customer)
            .register_def(account)
            .register_def(order.clone());
        let row = RowLabeled::from_iter([
            ("order_id", Value::Int64(Some(7))),
            ("account_id", Value::Int64(Some(3))),
            ("customer_id", Value::Int64(Some(1))),
            ("customer_name", Value::Varchar(Some("Ada".into()))),
            ("customer_2_id", Value::Int64(Some(2))),
            ("customer_2_name", Value::Varchar(Some("Grace".into()))),
        ]);
        let record = Materializer::new(&registry)
            .materialize(&order, Shape::Joined, &[row])
            .expect("Could not materialize the order");
        let order = dynamic(record.as_ref());
        let owner = dynamic(
            dynamic(order.related("account_id").unwrap())
                .related("customer_id")
                .unwrap(),
        );
        assert_eq!(owner.value("name"), Some(&Value::Varchar(Some("Ada".into()))));
        let buyer = dynamic(order.related("customer_id").unwrap());
        assert_eq!(buyer.value("id"), Some(&Value::Int64(Some(2))));
        assert_eq!(
            buyer.value("name"),
            Some(&Value::Varchar(Some("Grace".into())))
        );
    }
}
