#[cfg(test)]
mod tests {
    use indoc::indoc;
    use keel_core::{
        Binding, Context, DynamicRecord, EntityDef, ErrorKind, FieldDef, GenericSqlWriter, Planner,
        Query, Registry, SqlWriter, Statement, Value,
    };
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use time::macros::date;

    const WRITER: GenericSqlWriter = GenericSqlWriter::new();

    struct Shop {
        registry: Registry,
        customer: Arc<EntityDef>,
        account: Arc<EntityDef>,
        order: Arc<EntityDef>,
    }

    fn shop() -> Shop {
        let customer = EntityDef::builder("Customer")
            .field(FieldDef::new("id", Value::Int64(None)))
            .field(FieldDef::new("name", Value::Varchar(None)))
            .field(FieldDef::new("email", Value::Varchar(None)).nullable())
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
            .register_def(customer.clone())
            .register_def(account.clone())
            .register_def(order.clone());
        Shop {
            registry,
            customer,
            account,
            order,
        }
    }

    fn ada(shop: &Shop) -> DynamicRecord {
        DynamicRecord::new(shop.customer.clone())
            .with("name", "Ada")
            .unwrap()
            .with("email", "ada@example.com")
            .unwrap()
    }

    fn render(statement: impl Into<Statement>) -> String {
        WRITER.render(&statement.into(), Binding::Inline).sql
    }

    #[test]
    fn insert_without_relations() {
        let shop = shop();
        let planner = Planner::new(&shop.registry);
        let record = DynamicRecord::new(shop.customer.clone())
            .with("name", "Grace")
            .unwrap();
        let plan = planner.plan_insert(&record).expect("Could not plan the insert");
        assert_eq!(plan.len(), 1);
        // Primary key excluded
        assert_eq!(plan.statements[0].values.len(), 2);
        let queries = WRITER.render_plan(&plan, Binding::Inline);
        assert_eq!(
            queries[0].sql,
            r#"INSERT INTO "customer" ("name", "email") VALUES ('Grace', NULL) ON CONFLICT DO NOTHING;"#
        );
    }

    #[test]
    fn insert_account_with_customer() {
        let shop = shop();
        let planner = Planner::new(&shop.registry);
        let account = DynamicRecord::new(shop.account.clone())
            .with("number", "ACC-1")
            .unwrap()
            .with_related("customer_id", ada(&shop))
            .unwrap();
        let plan = planner
            .plan_insert(&account)
            .expect("Could not plan the insert");
        assert_eq!(plan.len(), 2);
        let queries = WRITER.render_plan(&plan, Binding::Inline);
        assert_eq!(
            queries[0].sql,
            r#"INSERT INTO "customer" ("name", "email") VALUES ('Ada', 'ada@example.com') ON CONFLICT DO NOTHING;"#
        );
        assert_eq!(
            queries[1].sql,
            indoc! {r#"
                INSERT INTO "account" ("number", "customer_id") VALUES ('ACC-1', (SELECT "id" FROM "customer" WHERE "name" = 'Ada' AND "email" = 'ada@example.com')) ON CONFLICT DO NOTHING;
            "#}
            .trim()
        );
    }

    #[test]
    fn insert_three_levels() {
        let shop = shop();
        let planner = Planner::new(&shop.registry).with_schema("shop");
        let customer = DynamicRecord::new(shop.customer.clone())
            .with("name", "Ada")
            .unwrap();
        let account = DynamicRecord::new(shop.account.clone())
            .with("number", "ACC-1")
            .unwrap()
            .with_related("customer_id", customer)
            .unwrap();
        let order = DynamicRecord::new(shop.order.clone())
            .with("total", Decimal::new(1250, 2))
            .unwrap()
            .with_related("account_id", account)
            .unwrap();
        let plan = planner.plan_insert(&order).expect("Could not plan the insert");
        let tables: Vec<_> = plan
            .statements
            .iter()
            .map(|v| v.table.name.to_string())
            .collect();
        assert_eq!(tables, ["customer", "account", "order"]);
        let queries = WRITER.render_plan(&plan, Binding::Inline);
        assert_eq!(
            queries[2].sql,
            indoc! {r#"
                INSERT INTO "shop"."order" ("total", "account_id") VALUES (12.50, (SELECT "id" FROM "shop"."account" WHERE "number" = 'ACC-1' AND "customer_id" = (SELECT "id" FROM "shop"."customer" WHERE "name" = 'Ada'))) ON CONFLICT DO NOTHING;
            "#}
            .trim()
        );
    }

    #[test]
    fn insert_with_bound_parameters() {
        let shop = shop();
        let planner = Planner::new(&shop.registry);
        let account = DynamicRecord::new(shop.account.clone())
            .with("number", "ACC-1")
            .unwrap()
            .with_related("customer_id", ada(&shop))
            .unwrap();
        let plan = planner.plan_insert(&account).unwrap();
        let queries = WRITER.render_plan(&plan, Binding::Parameters);
        assert_eq!(
            queries[1],
            Query::new(
                r#"INSERT INTO "account" ("number", "customer_id") VALUES (?, (SELECT "id" FROM "customer" WHERE "name" = ? AND "email" = ?)) ON CONFLICT DO NOTHING;"#,
                vec![
                    Value::Varchar(Some("ACC-1".into())),
                    Value::Varchar(Some("Ada".into())),
                    Value::Varchar(Some("ada@example.com".into())),
                ],
            )
        );
    }

    #[test]
    fn insert_foreign_key_as_key() {
        let shop = shop();
        let planner = Planner::new(&shop.registry);
        let account = DynamicRecord::new(shop.account.clone())
            .with("number", "ACC-2")
            .unwrap()
            .with("customer_id", 3)
            .unwrap();
        let plan = planner.plan_insert(&account).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(
            WRITER.render_plan(&plan, Binding::Inline)[0].sql,
            r#"INSERT INTO "account" ("number", "customer_id") VALUES ('ACC-2', 3) ON CONFLICT DO NOTHING;"#
        );
    }

    #[test]
    fn lookup_of_empty_record() {
        let shop = shop();
        let planner = Planner::new(&shop.registry);
        let account = DynamicRecord::new(shop.account.clone())
            .with("number", "ACC-3")
            .unwrap()
            .with_related("customer_id", DynamicRecord::new(shop.customer.clone()))
            .unwrap();
        let error = planner
            .plan_insert(&account)
            .expect_err("The customer cannot be looked up");
        assert!(format!("{:#}", error).contains("every field of the record is empty"));
    }

    #[test]
    fn unregistered_record() {
        let registry = Registry::new();
        let planner = Planner::new(&registry);
        let widget = EntityDef::builder("Widget")
            .field(FieldDef::new("id", Value::Int32(None)))
            .build();
        let error = planner
            .plan_insert(&DynamicRecord::new(widget))
            .expect_err("Widget is not registered");
        assert_eq!(
            ErrorKind::of(&error),
            Some(&ErrorKind::UnknownEntity("widget".into()))
        );
    }

    #[test]
    fn select_by_id_joins_every_level() {
        let shop = shop();
        let planner = Planner::new(&shop.registry);
        let select = planner
            .select_by_id(&shop.order, Value::Int64(Some(7)))
            .expect("Could not plan the select");
        assert_eq!(
            render(select),
            indoc! {r#"
                SELECT "order"."id" AS "order_id", "order"."total" AS "order_total", "account"."id" AS "account_id", "account"."number" AS "account_number", "customer"."id" AS "customer_id", "customer"."name" AS "customer_name", "customer"."email" AS "customer_email"
                FROM "order"
                INNER JOIN "account" ON "account"."id" = "order"."account_id"
                INNER JOIN "customer" ON "customer"."id" = "account"."customer_id"
                WHERE "order"."id" = 7
                LIMIT 1;
            "#}
            .trim()
        );
    }

    #[test]
    fn plain_columns() {
        let shop = shop();
        let planner = Planner::new(&shop.registry);
        let columns = planner
            .select_columns(&shop.account, false)
            .expect("Could not list the columns");
        let names: Vec<_> = columns
            .iter()
            .map(|v| format!("{}.{}", v.column.table, v.column.name))
            .collect();
        assert_eq!(
            names,
            [
                "account.id",
                "account.number",
                "customer.id",
                "customer.name",
                "customer.email"
            ]
        );
        assert!(columns.iter().all(|v| v.alias.is_none()));
    }

    #[test]
    fn select_by_property() {
        let shop = shop();
        let planner = Planner::new(&shop.registry).with_schema("shop");
        let simple = planner
            .select_by_property(&shop.customer, "name", "Ada".into(), true)
            .unwrap();
        assert_eq!(
            render(simple),
            indoc! {r#"
                SELECT *
                FROM "shop"."customer"
                WHERE "name" = 'Ada';
            "#}
            .trim()
        );
        let joined = planner
            .select_by_property(&shop.account, "number", "ACC-1".into(), false)
            .unwrap();
        assert_eq!(
            render(joined),
            indoc! {r#"
                SELECT "shop"."account"."id" AS "account_id", "shop"."account"."number" AS "account_number", "shop"."customer"."id" AS "customer_id", "shop"."customer"."name" AS "customer_name", "shop"."customer"."email" AS "customer_email"
                FROM "shop"."account"
                INNER JOIN "shop"."customer" ON "shop"."customer"."id" = "shop"."account"."customer_id"
                WHERE "shop"."account"."number" = 'ACC-1';
            "#}
            .trim()
        );
        let null = planner
            .select_by_property(&shop.customer, "email", Value::Varchar(None), true)
            .unwrap();
        assert!(render(null).ends_with(r#"WHERE "email" IS NULL;"#));
        let error = planner
            .select_by_property(&shop.customer, "nickname", "Ada".into(), true)
            .expect_err("There is no nickname");
        assert_eq!(
            ErrorKind::of(&error),
            Some(&ErrorKind::UnknownField {
                entity: "Customer".into(),
                field: "nickname".into(),
            })
        );
    }

    #[test]
    fn select_all_and_delete() {
        let shop = shop();
        let planner = Planner::new(&shop.registry);
        assert_eq!(
            render(planner.select_all(&shop.customer)),
            "SELECT *\nFROM \"customer\";"
        );
        let delete = planner
            .delete_by_id(&shop.customer, Value::Int64(Some(5)))
            .unwrap();
        assert_eq!(render(delete), "DELETE FROM \"customer\"\nWHERE \"id\" = 5;");
    }

    #[test]
    fn declared_relations() {
        let customer = EntityDef::builder("Customer")
            .field(FieldDef::new("id", Value::Int64(None)))
            .field(FieldDef::new("external_id", Value::Varchar(None)).scalar())
            .build();
        let invoice = EntityDef::builder("Invoice")
            .field(FieldDef::new("id", Value::Int64(None)))
            .field(FieldDef::new("billed_to", Value::Int64(None)).references_table("customer"))
            .build();
        let mut registry = Registry::new();
        registry.register_def(customer).register_def(invoice.clone());
        let planner = Planner::new(&registry);
        let select = planner
            .select_by_id(&invoice, Value::Int64(Some(1)))
            .unwrap();
        assert_eq!(
            render(select),
            indoc! {r#"
                SELECT "invoice"."id" AS "invoice_id", "customer"."id" AS "customer_id", "customer"."external_id" AS "customer_external_id"
                FROM "invoice"
                INNER JOIN "customer" ON "customer"."id" = "invoice"."billed_to"
                WHERE "invoice"."id" = 1
                LIMIT 1;
            "#}
            .trim()
        );
    }

    #[test]
    fn unknown_target() {
        let gadget = EntityDef::builder("Gadget")
            .field(FieldDef::new("id", Value::Int64(None)))
            .field(FieldDef::new("widget_id", Value::Int64(None)))
            .build();
        let mut registry = Registry::new();
        registry.register_def(gadget.clone());
        let error = Planner::new(&registry)
            .select_by_id(&gadget, Value::Int64(Some(1)))
            .expect_err("Widget is not registered");
        assert_eq!(
            ErrorKind::of(&error),
            Some(&ErrorKind::UnknownEntity("widget".into()))
        );
        assert!(format!("{:#}", error).contains("field `widget_id`"));
    }

    #[test]
    fn cyclic_relation() {
        let employee = EntityDef::builder("Employee")
            .field(FieldDef::new("id", Value::Int64(None)))
            .field(FieldDef::new("manager_id", Value::Int64(None)).references_table("employee"))
            .build();
        let mut registry = Registry::new();
        registry.register_def(employee.clone());
        let error = Planner::new(&registry)
            .select_by_id(&employee, Value::Int64(Some(1)))
            .expect_err("The relation never ends");
        assert_eq!(
            ErrorKind::of(&error),
            Some(&ErrorKind::CyclicRelation("employee -> employee".into()))
        );
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
        let planner = Planner::new(&registry);
        let select = planner
            .select_by_id(&order, Value::Int64(Some(7)))
            .expect("Could not plan the select");
        assert_eq!(
            render(select),
            indoc! {r#"
                SELECT "order"."id" AS "order_id", "account"."id" AS "account_id", "customer"."id" AS "customer_id", "customer"."name" AS "customer_name", "customer_2"."id" AS "customer_2_id", "customer_2"."name" AS "customer_2_name"
                FROM "order"
                INNER JOIN "account" ON "account"."id" = "order"."account_id"
                INNER JOIN "customer" ON "customer"."id" = "account"."customer_id"
                INNER JOIN "customer" "customer_2" ON "customer_2"."id" = "order"."customer_id"
                WHERE "order"."id" = 7
                LIMIT 1;
            "#}
            .trim()
        );
    }

    #[test]
    fn non_finite_floats_bound() {
        let mut context = Context::new(true, Binding::Inline);
        let mut out = String::new();
        for value in [
            Value::Float64(Some(1.5)),
            Value::Float64(Some(f64::INFINITY)),
            Value::Float32(Some(f32::NEG_INFINITY)),
        ] {
            if !out.is_empty() {
                out.push_str(", ");
            }
            WRITER.write_value(&mut context, &mut out, &value);
        }
        assert_eq!(out, "1.5, ?, ?");
        assert_eq!(
            context.params,
            [
                Value::Float64(Some(f64::INFINITY)),
                Value::Float64(Some(f64::NEG_INFINITY)),
            ]
        );
    }

    #[test]
    fn qualification_restored() {
        let mut context = Context::new(true, Binding::Inline);
        {
            let mut inner = context.qualify(false);
            assert!(!inner.qualify_columns);
            let nested = inner.qualify(true);
            assert!(nested.qualify_columns);
        }
        assert!(context.qualify_columns);
    }

    #[test]
    fn inline_values() {
        let mut context = Context::new(true, Binding::Inline);
        let mut out = String::new();
        for value in [
            Value::Int32(Some(-5)),
            Value::Boolean(Some(true)),
            Value::Varchar(Some("it's".into())),
            Value::Decimal(Some(Decimal::new(1250, 2))),
            Value::Date(Some(date!(2024 - 01 - 05))),
            Value::Blob(Some(vec![1, 171].into())),
            Value::Float64(None),
        ] {
            if !out.is_empty() {
                out.push_str(", ");
            }
            WRITER.write_value(&mut context, &mut out, &value);
        }
        assert_eq!(out, "-5, true, 'it''s', 12.50, '2024-01-05', X'01AB', NULL");
        assert!(context.params.is_empty());
    }
}
