#[cfg(test)]
mod tests {
    use keel_core::{
        DynamicRecord, EntityDef, ErrorKind, FieldDef, FieldRole, Registry, SnakeCaseConvention,
        Value, describe,
    };

    fn customer() -> std::sync::Arc<EntityDef> {
        EntityDef::builder("Customer")
            .field(FieldDef::new("id", Value::Int64(None)))
            .field(FieldDef::new("name", Value::Varchar(None)))
            .build()
    }

    #[test]
    fn lookup_by_name() {
        let mut registry = Registry::new();
        registry.register_def(customer());
        assert!(registry.contains("customer"));
        assert!(registry.contains("Customer"));
        assert_eq!(registry.get("Customer").unwrap().name, "Customer");
        let error = registry.get("widget").expect_err("Widget is not registered");
        assert_eq!(
            ErrorKind::of(&error),
            Some(&ErrorKind::UnknownEntity("widget".into()))
        );
        assert_eq!(registry.entities().count(), 1);
    }

    #[test]
    fn primary_key_from_convention() {
        let def = EntityDef::builder("Tag")
            .field(FieldDef::new("label", Value::Varchar(None)))
            .field(FieldDef::new("id", Value::Int32(None)))
            .build();
        assert_eq!(def.primary_key().map(|f| f.name()), Some("id"));
        let mut registry = Registry::new();
        registry.register_def(EntityDef {
            fields: vec![
                FieldDef::new("code", Value::Varchar(None)),
                FieldDef::new("id", Value::Int32(None)),
            ],
            ..(*def).clone()
        });
        let tag = registry.get("tag").unwrap();
        assert_eq!(tag.primary_key().map(|f| f.name()), Some("id"));
    }

    #[test]
    fn roles() {
        let account = EntityDef::builder("Account")
            .field(FieldDef::new("id", Value::Int64(None)))
            .field(FieldDef::new("number", Value::Varchar(None)))
            .field(FieldDef::new("customer_id", Value::Int64(None)))
            .build();
        let mut registry = Registry::new();
        registry.register_def(customer()).register_def(account.clone());
        let record = DynamicRecord::new(account)
            .with("number", "ACC-1")
            .unwrap()
            .with("customer_id", 1i64)
            .unwrap();
        let descriptor = describe(&record, &registry).expect("Could not describe the account");
        let names: Vec<_> = descriptor.entries.iter().map(|e| e.field.name()).collect();
        assert_eq!(names, ["id", "number", "customer_id"]);
        let roles: Vec<_> = descriptor
            .entries
            .iter()
            .map(|e| e.role.is_foreign_key())
            .collect();
        assert_eq!(roles, [false, false, true]);
        let FieldRole::ForeignKey(target) = &descriptor.entries[2].role else {
            unreachable!()
        };
        assert_eq!(target.table_name(), "customer");
        assert_eq!(
            descriptor.primary_key().map(|e| e.field.name()),
            Some("id")
        );
        assert_eq!(descriptor.insertable().count(), 2);
    }

    #[test]
    fn snake_case_registry() {
        let item = EntityDef::builder("OrderItem")
            .table("order_item")
            .field(FieldDef::new("id", Value::Int64(None)))
            .build();
        let line = EntityDef::builder("Line")
            .field(FieldDef::new("id", Value::Int64(None)))
            .field(FieldDef::new("order_item_id", Value::Int64(None)))
            .build();
        let mut registry = Registry::with_convention(SnakeCaseConvention::default());
        registry.register_def(item).register_def(line.clone());
        assert!(registry.contains("OrderItem"));
        let role = registry
            .resolve_role(&line, &line.fields[1])
            .expect("The target is registered");
        assert!(matches!(role, FieldRole::ForeignKey(ref v) if v.table_name() == "order_item"));
    }
}
