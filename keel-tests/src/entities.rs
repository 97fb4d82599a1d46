use keel::{Entity, Reference};
use rust_decimal::Decimal;

#[derive(Entity, Default, Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Entity, Default, Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub number: String,
    pub customer_id: Reference<Customer>,
}

/// Order of an account, its table is `order` (quoted, it is a keyword).
#[derive(Entity, Default, Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub total: Decimal,
    pub account_id: Reference<Account>,
}

impl Customer {
    pub fn new(name: &str, email: Option<&str>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            email: email.map(Into::into),
        }
    }
}

impl Account {
    pub fn new(number: &str, customer: Customer) -> Self {
        Self {
            id: 0,
            number: number.into(),
            customer_id: customer.into(),
        }
    }
}

impl Order {
    pub fn new(total: Decimal, account: Account) -> Self {
        Self {
            id: 0,
            total,
            account_id: account.into(),
        }
    }
}
