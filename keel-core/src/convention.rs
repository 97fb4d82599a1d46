use convert_case::{Case, Casing};
use std::{borrow::Cow, fmt::Debug};

/// Naming rules used when a field does not declare its relation.
///
/// A field is a foreign key when its name contains the marker (`_id`) after at
/// least one character and it is not the primary key itself. The referenced
/// table is the token before the first underscore, so `shipping_address_id`
/// points to `shipping`. Declare the relation on the field, or pick a different
/// convention, when that is not what the schema means.
pub trait Convention: Send + Sync + Debug {
    fn marker(&self) -> &str {
        "_id"
    }

    fn primary_key_name(&self) -> &str {
        "id"
    }

    fn is_foreign_key(&self, field: &str) -> bool {
        field != self.primary_key_name() && field.match_indices(self.marker()).any(|(i, _)| i > 0)
    }

    fn target_table_of(&self, field: &str) -> Option<String> {
        if !self.is_foreign_key(field) {
            return None;
        }
        field
            .split('_')
            .next()
            .filter(|v| !v.is_empty())
            .map(str::to_lowercase)
    }

    fn table_name_of(&self, class: &str) -> String {
        class.to_lowercase()
    }

    /// Capitalizes the first letter of each word.
    fn class_name_of(&self, table: &str) -> String {
        let mut result = String::with_capacity(table.len());
        let mut word_start = true;
        for c in table.chars() {
            if word_start {
                result.extend(c.to_uppercase());
            } else {
                result.push(c);
            }
            word_start = c.is_whitespace();
        }
        result
    }
}

/// Lower-case table names and first-segment targets.
///
/// Single word names round trip between class and table, `OrderItem` does not
/// (it becomes `orderitem` and then `Orderitem`).
#[derive(Debug, Clone)]
pub struct DefaultConvention {
    pub marker: Cow<'static, str>,
    pub primary_key: Cow<'static, str>,
}

impl Default for DefaultConvention {
    fn default() -> Self {
        Self {
            marker: Cow::Borrowed("_id"),
            primary_key: Cow::Borrowed("id"),
        }
    }
}

impl Convention for DefaultConvention {
    fn marker(&self) -> &str {
        &self.marker
    }

    fn primary_key_name(&self) -> &str {
        &self.primary_key
    }
}

/// `OrderItem` maps to `order_item` and back.
///
/// A foreign key names its target by everything before a trailing marker:
/// `shipping_address_id` points to `shipping_address`.
#[derive(Default, Debug, Clone)]
pub struct SnakeCaseConvention {
    pub inner: DefaultConvention,
}

impl Convention for SnakeCaseConvention {
    fn marker(&self) -> &str {
        self.inner.marker()
    }

    fn primary_key_name(&self) -> &str {
        self.inner.primary_key_name()
    }

    fn target_table_of(&self, field: &str) -> Option<String> {
        if !self.is_foreign_key(field) {
            return None;
        }
        match field.strip_suffix(self.marker()) {
            Some(prefix) if !prefix.is_empty() => Some(prefix.to_lowercase()),
            _ => self.inner.target_table_of(field),
        }
    }

    fn table_name_of(&self, class: &str) -> String {
        class.to_case(Case::Snake)
    }

    fn class_name_of(&self, table: &str) -> String {
        table.to_case(Case::Pascal)
    }
}
