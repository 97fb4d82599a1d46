pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Column label of a field in a join-qualified select, `<table>_<column>`.
///
/// Both the planner and the materializer go through this function, the two
/// sides are never cross-checked at runtime.
pub fn alias_of(table: &str, column: &str) -> String {
    let mut result = String::with_capacity(table.len() + column.len() + 1);
    result.push_str(&table.to_lowercase());
    result.push('_');
    result.push_str(column);
    result
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        format_args!(
            "{}{}",
            &$query[..$query
                .char_indices()
                .nth(497)
                .map(|(i, _)| i)
                .unwrap_or($query.len())]
                .trim_end(),
            if $query.chars().nth(497).is_some() {
                "..."
            } else {
                ""
            },
        )
    };
}

/// Logs the error and returns it.
#[macro_export]
macro_rules! log_error {
    ($error:expr) => {{
        let error = $error;
        ::log::error!("{:#}", error);
        error
    }};
}

/// Logs at the `FATAL` level understood by [`FileLogger`](crate::FileLogger).
///
/// The record goes through `log::error!` with a target prefixed by `fatal:`.
#[macro_export]
macro_rules! fatal {
    (target: $target:expr, $($arg:tt)+) => {
        ::log::error!(target: format!("fatal:{}", $target).as_str(), $($arg)+)
    };
    ($($arg:tt)+) => {
        ::log::error!(target: concat!("fatal:", module_path!()), $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separated() {
        let mut out = String::from("(");
        separated_by(&mut out, ["a", "", "b"], |out, v| out.push_str(v), ", ");
        out.push(')');
        assert_eq!(out, "(a, b)");
    }

    #[test]
    fn alias() {
        assert_eq!(alias_of("Account", "customer_id"), "account_customer_id");
    }

    #[test]
    fn truncate() {
        let long = "x".repeat(600);
        let truncated = format!("{}", truncate_long!(long));
        assert_eq!(truncated.len(), 500);
        assert!(truncated.ends_with("..."));
        assert_eq!(format!("{}", truncate_long!("short ")), "short");
    }
}
