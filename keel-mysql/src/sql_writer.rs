use keel_core::{Context, SqlWriter};

/// MySQL flavour: backtick identifiers, backslash aware string literals, `INSERT IGNORE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlSqlWriter;

impl MySqlSqlWriter {
    pub const fn new() -> Self {
        Self
    }
}

impl SqlWriter for MySqlSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn write_identifier_quoted(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('`');
        self.write_escaped(context, out, value, '`', "``");
        out.push('`');
    }

    fn write_value_string(&self, _context: &mut Context, out: &mut String, value: &str) {
        out.push('\'');
        for c in value.chars() {
            match c {
                '\'' => out.push_str("''"),
                '\\' => out.push_str("\\\\"),
                _ => out.push(c),
            }
        }
        out.push('\'');
    }

    fn write_insert_into(&self, _context: &mut Context, out: &mut String, ignore: bool) {
        out.push_str(if ignore {
            "INSERT IGNORE INTO "
        } else {
            "INSERT INTO "
        });
    }

    fn write_insert_ignore_suffix(&self, _context: &mut Context, _out: &mut String) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_core::Binding;

    #[test]
    fn quoting() {
        let writer = MySqlSqlWriter::new();
        let mut context = Context::new(true, Binding::Inline);
        let mut out = String::new();
        writer.write_identifier_quoted(&mut context, &mut out, "odd`name");
        out.push(' ');
        writer.write_value_string(&mut context, &mut out, r"it's C:\dir");
        assert_eq!(out, r"`odd``name` 'it''s C:\\dir'");
    }
}
