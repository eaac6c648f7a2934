//! Defines the `Dialect` trait for warehouse-specific SQL syntax.

pub trait Dialect: Send + Sync {
    /// Wraps an identifier (like a table or column name) in the correct
    /// quotation marks for the dialect.
    fn quote_identifier(&self, ident: &str) -> String;

    /// Renders a string literal, escaping embedded quotes.
    fn quote_literal(&self, value: &str) -> String;
}

#[derive(Debug, Clone)]
pub struct Redshift;

impl Dialect for Redshift {
    fn quote_identifier(&self, ident: &str) -> String {
        format!(r#""{}""#, ident.replace('"', "\"\""))
    }

    fn quote_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(Redshift.quote_identifier("time"), r#""time""#);
        assert_eq!(Redshift.quote_identifier(r#"we"ird"#), r#""we""ird""#);
    }

    #[test]
    fn test_quote_literal_escapes_quotes() {
        assert_eq!(Redshift.quote_literal("s3://bucket/log"), "'s3://bucket/log'");
        assert_eq!(Redshift.quote_literal("it's"), "'it''s'");
    }
}
