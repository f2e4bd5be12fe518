//! Syntactic validation of generated SQL.
//!
//! Verification only: the text is parsed with the PostgreSQL dialect and
//! the resulting AST is discarded. The generated output is never rewritten
//! here.

use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ValidateError(String);

/// Check that `sql` is well-formed PostgreSQL; returns the statement count.
pub fn check(sql: &str) -> Result<usize, ValidateError> {
    Parser::parse_sql(&PostgreSqlDialect {}, sql)
        .map(|statements| statements.len())
        .map_err(|e| ValidateError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_ddl() {
        let count = check(
            "CREATE TABLE IF NOT EXISTS users (id BIGINT NOT NULL PRIMARY KEY, username TEXT);\n\
             DROP TABLE IF EXISTS users CASCADE;",
        )
        .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_check_constraint_parses() {
        check("CREATE TABLE products (price NUMERIC CHECK (price >= 0.000000 AND price <= 100000.000000));")
            .unwrap();
    }

    #[test]
    fn test_malformed_sql_is_rejected() {
        assert!(check("CREATE TABLE (((").is_err());
    }
}
