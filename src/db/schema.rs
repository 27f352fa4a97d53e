//! SQL DDL for the book table.
//! The service expects the table to exist; this is used by tests and local setups.

/// Postgres schema:
/// - `isbn` fixed-width primary key
/// - `price` two fractional digits
pub const POSTGRES_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS books (
    isbn CHAR(14) PRIMARY KEY,
    title VARCHAR(255),
    author VARCHAR(255),
    price DECIMAL(5, 2)
);
"#;
