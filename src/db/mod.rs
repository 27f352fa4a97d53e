//! Database module: the book table, its storage backends and the capability
//! traits the HTTP layer depends on.
//!
//! Layout:
//! - `models.rs`: the `Book` row, also the JSON wire shape
//! - `schema.rs`: SQL DDL for the `books` table
//! - `postgres.rs`: sqlx-backed storage
//! - `memory.rs`: in-process storage for tests and local runs

pub mod memory;
pub mod models;
pub mod postgres;
pub mod schema;

use async_trait::async_trait;

use crate::error::BookstoreError;

pub use memory::InMemoryBookStore;
pub use models::Book;
pub use postgres::{PgBookStorage, connect_lazy};
pub use schema::POSTGRES_INIT;

#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Every row, in whatever order the backend yields them.
    async fn list_all(&self) -> Result<Vec<Book>, BookstoreError>;
    /// Point lookup by primary key. Zero rows is [`BookstoreError::NotFound`].
    async fn get_by_isbn(&self, isbn: &str) -> Result<Book, BookstoreError>;
    /// Insert as-is; duplicates and constraint violations are errors.
    async fn create(&self, book: &Book) -> Result<(), BookstoreError>;
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check_connection(&self) -> Result<(), BookstoreError>;
}
