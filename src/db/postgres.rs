use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::db::schema::POSTGRES_INIT;
use crate::db::{Book, BookRepository, HealthCheck};
use crate::error::BookstoreError;

/// Build the shared pool without opening a connection. The first query
/// connects, so an unreachable database shows up in the health probes rather
/// than at startup.
pub fn connect_lazy(cfg: &DatabaseConfig) -> Result<PgPool, BookstoreError> {
    Ok(PgPoolOptions::new().connect_lazy_with(cfg.connect_options()?))
}

#[derive(Clone)]
pub struct PgBookStorage {
    pool: PgPool,
}

impl PgBookStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), BookstoreError> {
        for stmt in POSTGRES_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl BookRepository for PgBookStorage {
    async fn list_all(&self) -> Result<Vec<Book>, BookstoreError> {
        let books = sqlx::query_as::<_, Book>("SELECT isbn, title, author, price FROM books")
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn get_by_isbn(&self, isbn: &str) -> Result<Book, BookstoreError> {
        sqlx::query_as::<_, Book>(
            "SELECT isbn, title, author, price FROM books WHERE isbn = $1",
        )
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| BookstoreError::NotFound(isbn.to_string()))
    }

    async fn create(&self, book: &Book) -> Result<(), BookstoreError> {
        sqlx::query("INSERT INTO books (isbn, title, author, price) VALUES ($1, $2, $3, $4)")
            .bind(&book.isbn)
            .bind(&book.title)
            .bind(&book.author)
            .bind(book.price)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl HealthCheck for PgBookStorage {
    async fn check_connection(&self) -> Result<(), BookstoreError> {
        let _: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
