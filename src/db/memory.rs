//! In-memory book storage.
//!
//! Backed by a `BTreeMap` keyed on ISBN behind a `tokio::sync::RwLock`, so
//! listings come back sorted by ISBN. Duplicate inserts fail the same way a
//! primary key violation would. Not durable.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::db::{Book, BookRepository, HealthCheck};
use crate::error::BookstoreError;

pub struct InMemoryBookStore {
    books: RwLock<BTreeMap<String, Book>>,
    healthy: AtomicBool,
}

impl Default for InMemoryBookStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self {
            books: RwLock::new(BTreeMap::new()),
            healthy: AtomicBool::new(true),
        }
    }

    pub fn with_books(books: impl IntoIterator<Item = Book>) -> Self {
        let books = books
            .into_iter()
            .map(|book| (book.isbn.clone(), book))
            .collect();
        Self {
            books: RwLock::new(books),
            healthy: AtomicBool::new(true),
        }
    }

    /// Make subsequent health checks succeed or fail.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.books.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.books.read().await.is_empty()
    }
}

#[async_trait]
impl BookRepository for InMemoryBookStore {
    async fn list_all(&self) -> Result<Vec<Book>, BookstoreError> {
        Ok(self.books.read().await.values().cloned().collect())
    }

    async fn get_by_isbn(&self, isbn: &str) -> Result<Book, BookstoreError> {
        self.books
            .read()
            .await
            .get(isbn)
            .cloned()
            .ok_or_else(|| BookstoreError::NotFound(isbn.to_string()))
    }

    async fn create(&self, book: &Book) -> Result<(), BookstoreError> {
        let mut books = self.books.write().await;
        if books.contains_key(&book.isbn) {
            return Err(BookstoreError::DatabaseError(sqlx::Error::Protocol(format!(
                "duplicate key value violates unique constraint \"books_pkey\" ({})",
                book.isbn
            ))));
        }
        books.insert(book.isbn.clone(), book.clone());
        Ok(())
    }
}

#[async_trait]
impl HealthCheck for InMemoryBookStore {
    async fn check_connection(&self) -> Result<(), BookstoreError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BookstoreError::DatabaseError(sqlx::Error::PoolClosed))
        }
    }
}
