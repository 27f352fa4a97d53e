use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::normalize_path::NormalizePath;

use crate::db::{BookRepository, HealthCheck};
use crate::handlers::{
    books::{book_by_isbn, books_index, create_book},
    health::health_handler,
};

#[derive(Clone)]
pub struct BookstoreState {
    pub books: Arc<dyn BookRepository>,
    pub health: Arc<dyn HealthCheck>,
}

impl BookstoreState {
    pub fn new(books: Arc<dyn BookRepository>, health: Arc<dyn HealthCheck>) -> Self {
        Self { books, health }
    }
}

pub fn bookstore_router(state: BookstoreState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/readyz", get(health_handler))
        .route("/books", get(books_index).post(create_book))
        .route("/books/{isbn}", get(book_by_isbn))
        .with_state(state)
}

/// Router wrapped so that `/books/` and `/books` resolve to the same route.
/// Path normalization has to run before routing, hence the outer layer.
pub fn bookstore_app(state: BookstoreState) -> NormalizePath<Router> {
    NormalizePath::trim_trailing_slash(bookstore_router(state))
}
