use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use tracing::{error, info, warn};

use crate::db::Book;
use crate::{BookstoreError, router::BookstoreState};

/// GET /books -> every book as a JSON array.
pub async fn books_index(
    State(state): State<BookstoreState>,
) -> Result<Json<Vec<Book>>, BookstoreError> {
    let books = state
        .books
        .list_all()
        .await
        .inspect_err(|e| error!(error = %e, "failed to list books"))?;
    Ok(Json(books))
}

/// GET /books/{isbn} -> a single book. Unknown ISBNs answer 500.
pub async fn book_by_isbn(
    State(state): State<BookstoreState>,
    Path(isbn): Path<String>,
) -> Result<Json<Book>, BookstoreError> {
    let book = state
        .books
        .get_by_isbn(&isbn)
        .await
        .inspect_err(|e| error!(isbn = %isbn, error = %e, "failed to load book"))?;
    Ok(Json(book))
}

/// POST /books -> insert the decoded book and echo it back.
///
/// The body is decoded by hand so that every malformed payload is a 400,
/// regardless of content type.
pub async fn create_book(
    State(state): State<BookstoreState>,
    body: Bytes,
) -> Result<Json<Book>, BookstoreError> {
    let book: Book = serde_json::from_slice(&body)
        .inspect_err(|e| warn!(error = %e, "rejecting malformed book payload"))?;

    state
        .books
        .create(&book)
        .await
        .inspect_err(|e| error!(isbn = %book.isbn, error = %e, "failed to create book"))?;

    info!(isbn = %book.isbn, "book created");
    Ok(Json(book))
}
