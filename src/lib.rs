pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod router;
pub mod vault;

pub use error::BookstoreError;
pub use router::{BookstoreState, bookstore_app, bookstore_router};
